//! Core of the taxi statistics explorer: load a CSV once, infer and clean
//! column types, then answer preview / summary / filter / aggregate / series
//! queries over the cleaned table.

pub mod data;
