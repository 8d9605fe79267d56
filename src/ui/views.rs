use eframe::egui::{self, Color32, Grid, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, DatePickerButton, TableBuilder};

use taxi_explorer::data::{
    preview, series, CleanedTable, ColumnStats, Summary, DEFAULT_PREVIEW_ROWS,
};

use crate::state::{AppState, FilterControl};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

/// Render a cleaned table as a striped grid of cells.
pub fn data_table(ui: &mut Ui, id: &str, table: &CleanedTable) {
    let names: Vec<&str> = table.column_names().collect();
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .columns(TableColumn::auto().at_least(80.0), names.len())
                .header(20.0, |mut header| {
                    for name in &names {
                        header.col(|ui| {
                            ui.strong(*name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.len(), |mut row| {
                        let i = row.index();
                        for column in table.columns() {
                            row.col(|ui| {
                                ui.label(column.values[i].to_string());
                            });
                        }
                    });
                });
        });
    });
}

/// Drop-down over `options`; returns true when the selection changed.
fn column_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: &mut Option<String>,
    options: &[String],
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.as_deref().unwrap_or("—"))
            .show_ui(ui, |ui: &mut Ui| {
                for option in options {
                    let selected = current.as_deref() == Some(option.as_str());
                    if ui.selectable_label(selected, option).clicked() && !selected {
                        *current = Some(option.clone());
                        changed = true;
                    }
                }
            });
    });
    changed
}

fn no_data(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a CSV file to explore it  (File → Open…)");
    });
}

fn warning(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(Color32::YELLOW));
}

// ---------------------------------------------------------------------------
// View raw data
// ---------------------------------------------------------------------------

pub fn raw_data(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return no_data(ui);
    };
    ui.heading(format!("Raw data (first {DEFAULT_PREVIEW_ROWS} rows)"));
    data_table(ui, "raw_table", &preview(table, DEFAULT_PREVIEW_ROWS));
}

// ---------------------------------------------------------------------------
// Data summary
// ---------------------------------------------------------------------------

pub fn summary(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        return no_data(ui);
    };
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Columns");
        info_grid(ui, summary);
        ui.add_space(12.0);
        ui.heading("Statistics");
        stats_grid(ui, summary);
    });
}

fn info_grid(ui: &mut Ui, summary: &Summary) {
    ui.label(format!("{} rows", summary.row_count));
    Grid::new("info_grid").striped(true).show(ui, |ui: &mut Ui| {
        ui.strong("#");
        ui.strong("Column");
        ui.strong("Non-missing");
        ui.strong("Type");
        ui.end_row();
        for (i, col) in summary.columns.iter().enumerate() {
            ui.label(i.to_string());
            ui.label(col.name.as_str());
            ui.label(col.non_missing.to_string());
            ui.label(col.semantic_type.to_string());
            ui.end_row();
        }
    });
    ui.label(format!("memory usage: {:.1} KB", summary.memory_bytes as f64 / 1024.0));
}

fn stats_grid(ui: &mut Ui, summary: &Summary) {
    let num = |v: Option<f64>| v.map_or_else(|| "—".to_string(), |v| format!("{v:.2}"));

    for col in &summary.columns {
        egui::CollapsingHeader::new(RichText::new(&col.name).strong())
            .id_salt(&col.name)
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                Grid::new(("stats", &col.name)).show(ui, |ui: &mut Ui| {
                    let row = |ui: &mut Ui, key: &str, value: String| {
                        ui.label(key);
                        ui.label(value);
                        ui.end_row();
                    };
                    match &col.stats {
                        ColumnStats::Numeric(s) => {
                            row(ui, "count", s.count.to_string());
                            row(ui, "mean", num(s.mean));
                            row(ui, "std", num(s.std));
                            row(ui, "min", num(s.min));
                            row(ui, "25%", num(s.q25));
                            row(ui, "50%", num(s.median));
                            row(ui, "75%", num(s.q75));
                            row(ui, "max", num(s.max));
                        }
                        ColumnStats::Categorical(s) => {
                            row(ui, "count", s.count.to_string());
                            row(ui, "unique", s.unique.to_string());
                            row(ui, "top", s.top.clone().unwrap_or_else(|| "—".into()));
                            row(ui, "freq", s.freq.to_string());
                        }
                        ColumnStats::Datetime(s) => {
                            let ts = |t: Option<chrono::NaiveDateTime>| {
                                t.map_or_else(|| "—".to_string(), |t| t.to_string())
                            };
                            row(ui, "count", s.count.to_string());
                            row(ui, "min", ts(s.min));
                            row(ui, "max", ts(s.max));
                            let range = s.range().map_or_else(
                                || "—".to_string(),
                                |d| format!("{} days", d.num_days()),
                            );
                            row(ui, "range", range);
                        }
                    }
                });
            });
    }
}

// ---------------------------------------------------------------------------
// Filter rows
// ---------------------------------------------------------------------------

pub fn filter_rows(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table.clone() else {
        return no_data(ui);
    };
    let columns: Vec<String> = table.column_names().map(str::to_string).collect();

    let mut column = state.filter_column.clone();
    if column_combo(ui, "filter_column", "Column", &mut column, &columns) {
        state.set_filter_column(column);
    }

    if filter_controls(ui, &mut state.filter_control) {
        state.refilter();
    }
    ui.separator();

    match &state.filtered {
        Some(Ok(rows)) => {
            ui.label(format!("{} of {} rows", rows.len(), table.len()));
            data_table(ui, "filtered_table", rows);
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
        None => {}
    }
}

/// Widgets for the current filter control; true when any value changed.
fn filter_controls(ui: &mut Ui, control: &mut FilterControl) -> bool {
    let mut changed = false;
    match control {
        FilterControl::Numeric { bounds, range } => {
            let span = bounds.0..=bounds.1;
            changed |= ui
                .add(egui::Slider::new(&mut range.0, span.clone()).text("from"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut range.1, span).text("to"))
                .changed();
            if range.0 > range.1 {
                std::mem::swap(&mut range.0, &mut range.1);
            }
        }
        FilterControl::Dates { bounds, range } => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("from");
                changed |= ui
                    .add(DatePickerButton::new(&mut range.0).id_salt("filter_start"))
                    .changed();
                ui.label("to");
                changed |= ui
                    .add(DatePickerButton::new(&mut range.1).id_salt("filter_end"))
                    .changed();
            });
            range.0 = range.0.clamp(bounds.0, bounds.1);
            range.1 = range.1.clamp(bounds.0, bounds.1);
            if range.0 > range.1 {
                std::mem::swap(&mut range.0, &mut range.1);
            }
        }
        FilterControl::Values { all, selected } => {
            ui.label("Values (none selected shows every row)");
            ScrollArea::vertical()
                .id_salt("filter_values")
                .max_height(160.0)
                .show(ui, |ui: &mut Ui| {
                    for value in all.iter() {
                        let mut checked = selected.contains(value);
                        if ui.checkbox(&mut checked, value.as_str()).changed() {
                            if checked {
                                selected.insert(value.clone());
                            } else {
                                selected.remove(value);
                            }
                            changed = true;
                        }
                    }
                });
        }
        FilterControl::Unavailable => {
            warning(ui, "This column has no values to filter on.");
        }
    }
    changed
}

// ---------------------------------------------------------------------------
// Group & aggregate
// ---------------------------------------------------------------------------

pub fn group_aggregate(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table.clone() else {
        return no_data(ui);
    };
    let numeric = state.numeric_columns();
    if numeric.is_empty() {
        return warning(ui, "No numeric columns available for aggregation.");
    }
    let columns: Vec<String> = table.column_names().map(str::to_string).collect();

    let mut changed = column_combo(
        ui,
        "group_column",
        "Group by",
        &mut state.group_column,
        &columns,
    );
    changed |= column_combo(
        ui,
        "mean_column",
        "Numeric column to average",
        &mut state.mean_column,
        &numeric,
    );
    if changed {
        state.regroup();
    }
    ui.separator();

    match &state.aggregation {
        Some(Ok(agg)) => {
            let value_column = agg.value_columns.first().cloned().unwrap_or_default();
            ScrollArea::vertical()
                .id_salt("aggregate_rows")
                .max_height(200.0)
                .show(ui, |ui: &mut Ui| {
                    Grid::new("aggregate_grid").striped(true).show(ui, |ui: &mut Ui| {
                        ui.strong(agg.group_column.as_str());
                        ui.strong(format!("mean {value_column}"));
                        ui.end_row();
                        for group in &agg.groups {
                            ui.label(group.key.to_string());
                            ui.label(
                                group
                                    .means
                                    .first()
                                    .copied()
                                    .flatten()
                                    .map_or_else(|| "<missing>".to_string(), |m| format!("{m:.2}")),
                            );
                            ui.end_row();
                        }
                    });
                });
            plot::aggregate_chart(ui, agg, state.color_map.as_ref());
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Plot numeric column
// ---------------------------------------------------------------------------

pub fn plot_column(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table.clone() else {
        return no_data(ui);
    };
    let numeric = state.numeric_columns();
    if numeric.is_empty() {
        return warning(ui, "No numeric columns available to plot.");
    }

    column_combo(ui, "plot_column", "Column", &mut state.plot_column, &numeric);

    let Some(column) = state.plot_column.as_deref() else {
        return;
    };
    match series(&table, column) {
        Ok(points) => plot::series_chart(ui, column, &points),
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
    }
}
