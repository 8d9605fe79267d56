mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use app::ExplorerApp;
use eframe::egui;
use state::AppState;
use taxi_explorer::data::CleaningConfig;

/// Dataset opened at startup when no path is given.
const DEFAULT_DATA_PATH: &str = "data/sample_data.csv";

/// Optional JSON file overriding [`CleaningConfig`] defaults.
const CONFIG_ENV: &str = "TAXI_EXPLORER_CONFIG";

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            CleaningConfig::from_json_file(&path)
                .with_context(|| format!("loading {CONFIG_ENV}={}", path.display()))?
        }
        None => CleaningConfig::default(),
    };

    let data_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let mut state = AppState::new(config);
    state.open(&data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Taxi Explorer – CSV Data Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
