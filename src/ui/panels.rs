use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Operation};

// ---------------------------------------------------------------------------
// Left side panel – operation selector
// ---------------------------------------------------------------------------

/// Render the left panel: which operation the central panel shows.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Operation");
    ui.separator();

    for op in Operation::ALL {
        if ui
            .selectable_label(state.operation == op, op.label())
            .clicked()
        {
            state.operation = op;
        }
    }

    ui.separator();
    match &state.source {
        Some(path) => {
            ui.label(RichText::new(path.display().to_string()).small());
        }
        None => {
            ui.label("No dataset loaded.");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.summary.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        if ui
            .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
            .clicked()
        {
            state.reload();
        }

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows × {} columns",
                table.len(),
                table.columns().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open taxi statistics")
        .add_filter("CSV", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_summary_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export summary")
        .add_filter("JSON", &["json"])
        .set_file_name("summary.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = export_summary(state, &path) {
            log::error!("summary export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_summary(state: &AppState, path: &Path) -> Result<()> {
    let summary = state.summary.as_ref().context("no dataset loaded")?;
    let json = serde_json::to_string_pretty(summary).context("serializing summary")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("summary written to {}", path.display());
    Ok(())
}
