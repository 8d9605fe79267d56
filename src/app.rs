use eframe::egui;

use crate::state::{AppState, Operation};
use crate::ui::{panels, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: operations ----
        egui::SidePanel::left("operation_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.operation {
            Operation::RawData => views::raw_data(ui, &self.state),
            Operation::Summary => views::summary(ui, &self.state),
            Operation::Filter => views::filter_rows(ui, &mut self.state),
            Operation::Aggregate => views::group_aggregate(ui, &mut self.state),
            Operation::Plot => views::plot_column(ui, &mut self.state),
        });
    }
}
