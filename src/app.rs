use eframe::egui;

use crate::ui::{panels, table};
use qualifying_totals::state::AppState;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct QualifyingTotalsApp {
    pub state: AppState,
}

impl eframe::App for QualifyingTotalsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs + table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::segment_tabs(ui, &mut self.state);
            ui.separator();
            table::table_view(ui, &mut self.state);
        });
    }
}
