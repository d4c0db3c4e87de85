mod app;
mod ui;

use app::QualifyingTotalsApp;
use clap::Parser;
use eframe::egui;
use qualifying_totals::config::AppConfig;
use qualifying_totals::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();
    let config = AppConfig::parse();
    log::debug!("Starting with {config:?}");

    let state = AppState::from_config(&config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Qualifying Totals",
        options,
        Box::new(|_cc| Ok(Box::new(QualifyingTotalsApp { state }))),
    )
}
