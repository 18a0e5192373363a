mod app;
mod color;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::DashboardApp;
use clap::Parser;
use eframe::egui;
use purchase_dashboard::config::Args;
use purchase_dashboard::data::loader::load_file;
use state::AppState;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let mut state = AppState::new(args.sheet.clone());
    if let Some(path) = &args.data {
        // A dataset named at startup must load; there is nothing to show otherwise.
        let dataset = load_file(path, &args.sheet)
            .with_context(|| format!("loading purchases from {}", path.display()))?;
        state.set_dataset(dataset);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Purchase Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
