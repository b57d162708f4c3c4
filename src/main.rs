mod app;
mod state;
mod ui;

use std::path::Path;

use anyhow::{Context, anyhow};
use app::SurveyTargetingApp;
use eframe::egui;
use state::AppState;
use survey_targeting::config::{AppConfig, CONFIG_FILE_NAME};
use survey_targeting::TargetingContext;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Artifacts are a precondition: fail here, before any window opens.
    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?;
    let context = TargetingContext::load(&config).context("startup failed")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([500.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Doctor Survey Targeting",
        options,
        Box::new(|_cc| Ok(Box::new(SurveyTargetingApp::new(AppState::new(context))))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}
