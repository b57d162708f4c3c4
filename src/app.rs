use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SurveyTargetingApp {
    pub state: AppState,
}

impl SurveyTargetingApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SurveyTargetingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: hour picker ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: results ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::results_table(ui, &self.state);
        });
    }
}
