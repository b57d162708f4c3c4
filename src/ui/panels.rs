use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use survey_targeting::data::export::{EXPORT_FILE_NAME, EXPORT_MIME};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar – hour picker and actions
// ---------------------------------------------------------------------------

/// Render the hour slider, the request button and the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Preferred survey time (hour)");
        let mut hour = state.selected_hour;
        if ui.add(egui::Slider::new(&mut hour, 0..=23)).changed() {
            state.select_hour(hour);
        }

        if ui.button("Get list of doctors").clicked() {
            state.run_selection();
        }

        ui.add_enabled_ui(state.export.is_some(), |ui: &mut Ui| {
            if ui.button("Download CSV").clicked() {
                save_file_dialog(state);
            }
        });
    });

    ui.label(format!("{} doctors loaded", state.context.table().len()));

    if let Some(status) = &state.status {
        let color = if status.is_error() {
            Color32::RED
        } else {
            Color32::from_rgb(0x4C, 0xAF, 0x50)
        };
        ui.label(RichText::new(status.message()).color(color));
    }
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Central panel – result table
// ---------------------------------------------------------------------------

/// Render the selected doctors.
pub fn results_table(ui: &mut Ui, state: &AppState) {
    let Some(table) = state.outcome.as_ref().and_then(|o| o.table()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Pick an hour and press \"Get list of doctors\"");
        });
        return;
    };

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true), table.columns.len())
        .header(20.0, |mut header| {
            for name in &table.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.len(), |mut row| {
                let cells = &table.rows[row.index()];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell.to_string());
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save selected doctors")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter(EXPORT_MIME, &["csv"])
        .save_file();

    if let Some(path) = file {
        state.save_export(&path);
    }
}
