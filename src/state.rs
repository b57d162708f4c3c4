use std::path::Path;

use survey_targeting::data::export::to_csv_bytes;
use survey_targeting::{TargetingContext, TargetingOutcome};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Found(usize),
    NoMatches,
    Saved(String),
    Error(String),
}

impl Status {
    pub fn message(&self) -> String {
        match self {
            Status::Found(n) => format!("{n} doctors found for the selected hour!"),
            Status::NoMatches => "No doctors found for the selected time.".to_string(),
            Status::Saved(path) => format!("Saved {path}"),
            Status::Error(e) => format!("Error: {e}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Artifacts and dataset loaded at startup.
    pub context: TargetingContext,

    /// Hour picked on the slider.
    pub selected_hour: u32,

    /// Outcome of the last request (None until the button is pressed).
    pub outcome: Option<TargetingOutcome>,

    /// CSV bytes of the last non-empty outcome.
    pub export: Option<Vec<u8>>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(context: TargetingContext) -> Self {
        let selected_hour = context.config().default_hour;
        Self {
            context,
            selected_hour,
            outcome: None,
            export: None,
            status: None,
        }
    }

    /// Pick a new hour.  Results of the previous hour are dropped so the
    /// table and the download never belong to a different hour than the slider.
    pub fn select_hour(&mut self, hour: u32) {
        if hour == self.selected_hour {
            return;
        }
        self.selected_hour = hour;
        self.outcome = None;
        self.export = None;
        self.status = None;
    }

    /// Run the pipeline for `selected_hour` and refresh outcome, export and status.
    pub fn run_selection(&mut self) {
        self.export = None;
        self.outcome = None;

        let outcome = match self.context.run(self.selected_hour) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Request for hour {} failed: {e}", self.selected_hour);
                self.status = Some(Status::Error(e.to_string()));
                return;
            }
        };

        match outcome.table() {
            Some(table) => match to_csv_bytes(table) {
                Ok(bytes) => {
                    self.export = Some(bytes);
                    self.status = Some(Status::Found(table.len()));
                }
                Err(e) => {
                    log::error!("Export failed: {e}");
                    self.status = Some(Status::Error(e.to_string()));
                }
            },
            None => self.status = Some(Status::NoMatches),
        }
        self.outcome = Some(outcome);
    }

    /// Write the current export to `path`.
    pub fn save_export(&mut self, path: &Path) {
        let Some(bytes) = &self.export else {
            return;
        };
        match std::fs::write(path, bytes) {
            Ok(()) => {
                log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
                self.status = Some(Status::Saved(path.display().to_string()));
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                self.status = Some(Status::Error(format!("writing {}: {e}", path.display())));
            }
        }
    }
}
