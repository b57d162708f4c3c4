use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// File looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "survey_targeting.json";

/// What to do with a row whose category was never seen by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Abort the whole request with an `UnknownCategory` fault.
    #[default]
    FailRequest,
    /// Drop the offending row and keep going.
    SkipRow,
}

/// Names of the dataset columns the pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub id: String,
    pub login_time: String,
    pub logout_time: String,
    pub usage: String,
    /// Encoded columns, in feature order (between hour and usage).
    pub categorical: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id: "NPI".to_string(),
            login_time: "Login Time".to_string(),
            logout_time: "Logout Time".to_string(),
            usage: "Usage Time (mins)".to_string(),
            categorical: vec![
                "State".to_string(),
                "Region".to_string(),
                "Speciality".to_string(),
            ],
        }
    }
}

/// Startup configuration.  Every field has a default so a partial file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
    pub dataset_path: PathBuf,
    pub columns: ColumnConfig,
    /// Columns written to the export, in order.
    pub export_columns: Vec<String>,
    /// Hour the slider starts on.
    pub default_hour: u32,
    pub unknown_category: UnknownCategoryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        let columns = ColumnConfig::default();
        let mut export_columns = vec![columns.id.clone()];
        export_columns.extend(columns.categorical.iter().cloned());
        Self {
            model_path: PathBuf::from("random_forest_model.json"),
            encoders_path: PathBuf::from("label_encoders.json"),
            dataset_path: PathBuf::from("dummy_npi_data.csv"),
            columns,
            export_columns,
            default_hour: 12,
            unknown_category: UnknownCategoryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Read a config file.  Relative artifact paths resolve against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;

        if let Some(base) = path.parent() {
            for p in [
                &mut config.model_path,
                &mut config.encoders_path,
                &mut config.dataset_path,
            ] {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Use `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Using config {}", path.display());
            Self::load(path)
        } else {
            log::info!("No {} found, using defaults", path.display());
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.default_hour <= 23,
            "default_hour {} is outside 0-23",
            self.default_hour
        );
        ensure!(!self.export_columns.is_empty(), "export_columns is empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_artifact_names() {
        let config = AppConfig::default();
        assert_eq!(config.dataset_path, PathBuf::from("dummy_npi_data.csv"));
        assert_eq!(
            config.export_columns,
            vec!["NPI", "State", "Region", "Speciality"]
        );
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::FailRequest);
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults_and_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "dataset_path": "data/doctors.csv", "unknown_category": "skip_row" }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.dataset_path, dir.path().join("data/doctors.csv"));
        assert_eq!(config.model_path, dir.path().join("random_forest_model.json"));
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::SkipRow);
        assert_eq!(config.columns.login_time, "Login Time");
    }

    #[test]
    fn invalid_hour_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{ "default_hour": 24 }"#).unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
