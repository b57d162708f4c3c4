//! Request pipeline: prepare → predict → select → project.
//!
//! [`TargetingContext`] owns the three read-only inputs for the life of the
//! process.  Each call to [`TargetingContext::run`] works only on request-local
//! data, so a shared `&TargetingContext` can serve any number of requests.

use anyhow::{Context, ensure};

use crate::config::AppConfig;
use crate::data::filter::{matching_rows, project};
use crate::data::loader::load_file;
use crate::data::model::DataTable;
use crate::error::{Result, TargetingError};
use crate::model::{Classifier, EncoderSet, Label, RandomForest};
use crate::prepare::{feature_names, prepare};

/// Result of one request.  An empty selection is an outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetingOutcome {
    /// Projected rows for the selected hour.
    Matches(DataTable),
    NoMatches,
}

impl TargetingOutcome {
    pub fn len(&self) -> usize {
        match self {
            TargetingOutcome::Matches(table) => table.len(),
            TargetingOutcome::NoMatches => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table(&self) -> Option<&DataTable> {
        match self {
            TargetingOutcome::Matches(table) => Some(table),
            TargetingOutcome::NoMatches => None,
        }
    }
}

/// Everything loaded at startup.
pub struct TargetingContext {
    classifier: Box<dyn Classifier>,
    encoders: EncoderSet,
    table: DataTable,
    config: AppConfig,
}

impl TargetingContext {
    /// Load the classifier, encoders and dataset named by `config`.
    pub fn load(config: &AppConfig) -> anyhow::Result<Self> {
        let classifier = RandomForest::load(&config.model_path).context("loading classifier")?;
        let encoders = EncoderSet::load(&config.encoders_path).context("loading encoders")?;
        let table = load_file(&config.dataset_path).context("loading dataset")?;
        Self::new(Box::new(classifier), encoders, table, config.clone())
    }

    /// Assemble a context from already-loaded parts, checking that they fit
    /// together.
    pub fn new(
        classifier: Box<dyn Classifier>,
        encoders: EncoderSet,
        table: DataTable,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let features = feature_names(&config.columns);
        ensure!(
            classifier.n_features() == features.len(),
            "classifier expects {} features, pipeline produces {} ({:?})",
            classifier.n_features(),
            features.len(),
            features
        );

        for column in &config.columns.categorical {
            ensure!(
                encoders.get(column).is_some(),
                "no encoder for categorical column '{column}'"
            );
        }

        let cols = &config.columns;
        let required = [&cols.login_time, &cols.logout_time, &cols.usage]
            .into_iter()
            .chain(&cols.categorical)
            .chain(&config.export_columns);
        for column in required {
            ensure!(
                table.column_index(column).is_some(),
                "dataset has no column '{column}' (found {:?})",
                table.columns
            );
        }

        Ok(TargetingContext {
            classifier,
            encoders,
            table,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// Score every row and return the positive rows logged in at `hour`,
    /// projected to the export columns.
    pub fn run(&self, hour: u32) -> Result<TargetingOutcome> {
        if hour > 23 {
            return Err(TargetingError::HourOutOfRange(hour));
        }

        let prepared = prepare(
            &self.table,
            &self.encoders,
            &self.config.columns,
            self.config.unknown_category,
        )?;

        let matrix = &prepared.matrix;
        let expected = self.classifier.n_features();
        if !matrix.is_empty() && matrix.width() != expected {
            return Err(TargetingError::FeatureWidth {
                expected,
                got: matrix.width(),
            });
        }

        let labels = if matrix.is_empty() {
            Vec::new()
        } else {
            self.classifier.predict(matrix)
        };
        if labels.len() != matrix.len() {
            return Err(TargetingError::LabelCount {
                expected: matrix.len(),
                got: labels.len(),
            });
        }

        let mut predictions: Vec<Option<Label>> = vec![None; self.table.len()];
        for (&row, label) in prepared.matrix_rows.iter().zip(labels) {
            predictions[row] = Some(label);
        }

        let rows = matching_rows(&prepared.login_hour, &predictions, hour);
        log::info!(
            "Hour {hour}: scored {} of {} rows, {} matches",
            matrix.len(),
            self.table.len(),
            rows.len()
        );

        if rows.is_empty() {
            return Ok(TargetingOutcome::NoMatches);
        }
        let selected = project(&self.table, &rows, &self.config.export_columns)?;
        Ok(TargetingOutcome::Matches(selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::prepare::FeatureMatrix;

    /// Positive exactly when the hour feature is 8.
    struct EightOClock;

    impl Classifier for EightOClock {
        fn n_features(&self) -> usize {
            5
        }

        fn predict(&self, features: &FeatureMatrix) -> Vec<Label> {
            features
                .rows()
                .iter()
                .map(|r| {
                    if r[0] == 8.0 {
                        Label::Positive
                    } else {
                        Label::Negative
                    }
                })
                .collect()
        }
    }

    /// Drops the last label.
    struct Short;

    impl Classifier for Short {
        fn n_features(&self) -> usize {
            5
        }

        fn predict(&self, features: &FeatureMatrix) -> Vec<Label> {
            vec![Label::Positive; features.len().saturating_sub(1)]
        }
    }

    fn encoders() -> EncoderSet {
        EncoderSet::from_json(
            r#"{"State": ["NY"], "Region": ["East"], "Speciality": ["Cardiology"]}"#,
        )
        .unwrap()
    }

    fn table() -> DataTable {
        let mut t = DataTable::new(
            [
                "NPI",
                "State",
                "Login Time",
                "Logout Time",
                "Usage Time (mins)",
                "Region",
                "Speciality",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        for (npi, login) in [(1, "08:15"), (2, "09:40"), (3, "08:59")] {
            t.push_row(vec![
                CellValue::Integer(npi),
                CellValue::Text("NY".into()),
                CellValue::Text(login.into()),
                CellValue::Text("10:00".into()),
                CellValue::Integer(30),
                CellValue::Text("East".into()),
                CellValue::Text("Cardiology".into()),
            ]);
        }
        t
    }

    fn context(classifier: Box<dyn Classifier>) -> TargetingContext {
        TargetingContext::new(classifier, encoders(), table(), AppConfig::default()).unwrap()
    }

    #[test]
    fn selects_positive_rows_at_the_hour() {
        let ctx = context(Box::new(EightOClock));
        let outcome = ctx.run(8).unwrap();
        let selected = outcome.table().unwrap();
        assert_eq!(selected.columns, vec!["NPI", "State", "Region", "Speciality"]);
        let ids: Vec<_> = selected.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec![CellValue::Integer(1), CellValue::Integer(3)]);

        assert_eq!(ctx.run(9).unwrap(), TargetingOutcome::NoMatches);
    }

    #[test]
    fn hour_out_of_range_is_rejected() {
        let ctx = context(Box::new(EightOClock));
        assert!(matches!(ctx.run(24), Err(TargetingError::HourOutOfRange(24))));
    }

    #[test]
    fn label_count_mismatch_is_a_fault() {
        let ctx = context(Box::new(Short));
        assert!(matches!(
            ctx.run(8),
            Err(TargetingError::LabelCount { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn mismatched_parts_fail_at_construction() {
        struct Wide;
        impl Classifier for Wide {
            fn n_features(&self) -> usize {
                7
            }
            fn predict(&self, _: &FeatureMatrix) -> Vec<Label> {
                Vec::new()
            }
        }
        let err = TargetingContext::new(Box::new(Wide), encoders(), table(), AppConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("expects 7 features"));

        let mut t = table();
        t.columns[1] = "Province".into();
        assert!(
            TargetingContext::new(Box::new(EightOClock), encoders(), t, AppConfig::default())
                .is_err()
        );
    }
}
