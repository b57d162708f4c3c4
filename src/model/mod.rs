//! Pre-trained artifacts: the binary classifier and the label encoders.
//!
//! Both are produced offline and only read here.

pub mod encoders;
pub mod forest;

use crate::prepare::features::FeatureMatrix;

pub use encoders::{EncoderSet, LabelEncoder};
pub use forest::RandomForest;

/// Binary outcome for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Map a class value (`1` is positive) to a label.
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    pub fn is_positive(self) -> bool {
        self == Label::Positive
    }
}

/// Anything that can score a feature matrix.
///
/// Implementations must return exactly one label per matrix row, in row order.
pub trait Classifier: Send + Sync {
    /// Number of features each row must carry.
    fn n_features(&self) -> usize;

    fn predict(&self, features: &FeatureMatrix) -> Vec<Label>;
}
