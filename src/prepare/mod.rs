//! Feature preparation: timestamps, derived hour, categorical encoding.

pub mod features;
pub mod timestamp;

pub use features::{FeatureMatrix, PreparedTable, feature_names, prepare};
