//! Survey targeting: score a doctor dataset with a pre-trained classifier and
//! export the doctors predicted to respond at a chosen hour.
//!
//! The pipeline is synchronous and read-only over its inputs:
//! [`pipeline::TargetingContext`] is built once at startup and every request
//! goes through [`pipeline::TargetingContext::run`].

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prepare;

pub use config::AppConfig;
pub use error::TargetingError;
pub use pipeline::{TargetingContext, TargetingOutcome};
