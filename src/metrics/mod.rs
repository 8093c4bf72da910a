//! Fairness metrics engine.
//!
//! Every computation is a pure function of its dataset(s) and the group
//! codes. A division with a zero denominator yields `NaN`, which propagates
//! through ratios and differences and is reported verbatim.

pub mod base;
pub mod classification;
pub mod dataset_metric;

pub use base::{ConfusionMatrix, MetricValue};
pub use classification::ClassificationMetric;
pub use dataset_metric::BinaryLabelDatasetMetric;
