//! Core types shared by the metric calculators.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auditor::utility::format_metric;

/// A named scalar statistic together with its neutral value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub name: String,
    /// NaN when a denominator was zero
    pub value: f64,
    /// 1.0 for ratios, 0.0 for differences
    pub ideal: f64,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, ideal: f64) -> Self {
        let name = name.into();
        if value.is_nan() {
            tracing::warn!("{} is undefined (a group has no qualifying rows)", name);
        }
        Self { name, value, ideal }
    }

    /// Ratio metric, neutral at 1.0
    pub fn ratio(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, 1.0)
    }

    /// Difference metric, neutral at 0.0
    pub fn difference(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, 0.0)
    }

    pub fn is_defined(&self) -> bool {
        !self.value.is_nan()
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (Ideal: {:.1})", self.name, format_metric(self.value), self.ideal)
    }
}

/// Weighted confusion matrix, "positive" meaning the favorable label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: f64,
    pub fp: f64,
    pub tn: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
}

impl ConfusionMatrix {
    /// Actual positives
    pub fn positives(&self) -> f64 {
        self.tp + self.fn_
    }

    /// Actual negatives
    pub fn negatives(&self) -> f64 {
        self.fp + self.tn
    }

    pub fn total(&self) -> f64 {
        self.positives() + self.negatives()
    }
}
