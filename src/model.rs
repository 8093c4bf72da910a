//! Classification step producing the predicted dataset.
//!
//! The audit ships no trained model. [`LabelEchoClassifier`] stands in for
//! one by echoing the ground-truth labels, so classification metrics computed
//! from its output describe a perfect classifier. Plug a real model in by
//! implementing [`Classifier`].

use std::fmt::Debug;

use crate::auditor::error::AuditResult;
use crate::auditor::object::BinaryLabelDataset;

/// Anything that can label the rows of a dataset.
pub trait Classifier: Send + Sync + Debug {
    /// Return a copy of `dataset` carrying predicted labels.
    ///
    /// Rows, their order, groups and weights must be preserved.
    fn predict(&self, dataset: &BinaryLabelDataset) -> AuditResult<BinaryLabelDataset>;

    /// Get model name
    fn name(&self) -> &str {
        "Classifier"
    }
}

/// Stub classifier returning the true labels as predictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelEchoClassifier;

impl Classifier for LabelEchoClassifier {
    fn predict(&self, dataset: &BinaryLabelDataset) -> AuditResult<BinaryLabelDataset> {
        dataset.with_labels(&dataset.labels())
    }

    fn name(&self) -> &str {
        "LabelEchoClassifier (simulated predictions)"
    }
}

/// Classifier predicting the same label for every row.
///
/// Useful as a baseline: its false positive rate is 1.0 or 0.0 in every group.
#[derive(Debug, Clone, Copy)]
pub struct ConstantClassifier {
    pub label: i64,
}

impl Classifier for ConstantClassifier {
    fn predict(&self, dataset: &BinaryLabelDataset) -> AuditResult<BinaryLabelDataset> {
        dataset.with_labels(&vec![self.label; dataset.len()])
    }

    fn name(&self) -> &str {
        "ConstantClassifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auditor::constant::RiskCategory;
    use crate::auditor::object::{AuditRecord, GroupSpec};
    use crate::metrics::ClassificationMetric;

    fn sample() -> BinaryLabelDataset {
        BinaryLabelDataset::new(
            vec![
                AuditRecord::new(1, 1, RiskCategory::Low),
                AuditRecord::new(0, 1, RiskCategory::High),
                AuditRecord::new(0, 0, RiskCategory::Medium),
                AuditRecord::new(1, 0, RiskCategory::Low),
            ],
            1,
        )
    }

    #[test]
    fn test_echo_copies_truth() {
        let truth = sample();
        let predicted = LabelEchoClassifier.predict(&truth).unwrap();
        assert_eq!(predicted, truth);
    }

    #[test]
    fn test_constant_classifier_rates() {
        let truth = sample();
        let predicted = ConstantClassifier { label: 1 }.predict(&truth).unwrap();
        let metric = ClassificationMetric::new(&truth, &predicted, GroupSpec::default()).unwrap();

        assert_eq!(metric.false_positive_rate(true), 1.0);
        assert_eq!(metric.false_positive_rate(false), 1.0);
        assert_eq!(metric.false_positive_rate_difference().value, 0.0);
    }
}
