//! Metrics comparing ground truth with predictions.

use crate::auditor::constant::GroupKind;
use crate::auditor::error::{AuditError, AuditResult};
use crate::auditor::object::{BinaryLabelDataset, GroupSpec};
use crate::auditor::utility::safe_div;

use super::base::{ConfusionMatrix, MetricValue};

/// Group-level error rates of a (truth, predicted) dataset pair.
///
/// Both datasets must hold the same rows in the same order; only the labels
/// of `predicted` differ. Counts are weighted by the ground-truth weights.
pub struct ClassificationMetric<'a> {
    truth: &'a BinaryLabelDataset,
    predicted: &'a BinaryLabelDataset,
    groups: GroupSpec,
}

impl<'a> ClassificationMetric<'a> {
    pub fn new(
        truth: &'a BinaryLabelDataset,
        predicted: &'a BinaryLabelDataset,
        groups: GroupSpec,
    ) -> AuditResult<Self> {
        if truth.len() != predicted.len() {
            return Err(AuditError::Mismatch(format!(
                "{} ground-truth rows vs {} predicted rows",
                truth.len(),
                predicted.len()
            )));
        }
        if truth.favorable_label != predicted.favorable_label {
            return Err(AuditError::Mismatch("favorable labels differ".to_string()));
        }
        if let Some(row) = truth
            .records
            .iter()
            .zip(&predicted.records)
            .position(|(t, p)| t.protected != p.protected)
        {
            return Err(AuditError::Mismatch(format!(
                "row {} has a different protected attribute in the predictions",
                row
            )));
        }

        Ok(Self {
            truth,
            predicted,
            groups,
        })
    }

    /// Weighted confusion matrix; `None` covers both groups.
    pub fn confusion_matrix(&self, privileged: Option<bool>) -> ConfusionMatrix {
        let code = privileged.map(|p| self.groups.code(GroupKind::from_privileged(p)));
        let favorable = self.truth.favorable_label;

        let mut cm = ConfusionMatrix::default();
        for (t, p) in self.truth.records.iter().zip(&self.predicted.records) {
            if code.is_some_and(|c| t.protected != c) {
                continue;
            }
            match (t.label == favorable, p.label == favorable) {
                (true, true) => cm.tp += t.weight,
                (false, true) => cm.fp += t.weight,
                (false, false) => cm.tn += t.weight,
                (true, false) => cm.fn_ += t.weight,
            }
        }
        cm
    }

    /// FP / N for the selected group; NaN without actual negatives.
    pub fn false_positive_rate(&self, privileged: bool) -> f64 {
        let cm = self.confusion_matrix(Some(privileged));
        safe_div(cm.fp, cm.negatives())
    }

    /// TP / P for the selected group; NaN without actual positives.
    pub fn true_positive_rate(&self, privileged: bool) -> f64 {
        let cm = self.confusion_matrix(Some(privileged));
        safe_div(cm.tp, cm.positives())
    }

    /// FPR(unprivileged) - FPR(privileged)
    pub fn false_positive_rate_difference(&self) -> MetricValue {
        let value = self.false_positive_rate(false) - self.false_positive_rate(true);
        MetricValue::difference("False Positive Rate Difference", value)
    }

    /// TPR(unprivileged) - TPR(privileged)
    pub fn equal_opportunity_difference(&self) -> MetricValue {
        let value = self.true_positive_rate(false) - self.true_positive_rate(true);
        MetricValue::difference("Equal Opportunity Difference", value)
    }
}
