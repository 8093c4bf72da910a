//! Metrics over a single labelled dataset.

use crate::auditor::constant::GroupKind;
use crate::auditor::object::{AuditRecord, BinaryLabelDataset, GroupSpec};
use crate::auditor::utility::safe_div;

use super::base::MetricValue;

/// Group-level statistics of one [`BinaryLabelDataset`], weighted by instance weights.
pub struct BinaryLabelDatasetMetric<'a> {
    dataset: &'a BinaryLabelDataset,
    groups: GroupSpec,
}

impl<'a> BinaryLabelDatasetMetric<'a> {
    pub fn new(dataset: &'a BinaryLabelDataset, groups: GroupSpec) -> Self {
        Self { dataset, groups }
    }

    /// Rows selected by `privileged`: `None` means the whole dataset.
    fn rows(&self, privileged: Option<bool>) -> impl Iterator<Item = &'a AuditRecord> + '_ {
        let code = privileged.map(|p| self.groups.code(GroupKind::from_privileged(p)));
        self.dataset
            .records
            .iter()
            .filter(move |r| code.map_or(true, |c| r.protected == c))
    }

    /// Weighted row count.
    pub fn num_instances(&self, privileged: Option<bool>) -> f64 {
        self.rows(privileged).map(|r| r.weight).sum()
    }

    /// Weighted count of favorable-label rows.
    pub fn num_positives(&self, privileged: Option<bool>) -> f64 {
        self.rows(privileged)
            .filter(|r| self.dataset.is_favorable(r))
            .map(|r| r.weight)
            .sum()
    }

    /// Weighted count of unfavorable-label rows.
    pub fn num_negatives(&self, privileged: Option<bool>) -> f64 {
        self.rows(privileged)
            .filter(|r| !self.dataset.is_favorable(r))
            .map(|r| r.weight)
            .sum()
    }

    /// P(favorable | group); NaN for an empty group.
    pub fn base_rate(&self, privileged: Option<bool>) -> f64 {
        safe_div(self.num_positives(privileged), self.num_instances(privileged))
    }

    /// P(fav | unprivileged) / P(fav | privileged)
    pub fn disparate_impact(&self) -> MetricValue {
        let value = safe_div(self.base_rate(Some(false)), self.base_rate(Some(true)));
        MetricValue::ratio("Disparate Impact Ratio", value)
    }

    /// P(fav | unprivileged) - P(fav | privileged)
    pub fn statistical_parity_difference(&self) -> MetricValue {
        let value = self.base_rate(Some(false)) - self.base_rate(Some(true));
        MetricValue::difference("Statistical Parity Difference", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auditor::constant::RiskCategory;

    fn rows(spec: &[(i64, i64, usize)]) -> Vec<AuditRecord> {
        // (protected, label, count)
        spec.iter()
            .flat_map(|&(protected, label, count)| {
                std::iter::repeat(AuditRecord::new(label, protected, RiskCategory::Low)).take(count)
            })
            .collect()
    }

    #[test]
    fn test_equal_rates_are_neutral() {
        let dataset = BinaryLabelDataset::new(rows(&[(1, 1, 3), (1, 0, 7), (0, 1, 6), (0, 0, 14)]), 1);
        let metric = BinaryLabelDatasetMetric::new(&dataset, GroupSpec::default());

        assert!((metric.disparate_impact().value - 1.0).abs() < 1e-12);
        assert!(metric.statistical_parity_difference().value.abs() < 1e-12);
    }

    #[test]
    fn test_unequal_rates() {
        let dataset = BinaryLabelDataset::new(rows(&[(1, 1, 8), (1, 0, 2), (0, 1, 4), (0, 0, 6)]), 1);
        let metric = BinaryLabelDatasetMetric::new(&dataset, GroupSpec::default());

        assert!((metric.base_rate(Some(true)) - 0.8).abs() < 1e-12);
        assert!((metric.base_rate(Some(false)) - 0.4).abs() < 1e-12);
        assert!((metric.base_rate(None) - 0.6).abs() < 1e-12);
        assert!((metric.disparate_impact().value - 0.5).abs() < 1e-12);
        assert!((metric.statistical_parity_difference().value + 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_favorable_label_zero() {
        let dataset = BinaryLabelDataset::new(rows(&[(1, 0, 6), (1, 1, 4), (0, 0, 3), (0, 1, 7)]), 0);
        let metric = BinaryLabelDatasetMetric::new(&dataset, GroupSpec::default());

        assert_eq!(metric.num_positives(Some(true)), 6.0);
        assert_eq!(metric.num_negatives(Some(false)), 7.0);
        assert!((metric.disparate_impact().value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_group_is_nan() {
        let dataset = BinaryLabelDataset::new(rows(&[(1, 1, 5), (1, 0, 5)]), 1);
        let metric = BinaryLabelDatasetMetric::new(&dataset, GroupSpec::default());

        assert_eq!(metric.num_instances(Some(false)), 0.0);
        assert!(metric.base_rate(Some(false)).is_nan());
        assert!(metric.disparate_impact().value.is_nan());
        assert!(metric.statistical_parity_difference().value.is_nan());
    }

    #[test]
    fn test_privileged_never_favorable_is_nan() {
        let dataset = BinaryLabelDataset::new(rows(&[(1, 0, 5), (0, 1, 5)]), 1);
        let metric = BinaryLabelDatasetMetric::new(&dataset, GroupSpec::default());

        assert!(metric.disparate_impact().value.is_nan());
        assert!((metric.statistical_parity_difference().value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_are_used() {
        let mut records = rows(&[(1, 1, 1), (1, 0, 1), (0, 1, 1), (0, 0, 1)]);
        records[0].weight = 3.0;
        let dataset = BinaryLabelDataset::new(records, 1);
        let metric = BinaryLabelDatasetMetric::new(&dataset, GroupSpec::default());

        assert!((metric.base_rate(Some(true)) - 0.75).abs() < 1e-12);
        assert_eq!(metric.num_instances(None), 6.0);
    }
}
