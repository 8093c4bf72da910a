//! Reweighing pre-processing.
//!
//! Each (group, label) cell of the 2x2 contingency table gets the factor
//! `W(label) * W(group) / (W * W(group, label))`, computed on instance
//! weights. Multiplying row weights by their cell factor gives every populated
//! cell the mass `W(group) * W(label) / W`, which makes group and label
//! independent and keeps the total weight once all four cells have rows.
//! A cell without support keeps factor 1.0.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auditor::constant::GroupKind;
use crate::auditor::error::{AuditError, AuditResult};
use crate::auditor::object::{BinaryLabelDataset, GroupSpec};

/// Per-cell multiplicative weights learned by [`Reweighing::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellWeights {
    pub privileged_favorable: f64,
    pub privileged_unfavorable: f64,
    pub unprivileged_favorable: f64,
    pub unprivileged_unfavorable: f64,
}

impl CellWeights {
    pub fn get(&self, group: GroupKind, favorable: bool) -> f64 {
        match (group, favorable) {
            (GroupKind::Privileged, true) => self.privileged_favorable,
            (GroupKind::Privileged, false) => self.privileged_unfavorable,
            (GroupKind::Unprivileged, true) => self.unprivileged_favorable,
            (GroupKind::Unprivileged, false) => self.unprivileged_unfavorable,
        }
    }

    fn set(&mut self, group: GroupKind, favorable: bool, value: f64) {
        let slot = match (group, favorable) {
            (GroupKind::Privileged, true) => &mut self.privileged_favorable,
            (GroupKind::Privileged, false) => &mut self.privileged_unfavorable,
            (GroupKind::Unprivileged, true) => &mut self.unprivileged_favorable,
            (GroupKind::Unprivileged, false) => &mut self.unprivileged_unfavorable,
        };
        *slot = value;
    }
}

impl Default for CellWeights {
    fn default() -> Self {
        Self {
            privileged_favorable: 1.0,
            privileged_unfavorable: 1.0,
            unprivileged_favorable: 1.0,
            unprivileged_unfavorable: 1.0,
        }
    }
}

/// Reweighing transform over the two configured groups.
#[derive(Debug, Clone)]
pub struct Reweighing {
    groups: GroupSpec,
    weights: Option<CellWeights>,
}

impl Reweighing {
    pub fn new(groups: GroupSpec) -> Self {
        Self { groups, weights: None }
    }

    /// Learned cell factors, once fitted.
    pub fn weights(&self) -> Option<&CellWeights> {
        self.weights.as_ref()
    }

    /// Compute the cell factors from the weighted contingency table.
    pub fn fit(&mut self, dataset: &BinaryLabelDataset) -> AuditResult<&CellWeights> {
        let total = dataset.total_weight();
        if dataset.is_empty() || total <= 0.0 {
            return Err(AuditError::EmptyDataset("cannot reweigh an empty dataset".to_string()));
        }

        // [group][favorable]
        let mut cells = [[0.0f64; 2]; 2];
        for record in &dataset.records {
            let Some(group) = self.groups.kind_of(record.protected) else {
                continue;
            };
            let g = usize::from(!group.is_privileged());
            let l = usize::from(dataset.is_favorable(record));
            cells[g][l] += record.weight;
        }

        let label_total = |l: usize| cells[0][l] + cells[1][l];
        let mut weights = CellWeights::default();

        for group in GroupKind::ALL {
            let g = usize::from(!group.is_privileged());
            let group_total = cells[g][0] + cells[g][1];
            for favorable in [true, false] {
                let l = usize::from(favorable);
                let cell = cells[g][l];
                if cell > 0.0 {
                    weights.set(group, favorable, label_total(l) * group_total / (total * cell));
                } else {
                    debug!("reweighing: empty cell ({}, favorable={}), factor 1.0", group, favorable);
                }
            }
        }

        info!(
            "reweighing factors: priv/fav {:.4}, priv/unfav {:.4}, unpriv/fav {:.4}, unpriv/unfav {:.4}",
            weights.privileged_favorable,
            weights.privileged_unfavorable,
            weights.unprivileged_favorable,
            weights.unprivileged_unfavorable
        );

        Ok(self.weights.insert(weights))
    }

    /// New dataset whose row weights are scaled by their cell factor.
    ///
    /// Rows outside both groups keep their weight.
    pub fn transform(&self, dataset: &BinaryLabelDataset) -> AuditResult<BinaryLabelDataset> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| AuditError::Mismatch("reweighing used before fit".to_string()))?;

        let new_weights: Vec<f64> = dataset
            .records
            .iter()
            .map(|record| match self.groups.kind_of(record.protected) {
                Some(group) => record.weight * weights.get(group, dataset.is_favorable(record)),
                None => record.weight,
            })
            .collect();

        dataset.with_weights(&new_weights)
    }

    pub fn fit_transform(&mut self, dataset: &BinaryLabelDataset) -> AuditResult<BinaryLabelDataset> {
        self.fit(dataset)?;
        self.transform(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auditor::constant::RiskCategory;
    use crate::auditor::object::AuditRecord;
    use crate::metrics::BinaryLabelDatasetMetric;

    fn dataset(spec: &[(i64, i64, usize)], favorable: i64) -> BinaryLabelDataset {
        // (protected, label, count)
        let records = spec
            .iter()
            .flat_map(|&(protected, label, count)| {
                std::iter::repeat(AuditRecord::new(label, protected, RiskCategory::High)).take(count)
            })
            .collect();
        BinaryLabelDataset::new(records, favorable)
    }

    #[test]
    fn test_balanced_data_keeps_unit_weights() {
        let balanced = dataset(&[(1, 1, 4), (1, 0, 6), (0, 1, 8), (0, 0, 12)], 1);
        let reweighed = Reweighing::new(GroupSpec::default()).fit_transform(&balanced).unwrap();

        for weight in reweighed.weights() {
            assert!((weight - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_preserves_rows_labels_and_total_weight() {
        let original = dataset(&[(1, 1, 7), (1, 0, 3), (0, 1, 2), (0, 0, 8)], 1);
        let reweighed = Reweighing::new(GroupSpec::default()).fit_transform(&original).unwrap();

        assert_eq!(reweighed.len(), original.len());
        assert_eq!(reweighed.labels(), original.labels());
        for (a, b) in reweighed.records.iter().zip(&original.records) {
            assert_eq!((a.protected, a.risk), (b.protected, b.risk));
        }
        assert!((reweighed.total_weight() - original.total_weight()).abs() < 1e-9);
    }

    #[test]
    fn test_equalizes_favorable_rates() {
        let original = dataset(&[(1, 1, 7), (1, 0, 3), (0, 1, 2), (0, 0, 8)], 1);
        let reweighed = Reweighing::new(GroupSpec::default()).fit_transform(&original).unwrap();
        let metric = BinaryLabelDatasetMetric::new(&reweighed, GroupSpec::default());

        assert!((metric.base_rate(Some(true)) - metric.base_rate(Some(false))).abs() < 1e-12);
        assert!((metric.disparate_impact().value - 1.0).abs() < 1e-12);
        assert!(metric.statistical_parity_difference().value.abs() < 1e-12);
    }

    #[test]
    fn test_cell_factors() {
        let original = dataset(&[(1, 1, 7), (1, 0, 3), (0, 1, 2), (0, 0, 8)], 1);
        let mut reweighing = Reweighing::new(GroupSpec::default());
        let weights = *reweighing.fit(&original).unwrap();

        // W=20, W(priv)=10, W(fav)=9: 9*10/(20*7)
        assert!((weights.privileged_favorable - 90.0 / 140.0).abs() < 1e-12);
        assert!((weights.unprivileged_unfavorable - 110.0 / 160.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_cell_defaults_to_one() {
        let original = dataset(&[(1, 1, 5), (0, 0, 5)], 1);
        let mut reweighing = Reweighing::new(GroupSpec::default());
        let weights = *reweighing.fit(&original).unwrap();

        assert_eq!(weights.privileged_unfavorable, 1.0);
        assert_eq!(weights.unprivileged_favorable, 1.0);
        assert!((weights.privileged_favorable - 0.5).abs() < 1e-12);
    }

    fn cell_mass(ds: &BinaryLabelDataset, protected: i64, label: i64) -> f64 {
        ds.records
            .iter()
            .filter(|r| r.protected == protected && r.label == label)
            .map(|r| r.weight)
            .sum()
    }

    #[test]
    fn test_fully_separated_groups() {
        // Every privileged row favorable, every unprivileged row unfavorable
        let original = dataset(&[(1, 1, 5), (0, 0, 5)], 1);
        let before = BinaryLabelDatasetMetric::new(&original, GroupSpec::default());
        assert_eq!(before.disparate_impact().value, 0.0);

        let reweighed = Reweighing::new(GroupSpec::default()).fit_transform(&original).unwrap();

        // W(g) * W(l) / W = 5 * 5 / 10 for both populated cells
        assert!((cell_mass(&reweighed, 1, 1) - 2.5).abs() < 1e-12);
        assert!((cell_mass(&reweighed, 0, 0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_separated_groups_with_every_cell_populated() {
        let original = dataset(&[(1, 1, 5), (1, 0, 1), (0, 1, 1), (0, 0, 5)], 1);
        let reweighed = Reweighing::new(GroupSpec::default()).fit_transform(&original).unwrap();
        let metric = BinaryLabelDatasetMetric::new(&reweighed, GroupSpec::default());

        assert!((metric.base_rate(Some(true)) - metric.base_rate(Some(false))).abs() < 1e-12);
        assert!((reweighed.total_weight() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let original = dataset(&[(1, 1, 1)], 1);
        assert!(Reweighing::new(GroupSpec::default()).transform(&original).is_err());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let empty = BinaryLabelDataset::new(Vec::new(), 1);
        let err = Reweighing::new(GroupSpec::default()).fit(&empty).unwrap_err();
        assert!(matches!(err, AuditError::EmptyDataset(_)));
    }
}
