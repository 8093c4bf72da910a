//! Basic data structures used by the audit pipeline.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::constant::{GroupKind, RiskCategory, PRIVILEGED_CODE, UNPRIVILEGED_CODE};
use super::error::{AuditError, AuditResult};

/// One defendant row after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Binary outcome label (0 or 1)
    pub label: i64,
    /// Protected-attribute code
    pub protected: i64,
    /// COMPAS risk bucket
    pub risk: RiskCategory,
    /// Instance weight, 1.0 unless reweighed
    pub weight: f64,
}

impl AuditRecord {
    pub fn new(label: i64, protected: i64, risk: RiskCategory) -> Self {
        Self {
            label,
            protected,
            risk,
            weight: 1.0,
        }
    }
}

/// Protected-attribute codes that define the two comparison groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub privileged: i64,
    pub unprivileged: i64,
}

impl GroupSpec {
    pub fn new(privileged: i64, unprivileged: i64) -> Self {
        Self {
            privileged,
            unprivileged,
        }
    }

    /// Code carried by rows of the given group.
    pub fn code(&self, kind: GroupKind) -> i64 {
        match kind {
            GroupKind::Privileged => self.privileged,
            GroupKind::Unprivileged => self.unprivileged,
        }
    }

    /// Group a protected code belongs to, if any.
    pub fn kind_of(&self, code: i64) -> Option<GroupKind> {
        if code == self.privileged {
            Some(GroupKind::Privileged)
        } else if code == self.unprivileged {
            Some(GroupKind::Unprivileged)
        } else {
            None
        }
    }
}

impl Default for GroupSpec {
    fn default() -> Self {
        Self::new(PRIVILEGED_CODE, UNPRIVILEGED_CODE)
    }
}

/// Rows with a binary label and a binary protected attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryLabelDataset {
    pub records: Vec<AuditRecord>,
    /// Label value counted as the favorable outcome
    pub favorable_label: i64,
    pub label_name: String,
    pub protected_attribute: String,
}

impl BinaryLabelDataset {
    pub fn new(records: Vec<AuditRecord>, favorable_label: i64) -> Self {
        Self {
            records,
            favorable_label,
            label_name: "two_year_recid".to_string(),
            protected_attribute: "race".to_string(),
        }
    }

    /// Override the column names the dataset was built from
    pub fn with_names(mut self, label_name: impl Into<String>, protected_attribute: impl Into<String>) -> Self {
        self.label_name = label_name.into();
        self.protected_attribute = protected_attribute.into();
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn unfavorable_label(&self) -> i64 {
        1 - self.favorable_label
    }

    pub fn is_favorable(&self, record: &AuditRecord) -> bool {
        record.label == self.favorable_label
    }

    pub fn labels(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.label).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.weight).collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.records.iter().map(|r| r.weight).sum()
    }

    /// Copy of the dataset carrying the given labels.
    pub fn with_labels(&self, labels: &[i64]) -> AuditResult<Self> {
        if labels.len() != self.records.len() {
            return Err(AuditError::Mismatch(format!(
                "{} labels supplied for {} rows",
                labels.len(),
                self.records.len()
            )));
        }

        let mut copy = self.clone();
        for (record, &label) in copy.records.iter_mut().zip(labels) {
            record.label = label;
        }
        Ok(copy)
    }

    /// Copy of the dataset carrying the given instance weights.
    pub fn with_weights(&self, weights: &[f64]) -> AuditResult<Self> {
        if weights.len() != self.records.len() {
            return Err(AuditError::Mismatch(format!(
                "{} weights supplied for {} rows",
                weights.len(),
                self.records.len()
            )));
        }

        let mut copy = self.clone();
        for (record, &weight) in copy.records.iter_mut().zip(weights) {
            record.weight = weight;
        }
        Ok(copy)
    }

    /// Shuffle rows and cut them into train/test parts.
    ///
    /// The train part holds `floor(ratio * len)` rows, the test part the rest.
    pub fn split<R: Rng + ?Sized>(&self, ratio: f64, rng: &mut R) -> AuditResult<(Self, Self)> {
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(AuditError::Settings {
                key: "split.train_ratio".to_string(),
                reason: format!("{} is not inside (0, 1)", ratio),
            });
        }

        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.shuffle(rng);

        let train_len = (ratio * self.records.len() as f64).floor() as usize;
        let (train_idx, test_idx) = order.split_at(train_len);

        Ok((self.subset(train_idx), self.subset(test_idx)))
    }

    /// Dataset made of the rows at the given positions, in that order.
    pub(crate) fn subset(&self, indices: &[usize]) -> Self {
        Self {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            favorable_label: self.favorable_label,
            label_name: self.label_name.clone(),
            protected_attribute: self.protected_attribute.clone(),
        }
    }

    /// Row count per risk category for one protected code.
    pub fn risk_counts(&self, protected: i64) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for record in self.records.iter().filter(|r| r.protected == protected) {
            counts[record.risk.index()] += 1;
        }
        counts
    }
}
