//! Audit report: the console lines and the optional JSON dump.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::auditor::error::AuditResult;
use crate::auditor::utility::format_metric;
use crate::dataset::LoadSummary;
use crate::metrics::MetricValue;
use crate::mitigation::CellWeights;

pub const REPORT_FILE: &str = "audit_report.json";

/// Everything one audit run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub data_path: PathBuf,
    pub load: LoadSummary,
    pub train_rows: usize,
    pub test_rows: usize,
    pub classifier: String,

    pub disparate_impact: MetricValue,
    pub statistical_parity_difference: MetricValue,
    pub false_positive_rate_privileged: f64,
    pub false_positive_rate_unprivileged: f64,
    pub false_positive_rate_difference: MetricValue,
    pub equal_opportunity_difference: MetricValue,

    pub reweighing_factors: CellWeights,
    pub disparate_impact_after_reweighing: MetricValue,
    pub statistical_parity_difference_after_reweighing: MetricValue,

    pub charts: Vec<PathBuf>,
}

impl AuditReport {
    /// The six fairness metrics, in print order.
    pub fn metrics(&self) -> [&MetricValue; 6] {
        [
            &self.disparate_impact,
            &self.statistical_parity_difference,
            &self.false_positive_rate_difference,
            &self.equal_opportunity_difference,
            &self.disparate_impact_after_reweighing,
            &self.statistical_parity_difference_after_reweighing,
        ]
    }

    /// Metrics with no value because a group lacked qualifying rows.
    pub fn undefined_metrics(&self) -> Vec<&str> {
        self.metrics()
            .iter()
            .filter(|m| !m.is_defined())
            .map(|m| m.name.as_str())
            .collect()
    }

    /// Write the report as pretty JSON into `output_dir`.
    ///
    /// Undefined metric values are written as `null`.
    pub fn write_json(&self, output_dir: &Path) -> AuditResult<PathBuf> {
        let path = output_dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;
        info!("report written to {}", path.display());
        Ok(path)
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {}", self.data_path.display())?;
        writeln!(
            f,
            "Rows: {} read, {} kept ({} screened out, {} outside the compared groups)",
            self.load.rows_read, self.load.rows_kept, self.load.dropped_by_screening, self.load.dropped_other_groups
        )?;
        writeln!(
            f,
            "Split: {} train / {} test, predictions by {}",
            self.train_rows, self.test_rows, self.classifier
        )?;
        writeln!(f)?;

        writeln!(f, "{}", self.disparate_impact)?;
        writeln!(f, "{}", self.statistical_parity_difference)?;
        writeln!(
            f,
            "False Positive Rate (privileged / unprivileged): {} / {}",
            format_metric(self.false_positive_rate_privileged),
            format_metric(self.false_positive_rate_unprivileged)
        )?;
        writeln!(f, "{}", self.false_positive_rate_difference)?;
        writeln!(f, "{}", self.equal_opportunity_difference)?;
        writeln!(f, "{}", self.disparate_impact_after_reweighing)?;
        write!(f, "{}", self.statistical_parity_difference_after_reweighing)?;

        for chart in &self.charts {
            write!(f, "\nChart saved: {}", chart.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AuditReport {
        AuditReport {
            run_id: "test".to_string(),
            generated_at: Utc::now(),
            data_path: PathBuf::from("data/compas-scores-two-years.csv"),
            load: LoadSummary {
                rows_read: 10,
                rows_kept: 8,
                dropped_by_screening: 1,
                dropped_other_groups: 1,
                rules_applied: vec!["is_recid"],
            },
            train_rows: 5,
            test_rows: 3,
            classifier: "LabelEchoClassifier".to_string(),
            disparate_impact: MetricValue::ratio("Disparate Impact Ratio", 0.8),
            statistical_parity_difference: MetricValue::difference("Statistical Parity Difference", -0.125),
            false_positive_rate_privileged: 0.0,
            false_positive_rate_unprivileged: f64::NAN,
            false_positive_rate_difference: MetricValue::difference("False Positive Rate Difference", f64::NAN),
            equal_opportunity_difference: MetricValue::difference("Equal Opportunity Difference", 0.0),
            reweighing_factors: CellWeights::default(),
            disparate_impact_after_reweighing: MetricValue::ratio("Disparate Impact Ratio (After Reweighing)", 1.0),
            statistical_parity_difference_after_reweighing: MetricValue::difference(
                "Statistical Parity Difference (After Reweighing)",
                0.0,
            ),
            charts: vec![PathBuf::from("./fpr_by_race.png")],
        }
    }

    #[test]
    fn test_display_lines() {
        let text = sample_report().to_string();

        assert!(text.contains("Disparate Impact Ratio: 0.800 (Ideal: 1.0)"));
        assert!(text.contains("Statistical Parity Difference: -0.125 (Ideal: 0.0)"));
        assert!(text.contains("False Positive Rate Difference: NaN (Ideal: 0.0)"));
        assert!(text.contains("Disparate Impact Ratio (After Reweighing): 1.000 (Ideal: 1.0)"));
        assert!(text.contains("Chart saved: ./fpr_by_race.png"));
    }

    #[test]
    fn test_undefined_metrics() {
        assert_eq!(sample_report().undefined_metrics(), vec!["False Positive Rate Difference"]);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_report().write_json(dir.path()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["train_rows"], 5);
        assert_eq!(value["disparate_impact"]["value"], 0.8);
        assert!(value["false_positive_rate_difference"]["value"].is_null());
        assert_eq!(value["load"]["rules_applied"][0], "is_recid");
    }
}
