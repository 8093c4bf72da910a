//! PNG charts of the audit results.

pub mod bar;
pub mod canvas;
pub mod font;

use std::path::{Path, PathBuf};

use image::Rgb;
use tracing::info;

use crate::auditor::config::FairnessConfig;
use crate::auditor::constant::{GroupKind, RiskCategory};
use crate::auditor::error::AuditResult;
use crate::auditor::object::{BinaryLabelDataset, GroupSpec};

pub use bar::{Bar, BarChart, BarGroup};
pub use canvas::Canvas;

pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
pub const ORANGE: Rgb<u8> = Rgb([255, 127, 14]);

pub const RISK_DISTRIBUTION_FILE: &str = "risk_score_distribution.png";
pub const FPR_FILE: &str = "fpr_by_race.png";

const DISTRIBUTION_SIZE: (u32, u32) = (1000, 600);
const FPR_SIZE: (u32, u32) = (800, 500);

fn group_color(kind: GroupKind) -> Rgb<u8> {
    match kind {
        GroupKind::Privileged => BLUE,
        GroupKind::Unprivileged => ORANGE,
    }
}

/// Counts of each risk category per group, grouped by category.
pub fn risk_distribution_chart(dataset: &BinaryLabelDataset, fairness: &FairnessConfig) -> BarChart {
    let groups = GroupSpec::default();
    let counts: Vec<(GroupKind, [usize; 3])> = GroupKind::ALL
        .iter()
        .map(|kind| (*kind, dataset.risk_counts(groups.code(*kind))))
        .collect();

    BarChart {
        title: "Risk Score Distribution by Race".to_string(),
        x_label: "Risk Category".to_string(),
        y_label: "Count".to_string(),
        groups: RiskCategory::ALL
            .iter()
            .map(|risk| BarGroup {
                label: risk.to_string(),
                bars: counts
                    .iter()
                    .map(|(kind, per_risk)| Bar {
                        value: per_risk[risk.index()] as f64,
                        color: group_color(*kind),
                    })
                    .collect(),
            })
            .collect(),
        legend: GroupKind::ALL
            .iter()
            .map(|kind| {
                (
                    format!("{}: {}", fairness.protected_attribute_name, fairness.group_label(*kind)),
                    group_color(*kind),
                )
            })
            .collect(),
        integer_values: true,
    }
}

/// False positive rate of each group, one bar per group.
pub fn fpr_chart(fpr_privileged: f64, fpr_unprivileged: f64, fairness: &FairnessConfig) -> BarChart {
    let bar = |kind: GroupKind, value: f64| BarGroup {
        label: fairness.group_label(kind),
        bars: vec![Bar {
            value,
            color: group_color(kind),
        }],
    };

    BarChart {
        title: "False Positive Rates by Race".to_string(),
        x_label: fairness.protected_attribute_name.clone(),
        y_label: "False Positive Rate".to_string(),
        groups: vec![
            bar(GroupKind::Privileged, fpr_privileged),
            bar(GroupKind::Unprivileged, fpr_unprivileged),
        ],
        legend: Vec::new(),
        integer_values: false,
    }
}

/// Render and save the risk score distribution chart into `output_dir`.
pub fn save_risk_distribution(
    dataset: &BinaryLabelDataset,
    fairness: &FairnessConfig,
    output_dir: &Path,
) -> AuditResult<PathBuf> {
    let path = output_dir.join(RISK_DISTRIBUTION_FILE);
    let (width, height) = DISTRIBUTION_SIZE;
    risk_distribution_chart(dataset, fairness)
        .render(width, height)
        .save_png(&path)?;
    info!("chart written to {}", path.display());
    Ok(path)
}

/// Render and save the false positive rate chart into `output_dir`.
pub fn save_fpr(
    fpr_privileged: f64,
    fpr_unprivileged: f64,
    fairness: &FairnessConfig,
    output_dir: &Path,
) -> AuditResult<PathBuf> {
    let path = output_dir.join(FPR_FILE);
    let (width, height) = FPR_SIZE;
    fpr_chart(fpr_privileged, fpr_unprivileged, fairness)
        .render(width, height)
        .save_png(&path)?;
    info!("chart written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auditor::error::AuditError;
    use crate::auditor::object::AuditRecord;

    fn sample() -> BinaryLabelDataset {
        BinaryLabelDataset::new(
            vec![
                AuditRecord::new(0, 1, RiskCategory::Low),
                AuditRecord::new(0, 1, RiskCategory::Low),
                AuditRecord::new(1, 1, RiskCategory::High),
                AuditRecord::new(1, 0, RiskCategory::High),
                AuditRecord::new(0, 0, RiskCategory::Medium),
            ],
            0,
        )
    }

    #[test]
    fn test_distribution_groups_by_category() {
        let chart = risk_distribution_chart(&sample(), &FairnessConfig::default());

        let labels: Vec<&str> = chart.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Low", "Medium", "High"]);

        // privileged bar first, unprivileged second
        assert_eq!(chart.groups[0].bars[0].value, 2.0);
        assert_eq!(chart.groups[0].bars[1].value, 0.0);
        assert_eq!(chart.groups[2].bars[1].value, 1.0);
        assert_eq!(chart.groups[0].bars[0].color, BLUE);
        assert_eq!(chart.legend[1].0, "race: African-American");
    }

    #[test]
    fn test_fpr_chart_keeps_nan() {
        let chart = fpr_chart(0.25, f64::NAN, &FairnessConfig::default());
        assert_eq!(chart.groups[0].label, "Caucasian");
        assert_eq!(chart.groups[1].bars[0].color, ORANGE);
        assert!(chart.groups[1].bars[0].value.is_nan());
    }

    #[test]
    fn test_save_writes_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let fairness = FairnessConfig::default();

        let dist = save_risk_distribution(&sample(), &fairness, dir.path()).unwrap();
        let fpr = save_fpr(0.1, f64::NAN, &fairness, dir.path()).unwrap();

        assert_eq!(dist, dir.path().join(RISK_DISTRIBUTION_FILE));
        assert!(dist.exists());
        assert!(fpr.exists());
    }

    #[test]
    fn test_save_into_missing_dir_is_chart_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_fpr(0.1, 0.2, &FairnessConfig::default(), &dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, AuditError::Chart { .. }));
    }
}
