//! The audit pipeline: acquisition, loading, metrics, charts and reweighing.

use std::fs;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::auditor::config::AuditConfig;
use crate::auditor::error::{AuditError, AuditResult};
use crate::auditor::constant::GroupKind;
use crate::auditor::object::GroupSpec;
use crate::chart;
use crate::datafeed::{self, DatasetFetcher};
use crate::dataset::load_compas;
use crate::metrics::{BinaryLabelDatasetMetric, ClassificationMetric, MetricValue};
use crate::mitigation::Reweighing;
use crate::model::Classifier;
use crate::report::AuditReport;

/// Run one audit end to end.
///
/// Stages run strictly in order and the first failure aborts the run, so a
/// failed download never reaches the classifier or the chart writers.
pub async fn run_audit(
    config: &AuditConfig,
    fetcher: &dyn DatasetFetcher,
    classifier: &dyn Classifier,
) -> AuditResult<AuditReport> {
    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("audit", run_id = %run_id);

    let result = run_stages(config, fetcher, classifier, run_id)
        .instrument(span.clone())
        .await;
    if let Err(e) = &result {
        span.in_scope(|| error!("audit failed: {}", e));
    }
    result
}

async fn run_stages(
    config: &AuditConfig,
    fetcher: &dyn DatasetFetcher,
    classifier: &dyn Classifier,
    run_id: String,
) -> AuditResult<AuditReport> {
    config.validate()?;
    let groups = GroupSpec::default();

    info!("stage 1/4: dataset acquisition");
    datafeed::acquire(&config.data_path, &config.data_url, fetcher).await?;
    if let Some(mirror_path) = &config.mirror_path {
        datafeed::mirror(&config.data_path, mirror_path)?;
    }

    info!("stage 2/4: loading {}", config.data_path.display());
    let (dataset, load) = load_compas(&config.data_path, &config.fairness)?;
    if dataset.is_empty() {
        return Err(AuditError::EmptyDataset(format!(
            "no {} / {} rows left in {}",
            config.fairness.group_label(GroupKind::Privileged),
            config.fairness.group_label(GroupKind::Unprivileged),
            config.data_path.display()
        )));
    }

    info!("stage 3/4: fairness metrics on {} rows", dataset.len());
    let dataset_metric = BinaryLabelDatasetMetric::new(&dataset, groups);
    let disparate_impact = dataset_metric.disparate_impact();
    let statistical_parity_difference = dataset_metric.statistical_parity_difference();

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let (train, test) = dataset.split(config.train_ratio, &mut rng)?;
    info!("split {} train / {} test rows", train.len(), test.len());

    let predicted = classifier.predict(&test)?;
    info!("predictions from {}", classifier.name());
    let class_metric = ClassificationMetric::new(&test, &predicted, groups)?;
    let false_positive_rate_privileged = class_metric.false_positive_rate(true);
    let false_positive_rate_unprivileged = class_metric.false_positive_rate(false);
    let false_positive_rate_difference = class_metric.false_positive_rate_difference();
    let equal_opportunity_difference = class_metric.equal_opportunity_difference();

    info!("stage 4/4: reporting into {}", config.output_dir.display());
    fs::create_dir_all(&config.output_dir)?;
    let charts = vec![
        chart::save_risk_distribution(&dataset, &config.fairness, &config.output_dir)?,
        chart::save_fpr(
            false_positive_rate_privileged,
            false_positive_rate_unprivileged,
            &config.fairness,
            &config.output_dir,
        )?,
    ];

    let mut reweighing = Reweighing::new(groups);
    let reweighed = reweighing.fit_transform(&dataset)?;
    let reweighing_factors = reweighing.weights().copied().unwrap_or_default();
    let reweighed_metric = BinaryLabelDatasetMetric::new(&reweighed, groups);

    let report = AuditReport {
        run_id,
        generated_at: Utc::now(),
        data_path: config.data_path.clone(),
        load,
        train_rows: train.len(),
        test_rows: test.len(),
        classifier: classifier.name().to_string(),
        disparate_impact,
        statistical_parity_difference,
        false_positive_rate_privileged,
        false_positive_rate_unprivileged,
        false_positive_rate_difference,
        equal_opportunity_difference,
        reweighing_factors,
        disparate_impact_after_reweighing: after_reweighing(reweighed_metric.disparate_impact()),
        statistical_parity_difference_after_reweighing: after_reweighing(
            reweighed_metric.statistical_parity_difference(),
        ),
        charts,
    };

    let undefined = report.undefined_metrics();
    if !undefined.is_empty() {
        warn!("{} of 6 metrics undefined: {}", undefined.len(), undefined.join(", "));
    }

    if config.write_report_json {
        report.write_json(&config.output_dir)?;
    }

    info!("audit finished");
    Ok(report)
}

fn after_reweighing(metric: MetricValue) -> MetricValue {
    MetricValue {
        name: format!("{} (After Reweighing)", metric.name),
        ..metric
    }
}
