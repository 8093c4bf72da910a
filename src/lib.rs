//! COMPAS fairness audit
//!
//! This crate audits the COMPAS recidivism dataset for racial bias:
//!
//! - Dataset acquisition (local file or one-shot HTTPS download)
//! - CSV loading with the standard COMPAS screening
//! - Group fairness metrics (disparate impact, statistical parity,
//!   false positive rate and equal opportunity differences)
//! - Reweighing as a pre-processing mitigation
//! - Console report and PNG charts
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use compas_audit::{run_audit, AuditConfig, HttpFetcher, LabelEchoClassifier};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = AuditConfig::default();
//!     let fetcher = HttpFetcher::new(config.download_timeout).unwrap();
//!     let report = run_audit(&config, &fetcher, &LabelEchoClassifier).await.unwrap();
//!     println!("{}", report);
//! }
//! ```

pub mod auditor;
pub mod chart;
pub mod datafeed;
pub mod dataset;
pub mod engine;
pub mod metrics;
pub mod mitigation;
pub mod model;
pub mod report;

// Re-export commonly used types
pub use auditor::{
    init_logger, AuditConfig, AuditError, AuditRecord, AuditResult, BinaryLabelDataset, FairnessConfig,
    GroupKind, GroupSpec, RiskCategory, Settings, SETTINGS,
};
pub use datafeed::{acquire, mirror, Acquisition, DatasetFetcher, HttpFetcher};
pub use dataset::{load_compas, LoadSummary};
pub use engine::run_audit;
pub use metrics::{BinaryLabelDatasetMetric, ClassificationMetric, ConfusionMatrix, MetricValue};
pub use mitigation::{CellWeights, Reweighing};
pub use model::{Classifier, ConstantClassifier, LabelEchoClassifier};
pub use report::AuditReport;

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
