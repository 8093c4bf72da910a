//! Auditor module - shared building blocks of the fairness audit.
//!
//! - **constant**: risk categories and group kinds
//! - **object**: records, the binary-label dataset and group codes
//! - **config**: typed run configuration
//! - **setting**: key/value settings with file and env overrides
//! - **logger**: tracing subscriber setup
//! - **error**: the crate error type
//! - **utility**: paths and small numeric helpers

pub mod config;
pub mod constant;
pub mod error;
pub mod logger;
pub mod object;
pub mod setting;
pub mod utility;

pub use config::{AuditConfig, FairnessConfig};
pub use constant::{GroupKind, RiskCategory, ANY_OTHER_VALUE, PRIVILEGED_CODE, UNPRIVILEGED_CODE};
pub use error::{AuditError, AuditResult};
pub use logger::{init_logger, DEBUG, ERROR, INFO, WARNING};
pub use object::{AuditRecord, BinaryLabelDataset, GroupSpec};
pub use setting::{SettingValue, Settings, DEFAULT_DATA_PATH, DEFAULT_DATA_URL, SETTINGS, SETTING_FILENAME};
pub use utility::{format_metric, get_file_path, get_folder_path, safe_div, TEMP_DIR};
