//! Typed configuration built from [`Settings`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constant::{GroupKind, ANY_OTHER_VALUE, PRIVILEGED_CODE, UNPRIVILEGED_CODE};
use super::error::{AuditError, AuditResult};
use super::setting::{Settings, DEFAULT_DATA_PATH, DEFAULT_DATA_URL};

/// Which column holds what, and which values form the two groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessConfig {
    pub protected_attribute_name: String,
    /// Raw CSV value mapped to the privileged code (1)
    pub privileged_value: String,
    /// Raw CSV value mapped to the unprivileged code (0); `*` takes every
    /// value other than the privileged one
    pub unprivileged_value: String,
    pub outcome_label_name: String,
    pub favorable_label_value: i64,
    pub risk_column: String,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            protected_attribute_name: "race".to_string(),
            privileged_value: "Caucasian".to_string(),
            unprivileged_value: "African-American".to_string(),
            outcome_label_name: "two_year_recid".to_string(),
            // Not reoffending within two years
            favorable_label_value: 0,
            risk_column: "score_text".to_string(),
        }
    }
}

impl FairnessConfig {
    /// Group code of a raw protected value, `None` for rows outside both groups.
    pub fn group_code(&self, value: &str) -> Option<i64> {
        if value == self.privileged_value {
            Some(PRIVILEGED_CODE)
        } else if value == self.unprivileged_value || self.unprivileged_value == ANY_OTHER_VALUE {
            Some(UNPRIVILEGED_CODE)
        } else {
            None
        }
    }

    /// Human-readable name of a group, used by charts and logs.
    pub fn group_label(&self, kind: GroupKind) -> String {
        match kind {
            GroupKind::Privileged => self.privileged_value.clone(),
            GroupKind::Unprivileged if self.unprivileged_value == ANY_OTHER_VALUE => {
                format!("Non-{}", self.privileged_value)
            }
            GroupKind::Unprivileged => self.unprivileged_value.clone(),
        }
    }

    pub fn validate(&self) -> AuditResult<()> {
        if self.privileged_value == ANY_OTHER_VALUE {
            return Err(AuditError::Settings {
                key: "fairness.privileged_value".to_string(),
                reason: format!("'{}' is only allowed as the unprivileged value", ANY_OTHER_VALUE),
            });
        }
        if self.privileged_value == self.unprivileged_value {
            return Err(AuditError::Settings {
                key: "fairness.unprivileged_value".to_string(),
                reason: "privileged and unprivileged values must differ".to_string(),
            });
        }
        if self.favorable_label_value != 0 && self.favorable_label_value != 1 {
            return Err(AuditError::Settings {
                key: "fairness.favorable_label".to_string(),
                reason: format!("{} is not a binary label", self.favorable_label_value),
            });
        }
        for (key, value) in [
            ("fairness.protected_attribute", &self.protected_attribute_name),
            ("fairness.label_name", &self.outcome_label_name),
            ("fairness.risk_column", &self.risk_column),
        ] {
            if value.trim().is_empty() {
                return Err(AuditError::Settings {
                    key: key.to_string(),
                    reason: "column name is empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Everything one audit run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    pub data_path: PathBuf,
    pub data_url: String,
    /// Second location the CSV is copied to, if any
    pub mirror_path: Option<PathBuf>,
    pub download_timeout: Duration,
    pub train_ratio: f64,
    /// Fixed shuffle seed; fresh entropy when absent
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    pub write_report_json: bool,
    pub fairness: FairnessConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            data_url: DEFAULT_DATA_URL.to_string(),
            mirror_path: None,
            download_timeout: Duration::from_secs(60),
            train_ratio: 0.7,
            seed: None,
            output_dir: PathBuf::from("."),
            write_report_json: false,
            fairness: FairnessConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Build and validate the run configuration.
    pub fn from_settings(settings: &Settings) -> AuditResult<Self> {
        let defaults = AuditConfig::default();
        let fairness_defaults = FairnessConfig::default();

        let string_or = |key: &str, default: &str| settings.get_string(key).unwrap_or_else(|| default.to_string());

        let mirror_path = settings
            .get_string("data.mirror_path")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let timeout_secs = settings
            .get_int("data.timeout_secs")
            .unwrap_or(defaults.download_timeout.as_secs() as i64);
        if timeout_secs <= 0 {
            return Err(AuditError::Settings {
                key: "data.timeout_secs".to_string(),
                reason: format!("{} is not a positive number of seconds", timeout_secs),
            });
        }

        // Negative seeds mean "not set"
        let seed = settings
            .get_int("split.seed")
            .filter(|s| *s >= 0)
            .map(|s| s as u64);

        let config = Self {
            data_path: PathBuf::from(string_or("data.path", &defaults.data_path.to_string_lossy())),
            data_url: string_or("data.url", &defaults.data_url),
            mirror_path,
            download_timeout: Duration::from_secs(timeout_secs as u64),
            train_ratio: settings.get_float("split.train_ratio").unwrap_or(defaults.train_ratio),
            seed,
            output_dir: PathBuf::from(string_or("output.dir", &defaults.output_dir.to_string_lossy())),
            write_report_json: settings.get_bool("output.report_json").unwrap_or(false),
            fairness: FairnessConfig {
                protected_attribute_name: string_or(
                    "fairness.protected_attribute",
                    &fairness_defaults.protected_attribute_name,
                ),
                privileged_value: string_or("fairness.privileged_value", &fairness_defaults.privileged_value),
                unprivileged_value: string_or("fairness.unprivileged_value", &fairness_defaults.unprivileged_value),
                outcome_label_name: string_or("fairness.label_name", &fairness_defaults.outcome_label_name),
                favorable_label_value: settings
                    .get_int("fairness.favorable_label")
                    .unwrap_or(fairness_defaults.favorable_label_value),
                risk_column: string_or("fairness.risk_column", &fairness_defaults.risk_column),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AuditResult<()> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(AuditError::Settings {
                key: "split.train_ratio".to_string(),
                reason: format!("{} is not inside (0, 1)", self.train_ratio),
            });
        }
        self.fairness.validate()
    }
}
