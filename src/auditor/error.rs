//! Error type shared by every stage of the audit pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type AuditResult<T> = Result<T, AuditError>;

/// Failures that abort an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The dataset could not be fetched from the remote source.
    #[error("failed to download dataset from {url} to {}: {reason}", path.display())]
    Download {
        url: String,
        path: PathBuf,
        reason: String,
    },

    /// The configured download URL is not a valid URL.
    #[error("invalid dataset url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The dataset could not be copied into the mirror location.
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV file is unreadable or its content is malformed.
    #[error("failed to load dataset {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// A column the audit depends on is absent from the CSV header.
    #[error("dataset {} has no column named '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Nothing left to audit after filtering.
    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    /// Ground-truth and predicted datasets do not describe the same rows.
    #[error("dataset mismatch: {0}")]
    Mismatch(String),

    /// Chart rendering or encoding failed.
    #[error("failed to render chart {}: {reason}", path.display())]
    Chart { path: PathBuf, reason: String },

    /// A setting is missing or carries an unusable value.
    #[error("invalid setting '{key}': {reason}")]
    Settings { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Remediation hint printed by the binary next to the diagnostic.
    pub fn hint(&self) -> Option<String> {
        match self {
            AuditError::Download { url, path, .. } => Some(format!(
                "Download the file manually from {} and place it at {}",
                url,
                path.display()
            )),
            AuditError::InvalidUrl { .. } => {
                Some("Check the 'data.url' entry of audit_setting.json".to_string())
            }
            AuditError::Copy { to, .. } => Some(format!(
                "Make sure {} is writable or unset 'data.mirror_path'",
                to.display()
            )),
            AuditError::Load { .. } | AuditError::MissingColumn { .. } => Some(
                "Ensure the file is the ProPublica compas-scores-two-years.csv export".to_string(),
            ),
            AuditError::Settings { .. } => {
                Some("Fix or remove the entry in audit_setting.json".to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_hint_names_url_and_path() {
        let err = AuditError::Download {
            url: "https://example.org/compas.csv".to_string(),
            path: PathBuf::from("data/compas.csv"),
            reason: "timeout".to_string(),
        };
        let hint = err.hint().unwrap();
        assert!(hint.contains("https://example.org/compas.csv"));
        assert!(hint.contains("data/compas.csv"));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_mismatch_has_no_hint() {
        assert!(AuditError::Mismatch("length".to_string()).hint().is_none());
    }
}
