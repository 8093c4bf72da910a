//! CSV loading into a [`BinaryLabelDataset`].

use std::path::Path;

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::auditor::config::FairnessConfig;
use crate::auditor::constant::{GroupKind, RiskCategory};
use crate::auditor::error::{AuditError, AuditResult};
use crate::auditor::object::{AuditRecord, BinaryLabelDataset};

use super::processor::{apply_screening, compas_screening_rules};

/// Row accounting of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped_by_screening: usize,
    /// Rows whose protected value is neither of the two configured groups
    pub dropped_other_groups: usize,
    pub rules_applied: Vec<&'static str>,
}

/// Parse, screen and map the CSV at `path`.
pub fn load_compas(path: &Path, config: &FairnessConfig) -> AuditResult<(BinaryLabelDataset, LoadSummary)> {
    let load_error = |reason: String| AuditError::Load {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(load_error("file does not exist".to_string()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| load_error(e.to_string()))?;

    for column in [
        &config.protected_attribute_name,
        &config.outcome_label_name,
        &config.risk_column,
    ] {
        if df.column(column).is_err() {
            return Err(AuditError::MissingColumn {
                path: path.to_path_buf(),
                column: column.clone(),
            });
        }
    }

    let rows_read = df.height();
    let (df, rules_applied) = apply_screening(df, &compas_screening_rules(&config.risk_column))
        .map_err(|e| load_error(e.to_string()))?;
    debug!("screening rules applied: {:?}", rules_applied);

    let (records, dropped_other_groups) = map_records(&df, config).map_err(|reason| match reason {
        RecordError::Polars(e) => load_error(e.to_string()),
        RecordError::Invalid(reason) => load_error(reason),
    })?;

    let summary = LoadSummary {
        rows_read,
        rows_kept: records.len(),
        dropped_by_screening: rows_read - df.height(),
        dropped_other_groups,
        rules_applied,
    };
    info!(
        "loaded {}: {} rows read, {} kept, {} screened out, {} outside '{}'/'{}'",
        path.display(),
        summary.rows_read,
        summary.rows_kept,
        summary.dropped_by_screening,
        summary.dropped_other_groups,
        config.group_label(GroupKind::Privileged),
        config.group_label(GroupKind::Unprivileged)
    );

    let dataset = BinaryLabelDataset::new(records, config.favorable_label_value)
        .with_names(&config.outcome_label_name, &config.protected_attribute_name);
    Ok((dataset, summary))
}

enum RecordError {
    Polars(PolarsError),
    Invalid(String),
}

impl From<PolarsError> for RecordError {
    fn from(e: PolarsError) -> Self {
        RecordError::Polars(e)
    }
}

/// Turn screened rows into records, dropping rows of other groups.
fn map_records(df: &DataFrame, config: &FairnessConfig) -> Result<(Vec<AuditRecord>, usize), RecordError> {
    let protected = column_as(df, &config.protected_attribute_name, &DataType::String)?;
    let labels = column_as(df, &config.outcome_label_name, &DataType::Int64)?;
    let risks = column_as(df, &config.risk_column, &DataType::String)?;

    let protected = protected.str()?;
    let labels = labels.i64()?;
    let risks = risks.str()?;

    let mut records = Vec::with_capacity(df.height());
    let mut dropped = 0usize;

    for (row, ((group, label), risk)) in protected.into_iter().zip(labels).zip(risks).enumerate() {
        let Some(code) = group
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| config.group_code(value))
        else {
            dropped += 1;
            continue;
        };

        let label = match label {
            Some(label @ (0 | 1)) => label,
            Some(other) => {
                return Err(RecordError::Invalid(format!(
                    "row {}: label '{}' is {} (expected 0 or 1)",
                    row, config.outcome_label_name, other
                )))
            }
            None => {
                return Err(RecordError::Invalid(format!(
                    "row {}: label '{}' is missing",
                    row, config.outcome_label_name
                )))
            }
        };

        let risk: RiskCategory = risk
            .ok_or_else(|| format!("row {}: '{}' is missing", row, config.risk_column))
            .and_then(|value| value.parse())
            .map_err(|reason| RecordError::Invalid(format!("row {}: {}", row, reason)))?;

        records.push(AuditRecord::new(label, code, risk));
    }

    Ok((records, dropped))
}

fn column_as(df: &DataFrame, name: &str, dtype: &DataType) -> PolarsResult<Series> {
    df.column(name)?.as_materialized_series().cast(dtype)
}
