//! Row filters applied to the raw COMPAS export before auditing.
//!
//! These are the ProPublica screening rules: keep cases whose charge date is
//! within 30 days of the COMPAS screening, drop cases without a recidivism
//! record, ordinary traffic offences and unscored rows. A rule whose column is
//! absent from the file is skipped.

use polars::prelude::*;

/// One screening rule over a single column.
#[derive(Debug, Clone)]
pub struct ScreeningRule {
    pub name: &'static str,
    pub column: String,
    expr: Expr,
}

impl ScreeningRule {
    fn new(name: &'static str, column: &str, expr: Expr) -> Self {
        Self {
            name,
            column: column.to_string(),
            expr,
        }
    }
}

/// The standard rules; `risk_column` holds the Low/Medium/High text.
pub fn compas_screening_rules(risk_column: &str) -> Vec<ScreeningRule> {
    vec![
        ScreeningRule::new(
            "screening_window",
            "days_b_screening_arrest",
            col("days_b_screening_arrest")
                .gt_eq(lit(-30))
                .and(col("days_b_screening_arrest").lt_eq(lit(30))),
        ),
        ScreeningRule::new("has_recid_record", "is_recid", col("is_recid").neq(lit(-1))),
        ScreeningRule::new(
            "not_ordinary_traffic",
            "c_charge_degree",
            col("c_charge_degree").neq(lit("O")),
        ),
        ScreeningRule::new("scored", risk_column, col(risk_column).neq(lit("N/A"))),
    ]
}

/// Apply every rule whose column exists; returns the filtered frame and the
/// names of the rules that ran.
pub fn apply_screening(df: DataFrame, rules: &[ScreeningRule]) -> PolarsResult<(DataFrame, Vec<&'static str>)> {
    let mut applied = Vec::new();
    let mut predicate: Option<Expr> = None;

    for rule in rules {
        if df.column(&rule.column).is_err() {
            continue;
        }
        applied.push(rule.name);
        predicate = Some(match predicate {
            Some(existing) => existing.and(rule.expr.clone()),
            None => rule.expr.clone(),
        });
    }

    let filtered = match predicate {
        Some(predicate) => df.lazy().filter(predicate).collect()?,
        None => df,
    };
    Ok((filtered, applied))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screening_drops_flagged_rows() {
        let df = df! {
            "days_b_screening_arrest" => [0i64, -31, 5, 12, 30],
            "is_recid" => [1i64, 0, -1, 0, 1],
            "c_charge_degree" => ["F", "F", "F", "O", "M"],
            "score_text" => ["Low", "High", "Medium", "Low", "N/A"],
        }
        .unwrap();

        let (filtered, applied) = apply_screening(df, &compas_screening_rules("score_text")).unwrap();
        assert_eq!(applied.len(), 4);
        assert_eq!(filtered.height(), 1);
    }

    #[test]
    fn test_missing_columns_are_skipped() {
        let df = df! {
            "score_text" => ["Low", "N/A", "High"],
        }
        .unwrap();

        let (filtered, applied) = apply_screening(df, &compas_screening_rules("score_text")).unwrap();
        assert_eq!(applied, vec!["scored"]);
        assert_eq!(filtered.height(), 2);
    }
}
