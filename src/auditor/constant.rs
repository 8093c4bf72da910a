//! General constant enums used in the audit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-level COMPAS decile bucket (`score_text` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// All categories in chart order.
    pub const ALL: [RiskCategory; 3] = [RiskCategory::Low, RiskCategory::Medium, RiskCategory::High];

    /// Value as written in the CSV.
    pub fn value(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }

    /// Position inside [`RiskCategory::ALL`].
    pub fn index(&self) -> usize {
        match self {
            RiskCategory::Low => 0,
            RiskCategory::Medium => 1,
            RiskCategory::High => 2,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(RiskCategory::Low),
            "Medium" => Ok(RiskCategory::Medium),
            "High" => Ok(RiskCategory::High),
            other => Err(format!("unknown risk category '{}'", other)),
        }
    }
}

/// Side of the protected-attribute split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    Privileged,
    Unprivileged,
}

impl GroupKind {
    /// Both groups, privileged first.
    pub const ALL: [GroupKind; 2] = [GroupKind::Privileged, GroupKind::Unprivileged];

    pub fn from_privileged(privileged: bool) -> Self {
        if privileged {
            GroupKind::Privileged
        } else {
            GroupKind::Unprivileged
        }
    }

    pub fn is_privileged(&self) -> bool {
        matches!(self, GroupKind::Privileged)
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Privileged => write!(f, "privileged"),
            GroupKind::Unprivileged => write!(f, "unprivileged"),
        }
    }
}

/// Protected-attribute code assigned to privileged rows.
pub const PRIVILEGED_CODE: i64 = 1;

/// Protected-attribute code assigned to unprivileged rows.
pub const UNPRIVILEGED_CODE: i64 = 0;

/// Unprivileged value matching every value except the privileged one
pub const ANY_OTHER_VALUE: &str = "*";
