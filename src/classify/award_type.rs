use serde::{Deserialize, Serialize};
use std::fmt;

use crate::process::utils::parse_number;
use crate::table::RawTable;

/// Award type, derived from a numeric type code or a free-text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    New,
    CompetingRenewal,
    Supplement,
    Extension,
    NoncompetingContinuation,
    Other,
}

impl TypeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCategory::New => "new",
            TypeCategory::CompetingRenewal => "competing_renewal",
            TypeCategory::Supplement => "supplement",
            TypeCategory::Extension => "extension",
            TypeCategory::NoncompetingContinuation => "noncompeting_continuation",
            TypeCategory::Other => "other",
        }
    }

    /// Map an award type code: 1 new, 2 competing renewal, 3 supplement,
    /// 4 extension, 5 non-competing continuation. Anything else is `Other`.
    pub fn from_code(raw: &str) -> Self {
        let code = match parse_number(raw) {
            Some(v) if v.fract() == 0.0 => v as i64,
            _ => return TypeCategory::Other,
        };
        match code {
            1 => TypeCategory::New,
            2 => TypeCategory::CompetingRenewal,
            3 => TypeCategory::Supplement,
            4 => TypeCategory::Extension,
            5 => TypeCategory::NoncompetingContinuation,
            _ => TypeCategory::Other,
        }
    }

    /// Map a free-text label. First match wins; the non-competing test
    /// must run before the competing/renewal one since "non-competing"
    /// contains "comp".
    pub fn from_text(raw: &str) -> Self {
        let t = raw.to_lowercase();
        if t.contains("new") {
            TypeCategory::New
        } else if t.contains("supp") {
            TypeCategory::Supplement
        } else if t.contains("non") && t.contains("comp") {
            TypeCategory::NoncompetingContinuation
        } else if t.contains("exten") {
            TypeCategory::Extension
        } else if t.contains("comp") && (t.contains("renew") || t.contains("continuation")) {
            TypeCategory::CompetingRenewal
        } else {
            TypeCategory::Other
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one row. A resolved code column always wins over the text
/// column, even when the code cell is empty.
pub fn classify(code_col: Option<usize>, text_col: Option<usize>, table: &RawTable, row: usize) -> TypeCategory {
    match (code_col, text_col) {
        (Some(c), _) => TypeCategory::from_code(table.cell(row, c)),
        (None, Some(t)) => TypeCategory::from_text(table.cell(row, t)),
        (None, None) => TypeCategory::Other,
    }
}
