use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::weekly::WeeklyAggregate;
use super::window::YtdWindows;
use crate::classify::TypeCategory;

/// Type filters offered downstream, independent of the allow-list.
pub const TYPE_OPTIONS: [TypeCategory; 3] = [
    TypeCategory::New,
    TypeCategory::CompetingRenewal,
    TypeCategory::Supplement,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PicklistMeta {
    /// `cutoff_<year>` → last day of that year's window.
    #[serde(flatten)]
    pub cutoffs: BTreeMap<String, NaiveDate>,
    pub source_file: String,
    pub amount_measure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Picklists {
    pub institutions: Vec<String>,
    pub ics: Vec<String>,
    pub mechanisms: Vec<String>,
    pub activity_codes: Vec<String>,
    pub type_options: Vec<TypeCategory>,
    pub meta: PicklistMeta,
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Sorted distinct non-empty values of every filterable dimension.
pub fn build_picklists(
    rows: &[WeeklyAggregate],
    windows: &YtdWindows,
    source_file: String,
    amount_measure: String,
) -> Picklists {
    let cutoffs = [windows.earlier, windows.later]
        .iter()
        .map(|w| (format!("cutoff_{}", w.year), w.end))
        .collect();

    Picklists {
        institutions: distinct(rows.iter().map(|r| r.org_name_norm.as_str())),
        ics: distinct(rows.iter().map(|r| r.admin_ic.as_str())),
        mechanisms: distinct(rows.iter().map(|r| r.mechanism.as_str())),
        activity_codes: distinct(rows.iter().map(|r| r.activity_code.as_str())),
        type_options: TYPE_OPTIONS.to_vec(),
        meta: PicklistMeta {
            cutoffs,
            source_file,
            amount_measure,
        },
    }
}
