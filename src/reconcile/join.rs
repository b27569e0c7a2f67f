use chrono::NaiveDate;
use std::collections::HashMap;

use super::sidecar::Sidecar;

/// Join key of one primary row. `date` is `None` when the primary date
/// did not parse; such rows never match the strict join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    pub identifier: String,
    pub date: Option<NaiveDate>,
}

/// A join strategy yields one merged amount per primary row, or `None`
/// when it does not apply to this sidecar.
pub type JoinStrategy = fn(&Sidecar, &[PrimaryKey]) -> Option<Vec<Option<f64>>>;

/// Most precise first.
pub const STRATEGIES: &[(&str, JoinStrategy)] = &[
    ("identifier+date", strict_pair_join),
    ("identifier", identifier_join),
];

/// Try each strategy in order; the first that fills at least one row wins.
pub fn merge(sidecar: &Sidecar, keys: &[PrimaryKey]) -> Option<(&'static str, Vec<Option<f64>>)> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        strategy(sidecar, keys)
            .filter(|merged| merged.iter().any(Option::is_some))
            .map(|merged| (*name, merged))
    })
}

/// Left join on (identifier, date). Only for sidecars with a date column.
/// Several sidecar rows on the same pair are summed.
pub fn strict_pair_join(sidecar: &Sidecar, keys: &[PrimaryKey]) -> Option<Vec<Option<f64>>> {
    if !sidecar.has_date {
        return None;
    }
    let mut sums: HashMap<(&str, NaiveDate), f64> = HashMap::new();
    for row in &sidecar.rows {
        if let (Some(date), Some(amount)) = (row.date, row.amount) {
            *sums.entry((row.identifier.as_str(), date)).or_insert(0.0) += amount;
        }
    }
    Some(
        keys.iter()
            .map(|k| {
                k.date
                    .and_then(|d| sums.get(&(k.identifier.as_str(), d)).copied())
            })
            .collect(),
    )
}

/// Left join on identifier alone, after summing the sidecar per
/// identifier. Only for sidecars without a date column.
pub fn identifier_join(sidecar: &Sidecar, keys: &[PrimaryKey]) -> Option<Vec<Option<f64>>> {
    if sidecar.has_date {
        return None;
    }
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for row in &sidecar.rows {
        if let Some(amount) = row.amount {
            *sums.entry(row.identifier.as_str()).or_insert(0.0) += amount;
        }
    }
    Some(
        keys.iter()
            .map(|k| sums.get(k.identifier.as_str()).copied())
            .collect(),
    )
}
