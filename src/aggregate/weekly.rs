use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

use super::window::YtdWindows;
use crate::classify::{MechanismCategory, TypeCategory};
use crate::process::ResolvedRecord;

/// One row of the weekly aggregate artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyAggregate {
    pub year: i32,
    pub week_of_year: u32,
    pub week_start: NaiveDate,
    pub admin_ic: String,
    pub mechanism: MechanismCategory,
    pub activity_code: String,
    pub org_name_norm: String,
    pub type_category: TypeCategory,
    pub amount: f64,
}

/// Grouping key; its field order is the output order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    year: i32,
    week_of_year: u32,
    week_start: NaiveDate,
    admin_ic: String,
    mechanism: MechanismCategory,
    activity_code: String,
    org_name_norm: String,
    type_category: TypeCategory,
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Keep rows inside either window whose type is allow-listed, bucket
/// them by calendar week and sum amounts per dimension tuple.
pub fn aggregate_weekly(
    records: &[ResolvedRecord],
    windows: &YtdWindows,
    allowlist: &[TypeCategory],
) -> Vec<WeeklyAggregate> {
    let allowed: HashSet<TypeCategory> = allowlist.iter().copied().collect();
    let mut groups: BTreeMap<GroupKey, f64> = BTreeMap::new();

    for rec in records
        .iter()
        .filter(|r| windows.contains(r.date))
        .filter(|r| allowed.contains(&r.type_category))
    {
        let start = week_start(rec.date);
        let key = GroupKey {
            year: rec.date.year(),
            week_of_year: start.iso_week().week(),
            week_start: start,
            admin_ic: rec.admin_ic.clone(),
            mechanism: rec.mechanism,
            activity_code: rec.activity_code.clone(),
            org_name_norm: rec.org_name_norm.clone(),
            type_category: rec.type_category,
        };
        *groups.entry(key).or_insert(0.0) += rec.amount;
    }

    groups
        .into_iter()
        .map(|(k, amount)| (k, finite_sum(amount)))
        .map(|(k, amount)| WeeklyAggregate {
            year: k.year,
            week_of_year: k.week_of_year,
            week_start: k.week_start,
            admin_ic: k.admin_ic,
            mechanism: k.mechanism,
            activity_code: k.activity_code,
            org_name_norm: k.org_name_norm,
            type_category: k.type_category,
            amount,
        })
        .collect()
}

/// Sums that overflowed saturate at the largest finite value so the
/// artifact never carries a null amount.
fn finite_sum(sum: f64) -> f64 {
    if sum.is_finite() {
        return sum;
    }
    warn!(sum, "weekly sum is not finite; clamping");
    if sum.is_nan() {
        0.0
    } else {
        sum.clamp(f64::MIN, f64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rec(date: &str, ic: &str, ty: TypeCategory, amount: f64) -> ResolvedRecord {
        ResolvedRecord {
            date: d(date),
            org_name_norm: "Org".into(),
            admin_ic: ic.into(),
            activity_code: "R01".into(),
            mechanism: MechanismCategory::R,
            type_category: ty,
            amount,
        }
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(week_start(d("2024-03-01")), d("2024-02-26"));
        assert_eq!(week_start(d("2024-03-04")), d("2024-03-04"));
        assert_eq!(week_start(d("2025-03-09")), d("2025-03-03"));
    }

    #[test]
    fn sums_within_a_week_and_filters() {
        let windows = YtdWindows::new(d("2025-03-10"), 2024, 2025).unwrap();
        let records = vec![
            rec("2024-03-05", "NCI", TypeCategory::New, 10.0),
            rec("2024-03-07", "NCI", TypeCategory::New, 5.0),
            rec("2024-03-07", "NCI", TypeCategory::Extension, 99.0),
            rec("2024-06-01", "NCI", TypeCategory::New, 99.0),
            rec("2025-01-02", "NCI", TypeCategory::Supplement, 1.0),
        ];
        let rows = aggregate_weekly(
            &records,
            &windows,
            &[TypeCategory::New, TypeCategory::Supplement],
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].week_start, d("2024-03-04"));
        assert_eq!(rows[0].week_of_year, 10);
        assert_eq!(rows[0].amount, 15.0);
        assert_eq!(rows[1].year, 2025);
        assert_eq!(rows[1].week_start, d("2024-12-30"));
        assert_eq!(rows[1].week_of_year, 1);
    }

    #[test]
    fn output_is_sorted_by_key() {
        let windows = YtdWindows::new(d("2025-03-10"), 2024, 2025).unwrap();
        let records = vec![
            rec("2025-02-03", "NHLBI", TypeCategory::New, 1.0),
            rec("2024-02-03", "NCI", TypeCategory::New, 1.0),
            rec("2025-02-03", "NCI", TypeCategory::New, 1.0),
        ];
        let rows = aggregate_weekly(&records, &windows, &[TypeCategory::New]);
        let order: Vec<_> = rows.iter().map(|r| (r.year, r.admin_ic.as_str())).collect();
        assert_eq!(order, vec![(2024, "NCI"), (2025, "NCI"), (2025, "NHLBI")]);
    }

    #[test]
    fn overflowing_sums_stay_finite() {
        let windows = YtdWindows::new(d("2025-03-10"), 2024, 2025).unwrap();
        let records = vec![
            rec("2025-02-03", "NCI", TypeCategory::New, f64::MAX),
            rec("2025-02-04", "NCI", TypeCategory::New, f64::MAX),
            rec("2025-02-03", "NHLBI", TypeCategory::New, f64::MIN),
            rec("2025-02-04", "NHLBI", TypeCategory::New, f64::MIN),
        ];
        let rows = aggregate_weekly(&records, &windows, &[TypeCategory::New]);
        assert_eq!(rows[0].amount, f64::MAX);
        assert_eq!(rows[1].amount, f64::MIN);

        let v = serde_json::to_value(&rows).unwrap();
        assert!(v[0]["amount"].is_f64());
        assert!(v[1]["amount"].is_f64());
    }

    #[test]
    fn serializes_flat_record() {
        let row = WeeklyAggregate {
            year: 2024,
            week_of_year: 9,
            week_start: d("2024-02-26"),
            admin_ic: "IC1".into(),
            mechanism: MechanismCategory::Other,
            activity_code: "".into(),
            org_name_norm: "".into(),
            type_category: TypeCategory::CompetingRenewal,
            amount: 1.5,
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["week_start"], "2024-02-26");
        assert_eq!(v["mechanism"], "Other");
        assert_eq!(v["type_category"], "competing_renewal");
        assert_eq!(v["amount"], 1.5);
    }
}
