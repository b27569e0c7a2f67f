// src/process/mod.rs
pub mod date_parser;
pub mod utils;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::classify::{award_type, MechanismCategory, TypeCategory};
use crate::schema::{require_role, resolve_role, ColumnRole};
use crate::table::RawTable;

/// Column indices for every role, fixed once per table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub date: usize,
    pub amount: usize,
    pub institute: usize,
    pub org: Option<usize>,
    pub activity: Option<usize>,
    pub type_code: Option<usize>,
    pub type_text: Option<usize>,
}

impl ResolvedColumns {
    /// Resolve all roles on `table`. `amount_column` comes from the
    /// reconciler and must name one of the table's headers.
    pub fn resolve(table: &RawTable, amount_column: &str) -> Result<Self> {
        let headers = &table.headers;
        let index = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| anyhow!("column {} vanished from table", name))
        };

        let date = index(require_role(headers, ColumnRole::Date)?)?;
        let institute = index(require_role(headers, ColumnRole::InstituteCode)?)?;
        let amount = index(amount_column)?;

        let optional = |role: ColumnRole| {
            let found = resolve_role(headers, role).and_then(|name| table.column_index(name));
            if found.is_none() {
                debug!(%role, "optional role not present");
            }
            found
        };
        let org = optional(ColumnRole::OrgName);
        if org.is_none() {
            warn!("no organization column; org_name_norm will be empty");
        }
        let activity = optional(ColumnRole::ActivityCode);
        let type_code = optional(ColumnRole::TypeCode);
        let type_text = optional(ColumnRole::TypeText);

        info!(
            date = %headers[date],
            amount = %headers[amount],
            institute = %headers[institute],
            org = ?org.map(|i| &headers[i]),
            activity = ?activity.map(|i| &headers[i]),
            type_code = ?type_code.map(|i| &headers[i]),
            type_text = ?type_text.map(|i| &headers[i]),
            "resolved columns"
        );

        Ok(Self {
            date,
            amount,
            institute,
            org,
            activity,
            type_code,
            type_text,
        })
    }
}

/// A row once every role is known. Nothing untyped survives past here.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub date: NaiveDate,
    pub org_name_norm: String,
    pub admin_ic: String,
    pub activity_code: String,
    pub mechanism: MechanismCategory,
    pub type_category: TypeCategory,
    /// Always finite; unparsable amounts are 0.
    pub amount: f64,
}

/// Single pass over `table`: parse dates in `tz`, coerce amounts,
/// normalize names and codes, classify. Rows whose date does not parse
/// are dropped.
pub fn normalize_records(table: &RawTable, cols: &ResolvedColumns, tz: Tz) -> Vec<ResolvedRecord> {
    let mut out = Vec::with_capacity(table.len());
    let mut dropped = 0usize;

    for row in 0..table.len() {
        let date = match date_parser::parse_award_date(table.cell(row, cols.date), tz) {
            Some(d) => d,
            None => {
                dropped += 1;
                continue;
            }
        };

        let activity_code = cols
            .activity
            .map(|c| utils::normalize_code(table.cell(row, c)))
            .unwrap_or_default();

        out.push(ResolvedRecord {
            date,
            org_name_norm: cols
                .org
                .map(|c| utils::normalize_org(table.cell(row, c)))
                .unwrap_or_default(),
            admin_ic: utils::normalize_code(table.cell(row, cols.institute)),
            mechanism: MechanismCategory::from_activity(&activity_code),
            activity_code,
            type_category: award_type::classify(cols.type_code, cols.type_text, table, row),
            amount: utils::parse_amount(table.cell(row, cols.amount)),
        });
    }

    debug!(kept = out.len(), dropped, "normalized records");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YtdError;
    use chrono_tz::America::New_York;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn normalizes_and_classifies() -> Result<()> {
        let t = table(
            &["Award_Notice_Date", "award_amount", "ADMIN_IC", "org_name", "activity_code", "award_type"],
            &[
                &["2024-03-01", "100", " ca ", "  Big   State U ", "r01", "New"],
                &["not a date", "5", "CA", "X", "R01", "New"],
                &["2024-03-04", "oops", "CA", "X", "", "Non-Competing Continuation"],
            ],
        );
        let cols = ResolvedColumns::resolve(&t, "award_amount")?;
        let recs = normalize_records(&t, &cols, New_York);

        assert_eq!(recs.len(), 2);
        let first = &recs[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(first.admin_ic, "CA");
        assert_eq!(first.org_name_norm, "Big State U");
        assert_eq!(first.activity_code, "R01");
        assert_eq!(first.mechanism, MechanismCategory::R);
        assert_eq!(first.type_category, TypeCategory::New);
        assert_eq!(first.amount, 100.0);

        let second = &recs[1];
        assert_eq!(second.amount, 0.0);
        assert_eq!(second.mechanism, MechanismCategory::Other);
        assert_eq!(second.type_category, TypeCategory::NoncompetingContinuation);
        Ok(())
    }

    #[test]
    fn optional_roles_fall_back() -> Result<()> {
        let t = table(&["date", "amount", "ic"], &[&["2024-01-02", "1", "NCI"]]);
        let cols = ResolvedColumns::resolve(&t, "amount")?;
        assert_eq!(cols.org, None);
        assert_eq!(cols.activity, None);

        let recs = normalize_records(&t, &cols, New_York);
        assert_eq!(recs[0].org_name_norm, "");
        assert_eq!(recs[0].activity_code, "");
        assert_eq!(recs[0].mechanism, MechanismCategory::Other);
        assert_eq!(recs[0].type_category, TypeCategory::Other);
        Ok(())
    }

    #[test]
    fn missing_institute_is_fatal() {
        let t = table(&["date", "amount"], &[]);
        let err = ResolvedColumns::resolve(&t, "amount").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<YtdError>(),
            Some(YtdError::SchemaResolution {
                role: ColumnRole::InstituteCode,
                ..
            })
        ));
    }
}
