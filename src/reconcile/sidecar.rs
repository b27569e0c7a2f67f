use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::process::{date_parser::parse_award_date, utils};
use crate::schema::{amount_column, resolve_role, ColumnRole};
use crate::table::{RawTable, TableFormat};

/// File-name fragment that marks a sidecar.
pub const SIDECAR_MARKER: &str = "amount";

/// List sidecar candidates next to `primary`: readable table files whose
/// name contains "amount" (any case), sorted by path so runs are
/// reproducible. The primary itself is never a candidate.
pub fn discover_candidates(dir: &Path, primary: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    let mut found: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("invalid glob pattern {}", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .filter(|p| p.file_name() != primary.file_name())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.to_lowercase().contains(SIDECAR_MARKER))
        })
        .filter(|p| TableFormat::from_path(p).is_some())
        .collect();
    found.sort();
    debug!(dir = %dir.display(), candidates = ?found, "sidecar discovery");
    Ok(found)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SidecarRow {
    pub identifier: String,
    pub date: Option<NaiveDate>,
    /// `None` when the cell does not parse; such rows add nothing to sums.
    pub amount: Option<f64>,
}

/// A sidecar reduced to what the join needs.
#[derive(Debug, Clone)]
pub struct Sidecar {
    pub path: PathBuf,
    pub amount_column: String,
    pub has_date: bool,
    pub rows: Vec<SidecarRow>,
}

impl Sidecar {
    /// Resolve the sidecar's roles and normalize its rows. `None` (with a
    /// warning) when it lacks an amount or an identifier column.
    pub fn prepare(path: &Path, table: &RawTable, tz: Tz) -> Option<Self> {
        let Some(amount_name) = amount_column(table) else {
            warn!(path = %path.display(), "sidecar has no amount column; skipping");
            return None;
        };
        let Some(id_name) = resolve_role(&table.headers, ColumnRole::GrantIdentifier) else {
            warn!(path = %path.display(), "sidecar has no identifier column; skipping");
            return None;
        };
        let date_col = resolve_role(&table.headers, ColumnRole::Date)
            .and_then(|name| table.column_index(name));

        let amount_col = table.column_index(amount_name)?;
        let id_col = table.column_index(id_name)?;

        let rows = (0..table.len())
            .map(|r| SidecarRow {
                identifier: utils::normalize_identifier(table.cell(r, id_col)),
                date: date_col.and_then(|c| parse_award_date(table.cell(r, c), tz)),
                amount: utils::parse_number(table.cell(r, amount_col)),
            })
            .collect();

        debug!(
            path = %path.display(),
            amount = amount_name,
            identifier = id_name,
            date = ?date_col.map(|c| &table.headers[c]),
            "prepared sidecar"
        );

        Some(Self {
            path: path.to_path_buf(),
            amount_column: amount_name.to_string(),
            has_date: date_col.is_some(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono_tz::America::New_York;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discovery_is_sorted_and_filtered() -> Result<()> {
        let dir = tempdir()?;
        for name in [
            "z_amounts.csv",
            "Award_Amounts.parquet",
            "a_amounts.csv.zst",
            "amounts_notes.txt",
            "awards.csv",
            "primary_amount.csv",
        ] {
            fs::write(dir.path().join(name), "x")?;
        }
        fs::create_dir(dir.path().join("amount_dir.csv"))?;

        let found = discover_candidates(dir.path(), &dir.path().join("primary_amount.csv"))?;
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["Award_Amounts.parquet", "a_amounts.csv.zst", "z_amounts.csv"]
        );
        Ok(())
    }

    #[test]
    fn prepare_needs_amount_and_identifier() {
        let no_id = RawTable::new(
            vec!["award_amount".into()],
            vec![vec!["1".into()]],
        );
        assert!(Sidecar::prepare(Path::new("x.csv"), &no_id, New_York).is_none());

        let ok = RawTable::new(
            vec!["APPL_ID".into(), "award_amount".into()],
            vec![vec![" 7.0 ".into(), "$1,000".into()], vec!["8".into(), "".into()]],
        );
        let s = Sidecar::prepare(Path::new("x.csv"), &ok, New_York).unwrap();
        assert!(!s.has_date);
        assert_eq!(s.amount_column, "award_amount");
        assert_eq!(s.rows[0].identifier, "7");
        assert_eq!(s.rows[0].amount, Some(1000.0));
        assert_eq!(s.rows[1].amount, None);
    }
}
