use anyhow::Result;
use tracing::{debug, info};

use super::types::{ColumnRole, AMOUNT_HINTS};
use crate::error::YtdError;
use crate::process::utils::parse_number;
use crate::table::RawTable;

/// Pick the column for a role from an unknown header list.
///
/// Exact (case-insensitive) matches are tried first, in the caller's
/// ranking order. Only when none hit are the columns scanned, in header
/// order, for one whose lowercased name contains any `contains` fragment.
pub fn resolve<'a, S: AsRef<str>>(
    columns: &'a [S],
    exact: &[&str],
    contains: &[&str],
) -> Option<&'a str> {
    let lowered: Vec<String> = columns.iter().map(|c| c.as_ref().to_lowercase()).collect();

    for want in exact {
        let want = want.to_lowercase();
        if let Some(idx) = lowered.iter().position(|c| *c == want) {
            return Some(columns[idx].as_ref());
        }
    }

    columns
        .iter()
        .zip(&lowered)
        .find(|(_, lc)| contains.iter().any(|sub| lc.contains(sub)))
        .map(|(c, _)| c.as_ref())
}

/// Resolve `role` against `columns` using its candidate table.
pub fn resolve_role<S: AsRef<str>>(columns: &[S], role: ColumnRole) -> Option<&str> {
    let spec = role.spec();
    let found = resolve(columns, spec.exact, spec.contains);
    debug!(%role, column = ?found, "resolved role");
    found
}

/// Like [`resolve_role`], but a miss is a fatal schema error carrying the
/// full column list.
pub fn require_role<S: AsRef<str>>(columns: &[S], role: ColumnRole) -> Result<&str> {
    resolve_role(columns, role).ok_or_else(|| {
        YtdError::SchemaResolution {
            role,
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
        .into()
    })
}

/// Last resort for the amount role: the first column whose name smells
/// like money and whose non-empty cells all parse as numbers.
pub fn numeric_amount_column(table: &RawTable) -> Option<&str> {
    let found = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let lc = name.to_lowercase();
            AMOUNT_HINTS.iter().any(|h| lc.contains(h))
        })
        .find(|(idx, _)| is_numeric_column(table, *idx))
        .map(|(_, name)| name.as_str());

    if let Some(name) = found {
        info!(column = name, "using heuristic amount column");
    }
    found
}

fn is_numeric_column(table: &RawTable, col: usize) -> bool {
    let mut seen = false;
    for cell in table.column(col) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        if parse_number(cell).is_none() {
            return false;
        }
        seen = true;
    }
    seen
}

/// Amount column from the table itself: ranked names first, then the
/// numeric heuristic.
pub fn amount_column(table: &RawTable) -> Option<&str> {
    resolve_role(&table.headers, ColumnRole::Amount).or_else(|| numeric_amount_column(table))
}
