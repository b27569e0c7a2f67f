//! Amount reconciliation: use the primary table's own amount column when
//! there is one, otherwise merge one in from an "amount" sidecar file.

pub mod join;
pub mod sidecar;

use anyhow::{bail, Result};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::YtdError;
use crate::process::{date_parser::parse_award_date, utils::normalize_identifier};
use crate::schema::amount_column;
use crate::table::{load_table, RawTable};
use join::PrimaryKey;
use sidecar::{discover_candidates, Sidecar};

/// Where the amount column came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountSource {
    Primary,
    Sidecar { path: PathBuf, strategy: &'static str },
}

#[derive(Debug)]
pub struct Reconciled {
    pub table: RawTable,
    pub amount_column: String,
    pub source: AmountSource,
    /// Sidecar candidates that failed to load, in the order tried.
    pub skipped: Vec<PathBuf>,
}

impl Reconciled {
    /// Human-readable label of the amount measure, for output metadata.
    pub fn measure_label(&self) -> String {
        match &self.source {
            AmountSource::Primary => self.amount_column.clone(),
            AmountSource::Sidecar { path, strategy } => format!(
                "{} (from {}, joined on {})",
                self.amount_column,
                path.display(),
                strategy
            ),
        }
    }
}

/// Make sure `primary` has an amount column.
///
/// `source` is the primary file's path; sidecars are looked up in its
/// directory and joined on `identifier_column` (plus `date_column` when
/// the sidecar has dates).
#[tracing::instrument(level = "info", skip_all, fields(source = %source.display()))]
pub fn reconcile(
    primary: RawTable,
    source: &Path,
    date_column: &str,
    identifier_column: &str,
    tz: Tz,
) -> Result<Reconciled> {
    if let Some(col) = amount_column(&primary) {
        let amount_column = col.to_string();
        info!(column = %amount_column, "amount column found in primary");
        return Ok(Reconciled {
            table: primary,
            amount_column,
            source: AmountSource::Primary,
            skipped: Vec::new(),
        });
    }
    info!("primary has no amount column; trying sidecars");

    let dir = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let candidates = discover_candidates(&dir, source)?;
    if candidates.is_empty() {
        bail!(YtdError::NoSidecarCandidates { dir });
    }

    let keys = primary_keys(&primary, date_column, identifier_column, tz);
    let mut skipped = Vec::new();

    for path in &candidates {
        let table = match load_table(path) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "could not load sidecar; skipping");
                skipped.push(path.clone());
                continue;
            }
        };
        let Some(sidecar) = Sidecar::prepare(path, &table, tz) else {
            continue;
        };

        let Some((strategy, merged)) = join::merge(&sidecar, &keys) else {
            warn!(path = %path.display(), "sidecar matched no primary rows");
            continue;
        };

        let matched = merged.iter().filter(|v| v.is_some()).count();
        let name = merged_column_name(&primary.headers, &sidecar.amount_column);
        info!(
            path = %path.display(),
            column = %name,
            strategy,
            matched,
            rows = keys.len(),
            "merged sidecar amounts"
        );

        let values = merged
            .into_iter()
            .map(|v| v.map(|x| x.to_string()).unwrap_or_default())
            .collect();
        return Ok(Reconciled {
            table: primary.with_column(name.clone(), values),
            amount_column: name,
            source: AmountSource::Sidecar {
                path: path.clone(),
                strategy,
            },
            skipped,
        });
    }

    bail!(YtdError::ReconciliationExhausted { tried: candidates })
}

fn primary_keys(table: &RawTable, date_column: &str, identifier_column: &str, tz: Tz) -> Vec<PrimaryKey> {
    let date_col = table.column_index(date_column);
    let id_col = table.column_index(identifier_column);
    (0..table.len())
        .map(|r| PrimaryKey {
            identifier: id_col
                .map(|c| normalize_identifier(table.cell(r, c)))
                .unwrap_or_default(),
            date: date_col.and_then(|c| parse_award_date(table.cell(r, c), tz)),
        })
        .collect()
}

/// The sidecar's amount name, unless the primary already uses it.
fn merged_column_name(headers: &[String], wanted: &str) -> String {
    let mut name = wanted.to_string();
    while headers.iter().any(|h| *h == name) {
        name.push_str("_sidecar");
    }
    name
}
