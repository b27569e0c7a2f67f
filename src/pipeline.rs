//! One run: locate the extract, resolve its schema, reconcile amounts,
//! normalize, aggregate, and write both artifacts.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::aggregate::{aggregate_weekly, build_picklists, Picklists, WeeklyAggregate, YtdWindows};
use crate::config::PipelineConfig;
use crate::output::{write_json, JsonStyle};
use crate::process::{normalize_records, ResolvedColumns};
use crate::reconcile::{reconcile, AmountSource};
use crate::schema::{require_role, ColumnRole};
use crate::table::load_table;

/// Everything a run produces, before anything touches the output dir.
#[derive(Debug)]
pub struct RunOutput {
    pub input: PathBuf,
    pub windows: YtdWindows,
    pub amount_source: AmountSource,
    pub rows_read: usize,
    pub records_kept: usize,
    pub aggregates: Vec<WeeklyAggregate>,
    pub picklists: Picklists,
}

/// Compute both artifacts in memory. Every fatal error surfaces here.
pub fn build(config: &PipelineConfig) -> Result<RunOutput> {
    let tz = config.tz()?;
    let today = config.today()?;
    let windows = YtdWindows::new(today, config.earlier_year, config.later_year)?;
    info!(
        %today,
        earlier_cutoff = %windows.earlier.end,
        later_cutoff = %windows.later.end,
        "ytd windows"
    );

    let input = config.locate_input()?;
    info!(input = %input.display(), "loading primary extract");
    let table = load_table(&input)?;
    let rows_read = table.len();

    let date_column = require_role(&table.headers, ColumnRole::Date)?.to_string();
    require_role(&table.headers, ColumnRole::InstituteCode)?;
    let identifier = require_role(&table.headers, ColumnRole::GrantIdentifier)?.to_string();

    let reconciled = reconcile(table, &input, &date_column, &identifier, tz)?;
    let cols = ResolvedColumns::resolve(&reconciled.table, &reconciled.amount_column)?;
    let records = normalize_records(&reconciled.table, &cols, tz);

    let aggregates = aggregate_weekly(&records, &windows, &config.type_allowlist);
    let picklists = build_picklists(
        &aggregates,
        &windows,
        input.display().to_string(),
        reconciled.measure_label(),
    );
    info!(
        rows_read,
        records = records.len(),
        aggregates = aggregates.len(),
        "aggregated"
    );

    Ok(RunOutput {
        input,
        windows,
        amount_source: reconciled.source,
        rows_read,
        records_kept: records.len(),
        aggregates,
        picklists,
    })
}

/// Build, then write the aggregate table and the picklists.
pub fn run(config: &PipelineConfig) -> Result<RunOutput> {
    let out = build(config)?;
    write_json(&config.aggregate_path(), &out.aggregates, JsonStyle::Compact)?;
    write_json(&config.picklists_path(), &out.picklists, JsonStyle::Pretty)?;
    Ok(out)
}
