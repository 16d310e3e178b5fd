use log::info;
use serde::Serialize;

use crate::{
    classify::{self, TableKind},
    config::PipelineConfig,
    error::PipelineError,
    frame::Frame,
    io_utils, loader,
    merge::{self, MergeOptions},
    normalize,
};

/// Per-run counters for issues that degrade gracefully instead of aborting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunDiagnostics {
    /// Cells that failed numeric coercion and were nulled.
    pub coercion_failures: usize,
    /// Shipment rows whose ingredient tokens matched no joined column.
    pub unmatched_shipments: usize,
}

/// The complete output of one pipeline run. Constructed once, published
/// wholesale, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub group: Frame,
    pub category: Frame,
    pub item: Frame,
    /// Column list of the merged item table, for caller discovery.
    pub item_columns: Vec<String>,
    pub diagnostics: RunDiagnostics,
}

impl PipelineResult {
    /// Looks a published table up by its kind name. Unrecognized names
    /// yield `None`, mirroring the lookup the shell exposes.
    pub fn table(&self, kind: &str) -> Option<&Frame> {
        match kind {
            "Group" => Some(&self.group),
            "Category" => Some(&self.category),
            "Item" => Some(&self.item),
            _ => None,
        }
    }
}

/// Machine-readable run report for the `--summary` output.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub group_rows: usize,
    pub category_rows: usize,
    pub item_rows: usize,
    pub item_columns: Vec<String>,
    pub diagnostics: RunDiagnostics,
}

impl From<&PipelineResult> for RunSummary {
    fn from(result: &PipelineResult) -> Self {
        RunSummary {
            group_rows: result.group.row_count(),
            category_rows: result.category.row_count(),
            item_rows: result.item.row_count(),
            item_columns: result.item_columns.clone(),
            diagnostics: result.diagnostics,
        }
    }
}

/// Executes one full ingestion run: load, classify, normalize, merge.
/// Synchronous and side-effect free with respect to shared state; callers
/// decide whether to publish the result. Any error leaves nothing behind.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineResult, PipelineError> {
    config.validate()?;
    let mut diagnostics = RunDiagnostics::default();

    let sources = loader::load_sources(&config.sources, config.sheets_per_source)?;
    let mut tables = classify::bucket(sources);
    info!(
        "Classified tables: {} group / {} category / {} item row(s)",
        tables.group.row_count(),
        tables.category.row_count(),
        tables.item.row_count()
    );

    normalize::normalize_metrics(&mut tables.group, TableKind::Group, &mut diagnostics);
    normalize::normalize_metrics(&mut tables.category, TableKind::Category, &mut diagnostics);
    normalize::normalize_metrics(&mut tables.item, TableKind::Item, &mut diagnostics);

    let encoding = io_utils::resolve_encoding(config.input_encoding.as_deref())
        .map_err(|err| PipelineError::Config(err.to_string()))?;
    let ingredients = loader::load_reference(
        &config.ingredients,
        encoding,
        merge::INGREDIENT_NAME_COLUMN,
    )?;
    let shipments =
        loader::load_reference(&config.shipments, encoding, merge::SHIPMENT_INGREDIENT_COLUMN)?;

    let options = MergeOptions {
        dedup_matches: config.dedup_matches,
    };
    let mut item = merge::merge_item_references(
        &tables.item,
        &ingredients,
        &shipments,
        &options,
        &mut diagnostics,
    )?;

    normalize::fill_null_cost(&mut tables.group);
    normalize::fill_null_cost(&mut tables.category);
    normalize::fill_null_cost(&mut item);

    let item_columns = item.columns().to_vec();
    info!(
        "Pipeline complete: {} merged item row(s), {} column(s), {} coercion failure(s), {} unmatched shipment row(s)",
        item.row_count(),
        item_columns.len(),
        diagnostics.coercion_failures,
        diagnostics.unmatched_shipments
    );

    Ok(PipelineResult {
        group: tables.group,
        category: tables.category,
        item,
        item_columns,
        diagnostics,
    })
}
