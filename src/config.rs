use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::{cli::SourceArgs, error::PipelineError};

pub const DEFAULT_SHEETS_PER_SOURCE: usize = 3;

/// Everything one pipeline run needs to know. Usually deserialized from a
/// YAML manifest, with command-line flags overriding individual fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Ordered workbook paths, one per reporting period.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Ingredient catalog CSV.
    pub ingredients: PathBuf,
    /// Shipment log CSV.
    pub shipments: PathBuf,
    /// Worksheets read from each workbook.
    #[serde(default = "default_sheets_per_source")]
    pub sheets_per_source: usize,
    /// Bound shipment expansion to one append per log row per shipment row.
    #[serde(default)]
    pub dedup_matches: bool,
    /// Character encoding of the reference CSVs (defaults to utf-8).
    #[serde(default)]
    pub input_encoding: Option<String>,
}

fn default_sheets_per_source() -> usize {
    DEFAULT_SHEETS_PER_SOURCE
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sources.is_empty() {
            return Err(PipelineError::Config(
                "no source workbooks configured".to_string(),
            ));
        }
        if self.sheets_per_source == 0 {
            return Err(PipelineError::Config(
                "sheets_per_source must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds the run configuration from a manifest, command-line flags, or
/// both. Flags win over manifest values field by field.
pub fn resolve(args: &SourceArgs) -> Result<PipelineConfig> {
    let mut config = match &args.manifest {
        Some(path) => load_manifest(path)?,
        None => PipelineConfig {
            sources: Vec::new(),
            ingredients: args
                .ingredients
                .clone()
                .ok_or_else(|| anyhow!("--ingredients is required when no manifest is given"))?,
            shipments: args
                .shipments
                .clone()
                .ok_or_else(|| anyhow!("--shipments is required when no manifest is given"))?,
            sheets_per_source: DEFAULT_SHEETS_PER_SOURCE,
            dedup_matches: false,
            input_encoding: None,
        },
    };

    if !args.sources.is_empty() {
        config.sources = args.sources.clone();
    }
    if let Some(path) = &args.ingredients {
        config.ingredients = path.clone();
    }
    if let Some(path) = &args.shipments {
        config.shipments = path.clone();
    }
    if let Some(sheets) = args.sheets_per_source {
        config.sheets_per_source = sheets;
    }
    if let Some(encoding) = &args.input_encoding {
        config.input_encoding = Some(encoding.clone());
    }
    if args.dedup_matches {
        config.dedup_matches = true;
    }

    if config.sources.is_empty() {
        return Err(anyhow!(
            "no source workbooks configured; provide --source or a manifest with a sources list"
        ));
    }
    Ok(config)
}

fn load_manifest(path: &Path) -> Result<PipelineConfig> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Reading manifest {path:?}"))?;
    let mut config: PipelineConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing manifest {path:?}"))?;
    if let Some(base) = path.parent() {
        rebase(&mut config, base);
    }
    Ok(config)
}

/// Relative manifest paths are resolved against the manifest's directory so
/// a manifest can travel with its data.
fn rebase(config: &mut PipelineConfig, base: &Path) {
    for source in &mut config.sources {
        rebase_path(source, base);
    }
    rebase_path(&mut config.ingredients, base);
    rebase_path(&mut config.shipments, base);
}

fn rebase_path(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}
