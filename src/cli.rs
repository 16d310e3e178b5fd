use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Ingest menu spreadsheets and reconcile costs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full ingestion pipeline and report the merged item table
    Run(RunArgs),
    /// Run the pipeline and print the column names of one output table
    Columns(ColumnsArgs),
    /// Run the pipeline and preview the first rows of one output table
    Preview(PreviewArgs),
}

/// Input selection shared by every command.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// YAML manifest listing source workbooks and reference tables
    #[arg(short = 'M', long = "manifest")]
    pub manifest: Option<PathBuf>,
    /// Source workbook path (repeatable, overrides the manifest list)
    #[arg(long = "source", action = clap::ArgAction::Append)]
    pub sources: Vec<PathBuf>,
    /// Ingredient catalog CSV
    #[arg(long)]
    pub ingredients: Option<PathBuf>,
    /// Shipment log CSV
    #[arg(long)]
    pub shipments: Option<PathBuf>,
    /// Number of worksheets to read from each workbook
    #[arg(long = "sheets-per-source")]
    pub sheets_per_source: Option<usize>,
    /// Character encoding of the reference CSVs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Append each shipment log row at most once per shipment row
    #[arg(long = "dedup-matches")]
    pub dedup_matches: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Write group.csv, category.csv, and item.csv into this directory
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Emit a JSON run summary instead of the column listing
    #[arg(long)]
    pub summary: bool,
    /// Preview the first rows of the merged item table
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Which output table to inspect
    #[arg(long, value_enum)]
    pub kind: KindArg,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Which output table to preview
    #[arg(long, value_enum)]
    pub kind: KindArg,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum KindArg {
    Group,
    Category,
    Item,
}

impl KindArg {
    /// The published table name this argument selects.
    pub fn table_name(&self) -> &'static str {
        match self {
            KindArg::Group => "Group",
            KindArg::Category => "Category",
            KindArg::Item => "Item",
        }
    }
}
