pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod state;
pub mod table;
pub mod text;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    state::PipelineHandle,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("menu_metrics", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => handle_run(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Preview(args) => handle_preview(&args),
    }
}

fn handle_run(args: &cli::RunArgs) -> Result<()> {
    let config = config::resolve(&args.source)?;
    let handle = PipelineHandle::new();
    let result = pipeline::run_pipeline(&config).context("Running ingestion pipeline")?;
    let result = handle.publish(result);

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))?;
        for (name, frame) in [
            ("group.csv", &result.group),
            ("category.csv", &result.category),
            ("item.csv", &result.item),
        ] {
            let path = dir.join(name);
            io_utils::write_frame_csv(&path, frame)
                .with_context(|| format!("Writing {path:?}"))?;
            info!("Wrote {} row(s) to {:?}", frame.row_count(), path);
        }
    }

    if args.summary {
        let summary = pipeline::RunSummary::from(result.as_ref());
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Serializing run summary")?
        );
    } else {
        println!("Merged item columns:");
        for column in &result.item_columns {
            println!("  {column}");
        }
    }

    if args.table {
        table::print_frame(&result.item, 10);
    }
    Ok(())
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let config = config::resolve(&args.source)?;
    let handle = PipelineHandle::new();
    handle.publish(pipeline::run_pipeline(&config).context("Running ingestion pipeline")?);
    for column in handle.get_columns(args.kind.table_name()) {
        println!("{column}");
    }
    Ok(())
}

fn handle_preview(args: &cli::PreviewArgs) -> Result<()> {
    let config = config::resolve(&args.source)?;
    let handle = PipelineHandle::new();
    handle.publish(pipeline::run_pipeline(&config).context("Running ingestion pipeline")?);
    match handle.get_table(args.kind.table_name()) {
        Some(view) => table::print_frame(view.frame(), args.rows),
        None => println!("(no table published for '{}')", args.kind.table_name()),
    }
    Ok(())
}
