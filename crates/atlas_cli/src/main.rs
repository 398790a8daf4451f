//! Command-line entry point for the atlas engine.
//!
//! # Responsibility
//! - Read one markdown document from disk and run the engine over it.
//! - Print block summaries or a rendered view model as JSON on stdout.
//!
//! # Invariants
//! - Logs go to stderr so stdout stays machine-readable.
//! - A document with no decodable block is an error, not empty output.

use atlas_core::view::gallery::GallerySort;
use atlas_core::view::timeline::TimelineRoles;
use atlas_core::{
    field_icon, field_label, init_stderr_logging, parse_front_matter, parse_report, render,
    AtlasDataBlock, DisplayValueResolver, EngineConfig, FrontMatter, ViewMode, ViewRequest,
};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "atlas", version, about = "Render atlas data blocks from markdown")]
struct Cli {
    /// Log level written to stderr.
    #[arg(long = "log-level", global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the blocks of a document with resolved labels and display values.
    Blocks {
        /// Markdown document to scan.
        file: PathBuf,
    },
    /// Render one block into a view model.
    Render(RenderArgs),
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Markdown document to scan.
    file: PathBuf,

    /// View mode: list, kanban, calendar, timeline, tree, graph or gallery.
    #[arg(long, short = 'v', default_value = "list")]
    view: String,

    /// Block id to render. Defaults to the first block.
    #[arg(long, short = 'b')]
    block: Option<String>,

    /// Edge-list block id for the graph view.
    #[arg(long)]
    edges: Option<String>,

    /// Month shown by the calendar view, as YYYY-MM.
    #[arg(long, value_name = "YYYY-MM")]
    month: Option<String>,

    /// Gallery sort: date, likes or title.
    #[arg(long, default_value = "date")]
    sort: String,

    /// Timeline title field override.
    #[arg(long = "timeline-title")]
    timeline_title: Option<String>,

    /// YAML engine config file; replaces the document's front-matter config.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_stderr_logging(&cli.log_level) {
        eprintln!("atlas: {err}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Blocks { file } => run_blocks(file),
        Command::Render(args) => run_render(args),
    };
    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("atlas: {err}");
            ExitCode::FAILURE
        }
    }
}

fn read_document(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("cannot read {}: {err}", path.display()))
}

fn run_blocks(path: &Path) -> Result<String, String> {
    let document = read_document(path)?;
    let front = parse_front_matter(&document);
    let report = parse_report(&document);

    let blocks: Vec<Value> = report
        .blocks
        .iter()
        .map(|block| block_summary(block, &front))
        .collect();
    let skipped: Vec<Value> = report
        .skipped
        .iter()
        .map(|skipped| {
            json!({
                "index": skipped.index,
                "line": skipped.line,
                "reason": skipped.reason.to_string(),
            })
        })
        .collect();

    info!(
        "event=cli_blocks module=cli file={} blocks={} skipped={}",
        path.display(),
        blocks.len(),
        skipped.len()
    );
    to_json(&json!({ "blocks": blocks, "skipped": skipped }), true)
}

fn block_summary(block: &AtlasDataBlock, front: &FrontMatter) -> Value {
    let fields: Vec<Value> = block
        .schema
        .iter()
        .map(|field| {
            json!({
                "key": field.key,
                "label": field_label(field, &front.labels),
                "icon": field_icon(field, &front.labels),
                "type": field.field_type.as_str(),
            })
        })
        .collect();
    let resolver = DisplayValueResolver::from_config(&front.config);
    let rows: Vec<Value> = block
        .data
        .iter()
        .map(|item| {
            let cells: Map<String, Value> = block
                .schema
                .iter()
                .map(|field| {
                    let resolved = resolver.resolve_item(field, item);
                    (field.key.clone(), Value::String(resolved.display_value))
                })
                .collect();
            json!({ "id": item.id, "cells": cells })
        })
        .collect();
    json!({
        "id": block.id,
        "type": block.kind.as_str(),
        "title": block.title,
        "fields": fields,
        "rows": rows,
    })
}

fn run_render(args: &RenderArgs) -> Result<String, String> {
    let mode = ViewMode::parse(&args.view)
        .ok_or_else(|| format!("unknown view `{}`", args.view))?;
    let document = read_document(&args.file)?;
    let front = parse_front_matter(&document);
    let report = parse_report(&document);
    for skipped in &report.skipped {
        warn!(
            "event=cli_block_skipped module=cli line={} reason={}",
            skipped.line, skipped.reason
        );
    }

    let block = select_block(&report.blocks, args.block.as_deref())?;
    let edge_block = match (&args.edges, mode) {
        (Some(id), ViewMode::Graph) => Some(select_block(&report.blocks, Some(id.as_str()))?),
        _ => None,
    };

    let request = match mode {
        ViewMode::List => ViewRequest::List,
        ViewMode::Kanban => ViewRequest::Kanban,
        ViewMode::Calendar => {
            let (year, month) = match args.month.as_deref() {
                Some(text) => parse_month(text)?,
                None => current_month(),
            };
            ViewRequest::Calendar { year, month }
        }
        ViewMode::Timeline => ViewRequest::Timeline(TimelineRoles {
            title: args.timeline_title.clone(),
            ..TimelineRoles::default()
        }),
        ViewMode::Tree => ViewRequest::Tree,
        ViewMode::Graph => ViewRequest::Graph { edges: edge_block },
        ViewMode::Gallery => ViewRequest::Gallery {
            sort: GallerySort::parse(&args.sort)
                .ok_or_else(|| format!("unknown gallery sort `{}`", args.sort))?,
        },
    };

    let config = match &args.config {
        Some(path) => EngineConfig::from_yaml_str(&read_document(path)?)
            .map_err(|err| format!("invalid config {}: {err}", path.display()))?,
        None => front.config,
    };
    let model = render(block, &request, &config);
    info!(
        "event=cli_render module=cli file={} block={} mode={}",
        args.file.display(),
        block.id,
        mode
    );
    let value = serde_json::to_value(&model).map_err(|err| err.to_string())?;
    to_json(&value, args.pretty)
}

fn select_block<'a>(
    blocks: &'a [AtlasDataBlock],
    id: Option<&str>,
) -> Result<&'a AtlasDataBlock, String> {
    match id {
        Some(id) => blocks
            .iter()
            .find(|block| block.id == id)
            .ok_or_else(|| format!("no block with id `{id}`")),
        None => blocks
            .first()
            .ok_or_else(|| "document contains no atlas blocks".to_string()),
    }
}

fn parse_month(text: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("invalid month `{text}`, expected YYYY-MM");
    let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

fn current_month() -> (i32, u32) {
    let today = Local::now().date_naive();
    (today.year(), today.month())
}

fn to_json(value: &Value, pretty: bool) -> Result<String, String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(|err| err.to_string())
}
