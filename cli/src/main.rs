//! Command-line front door for the MCP scheduler core. All parsing —
//! JSON documents, `--window` flags — lives here; the core crate never
//! touches a file path or an argv.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mcp_sched_core::io::{self, TaskGraphDocument, WarmStartDocument};
use mcp_sched_core::{schedule, schedule_with_warm_start, WarmStart};

#[derive(Parser, Debug)]
#[command(name = "mcp-sched", about = "Modified-Critical-Path DAG scheduler")]
struct Args {
    /// Path to a task-graph JSON document.
    #[arg(long)]
    graph: PathBuf,

    /// Path to a warm-start JSON document (order + ub). Omit for a fresh
    /// ALAP run.
    #[arg(long)]
    warm_start: Option<PathBuf>,

    /// One or more `start:low_ids:high_ids` windows, e.g. `0:0,1:` or
    /// `50::1`. `low_ids`/`high_ids` are comma-separated processor ids,
    /// either half may be empty.
    #[arg(long = "window", required = true)]
    windows: Vec<String>,

    /// Memory threshold above which a task requires a high-memory processor.
    #[arg(long, default_value_t = 0)]
    memory_limit: u32,

    /// Where to write the resulting schedule JSON.
    #[arg(long, default_value = "schedule.json")]
    out: PathBuf,

    /// Where to write the updated warm-start binding for a later run.
    #[arg(long, default_value = "warm_start.json")]
    warm_start_out: PathBuf,
}

fn parse_window(raw: &str) -> Result<(u64, Vec<u32>, Vec<u32>)> {
    let mut parts = raw.splitn(3, ':');
    let start = parts
        .next()
        .context("window is missing a start time")?
        .parse::<u64>()
        .with_context(|| format!("invalid start time in window '{raw}'"))?;
    let low = parts.next().unwrap_or("");
    let high = parts.next().unwrap_or("");

    let parse_ids = |s: &str| -> Result<Vec<u32>> {
        s.split(',')
            .filter(|id| !id.is_empty())
            .map(|id| id.parse::<u32>().with_context(|| format!("invalid processor id '{id}'")))
            .collect()
    };

    Ok((start, parse_ids(low)?, parse_ids(high)?))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let graph_json = fs::read_to_string(&args.graph)
        .with_context(|| format!("reading task graph from {}", args.graph.display()))?;
    let document: TaskGraphDocument =
        serde_json::from_str(&graph_json).context("parsing task graph JSON")?;
    let tasks = document.to_specs();

    let windows = args
        .windows
        .iter()
        .map(|w| parse_window(w))
        .collect::<Result<Vec<_>>>()?;
    let timeline = io::build_timeline(windows);

    info!("loaded {} tasks from {}", tasks.len(), args.graph.display());

    let result = if let Some(path) = &args.warm_start {
        let warm_json = fs::read_to_string(path)
            .with_context(|| format!("reading warm-start binding from {}", path.display()))?;
        let doc: WarmStartDocument =
            serde_json::from_str(&warm_json).context("parsing warm-start JSON")?;
        let warm_start: WarmStart = doc.into();
        schedule_with_warm_start(&tasks, &timeline, args.memory_limit, warm_start)
            .context("running warm-started schedule")?
    } else {
        schedule(&tasks, &timeline, args.memory_limit).context("running schedule")?
    };

    info!("makespan {} across {} placed tasks", result.makespan, result.schedule.len());

    let output = io::schedule_output(&result, &timeline);
    let output_json = serde_json::to_string_pretty(&output).context("serializing schedule output")?;
    fs::write(&args.out, output_json)
        .with_context(|| format!("writing schedule to {}", args.out.display()))?;

    let warm_start_doc = WarmStartDocument {
        order: result.saved_order.clone(),
        ub: result.ub,
    };
    let warm_start_json =
        serde_json::to_string_pretty(&warm_start_doc).context("serializing warm-start binding")?;
    fs::write(&args.warm_start_out, warm_start_json).with_context(|| {
        format!("writing warm-start binding to {}", args.warm_start_out.display())
    })?;

    Ok(())
}
