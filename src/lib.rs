// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::collections::HashMap;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{GraphSource, PoolSection, load_source, validate_pool};
use crate::dag::{DependencyGraph, DependencyIndex, validate_graph};
use crate::engine::TaskScheduler;
use crate::exec::CommandBody;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - graph loading (TOML config or text graph)
/// - CLI overrides of the pool settings
/// - the scheduler and its worker pool
/// - the final report on stdout
pub fn run(args: CliArgs) -> Result<()> {
    let source = load_source(&args.graph)?;

    let (graph, pool, commands) = match source {
        GraphSource::Config(cfg) => {
            let graph = cfg.graph();
            let commands = cfg.commands();
            (graph, cfg.pool, commands)
        }
        GraphSource::Text(graph) => (graph, PoolSection::default(), HashMap::new()),
    };
    let pool = apply_overrides(pool, &args);
    validate_pool(&pool)?;

    if args.dry_run {
        validate_graph(&graph)?;
        print_dry_run(&graph, &pool);
        return Ok(());
    }

    info!(
        graph = %args.graph,
        tasks = graph.len(),
        commands = commands.len(),
        "running dependency graph"
    );

    let body = CommandBody::new(commands, pool.simulated_work());
    let report = TaskScheduler::new(graph, body)
        .with_options(pool.scheduler_options())
        .run()?;

    println!("{report}");

    if !report.terminated {
        bail!("schedule did not finish within {}s", pool.max_wait_secs);
    }
    let failed = report.failed();
    if !failed.is_empty() {
        bail!(
            "{} task(s) failed: {}; {} skipped",
            failed.len(),
            failed.join(", "),
            report.skipped().len()
        );
    }
    Ok(())
}

fn apply_overrides(mut pool: PoolSection, args: &CliArgs) -> PoolSection {
    if let Some(workers) = args.workers {
        pool.pool_size = workers;
    }
    if let Some(secs) = args.keep_alive_secs {
        pool.keep_alive_secs = secs;
    }
    if let Some(secs) = args.max_wait_secs {
        pool.max_wait_secs = secs;
    }
    if let Some(policy) = args.failure_policy {
        pool.failure_policy = policy;
    }
    if let Some(ms) = args.work_unit_ms {
        pool.work_unit_ms = ms;
    }
    pool
}

/// Dry-run output: the dependency index the scheduler would start from.
fn print_dry_run(graph: &DependencyGraph<String>, pool: &PoolSection) {
    let index = DependencyIndex::build(graph);

    println!("dagpool dry-run");
    println!("  pool.pool_size = {}", pool.pool_size);
    println!("  pool.keep_alive_secs = {}", pool.keep_alive_secs);
    println!("  pool.max_wait_secs = {}", pool.max_wait_secs);
    println!("  pool.failure_policy = {}", pool.failure_policy);
    println!("  pool.work_unit_ms = {}", pool.work_unit_ms);
    println!();

    println!("reverse dependencies:");
    for task in graph.tasks() {
        let dependents = index.dependents_of(task);
        if !dependents.is_empty() {
            println!("  {task} -> {}", dependents.join(", "));
        }
    }

    println!("remaining dependency counts:");
    let mut counts: Vec<_> = index.initial_counts().iter().collect();
    counts.sort();
    for (task, count) in counts {
        println!("  {task} -> {count}");
    }

    println!("initially ready (fan-out):");
    for entry in index.initial_ready() {
        println!("  {} ({})", entry.task, entry.fan_out);
    }

    debug!("dry-run complete (no execution)");
}
