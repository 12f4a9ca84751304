//! Benchmark command - measure batched simulation throughput
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_benchmarks(), report_results()
//! - Level 3: benchmark_env()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;

use hexbatch_core::{Agent, BatchedEnv, EnvConfig, RandomAgent};

use crate::env_args::EnvArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    /// Steps to run per configuration
    #[arg(long, default_value = "256")]
    pub steps: usize,

    /// Also run the other execution mode and compare
    #[arg(long)]
    pub compare: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results of a single benchmark run
#[derive(Clone, Debug)]
struct BenchmarkResult {
    name: String,
    envs: usize,
    steps: usize,
    total_time: Duration,
    samples_per_second: f64,
    games_finished: usize,
}

/// All benchmark results
#[derive(Clone, Debug)]
struct AllResults {
    results: Vec<BenchmarkResult>,
    system_info: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// 1. Resolve the environment config
/// 2. Time random play in the requested mode (and the other, if comparing)
/// 3. Report all results
pub fn run(args: BenchmarkArgs, seed: Option<u64>) -> Result<()> {
    let config = args.env.to_config(EnvConfig::new(4096, 11))?;
    tracing::info!(
        "Starting benchmark: {} envs, boardsize {}, {} steps",
        config.batch_size,
        config.boardsize,
        args.steps
    );

    let mut all_results = AllResults {
        results: Vec::new(),
        system_info: get_system_info(),
    };

    run_benchmarks(&config, &args, seed, &mut all_results)?;
    report_results(&all_results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn run_benchmarks(config: &EnvConfig, args: &BenchmarkArgs, seed: Option<u64>, results: &mut AllResults) -> Result<()> {
    let mut configs = vec![config.clone()];
    if args.compare {
        configs.push(config.clone().with_parallel(!config.parallel));
    }

    for config in configs {
        tracing::info!("Benchmarking {} stepping...", mode_name(&config));
        let result = benchmark_env(&config, args.steps, seed)?;
        results.results.push(result);
    }

    Ok(())
}

fn report_results(results: &AllResults, args: &BenchmarkArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Time `steps` rounds of uniformly random legal moves
fn benchmark_env(config: &EnvConfig, steps: usize, seed: Option<u64>) -> Result<BenchmarkResult> {
    let mut env = BatchedEnv::create(config.clone()).context("Failed to create environment")?;
    let mut agent = RandomAgent::new(seed);
    let mut obs = env.observe();
    let mut games_finished = 0;

    let start = Instant::now();
    for _ in 0..steps {
        let actions = agent.select_actions(&obs.instances);
        let (transition, next) = env.step(&actions).context("Step failed")?;
        games_finished += transition.finished();
        obs = next;
    }
    let total_time = start.elapsed();

    let samples = (config.batch_size * steps) as f64;
    Ok(BenchmarkResult {
        name: mode_name(config).to_string(),
        envs: config.batch_size,
        steps,
        total_time,
        samples_per_second: samples / total_time.as_secs_f64().max(f64::EPSILON),
        games_finished,
    })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn mode_name(config: &EnvConfig) -> &'static str {
    if config.parallel {
        "parallel"
    } else {
        "lockstep"
    }
}

/// Get system information string
fn get_system_info() -> String {
    format!(
        "hexbatch {}, {} CPUs",
        env!("CARGO_PKG_VERSION"),
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    )
}

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 60 {
        format!("{}m {:.1}s", d.as_secs() / 60, (d.as_secs() % 60) as f64 + d.subsec_millis() as f64 / 1000.0)
    } else if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

fn print_json_results(results: &AllResults) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark {
        mode: String,
        envs: usize,
        steps: usize,
        total_time_ms: u64,
        samples_per_second: f64,
        games_finished: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        timestamp: String,
        system_info: String,
        benchmarks: Vec<JsonBenchmark>,
    }

    let output = JsonOutput {
        timestamp: chrono::Utc::now().to_rfc3339(),
        system_info: results.system_info.clone(),
        benchmarks: results
            .results
            .iter()
            .map(|r| JsonBenchmark {
                mode: r.name.clone(),
                envs: r.envs,
                steps: r.steps,
                total_time_ms: r.total_time.as_millis() as u64,
                samples_per_second: r.samples_per_second,
                games_finished: r.games_finished,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &AllResults) {
    println!("\n=== HEXBATCH Benchmark Results ===");
    println!("System: {}\n", results.system_info);

    println!(
        "{:<10} {:>8} {:>8} {:>12} {:>14} {:>10}",
        "Mode", "Envs", "Steps", "Total Time", "Samples/s", "Finished"
    );
    println!("{}", "-".repeat(67));

    for r in &results.results {
        println!(
            "{:<10} {:>8} {:>8} {:>12} {:>14.0} {:>10}",
            r.name,
            r.envs,
            r.steps,
            format_duration(r.total_time),
            r.samples_per_second,
            r.games_finished
        );
    }

    let lockstep = results.results.iter().find(|r| r.name == "lockstep");
    let parallel = results.results.iter().find(|r| r.name == "parallel");
    if let (Some(seq), Some(par)) = (lockstep, parallel) {
        if seq.samples_per_second > 0.0 {
            println!("\nParallel speedup: {:.1}x", par.samples_per_second / seq.samples_per_second);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
