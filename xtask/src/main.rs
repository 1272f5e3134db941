use anyhow::{Context, Result};
use chunkgraph::{Chunk, ChunkedGraph, CompactChunkedGraph, Direction, GapChunk, GraphConfig, GraphStats};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "chunkgraph workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the criterion benchmarks and write a markdown report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Name the criterion baseline is saved under
        #[arg(long, default_value = "current")]
        baseline: String,

        /// Baseline the others are compared against in the report
        #[arg(long, default_value = "current")]
        reference: String,
    },
    /// Build a synthetic graph and print its occupancy figures as JSON
    Stats {
        /// Number of vertices
        #[arg(long, default_value_t = 10_000)]
        vertices: usize,

        /// Outgoing arrows per vertex
        #[arg(long, default_value_t = 8)]
        degree: usize,

        /// Vertex slots per chunk
        #[arg(long, default_value_t = chunkgraph::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Use 16-bit storage words
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
}

const BENCHES: &[&str] = &["chunked_graph_benchmark", "traversal_benchmark"];

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            baseline,
            reference,
        } => {
            if !report_only {
                run_benchmarks(quick, &baseline)?;
            }
            generate_report(&reference)?;
        }
        Commands::Stats {
            vertices,
            degree,
            chunk_size,
            compact,
        } => {
            let config = GraphConfig::default().with_chunk_size(chunk_size);
            let report = if compact {
                build_report(CompactChunkedGraph::with_config(config)?, vertices, degree)?
            } else {
                build_report(ChunkedGraph::<GapChunk<u32>>::with_config(config)?, vertices, degree)?
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct StatsReport {
    build_ms: f64,
    graph: GraphStats,
    occupancy: f64,
    fullest_chunk: Option<usize>,
}

fn build_report<C: Chunk>(mut graph: ChunkedGraph<C>, vertices: usize, degree: usize) -> Result<StatsReport> {
    let start = Instant::now();
    graph.add_vertices(vertices)?;
    // Deterministic pseudo-random targets.
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for v in 0..vertices {
        for _ in 0..degree {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let u = (state % vertices as u64) as usize;
            graph.add_arrow(v, u, (state >> 40) as u32 & 0xFFFF)?;
        }
    }
    let build_ms = start.elapsed().as_secs_f64() * 1e3;
    graph.check_invariants().context("synthetic graph failed its invariant check")?;
    info!(vertices, arrows = graph.arrow_count(), build_ms, "built synthetic graph");

    let stats = graph.stats();
    let fullest_chunk = graph
        .chunk_stats(Direction::Forward)
        .iter()
        .max_by_key(|c| c.used)
        .map(|c| c.base);
    Ok(StatsReport {
        build_ms,
        occupancy: stats.occupancy(),
        graph: stats,
        fullest_chunk,
    })
}

fn run_benchmarks(quick: bool, baseline: &str) -> Result<()> {
    info!("compiling benchmarks");
    let mut build = Command::new("cargo");
    build.args(["build", "--release"]);
    for bench in BENCHES {
        build.arg("--bench").arg(bench);
    }
    if !build.status()?.success() {
        anyhow::bail!("Failed to compile benchmarks");
    }

    for bench in BENCHES {
        info!(bench, baseline, "running benchmark");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.arg("bench").arg("--bench").arg(bench);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        cmd.arg("--save-baseline").arg(baseline);

        if quick {
            cmd.arg("--measurement-time").arg("0.1");
            cmd.arg("--noplot");
            cmd.arg("--sample-size").arg("10");
        }

        let status = cmd.status().with_context(|| format!("Failed to run bench {bench}"))?;

        if status.success() {
            info!(bench, elapsed = ?start.elapsed(), "finished benchmark");
        } else {
            warn!(bench, "benchmark failed");
        }
    }

    Ok(())
}

/// `workload -> baseline -> ops/s`.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn generate_report(reference: &str) -> Result<()> {
    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        warn!(dir = %criterion_dir.display(), "no criterion output found");
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, criterion_dir, &mut results);

    let mut baselines: Vec<String> = results.values().flat_map(|m| m.keys().cloned()).collect();
    baselines.sort();
    baselines.dedup();

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# chunkgraph Benchmark Report")?;
    writeln!(file)?;

    write!(file, "| Workload |")?;
    for baseline in &baselines {
        write!(file, " {baseline} (Ops/s) | vs {reference} |")?;
    }
    writeln!(file)?;
    write!(file, "|---|")?;
    for _ in &baselines {
        write!(file, "---|---|")?;
    }
    writeln!(file)?;

    for (workload, measured) in &results {
        write!(file, "| {workload} |")?;
        let reference_ops = measured.get(reference).copied().unwrap_or(0.0);
        for baseline in &baselines {
            match measured.get(baseline) {
                Some(&ops) => {
                    let rel = if reference_ops > 0.0 { ops / reference_ops } else { 0.0 };
                    write!(file, " {} | **{rel:.2}x** |", format_ops(ops))?;
                }
                None => write!(file, " N/A | - |")?,
            }
        }
        writeln!(file)?;
    }

    info!(path = %report_path.display(), workloads = results.len(), "report written");
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

fn read_json(path: &Path) -> Option<serde_json::Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Walks `target/criterion`, whose layout is `<group>/<bench>/<baseline>/estimates.json`.
fn collect_results(root: &Path, dir: &Path, results: &mut Results) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(root, &path, results);
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let Some(baseline) = baseline_dir.file_name().and_then(|s| s.to_str()) else { continue };
        if baseline == "report" || baseline == "new" || baseline == "base" || baseline == "change" {
            continue;
        }
        let Ok(workload) = workload_dir.strip_prefix(root) else { continue };
        let workload = workload.display().to_string();

        let elements = read_json(&workload_dir.join(baseline).join("benchmark.json"))
            .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64());
        let Some(time_ns) = read_json(&path)
            .and_then(|json| json.get("mean")?.get("point_estimate")?.as_f64())
            .filter(|t| *t > 0.0)
        else {
            continue;
        };
        let metric = elements.unwrap_or(1.0) * 1e9 / time_ns;
        results.entry(workload).or_default().insert(baseline.to_string(), metric);
    }
}
