//! CLI entry point: reads a worker catalog, profile, and demand from JSON
//! files (or, with the `grpc` feature, live service endpoints), runs
//! `solve()`, and prints the resulting plan.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use fleet_planner::{Demand, Profile, SolveOutcome, WorkerConfig};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "fleet-planner", about = "Minimum-cost capacity planning for an inference fleet")]
struct Cli {
    /// JSON file with the worker catalog.
    #[arg(long)]
    workers: PathBuf,

    /// JSON file with the demand distribution (map of requestTypeId -> rate).
    /// Ignored when `--demand-endpoint` is set.
    #[arg(long)]
    demand: Option<PathBuf>,

    /// JSON file with the throughput profile (list of {workerId, requestTypeId, maxRps}).
    /// Ignored when `--profile-endpoint` is set.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Live distribution service endpoint. Requires the `grpc` feature.
    #[arg(long)]
    demand_endpoint: Option<String>,

    /// Live profiler service endpoint. Requires the `grpc` feature.
    #[arg(long)]
    profile_endpoint: Option<String>,

    /// Number of slices each request type's demand is split into.
    #[arg(long, default_value_t = 2)]
    slice_factor: u32,

    /// Solver wall-clock time limit, in seconds.
    #[arg(long)]
    time_limit_secs: Option<f64>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Print the plan as JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(serde::Deserialize)]
struct ProfileEntryFile {
    worker_id: String,
    request_type_id: String,
    max_rps: f64,
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base = fmt::layer().with_target(true);

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(base.pretty())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(base.json())
            .init(),
    }
}

fn load_workers(path: &PathBuf) -> anyhow::Result<Vec<WorkerConfig>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn load_demand(path: Option<&PathBuf>) -> anyhow::Result<Demand> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(Demand::new()),
    }
}

fn load_profile(path: Option<&PathBuf>) -> anyhow::Result<Profile> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let entries: Vec<ProfileEntryFile> = serde_json::from_str(&raw)?;
            Ok(entries
                .into_iter()
                .map(|e| ((e.worker_id, e.request_type_id), e.max_rps))
                .collect())
        }
        None => Ok(Profile::new()),
    }
}

#[cfg(feature = "grpc")]
fn fetch_demand_live(endpoint: &str) -> anyhow::Result<Demand> {
    use fleet_planner::fetch::{fold_distribution, DistributionFetcher};
    use fleet_planner::grpc::GrpcDistributionClient;

    let client = GrpcDistributionClient { endpoint: endpoint.to_string() };
    let response = client.fetch()?;
    let (_, demand, warnings) = fold_distribution(response);
    for message in warnings {
        tracing::warn!(%message, "dropped distribution entry");
    }
    Ok(demand)
}

#[cfg(not(feature = "grpc"))]
fn fetch_demand_live(_endpoint: &str) -> anyhow::Result<Demand> {
    anyhow::bail!("--demand-endpoint requires the `grpc` feature")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(&cli) {
        Ok(outcome) => report(&cli, &outcome),
        Err(err) => {
            tracing::error!(error = %err, "fleet-planner failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<SolveOutcome> {
    let workers = load_workers(&cli.workers)?;

    let demand = match &cli.demand_endpoint {
        Some(endpoint) => fetch_demand_live(endpoint)?,
        None => load_demand(cli.demand.as_ref())?,
    };

    let profile = match &cli.profile_endpoint {
        Some(_) => anyhow::bail!("live profiler fetch is not wired into the CLI; pass --profile instead"),
        None => load_profile(cli.profile.as_ref())?,
    };

    let time_limit = cli.time_limit_secs.map(Duration::from_secs_f64);
    let outcome = fleet_planner::solve(&workers, &profile, &demand, cli.slice_factor, time_limit)?;
    Ok(outcome)
}

fn report(cli: &Cli, outcome: &SolveOutcome) -> ExitCode {
    if cli.json {
        let payload = serde_json::json!({
            "status": outcome.status_name(),
            "plan": outcome.plan(),
        });
        println!("{}", serde_json::to_string_pretty(&payload).unwrap());
    } else {
        println!("status: {}", outcome.status_name());
        if let Some(plan) = outcome.plan() {
            let mut worker_ids: Vec<&String> = plan.counts.keys().collect();
            worker_ids.sort();
            for worker_id in worker_ids {
                println!("  {worker_id}: {}", plan.counts[worker_id]);
            }
        }
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
