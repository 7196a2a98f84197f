use std::env;
use std::future::{self, Future};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use promo_usage_bench::{report, run_scenario, BenchConfig, Dependencies, ScenarioPlan};
use promo_usage_repository::{MetricsSink, TransportKind};

#[derive(Parser)]
#[command(name = "promo-usage-bench")]
#[command(about = "Benchmark the proxy and official cluster clients on promo order usage records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cluster URL for the official client (overrides ELASTICSEARCH_URL)
    #[arg(long, global = true)]
    elasticsearch_url: Option<String>,

    /// Proxy base URL (overrides PROXY_URL)
    #[arg(long, global = true)]
    proxy_url: Option<String>,

    /// Deployment environment used as index prefix (overrides DEPLOYMENT_ENV)
    #[arg(long, global = true)]
    environment: Option<String>,

    /// Proxy request timeout in milliseconds (overrides REQUEST_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Pause between the writes and the delete, in milliseconds
    #[arg(long, default_value = "1000", global = true)]
    pause_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario against both transports
    Run,
    /// Run the scenario against the proxy only
    Proxy,
    /// Run the scenario against the official client only
    Official,
    /// Check cluster health and version through both transports
    Health,
}

impl Commands {
    fn transports(&self) -> Vec<TransportKind> {
        match self {
            Commands::Run | Commands::Health => vec![TransportKind::Proxy, TransportKind::Official],
            Commands::Proxy => vec![TransportKind::Proxy],
            Commands::Official => vec![TransportKind::Official],
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(cli: &Cli) -> Result<BenchConfig> {
    let mut config = BenchConfig::from_env().context("Failed to read configuration")?;

    if let Some(url) = &cli.elasticsearch_url {
        config.elasticsearch_url = url.clone();
        if cli.proxy_url.is_none() && env::var("PROXY_URL").is_err() {
            config.proxy_url = url.clone();
        }
    }
    if let Some(url) = &cli.proxy_url {
        config.proxy_url = url.clone();
    }
    if let Some(environment) = &cli.environment {
        config.environment = environment.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout = Some(Duration::from_millis(timeout_ms));
    }

    Ok(config)
}

async fn run_benchmark(cli: &Cli, dependencies: &Dependencies) -> Result<()> {
    let metrics: std::sync::Arc<dyn MetricsSink> = dependencies.recorder.clone();
    let mut outcomes = Vec::with_capacity(dependencies.repositories.len());

    for repository in &dependencies.repositories {
        let plan = ScenarioPlan::for_kind(repository.kind())
            .with_pause(Duration::from_millis(cli.pause_ms));
        outcomes.push(run_scenario(repository, &plan, metrics.clone()).await);
    }

    println!(
        "\n{}",
        report::render(
            &outcomes,
            &dependencies.recorder.summaries(),
            &dependencies.recorder.counts()
        )
    );
    Ok(())
}

async fn run_health(dependencies: &Dependencies) -> Result<()> {
    let mut unhealthy = 0;

    for repository in &dependencies.repositories {
        let kind = repository.kind();
        match repository.health_check().await {
            Ok(true) => println!("{} {}", "✓".green(), format!("{} healthy", kind)),
            Ok(false) => {
                unhealthy += 1;
                println!("{} {}", "✗".red(), format!("{} unhealthy", kind));
            }
            Err(e) => {
                unhealthy += 1;
                println!("{} {}: {}", "✗".red(), kind, e);
            }
        }

        match repository.info().await {
            Ok(info) => println!(
                "  cluster {} (node {}, version {})",
                info.cluster_name, info.name, info.version
            ),
            Err(e) => warn!(transport = %kind, error = %e, "Could not read cluster info"),
        }
    }

    if unhealthy > 0 {
        anyhow::bail!("{} transport(s) reported an unhealthy cluster", unhealthy);
    }
    Ok(())
}

/// Run `work` unless `interrupt` completes first.
///
/// Dropping `work` cancels its in-flight requests. An interrupted run is an
/// error so the process exits non-zero.
async fn until_interrupted<W, I>(work: W, interrupt: I) -> Result<()>
where
    W: Future<Output = Result<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        result = work => result,
        _ = interrupt => {
            warn!("Interrupted, cancelling benchmark");
            anyhow::bail!("Benchmark interrupted before completion")
        }
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result = async {
        let config = load_config(&cli)?;
        let dependencies = Dependencies::new(&config, &cli.command.transports())
            .context("Failed to initialize transports")?;

        info!(environment = %config.environment, "Starting benchmark");

        let work = async {
            match cli.command {
                Commands::Health => run_health(&dependencies).await,
                _ => run_benchmark(&cli, &dependencies).await,
            }
        };
        until_interrupted(work, ctrl_c()).await
    }
    .await;

    if let Err(e) = result {
        error!("Benchmark failed: {}", e);
        eprintln!("\n{} {}", "Error:".red().bold(), e);

        for cause in e.chain().skip(1) {
            eprintln!("  Caused by: {}", cause);
        }

        std::process::exit(1);
    }
}
