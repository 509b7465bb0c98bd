//! StepToDeen worker runner.
//!
//! Drives the offline cache policy from the command line against the real
//! network and an on-disk cache, one lifecycle event per invocation.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Method;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use steptodeen_sw::worker::{FetchOutcome, ResponseSource};
use steptodeen_sw::{
    CacheRouter, CacheStorage, Config, ConsoleHost, Destination, DiskStorage, HttpFetcher, Request,
};

#[derive(Parser, Debug)]
#[command(name = "steptodeen-sw")]
#[command(about = "Offline cache worker for StepToDeen")]
#[command(version)]
struct Args {
    /// Base URL relative asset paths resolve against (overrides config)
    #[arg(short, long, global = true)]
    scope: Option<String>,

    /// Cache directory (default: $XDG_CACHE_HOME/steptodeen)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cache the static assets
    Install,
    /// Delete caches from previous versions
    Activate,
    /// Route a single request through the cache policy
    Fetch {
        url: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Treat the request as a top-level navigation
        #[arg(short, long)]
        document: bool,
    },
    /// Fire a background sync event
    Sync { tag: String },
    /// Fire a push event with an optional JSON payload
    Push {
        #[arg(short, long)]
        payload: Option<String>,
    },
    /// List cache buckets and their entries
    Status,
    /// Write the effective config to the config file
    InitConfig,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

type Router = CacheRouter<DiskStorage, HttpFetcher, ConsoleHost>;

fn build_router(args: &Args) -> Result<Router> {
    let mut config = Config::load()?;
    if let Some(ref scope) = args.scope {
        config.scope = scope.clone();
    }

    let cache_dir = match args.cache_dir {
        Some(ref dir) => dir.clone(),
        None => config.cache_dir()?,
    };
    let storage = DiskStorage::new(cache_dir)?;
    let fetcher = HttpFetcher::with_timeout(Duration::from_secs(config.request_timeout_secs))?;

    CacheRouter::new(config, storage, fetcher, ConsoleHost)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let args = Args::parse();
    let router = build_router(&args)?;
    info!(cache = %router.config().cache_name, "StepToDeen worker starting");

    match args.command {
        Command::Install => {
            let report = router.on_install().await?;
            println!("Cached {} asset(s)", report.cached.len());
            for url in &report.failed {
                println!("  failed: {}", url);
            }
        }
        Command::Activate => {
            let deleted = router.on_activate().await?;
            if deleted.is_empty() {
                println!("No old caches");
            }
            for name in deleted {
                println!("Deleted {}", name);
            }
        }
        Command::Fetch {
            url,
            method,
            document,
        } => {
            let method: Method = method
                .to_uppercase()
                .parse()
                .with_context(|| format!("Invalid method: {}", method))?;
            let destination = if document {
                Destination::Document
            } else {
                Destination::Other
            };
            let request = Request::new(method, router.resolve(&url)?, destination);
            print_outcome(&request, router.on_fetch(&request).await);
        }
        Command::Sync { tag } => {
            println!("{:?}", router.on_sync(&tag).await);
        }
        Command::Push { payload } => {
            router.on_push(payload.as_deref().map(str::as_bytes)).await?;
        }
        Command::Status => print_status(router.storage())?,
        Command::InitConfig => {
            let path = router.config().save()?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn print_outcome(request: &Request, outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::PassThrough => {
            println!("{} {}: not intercepted", request.method, request.url);
        }
        FetchOutcome::Respond { response, source } => {
            let source = match source {
                ResponseSource::Network => "network",
                ResponseSource::Cache => "cache",
                ResponseSource::AppShell => "app shell",
            };
            println!(
                "{} {}: {} from {} ({} bytes)",
                request.method,
                request.url,
                response.status,
                source,
                response.body.len()
            );
        }
        FetchOutcome::Failed(e) => {
            println!("{} {}: no response ({})", request.method, request.url, e);
        }
    }
}

fn print_status(storage: &impl CacheStorage) -> Result<()> {
    let buckets = storage.keys()?;
    if buckets.is_empty() {
        println!("No caches");
    }
    for bucket in buckets {
        let entries = storage.entries(&bucket)?;
        println!("{} ({} entries)", bucket, entries.len());
        for entry in entries {
            println!(
                "  {} {} [{}]",
                entry.response.status,
                entry.key,
                entry.age_display()
            );
        }
    }
    Ok(())
}
