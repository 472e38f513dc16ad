//! Runsheet - delivery route schedule generator
//!
//! Parses a stop list, asks the routing provider for drive times (and
//! optionally an optimized visiting order), builds the timed schedule, and
//! exports it as CSV.

mod cli;
mod config;
mod defaults;
mod services;
mod types;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::Config;
use services::estimator::DriveTimeEstimator;
use services::export;
use services::optimizer::{apply_order, StopOrderOptimizer};
use services::routing::{create_directions_provider, DirectionsError};
use services::schedule::build_schedule;
use types::{MalformedLinePolicy, RouteContext};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional persistent logs (daily rotation) next to the terminal output;
    // logs go to stderr so the schedule table stays clean on stdout.
    let (file_layer, _guard) = match std::env::var("LOGS_DIR") {
        Ok(dir) => {
            std::fs::create_dir_all(&dir).ok();
            let file_appender = RollingFileAppender::new(Rotation::DAILY, &dir, "runsheet.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                ),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,runsheet=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Depots => {
            for (name, address) in defaults::known_depots() {
                println!("{name:<10} {address}");
            }
            Ok(())
        }
        Command::Generate {
            route,
            departure,
            depot,
            stops,
            optimize,
            strict,
            output,
        } => {
            generate(route, departure, depot, stops, optimize, strict, output).await
        }
    }
}

async fn generate(
    route: String,
    departure: String,
    depot: String,
    stops_source: String,
    optimize: bool,
    strict: bool,
    output: Option<String>,
) -> Result<()> {
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let provider = create_directions_provider(&config);

    let ctx = RouteContext {
        route_name: route,
        departure: cli::parse_departure(&departure)?,
        depot_address: defaults::resolve_depot(&depot),
    };

    let input = read_stop_input(&stops_source)?;
    let policy = if strict {
        MalformedLinePolicy::Reject
    } else {
        MalformedLinePolicy::Skip
    };
    let parsed = types::parse_stop_list(&input, policy)?;
    info!("Parsed {} stops for route {}", parsed.len(), ctx.route_name);

    let ordered = if optimize {
        let addresses: Vec<String> = parsed.iter().map(|s| s.address.clone()).collect();
        let optimizer = StopOrderOptimizer::new(Arc::clone(&provider));

        match optimizer.optimize(&ctx.depot_address, &addresses).await {
            Ok(order) => apply_order(&parsed, &order),
            Err(DirectionsError::OptimizationUnsupported { backend }) => {
                warn!("{} backend cannot optimize stop order; keeping input order", backend);
                parsed
            }
            Err(e) => return Err(e).context("Waypoint optimization failed"),
        }
    } else {
        parsed
    };

    let estimator = DriveTimeEstimator::new(Arc::clone(&provider), config.buffer);
    let rows = build_schedule(&ctx, &ordered, &estimator, &config.schedule)
        .await
        .context("Schedule generation failed")?;
    info!("Generated {} schedule rows", rows.len());

    print!("{}", export::render_table(&rows));

    let out_path = output.unwrap_or_else(|| export::default_filename(&ctx.route_name));
    std::fs::write(&out_path, export::schedule_to_csv(&rows)?)
        .with_context(|| format!("Failed to write {out_path}"))?;
    info!("Schedule written to {}", out_path);

    Ok(())
}

fn read_stop_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stops from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read stop list from {source}"))
    }
}
