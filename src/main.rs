// src/main.rs

mod analyzer;
mod cli;
mod currency;
mod error;
mod filter;
mod model;
mod renderer;
mod report;
mod store;
#[cfg(test)]
mod test_utils;

use chrono::NaiveDate;
use clap::Parser;
use cli::{Args, Format};
use currency::CurrencyFormat;
use error::{DashboardError, Result};
use filter::Bounds;
use report::Dashboard;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Instant;
use store::RecordStore;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let start_time = Instant::now();

    let outcome = run(&args);
    info!("Total time: {:.2?}", start_time.elapsed());

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Dashboard run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
/// `DASHBOARD_LOG` takes an env-filter directive and defaults to "info".
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("DASHBOARD_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let currency = CurrencyFormat::new(&args.currency, args.locale)?;

    let load_start = Instant::now();
    let store = store::initialize(&args.source)?;
    info!(
        "Loaded {} records from {} in {:.2?}",
        store.records().len(),
        store.source(),
        load_start.elapsed()
    );

    let bounds = store.bounds()?;
    if let (Some(first), Some(last)) = (store.first_purchase(), store.last_purchase()) {
        info!(
            "Purchases span {} to {}; selectable window is {} to {}",
            first,
            last,
            bounds.min(),
            bounds.max()
        );
    }

    let range = bounds.select(args.start, args.end)?;
    show(store, range, args, &currency)?;

    if args.interactive {
        interact(store, bounds, args, &currency)?;
    }
    Ok(())
}

/// Filters, aggregates and presents one date range
fn show(
    store: &RecordStore,
    range: filter::DateRange,
    args: &Args,
    currency: &CurrencyFormat,
) -> Result<()> {
    let filtered = filter::filter(store.records(), range);
    info!(%range, records = filtered.len(), "Applied date range");

    let dashboard = Dashboard::build(&filtered, range);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Text => dashboard.write_summary(&mut out, currency)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &dashboard)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if let Some(output) = &args.output {
        renderer::render_charts(&dashboard, output, args.width, args.height)?;
    }
    Ok(())
}

/// Re-runs the dashboard for every `START END` line on stdin. A blank line
/// restores the default window; `q` quits.
fn interact(
    store: &RecordStore,
    bounds: Bounds,
    args: &Args,
    currency: &CurrencyFormat,
) -> Result<()> {
    eprintln!(
        "Enter a date range as START END (between {} and {}), blank for default, q to quit",
        bounds.min(),
        bounds.max()
    );

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line == "q" || line == "quit" {
            break;
        }

        let range = if line.is_empty() {
            Ok(bounds.default_range())
        } else {
            parse_range(line).and_then(|(start, end)| bounds.select(Some(start), Some(end)))
        };

        match range {
            Ok(range) => show(store, range, args, currency)?,
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(())
}

fn parse_range(line: &str) -> Result<(NaiveDate, NaiveDate)> {
    let mut parts = line.split_whitespace();
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DashboardError::MalformedRange(line.to_string()));
    };
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| DashboardError::MalformedRange(line.to_string()))
    };
    Ok((parse(start)?, parse(end)?))
}
