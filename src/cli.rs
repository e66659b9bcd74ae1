// src/cli.rs

use crate::currency::Locale;
use crate::store::{Source, DEFAULT_SOURCE};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Largest chart side accepted, in pixels
pub const MAX_CHART_SIDE: i64 = 16_384;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// URL or local path of the order-item CSV
    #[arg(short, long, env = "DASHBOARD_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: Source,

    /// First day of the reporting window (defaults to the earliest purchase date)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the reporting window (defaults to 30 days after the earliest purchase)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Directory to save the chart PNGs. Nothing is rendered without it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Width of the charts in pixels
    #[arg(long, default_value_t = 1280, value_parser = clap::value_parser!(u32).range(1..=MAX_CHART_SIDE))]
    pub width: u32,

    /// Height of the charts in pixels
    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u32).range(1..=MAX_CHART_SIDE))]
    pub height: u32,

    /// ISO 4217 code printed with revenue figures
    #[arg(long, env = "DASHBOARD_CURRENCY", default_value = "BRL")]
    pub currency: String,

    /// Number layout for revenue figures
    #[arg(long, value_enum, env = "DASHBOARD_LOCALE", default_value_t = Locale::PtBr)]
    pub locale: Locale,

    /// Summary format written to stdout
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Keep reading `START END` date pairs from stdin and redraw for each
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable report
    Text,
    /// The full dashboard as pretty-printed JSON
    Json,
}
