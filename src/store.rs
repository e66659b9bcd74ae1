// src/store.rs

use crate::error::{DashboardError, Result};
use crate::filter::Bounds;
use crate::model::{Record, RecordSet};
use chrono::{NaiveDate, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::convert::Infallible;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Public copy of the order-item dataset the dashboard was built around
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/Rafaellsimarmata/Ecommerce-Data-Analytics/refs/heads/main/dashboard/all_df.csv";

const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

static STORE: OnceLock<RecordStore> = OnceLock::new();

/// Where the order-item CSV comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

impl FromStr for Source {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Source::Remote(s.to_string()))
        } else {
            Ok(Source::Local(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => f.write_str(url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The immutable, process-wide record set
#[derive(Debug)]
pub struct RecordStore {
    source: Source,
    records: RecordSet,
}

impl RecordStore {
    pub fn new(source: Source, records: RecordSet) -> Self {
        Self { source, records }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn first_purchase(&self) -> Option<NaiveDateTime> {
        self.records.first_purchase()
    }

    pub fn last_purchase(&self) -> Option<NaiveDateTime> {
        self.records.last_purchase()
    }

    /// The window a user may pick dates from
    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::from_records(&self.records).ok_or(DashboardError::EmptyDataset)
    }
}

/// Loads the record set once and hands out the shared handle.
///
/// Later calls return the already loaded store, whatever `source` they pass.
pub fn initialize(source: &Source) -> Result<&'static RecordStore> {
    if let Some(store) = STORE.get() {
        debug!(source = %store.source(), "Record store already initialized");
        return Ok(store);
    }

    let records = load(source)?;
    Ok(STORE.get_or_init(|| RecordStore::new(source.clone(), records)))
}

/// Fetches and parses the whole dataset, sorted by purchase time
pub fn load(source: &Source) -> Result<RecordSet> {
    let body = fetch(source)?;
    parse(body.as_bytes())
}

fn fetch(source: &Source) -> Result<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Fetching {source}"));

    let body = match source {
        Source::Remote(url) => fetch_remote(url),
        // Decoded lossily like the remote body, so a stray Latin-1 byte only
        // mangles its own field.
        Source::Local(path) => fs::read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|e| DashboardError::Read {
                path: path.clone(),
                source: e,
            }),
    };

    match &body {
        Ok(text) => spinner.finish_with_message(format!("Fetched {} bytes", text.len())),
        Err(_) => spinner.abandon_with_message(format!("Failed to fetch {source}")),
    }
    body
}

fn fetch_remote(url: &str) -> Result<String> {
    let wrap = |e: reqwest::Error| DashboardError::Fetch {
        url: url.to_string(),
        source: e,
    };

    // No timeout: the dashboard cannot do anything useful before the data arrives.
    let client = reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .build()
        .map_err(wrap)?;
    let response = client.get(url).send().map_err(wrap)?;

    let status = response.status();
    if !status.is_success() {
        return Err(DashboardError::SourceUnavailable {
            location: url.to_string(),
            status: status.as_u16(),
        });
    }

    info!(%url, %status, "Fetched dataset");
    response.text().map_err(wrap)
}

/// The CSV columns the dashboard reads. Anything else in the file is ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    order_id: String,
    #[serde(default)]
    order_purchase_timestamp: Option<String>,
    #[serde(default)]
    order_approved_at: Option<String>,
    #[serde(default)]
    order_delivered_carrier_date: Option<String>,
    #[serde(default)]
    order_delivered_customer_date: Option<String>,
    #[serde(default)]
    order_estimated_delivery_date: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    product_category_name: Option<String>,
    #[serde(default)]
    customer_city: Option<String>,
    #[serde(default)]
    customer_unique_id: Option<String>,
    #[serde(default)]
    geolocation_lat: Option<String>,
    #[serde(default)]
    geolocation_lng: Option<String>,
}

/// Turns raw text fields into typed values, counting the ones that had
/// content but could not be parsed.
#[derive(Debug, Default)]
struct Normalizer {
    degenerate: usize,
}

impl Normalizer {
    fn record(&mut self, raw: RawRecord) -> Record {
        Record {
            order_id: raw.order_id,
            order_purchase_timestamp: self.timestamp(raw.order_purchase_timestamp),
            order_approved_at: self.timestamp(raw.order_approved_at),
            order_delivered_carrier_date: self.timestamp(raw.order_delivered_carrier_date),
            order_delivered_customer_date: self.timestamp(raw.order_delivered_customer_date),
            order_estimated_delivery_date: self.timestamp(raw.order_estimated_delivery_date),
            price: self.decimal(raw.price),
            product_category_name: text(raw.product_category_name),
            customer_city: text(raw.customer_city),
            customer_unique_id: raw.customer_unique_id.unwrap_or_default(),
            geolocation_lat: self.decimal(raw.geolocation_lat),
            geolocation_lng: self.decimal(raw.geolocation_lng),
        }
    }

    fn timestamp(&mut self, raw: Option<String>) -> Option<NaiveDateTime> {
        let raw = text(raw)?;
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            self.degenerate += 1;
        }
        parsed
    }

    fn decimal(&mut self, raw: Option<String>) -> Option<f64> {
        let raw = text(raw)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                self.degenerate += 1;
                None
            }
        }
    }
}

fn text(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Parses the timestamp layouts found in exported order data. A bare date
/// means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses order-item CSV into a sorted record set.
///
/// Rows that cannot be deserialized at all are skipped; single fields that
/// fail to parse become null.
pub fn parse<R: Read>(reader: R) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for required in ["order_id", "order_purchase_timestamp"] {
        if !headers.iter().any(|h| h == required) {
            return Err(DashboardError::MissingColumn(required));
        }
    }

    let bar = ProgressBar::new_spinner();
    bar.set_message("Parsing records");

    let mut normalizer = Normalizer::default();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (i, row) in reader.deserialize::<RawRecord>().enumerate() {
        match row {
            Ok(raw) => records.push(normalizer.record(raw)),
            Err(e) => {
                // Header is line 1
                warn!(line = i + 2, error = %e, "Skipping unreadable row");
                skipped += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_with_message(format!("Parsed {} records", records.len()));

    if normalizer.degenerate > 0 {
        warn!(
            fields = normalizer.degenerate,
            "Substituted null for fields that failed to parse"
        );
    }

    let set = RecordSet::from_records(records);
    info!(
        records = set.len(),
        skipped,
        first = ?set.first_purchase(),
        last = ?set.last_purchase(),
        "Loaded record set"
    );
    Ok(set)
}
