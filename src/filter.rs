// src/filter.rs

use crate::error::{DashboardError, Result};
use crate::model::RecordSet;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// How far past the earliest purchase date a user may select
pub const SELECTABLE_DAYS: i64 = 30;

/// An inclusive window of calendar days. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when the instant falls on any day of the window, time of day ignored
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let day = ts.date();
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start(), self.end())
    }
}

/// The dates a user is allowed to pick from, anchored at the earliest
/// purchase and capped at [`SELECTABLE_DAYS`] after it regardless of how far
/// the data actually reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    min: NaiveDate,
    max: NaiveDate,
}

impl Bounds {
    pub fn new(first_purchase: NaiveDateTime) -> Self {
        let min = first_purchase.date();
        Self {
            min,
            max: min + Duration::days(SELECTABLE_DAYS),
        }
    }

    pub fn from_records(records: &RecordSet) -> Option<Self> {
        records.first_purchase().map(Self::new)
    }

    pub fn min(&self) -> NaiveDate {
        self.min
    }

    pub fn max(&self) -> NaiveDate {
        self.max
    }

    pub fn default_range(&self) -> DateRange {
        DateRange {
            start: self.min,
            end: self.max,
        }
    }

    /// Validates a user selection. Missing ends fall back to the default window.
    pub fn select(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DateRange> {
        let start = start.unwrap_or(self.min);
        let end = end.unwrap_or(self.max);
        for date in [start, end] {
            if date < self.min || date > self.max {
                return Err(DashboardError::OutOfBounds {
                    date,
                    min: self.min,
                    max: self.max,
                });
            }
        }
        DateRange::new(start, end)
    }
}

/// Keeps the records purchased within `range`, preserving their order.
///
/// Records without a purchase timestamp are never in range.
pub fn filter(records: &RecordSet, range: DateRange) -> RecordSet {
    let selected = records
        .iter()
        .filter(|r| r.order_purchase_timestamp.is_some_and(|ts| range.contains(ts)))
        .cloned()
        .collect();
    RecordSet::from_sorted(selected)
}
