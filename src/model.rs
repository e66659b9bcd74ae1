// src/model.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One order-item row of the transaction dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Shared by every item row of the same order
    pub order_id: String,
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    pub order_approved_at: Option<NaiveDateTime>,
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
    pub price: Option<f64>,
    pub product_category_name: Option<String>,
    pub customer_city: Option<String>,
    pub customer_unique_id: String,
    pub geolocation_lat: Option<f64>,
    pub geolocation_lng: Option<f64>,
}

impl Record {
    /// The calendar day the order was placed on
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        self.order_purchase_timestamp.map(|ts| ts.date())
    }
}

/// Records ordered ascending by purchase timestamp.
///
/// Rows without a purchase timestamp sort after every dated row, keeping their
/// relative input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| {
            match (a.order_purchase_timestamp, b.order_purchase_timestamp) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        Self { records }
    }

    /// Wraps records that are already in purchase order, e.g. a subsequence
    /// of another set.
    pub(crate) fn from_sorted(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest purchase timestamp in the set
    pub fn first_purchase(&self) -> Option<NaiveDateTime> {
        self.records.first().and_then(|r| r.order_purchase_timestamp)
    }

    /// Latest purchase timestamp in the set
    pub fn last_purchase(&self) -> Option<NaiveDateTime> {
        self.records
            .iter()
            .rev()
            .find_map(|r| r.order_purchase_timestamp)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Orders and revenue of a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    /// Distinct orders placed that day
    pub order_count: usize,
    /// Item-level price sum, unrounded
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAggregate {
    pub product_category_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityAggregate {
    pub customer_city: String,
    pub count: usize,
}

/// Where a customer was when ordering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub customer_unique_id: String,
    pub latitude: f64,
    pub longitude: f64,
}
