// src/test_utils.rs

use crate::model::Record;
use chrono::{NaiveDate, NaiveDateTime};

/// Order items spanning a few days in early 2017, with some broken fields
pub const ORDER_ITEMS_CSV: &str = include_str!("../tests/fixtures/order_items.csv");

pub fn timestamp(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// A dated order item with a price and nothing else
pub fn record(order_id: &str, purchased: &str, price: f64) -> Record {
    Record {
        order_id: order_id.to_string(),
        order_purchase_timestamp: Some(timestamp(purchased)),
        price: Some(price),
        customer_unique_id: format!("customer-{order_id}"),
        ..Record::default()
    }
}

pub fn with_category(mut record: Record, category: &str) -> Record {
    record.product_category_name = Some(category.to_string());
    record
}

pub fn with_city(mut record: Record, city: &str) -> Record {
    record.customer_city = Some(city.to_string());
    record
}

pub fn with_location(mut record: Record, lat: f64, lng: f64) -> Record {
    record.geolocation_lat = Some(lat);
    record.geolocation_lng = Some(lng);
    record
}
