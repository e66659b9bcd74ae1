// src/report.rs

use crate::analyzer;
use crate::currency::CurrencyFormat;
use crate::filter::DateRange;
use crate::model::*;
use serde::Serialize;
use std::io::{self, Write};

/// How many categories each end of the category ranking shows
pub const CATEGORY_SLICE: usize = 5;

/// Everything the dashboard shows for one date range
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub range: DateRange,
    pub records: usize,
    pub total_orders: usize,
    pub total_revenue: f64,
    pub daily_orders: Vec<DailyAggregate>,
    pub categories: Vec<CategoryAggregate>,
    pub top_cities: Vec<CityAggregate>,
    pub locations: Vec<GeoPoint>,
}

impl Dashboard {
    /// Runs every aggregation over an already filtered record set
    pub fn build(filtered: &RecordSet, range: DateRange) -> Self {
        let daily_orders = analyzer::daily_orders(filtered);
        let total_orders = daily_orders.iter().map(|d| d.order_count).sum();
        let total_revenue = daily_orders.iter().map(|d| d.revenue).sum();

        Self {
            range,
            records: filtered.len(),
            total_orders,
            total_revenue,
            daily_orders,
            categories: analyzer::category_volume(filtered),
            top_cities: analyzer::top_cities(filtered),
            locations: analyzer::customer_locations(filtered),
        }
    }

    pub fn best_categories(&self) -> &[CategoryAggregate] {
        analyzer::head(&self.categories, CATEGORY_SLICE)
    }

    pub fn worst_categories(&self) -> &[CategoryAggregate] {
        analyzer::tail(&self.categories, CATEGORY_SLICE)
    }

    pub fn write_summary<W: Write>(&self, mut out: W, currency: &CurrencyFormat) -> io::Result<()> {
        writeln!(out, "E-commerce Public Dashboard")?;
        writeln!(
            out,
            "Range: {} ({} days, {} order items)",
            self.range,
            self.range.days(),
            self.records
        )?;
        writeln!(out)?;

        writeln!(out, "Daily Orders")?;
        writeln!(out, "  Total orders:  {}", self.total_orders)?;
        writeln!(out, "  Total revenue: {}", currency.format(self.total_revenue))?;
        for day in &self.daily_orders {
            writeln!(
                out,
                "  {}  {:>5} orders  {}",
                day.date,
                day.order_count,
                currency.format(day.revenue)
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Best Performing Product Categories")?;
        write_ranking(
            &mut out,
            self.best_categories()
                .iter()
                .map(|c| (c.product_category_name.as_str(), c.count)),
        )?;
        writeln!(out, "Worst Performing Product Categories")?;
        write_ranking(
            &mut out,
            self.worst_categories()
                .iter()
                .map(|c| (c.product_category_name.as_str(), c.count)),
        )?;
        writeln!(out)?;

        writeln!(out, "Top {} Cities by Order Volume", analyzer::TOP_CITIES)?;
        write_ranking(
            &mut out,
            self.top_cities
                .iter()
                .map(|c| (c.customer_city.as_str(), c.count)),
        )?;
        writeln!(out)?;

        writeln!(out, "Customer Order Locations: {} points", self.locations.len())?;
        Ok(())
    }
}

fn write_ranking<'a, W: Write>(
    out: &mut W,
    entries: impl Iterator<Item = (&'a str, usize)>,
) -> io::Result<()> {
    let mut empty = true;
    for (name, count) in entries {
        writeln!(out, "  {count:>6}  {name}")?;
        empty = false;
    }
    if empty {
        writeln!(out, "  (none)")?;
    }
    Ok(())
}
