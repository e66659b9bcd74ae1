// src/analyzer.rs

use crate::model::*;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};

/// How many cities the city ranking keeps
pub const TOP_CITIES: usize = 10;

/// Orders and revenue per purchase day, ascending by day.
///
/// Days without records are absent rather than zero-filled.
pub fn daily_orders(records: &RecordSet) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, (HashSet<&str>, f64)> = BTreeMap::new();

    for record in records {
        let Some(date) = record.purchase_date() else {
            continue;
        };
        let (orders, revenue) = days.entry(date).or_default();
        orders.insert(record.order_id.as_str());
        *revenue += record.price.unwrap_or(0.0);
    }

    days.into_iter()
        .map(|(date, (orders, revenue))| DailyAggregate {
            date,
            order_count: orders.len(),
            revenue,
        })
        .collect()
}

/// Item counts per product category, most popular first. Rows without a
/// category are left out.
pub fn category_volume(records: &RecordSet) -> Vec<CategoryAggregate> {
    rank(records.iter().filter_map(|r| r.product_category_name.as_deref()))
        .into_iter()
        .map(|(name, count)| CategoryAggregate {
            product_category_name: name.to_string(),
            count,
        })
        .collect()
}

/// The [`TOP_CITIES`] customer cities with the most order items
pub fn top_cities(records: &RecordSet) -> Vec<CityAggregate> {
    rank(records.iter().filter_map(|r| r.customer_city.as_deref()))
        .into_iter()
        .take(TOP_CITIES)
        .map(|(city, count)| CityAggregate {
            customer_city: city.to_string(),
            count,
        })
        .collect()
}

/// One point per record with both coordinates, in input order
pub fn customer_locations(records: &RecordSet) -> Vec<GeoPoint> {
    records
        .iter()
        .filter_map(|r| {
            Some(GeoPoint {
                customer_unique_id: r.customer_unique_id.clone(),
                latitude: r.geolocation_lat?,
                longitude: r.geolocation_lng?,
            })
        })
        .collect()
}

/// Counts occurrences of each key and sorts by count, descending.
/// Equal counts keep the order in which their keys first appeared.
fn rank<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The `n` leading entries of a ranking
pub fn head<T>(ranking: &[T], n: usize) -> &[T] {
    &ranking[..n.min(ranking.len())]
}

/// The `n` trailing entries of a ranking, still in ranking order
pub fn tail<T>(ranking: &[T], n: usize) -> &[T] {
    &ranking[ranking.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_daily_orders_example() {
        let set = RecordSet::from_records(vec![
            record("1", "2024-01-01 09:00:00", 10.0),
            record("1", "2024-01-01 09:00:00", 5.0),
            record("2", "2024-01-02 14:30:00", 20.0),
        ]);

        assert_eq!(
            daily_orders(&set),
            vec![
                DailyAggregate {
                    date: date("2024-01-01"),
                    order_count: 1,
                    revenue: 15.0,
                },
                DailyAggregate {
                    date: date("2024-01-02"),
                    order_count: 1,
                    revenue: 20.0,
                },
            ]
        );
    }

    #[test]
    fn test_daily_orders_skips_empty_days_and_null_prices() {
        let mut no_price = record("3", "2024-01-05 10:00:00", 0.0);
        no_price.price = None;
        let set = RecordSet::from_records(vec![
            record("1", "2024-01-01 09:00:00", 10.0),
            record("2", "2024-01-05 08:00:00", 7.5),
            no_price,
        ]);

        let daily = daily_orders(&set);
        let dates: Vec<NaiveDate> = daily.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-05")]);
        assert_eq!(daily[1].order_count, 2);
        assert_eq!(daily[1].revenue, 7.5);
    }

    #[test]
    fn test_daily_totals_match_input() {
        let set = RecordSet::from_records(vec![
            record("a", "2024-03-01 01:00:00", 12.25),
            record("a", "2024-03-01 01:00:00", 3.10),
            record("b", "2024-03-01 22:00:00", 99.99),
            record("c", "2024-03-02 00:00:00", 0.01),
            record("d", "2024-03-04 12:00:00", 45.0),
            record("d", "2024-03-04 12:00:00", 45.0),
        ]);

        let daily = daily_orders(&set);
        let orders: usize = daily.iter().map(|d| d.order_count).sum();
        let distinct: HashSet<&str> = set.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(orders, distinct.len());

        let revenue: f64 = daily.iter().map(|d| d.revenue).sum();
        let prices: f64 = set.iter().filter_map(|r| r.price).sum();
        assert!((revenue - prices).abs() < 1e-9);
    }

    #[test]
    fn test_category_volume_example() {
        let set = RecordSet::from_records(
            ["A", "B", "A", "C", "B", "A"]
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    with_category(record(&i.to_string(), "2024-01-01 10:00:00", 1.0), c)
                })
                .collect(),
        );

        let names: Vec<(String, usize)> = category_volume(&set)
            .into_iter()
            .map(|c| (c.product_category_name, c.count))
            .collect();
        assert_eq!(
            names,
            vec![("A".into(), 3), ("B".into(), 2), ("C".into(), 1)]
        );
    }

    #[test]
    fn test_category_ties_rank_earliest_first() {
        let set = RecordSet::from_records(vec![
            with_category(record("1", "2024-01-01 10:00:00", 1.0), "late"),
            with_category(record("2", "2024-01-01 08:00:00", 1.0), "early"),
            record("3", "2024-01-01 09:00:00", 1.0),
        ]);

        let names: Vec<String> = category_volume(&set)
            .into_iter()
            .map(|c| c.product_category_name)
            .collect();
        // Uncategorized rows are excluded rather than bucketed
        assert_eq!(names, vec!["early".to_string(), "late".to_string()]);
    }

    #[test]
    fn test_top_cities_truncates_to_ten() {
        let mut records = Vec::new();
        for i in 0..12 {
            for _ in 0..=i {
                records.push(with_city(
                    record(&format!("{i}"), "2024-01-01 10:00:00", 1.0),
                    &format!("city-{i}"),
                ));
            }
        }
        let cities = top_cities(&RecordSet::from_records(records));

        assert_eq!(cities.len(), TOP_CITIES);
        assert_eq!(cities[0].customer_city, "city-11");
        assert_eq!(cities[0].count, 12);
        assert_eq!(cities[9].customer_city, "city-2");
        assert!(cities.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_top_cities_tie_at_cutoff_keeps_earliest() {
        let mut records = Vec::new();
        for i in 0..9 {
            for _ in 0..3 {
                records.push(with_city(
                    record(&format!("{i}"), "2024-01-01 08:00:00", 1.0),
                    &format!("city-{i}"),
                ));
            }
        }
        records.push(with_city(record("a", "2024-01-01 09:00:00", 1.0), "earlier"));
        records.push(with_city(record("b", "2024-01-01 10:00:00", 1.0), "later"));

        let cities = top_cities(&RecordSet::from_records(records));
        assert_eq!(cities.len(), TOP_CITIES);
        assert_eq!(cities[9].customer_city, "earlier");
        assert!(cities.iter().all(|c| c.customer_city != "later"));
    }

    #[test]
    fn test_top_cities_never_pads() {
        let set = RecordSet::from_records(vec![
            with_city(record("1", "2024-01-01 10:00:00", 1.0), "recife"),
            with_city(record("2", "2024-01-01 11:00:00", 1.0), "natal"),
            with_city(record("3", "2024-01-01 12:00:00", 1.0), "recife"),
        ]);

        let cities = top_cities(&set);
        assert_eq!(
            cities,
            vec![
                CityAggregate {
                    customer_city: "recife".into(),
                    count: 2
                },
                CityAggregate {
                    customer_city: "natal".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_customer_locations_keep_duplicates_and_drop_nulls() {
        let mut half = record("3", "2024-01-01 12:00:00", 1.0);
        half.geolocation_lat = Some(-10.0);
        let set = RecordSet::from_records(vec![
            with_location(record("1", "2024-01-01 10:00:00", 1.0), -23.5, -46.6),
            with_location(record("1", "2024-01-01 10:00:00", 1.0), -23.5, -46.6),
            half,
            with_location(record("4", "2024-01-01 13:00:00", 1.0), 95.0, 200.0),
        ]);

        let points = customer_locations(&set);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], points[1]);
        assert_eq!(points[0].customer_unique_id, "customer-1");
        // Out-of-range coordinates pass through untouched
        assert_eq!(points[2].latitude, 95.0);
    }

    #[test]
    fn test_empty_input_gives_empty_aggregates() {
        let empty = RecordSet::default();
        assert!(daily_orders(&empty).is_empty());
        assert!(category_volume(&empty).is_empty());
        assert!(top_cities(&empty).is_empty());
        assert!(customer_locations(&empty).is_empty());
    }

    #[test]
    fn test_head_and_tail() {
        let ranking = [5, 4, 3, 2, 1, 0, -1];
        assert_eq!(head(&ranking, 5), &[5, 4, 3, 2, 1]);
        assert_eq!(tail(&ranking, 5), &[3, 2, 1, 0, -1]);
        assert_eq!(head(&ranking[..2], 5), &[5, 4]);
        assert_eq!(tail(&ranking[..2], 5), &[5, 4]);
        assert!(tail::<i32>(&[], 5).is_empty());
    }
}
