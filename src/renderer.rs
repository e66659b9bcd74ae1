// src/renderer.rs

use crate::error::{DashboardError, Result};
use crate::model::*;
use crate::report::Dashboard;
use image::{Rgb, RgbImage};
use palette::{FromColor, Lch, LinSrgb, Srgb};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const PLOT_AREA: Rgb<u8> = Rgb([234, 234, 242]);
const GRID: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 70]);
const MAP_BACKGROUND: Rgb<u8> = Rgb([8, 8, 12]);

const LINE: Rgb<u8> = Rgb([0x90, 0xCA, 0xF9]);
const HIGHLIGHT: Rgb<u8> = Rgb([0x67, 0xEB, 0x34]);
const MUTED: Rgb<u8> = Rgb([0xD3, 0xD3, 0xD3]);

const GRID_LINES: u32 = 5;

/// Renders every chart of the dashboard into `output` and returns the written paths
pub fn render_charts(
    dashboard: &Dashboard,
    output: &Path,
    width: u32,
    height: u32,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output)?;

    let charts = [
        ("daily_orders.png", render_daily_orders(&dashboard.daily_orders, width, height)),
        (
            "categories.png",
            render_categories(
                dashboard.best_categories(),
                dashboard.worst_categories(),
                width,
                height,
            ),
        ),
        ("top_cities.png", render_cities(&dashboard.top_cities, width, height)),
        (
            "customer_locations.png",
            render_locations(&dashboard.locations, width, height),
        ),
    ];

    let mut written = Vec::with_capacity(charts.len());
    for (name, image) in charts {
        let path = output.join(name);
        image.save(&path).map_err(|e| DashboardError::Render {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "Wrote chart");
        written.push(path);
    }

    info!(count = written.len(), dir = %output.display(), "Rendered charts");
    Ok(written)
}

/// The plotting rectangle inside an image, in pixels
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl Frame {
    fn inset(x0: u32, width: u32, height: u32) -> Self {
        let margin_x = (width / 12).max(2) as i64;
        let margin_y = (height / 10).max(2) as i64;
        Self {
            left: x0 as i64 + margin_x,
            top: margin_y,
            right: x0 as i64 + width as i64 - margin_x,
            bottom: height as i64 - margin_y,
        }
    }

    fn width(&self) -> i64 {
        (self.right - self.left).max(1)
    }

    fn height(&self) -> i64 {
        (self.bottom - self.top).max(1)
    }

    /// Plot area, horizontal gridlines and the two axes
    fn draw(&self, image: &mut RgbImage) {
        fill_rect(image, self.left, self.top, self.right, self.bottom, PLOT_AREA);
        for i in 1..GRID_LINES {
            let y = self.bottom - self.height() * i as i64 / GRID_LINES as i64;
            fill_rect(image, self.left, y, self.right, y + 1, GRID);
        }
        fill_rect(image, self.left - 2, self.top, self.left, self.bottom, AXIS);
        fill_rect(image, self.left - 2, self.bottom, self.right, self.bottom + 2, AXIS);
    }
}

fn canvas(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width.max(1), height.max(1), color)
}

/// Line chart of orders per day, with a marker on every day that has orders
fn render_daily_orders(daily: &[DailyAggregate], width: u32, height: u32) -> RgbImage {
    let mut image = canvas(width, height, BACKGROUND);
    let frame = Frame::inset(0, width, height);
    frame.draw(&mut image);

    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return image;
    };
    let span = (last.date - first.date).num_days();
    let max_orders = daily.iter().map(|d| d.order_count).max().unwrap_or(1).max(1) as i64;

    let points: Vec<(i64, i64)> = daily
        .iter()
        .map(|day| {
            let x = if span == 0 {
                frame.left + frame.width() / 2
            } else {
                frame.left + frame.width() * (day.date - first.date).num_days() / span
            };
            let y = frame.bottom - frame.height() * day.order_count as i64 / max_orders;
            (x, y)
        })
        .collect();

    for pair in points.windows(2) {
        draw_line(&mut image, pair[0], pair[1], 2, LINE);
    }
    for &(x, y) in &points {
        fill_circle(&mut image, x, y, 5, LINE);
    }
    image
}

/// Best categories on the left, worst on the right with the value axis flipped
fn render_categories(
    best: &[CategoryAggregate],
    worst: &[CategoryAggregate],
    width: u32,
    height: u32,
) -> RgbImage {
    let mut image = canvas(width, height, BACKGROUND);
    let half = width / 2;
    let panels = [
        (Frame::inset(0, half, height), best, false),
        (Frame::inset(half, width - half, height), worst, true),
    ];

    for (frame, categories, inverted) in panels {
        frame.draw(&mut image);
        if categories.is_empty() {
            continue;
        }

        let max = categories.iter().map(|c| c.count).max().unwrap_or(1).max(1) as i64;
        let slot = frame.height() / crate::report::CATEGORY_SLICE as i64;
        let thickness = (slot * 7 / 10).max(1);

        for (i, category) in categories.iter().enumerate() {
            let length = frame.width() * category.count as i64 / max;
            let top = frame.top + slot * i as i64 + (slot - thickness) / 2;
            let color = if i == 0 { HIGHLIGHT } else { MUTED };
            if inverted {
                fill_rect(&mut image, frame.right - length, top, frame.right, top + thickness, color);
            } else {
                fill_rect(&mut image, frame.left, top, frame.left + length, top + thickness, color);
            }
        }
    }
    image
}

/// Vertical bars for the city ranking, darker for higher ranks
fn render_cities(cities: &[CityAggregate], width: u32, height: u32) -> RgbImage {
    let mut image = canvas(width, height, BACKGROUND);
    let frame = Frame::inset(0, width, height);
    frame.draw(&mut image);

    if cities.is_empty() {
        return image;
    }

    let colors = rank_colors(cities.len());
    let max = cities.iter().map(|c| c.count).max().unwrap_or(1).max(1) as i64;
    let slot = frame.width() / crate::analyzer::TOP_CITIES as i64;
    let thickness = (slot * 7 / 10).max(1);

    for (i, city) in cities.iter().enumerate() {
        let left = frame.left + slot * i as i64 + (slot - thickness) / 2;
        let length = frame.height() * city.count as i64 / max;
        fill_rect(&mut image, left, frame.bottom - length, left + thickness, frame.bottom, colors[i]);
    }
    image
}

/// Equirectangular scatter of customer locations, colored by how many points
/// land on each pixel
fn render_locations(points: &[GeoPoint], width: u32, height: u32) -> RgbImage {
    let mut image = canvas(width, height, MAP_BACKGROUND);
    if points.is_empty() {
        return image;
    }

    let frame = Frame::inset(0, width, height);
    let (mut min_lng, mut max_lng) = (f64::MAX, f64::MIN);
    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    for p in points {
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
    }
    // A single location still needs a non-degenerate box
    let pad_lng = ((max_lng - min_lng) * 0.05).max(0.5);
    let pad_lat = ((max_lat - min_lat) * 0.05).max(0.5);
    let (min_lng, max_lng) = (min_lng - pad_lng, max_lng + pad_lng);
    let (min_lat, max_lat) = (min_lat - pad_lat, max_lat + pad_lat);

    let (w, h) = image.dimensions();
    let mut hits = vec![0usize; w as usize * h as usize];
    for p in points {
        let x = frame.left + ((p.longitude - min_lng) / (max_lng - min_lng) * frame.width() as f64) as i64;
        let y = frame.bottom - ((p.latitude - min_lat) / (max_lat - min_lat) * frame.height() as f64) as i64;
        for (px, py) in disc(x, y, 2) {
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                hits[py as usize * w as usize + px as usize] += 1;
            }
        }
    }

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let heat = hits[y as usize * w as usize + x as usize];
        if heat > 0 {
            *pixel = heat_to_color(heat);
        }
    }
    image
}

fn fill_rect(image: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    let (w, h) = image.dimensions();
    let (x0, x1) = (x0.min(x1).max(0), x0.max(x1).min(w as i64));
    let (y0, y1) = (y0.min(y1).max(0), y0.max(y1).min(h as i64));
    for y in y0..y1 {
        for x in x0..x1 {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn disc(cx: i64, cy: i64, radius: i64) -> impl Iterator<Item = (i64, i64)> {
    (-radius..=radius).flat_map(move |dy| {
        (-radius..=radius)
            .filter(move |dx| dx * dx + dy * dy <= radius * radius)
            .map(move |dx| (cx + dx, cy + dy))
    })
}

fn fill_circle(image: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    let (w, h) = image.dimensions();
    for (x, y) in disc(cx, cy, radius) {
        if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Bresenham, stamping a disc at every step for thickness
fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), thickness: i64, color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fill_circle(image, x, y, thickness / 2, color);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// One shade per rank, from dark to light blue
fn rank_colors(count: usize) -> Vec<Rgb<u8>> {
    (0..count)
        .map(|i| {
            let t = if count > 1 { i as f32 / (count - 1) as f32 } else { 0.0 };
            lch_to_rgb(Lch::new(35.0 + 40.0 * t, 55.0 - 20.0 * t, 255.0))
        })
        .collect()
}

fn lch_to_rgb(color: Lch) -> Rgb<u8> {
    let srgb: Srgb<f32> = Srgb::from_color(color);
    let (r, g, b) = srgb.into_components();
    Rgb([channel(r), channel(g), channel(b)])
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

// Blue-to-orange gradient for point density
fn heat_to_color(heat: usize) -> Rgb<u8> {
    let lch_colors = [
        Lch::new(40.0f32, 40.0f32, 260.0f32), // Blue
        Lch::new(60.0f32, 45.0f32, 230.0f32), // Light Blue
        Lch::new(95.0f32, 35.0f32, 90.0f32),  // Light Yellow
        Lch::new(75.0f32, 80.0f32, 50.0f32),  // Orange
        Lch::new(65.0f32, 100.0f32, 30.0f32), // Red-Orange
    ];
    let gradient_stops: Vec<LinSrgb<f32>> = lch_colors.into_iter().map(LinSrgb::from_color).collect();

    // Saturates at ten overlapping points
    let heat_float = ((heat.saturating_sub(1)) as f32 / 9.0f32).min(1.0f32);
    let scaled_pos = heat_float * (gradient_stops.len() - 1) as f32;

    let idx1 = scaled_pos.floor() as usize;
    let idx2 = (idx1 + 1).min(gradient_stops.len() - 1);
    let t = scaled_pos.fract();

    let c1 = gradient_stops[idx1];
    let c2 = gradient_stops[idx2];
    let mixed = LinSrgb::new(
        c1.red + (c2.red - c1.red) * t,
        c1.green + (c2.green - c1.green) * t,
        c1.blue + (c2.blue - c1.blue) * t,
    );

    let (r, g, b) = Srgb::from_linear(mixed).into_components();
    Rgb([channel(r), channel(g), channel(b)])
}
