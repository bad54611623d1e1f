//! Choropleth rasterization.
//!
//! Projects all municipal boundaries to Web Mercator, then fills one RGBA
//! frame pixel-by-pixel: each pixel center is inverse-projected, matched
//! against an R-tree of area bounding boxes and shaded on a sequential red
//! ramp by the area's incident count. Rows render in parallel.

use crate::types::MapArea;
use anyhow::{Context, Result};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::Point;
use image::{ImageBuffer, Rgba, RgbaImage};
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use std::f64::consts::PI;
use std::path::Path;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);
/// Fraction of the projected extent left as margin around the state.
const MARGIN: f64 = 0.02;
const MAX_HEIGHT: u32 = 4096;

// Wrapper for RTree indexing, lon/lat space
struct AreaIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for AreaIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct Choropleth {
    pub image: RgbaImage,
    pub max_count: u64,
}

pub fn render_choropleth(areas: &[MapArea], width: u32) -> Option<Choropleth> {
    if areas.is_empty() || width == 0 {
        return None;
    }

    // Geographic extent over every area that has a bounding box.
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;

    let tree_items: Vec<AreaIndex> = areas
        .iter()
        .enumerate()
        .filter_map(|(i, area)| {
            let rect = area.geometry.bounding_rect()?;
            min_lon = min_lon.min(rect.min().x);
            max_lon = max_lon.max(rect.max().x);
            min_lat = min_lat.min(rect.min().y);
            max_lat = max_lat.max(rect.max().y);
            Some(AreaIndex {
                index: i,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
        })
        .collect();

    if tree_items.is_empty() || min_lon >= max_lon || min_lat >= max_lat {
        return None;
    }

    let tree = RTree::bulk_load(tree_items);

    // Projected frame, y grows southward.
    let (mut frame_min_x, mut frame_min_y) = mercator(min_lon, max_lat);
    let (mut frame_max_x, mut frame_max_y) = mercator(max_lon, min_lat);
    let margin_x = (frame_max_x - frame_min_x) * MARGIN;
    let margin_y = (frame_max_y - frame_min_y) * MARGIN;
    frame_min_x -= margin_x;
    frame_max_x += margin_x;
    frame_min_y -= margin_y;
    frame_max_y += margin_y;

    let span_x = frame_max_x - frame_min_x;
    let span_y = frame_max_y - frame_min_y;
    let height = ((width as f64 * span_y / span_x).round() as u32).clamp(1, MAX_HEIGHT);

    let max_count = areas.iter().map(|a| a.count).max().unwrap_or(0);
    let denom = max_count.max(1) as f64;

    let rows: Vec<Vec<Rgba<u8>>> = (0..height)
        .into_par_iter()
        .map(|py| {
            let merc_y = frame_min_y + (py as f64 + 0.5) / height as f64 * span_y;
            let lat = inverse_mercator_lat(merc_y);
            (0..width)
                .map(|px| {
                    let merc_x = frame_min_x + (px as f64 + 0.5) / width as f64 * span_x;
                    let lon = merc_x * 360.0 - 180.0;
                    let point = Point::new(lon, lat);
                    let envelope = AABB::from_point([lon, lat]);

                    for candidate in tree.locate_in_envelope_intersecting(&envelope) {
                        let area = &areas[candidate.index];
                        if area.geometry.contains(&point) {
                            return reds_ramp(area.count as f64 / denom);
                        }
                    }
                    BACKGROUND
                })
                .collect()
        })
        .collect();

    let mut image: RgbaImage = ImageBuffer::new(width, height);
    for (py, row) in rows.iter().enumerate() {
        for (px, color) in row.iter().enumerate() {
            image.put_pixel(px as u32, py as u32, *color);
        }
    }

    Some(Choropleth { image, max_count })
}

pub fn write_png(choropleth: &Choropleth, path: &Path) -> Result<()> {
    choropleth
        .image
        .save(path)
        .with_context(|| format!("Failed to save choropleth: {:?}", path))
}

// Normalized Web Mercator: x and y in [0, 1], y southward.
fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn inverse_mercator_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Sequential "Reds" ramp, light at 0.0 to dark at 1.0. Shared with the bar
/// charts so the map and Act 1 use the same palette.
pub fn reds_rgb(t: f64) -> (u8, u8, u8) {
    const STOPS: [[f64; 3]; 3] = [
        [255.0, 245.0, 240.0],
        [251.0, 106.0, 74.0],
        [103.0, 0.0, 13.0],
    ];
    let t = t.clamp(0.0, 1.0);
    let (lo, hi, local) = if t < 0.5 {
        (STOPS[0], STOPS[1], t * 2.0)
    } else {
        (STOPS[1], STOPS[2], (t - 0.5) * 2.0)
    };
    let channel = |i: usize| (lo[i] + (hi[i] - lo[i]) * local).round() as u8;
    (channel(0), channel(1), channel(2))
}

fn reds_ramp(t: f64) -> Rgba<u8> {
    let (r, g, b) = reds_rgb(t);
    Rgba([r, g, b, 255])
}
