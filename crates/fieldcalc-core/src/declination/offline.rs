//! Deterministic offline declination model.
//!
//! A small lookup grid of known declination values in 1°×2° cells over the
//! primary survey region, nudged by fractional-degree corrections, with a
//! UTM-zone base table for everywhere else and a linear yearly drift from the
//! model epoch. Always produces a value; accuracy judgment is the caller's.

use crate::geo::transform::utm_zone_for_longitude;
use std::ops::RangeInclusive;

/// Reference epoch of the model, decimal years.
pub const MODEL_EPOCH: f64 = 2025.0;
/// Linear drift applied per year away from the epoch, degrees.
pub const DRIFT_DEG_PER_YEAR: f64 = 0.05;

const LAT_CORRECTION_PER_DEG: f64 = 0.15;
const LON_CORRECTION_PER_DEG: f64 = 0.08;

/// Declination in degrees (east-positive) at a position and decimal year.
pub fn declination_at(lon: f64, lat: f64, decimal_year: f64) -> f64 {
    let lat_cell = lat.round() as i32;
    let lon_cell = ((lon / 2.0).round() * 2.0) as i32;

    let mut declination = match grid_value(lat_cell, lon_cell) {
        Some(base) => {
            base + (lat - lat_cell as f64) * LAT_CORRECTION_PER_DEG
                + (lon - lon_cell as f64) * LON_CORRECTION_PER_DEG
        }
        None => zone_declination(utm_zone_for_longitude(lon), lon, lat),
    };

    declination += (decimal_year - MODEL_EPOCH) * DRIFT_DEG_PER_YEAR;
    (declination * 1e6).round() / 1e6
}

/// Broad per-zone declination with latitude and zone-center longitude
/// corrections, used outside the grid.
pub fn zone_declination(zone: u8, lon: f64, lat: f64) -> f64 {
    let base = zone_base(zone);
    let zone_center = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;
    base + (lat - 50.0) * LAT_CORRECTION_PER_DEG + (lon - zone_center) * LON_CORRECTION_PER_DEG
}

/// Quick per-zone defaults used when only the UTM zone is known.
pub fn default_for_zone(zone: u8) -> f64 {
    match zone {
        35 => 5.5,
        36 => 7.0,
        37 => 8.5,
        38 => 10.0,
        39 => 11.5,
        _ => 7.0,
    }
}

/// Plausibility bounds a caller should apply before trusting a declination
/// value at this position. Values outside the range are a signal, not an
/// error.
pub fn plausible_range(lon: f64, lat: f64) -> RangeInclusive<f64> {
    if (44.0..=53.0).contains(&lat) && (22.0..=41.0).contains(&lon) {
        3.0..=15.0
    } else {
        -30.0..=30.0
    }
}

fn grid_value(lat_cell: i32, lon_cell: i32) -> Option<f64> {
    let value = match (lat_cell, lon_cell) {
        // Western cells (zones 34-35)
        (49, 24) => 5.2,
        (49, 26) => 5.8,
        (50, 24) => 5.4,
        (50, 26) => 6.0,
        (51, 24) => 5.6,
        (51, 26) => 6.2,
        (52, 24) => 5.8,
        (52, 26) => 6.4,
        // Central cells (zone 36)
        (49, 30) => 6.8,
        (49, 32) => 7.2,
        (50, 30) => 7.0,
        (50, 32) => 7.4,
        (51, 30) => 7.2,
        (51, 32) => 7.6,
        (52, 30) => 7.4,
        (52, 32) => 7.8,
        // Eastern cells (zones 37-38)
        (49, 36) => 8.2,
        (49, 38) => 8.8,
        (50, 36) => 8.4,
        (50, 38) => 9.0,
        (51, 36) => 8.6,
        (51, 38) => 9.2,
        (52, 36) => 8.8,
        (52, 38) => 9.4,
        _ => return None,
    };
    Some(value)
}

fn zone_base(zone: u8) -> f64 {
    match zone {
        // Americas
        10 => -15.2,
        11 => -12.8,
        12 => -9.4,
        13 => -6.1,
        14 => -2.8,
        15 => 0.5,
        16 => 3.8,
        17 => 7.1,
        // Atlantic
        18 => 10.4,
        19 => 13.7,
        20 => 17.0,
        21 => 20.3,
        22 => 23.6,
        23 => 26.9,
        // Africa / western Europe
        24 => -2.1,
        25 => -1.8,
        26 => -1.5,
        27 => -1.2,
        28 => -0.9,
        29 => -0.6,
        30 => -0.3,
        31 => 0.0,
        32 => 0.3,
        33 => 0.6,
        // Eastern Europe calibration
        34 => 4.5,
        35 => 5.8,
        36 => 7.2,
        37 => 8.6,
        38 => 10.1,
        39 => 11.3,
        40 => 12.5,
        // Asia
        41 => 13.8,
        42 => 15.1,
        43 => 16.4,
        44 => 17.7,
        45 => 19.0,
        46 => 20.3,
        47 => 21.6,
        48 => 22.9,
        49 => 24.2,
        50 => 25.5,
        51 => 26.8,
        52 => 28.1,
        53 => 29.4,
        54 => 30.7,
        // Pacific
        55 => -18.2,
        56 => -16.8,
        57 => -15.4,
        58 => -14.0,
        59 => -12.6,
        60 => -11.2,
        _ => 0.0,
    }
}
