//! Polygon metrics engine: shoelace area, perimeter, bearings, closure error.
//!
//! All computation runs on projected (planar metric) coordinates, never on
//! raw geographic degrees. Declination is east-positive: magnetic bearing =
//! true bearing − declination.

use crate::error::{FieldcalcError, Result};
use crate::geo::transform::ProjectionConfig;
use crate::models::metrics::{EdgeReport, PolygonMetrics};
use crate::models::point::Ring;

/// Compute area, perimeter, closure error, and the per-edge bearing table
/// for a closed ring.
///
/// Pure over the ring snapshot. Degenerate rings (collinear, zero-length
/// edges) yield zero-valued metrics rather than an error; they are legitimate
/// transient states during editing. Rings shorter than 3 vertices fail with
/// `InsufficientPoints`.
pub fn compute_metrics(
    ring: &Ring,
    cfg: &ProjectionConfig,
    declination_deg: f64,
) -> Result<PolygonMetrics> {
    // The config carries no numeric input here, but a stale or invalid zone
    // should surface before results are attributed to it.
    let _ = ProjectionConfig::new(cfg.zone())?;

    if ring.len() < 3 {
        return Err(FieldcalcError::InsufficientPoints { found: ring.len() });
    }

    let mut area2 = 0.0;
    let mut perimeter = 0.0;
    let mut closure_dx = 0.0;
    let mut closure_dy = 0.0;
    let mut edges = Vec::with_capacity(ring.len());

    for (from, to) in ring.edges() {
        let [x1, y1] = from.projected;
        let [x2, y2] = to.projected;

        area2 += x1 * y2 - x2 * y1;

        let dx = x2 - x1;
        let dy = y2 - y1;
        let distance = (dx * dx + dy * dy).sqrt();
        perimeter += distance;
        closure_dx += dx;
        closure_dy += dy;

        let true_bearing = bearing_deg(dx, dy);
        edges.push(EdgeReport {
            from: from.role,
            to: to.role,
            distance_m: distance,
            true_bearing_deg: true_bearing,
            magnetic_bearing_deg: normalize_bearing(true_bearing - declination_deg),
        });
    }

    let closure_len = (closure_dx * closure_dx + closure_dy * closure_dy).sqrt();
    let closure_error_percent = if perimeter > 0.0 {
        closure_len / perimeter * 100.0
    } else {
        0.0
    };

    Ok(PolygonMetrics {
        area_sq_m: area2.abs() / 2.0,
        perimeter_m: perimeter,
        closure_error_percent,
        edges,
    })
}

/// True bearing of a displacement, surveying convention: 0° = north,
/// clockwise, in `[0, 360)`. Note the argument order: `atan2(dx, dy)`.
pub fn bearing_deg(dx: f64, dy: f64) -> f64 {
    normalize_bearing(dx.atan2(dy).to_degrees())
}

/// Normalize a bearing in degrees into `[0, 360)`.
pub fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs.
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}
