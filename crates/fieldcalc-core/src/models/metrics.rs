//! Derived polygon metrics and display units.

use crate::models::point::PointRole;
use serde::{Deserialize, Serialize};

/// Per-edge traversal report.
///
/// Bearings use the surveying convention: 0° = north, measured clockwise,
/// always within `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeReport {
    pub from: PointRole,
    pub to: PointRole,
    pub distance_m: f64,
    pub true_bearing_deg: f64,
    pub magnetic_bearing_deg: f64,
}

/// Metrics derived from a closed survey ring. Recomputed on every change;
/// never cached across `ProjectionConfig` or point-set revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonMetrics {
    pub area_sq_m: f64,
    pub perimeter_m: f64,
    pub closure_error_percent: f64,
    pub edges: Vec<EdgeReport>,
}

impl PolygonMetrics {
    pub fn area_in(&self, unit: AreaUnit) -> f64 {
        unit.from_square_meters(self.area_sq_m)
    }
}

/// Area units for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AreaUnit {
    #[default]
    SquareMeters,
    Hectares,
    SquareKilometers,
    Acres,
}

impl AreaUnit {
    /// Convert an area in square meters to this unit
    pub fn from_square_meters(&self, sq_m: f64) -> f64 {
        match self {
            AreaUnit::SquareMeters => sq_m,
            AreaUnit::Hectares => sq_m / 10_000.0,
            AreaUnit::SquareKilometers => sq_m / 1_000_000.0,
            AreaUnit::Acres => sq_m / 4047.0,
        }
    }

    /// Convert an area in this unit to square meters
    pub fn to_square_meters(&self, value: f64) -> f64 {
        match self {
            AreaUnit::SquareMeters => value,
            AreaUnit::Hectares => value * 10_000.0,
            AreaUnit::SquareKilometers => value * 1_000_000.0,
            AreaUnit::Acres => value * 4047.0,
        }
    }

    /// Display suffix (e.g. "ha")
    pub fn suffix(&self) -> &'static str {
        match self {
            AreaUnit::SquareMeters => "m²",
            AreaUnit::Hectares => "ha",
            AreaUnit::SquareKilometers => "km²",
            AreaUnit::Acres => "acres",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_unit_conversion() {
        let ha = AreaUnit::Hectares;
        assert!((ha.from_square_meters(25_000.0) - 2.5).abs() < 1e-12);
        assert!((ha.to_square_meters(2.5) - 25_000.0).abs() < 1e-9);

        let acres = AreaUnit::Acres;
        assert!((acres.from_square_meters(4047.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_area_in() {
        let metrics = PolygonMetrics {
            area_sq_m: 1_000_000.0,
            perimeter_m: 4000.0,
            closure_error_percent: 0.0,
            edges: vec![],
        };
        assert!((metrics.area_in(AreaUnit::SquareKilometers) - 1.0).abs() < 1e-12);
        assert!((metrics.area_in(AreaUnit::Hectares) - 100.0).abs() < 1e-12);
    }
}
