//! Import/export adapters.
//!
//! Writers render a fully resolved [`SurveyExport`] into a portable text
//! format; readers pull named raw points back out of one. Role
//! classification and coordinate conversion stay outside this layer, so
//! adapters never need a projection or a classifier.

pub mod csv;
pub mod geojson;
pub mod kml;

pub use csv::{CsvReader, CsvWriter};
pub use geojson::{GeoJsonReader, GeoJsonWriter};
pub use kml::{KmlReader, KmlWriter};

use crate::error::{FieldcalcError, Result};
use crate::models::{PointRole, PolygonMetrics};
use serde::{Deserialize, Serialize};

/// Coordinate space a reader found its points in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSpace {
    /// Planar metric easting/northing.
    Projected,
    /// Longitude/latitude degrees (WGS84).
    Geographic,
}

/// A named point as read from an external file, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPoint {
    pub name: String,
    pub coords: [f64; 2],
    pub space: CoordSpace,
}

/// A resolved export point carrying both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportPoint {
    pub role: PointRole,
    /// Easting, northing.
    pub projected: [f64; 2],
    /// Longitude, latitude.
    pub geographic: [f64; 2],
}

/// Everything a writer needs to render one survey.
///
/// `points` are expected in role order (LM, BM, SP, TP1..TPn), so the ring
/// members filtered out of it are already in traversal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyExport {
    pub site_name: String,
    pub zone: u8,
    pub declination_deg: f64,
    pub points: Vec<ExportPoint>,
    pub metrics: PolygonMetrics,
}

impl SurveyExport {
    /// Ring vertices in traversal order (SP, TP1..TPn), not closed.
    pub fn ring_points(&self) -> impl Iterator<Item = &ExportPoint> {
        self.points.iter().filter(|p| p.role.is_ring_member())
    }
}

/// Renders a [`SurveyExport`] into one output format.
pub trait FormatWriter: Send + Sync {
    fn write(&self, export: &SurveyExport) -> Result<String>;
    fn format_name(&self) -> &str;
    fn file_extension(&self) -> &str;
}

/// Extracts named raw points from one input format.
pub trait PointReader: Send + Sync {
    fn parse(&self, content: &str) -> Result<Vec<ImportedPoint>>;
    fn format_name(&self) -> &str;
    fn supported_extensions(&self) -> &[&str];
}

/// Writer lookup by format name (case-insensitive).
pub fn writer_for(name: &str) -> Result<Box<dyn FormatWriter>> {
    match name.to_ascii_lowercase().as_str() {
        "csv" => Ok(Box::new(CsvWriter)),
        "geojson" | "json" => Ok(Box::new(GeoJsonWriter)),
        "kml" => Ok(Box::new(KmlWriter)),
        other => Err(FieldcalcError::FormatUnsupported {
            name: other.to_string(),
        }),
    }
}

/// Reader lookup by file extension (case-insensitive).
pub fn reader_for_extension(extension: &str) -> Result<Box<dyn PointReader>> {
    let ext = extension.to_ascii_lowercase();
    let readers: Vec<Box<dyn PointReader>> = vec![
        Box::new(CsvReader),
        Box::new(GeoJsonReader),
        Box::new(KmlReader),
    ];
    readers
        .into_iter()
        .find(|r| r.supported_extensions().contains(&ext.as_str()))
        .ok_or(FieldcalcError::FormatUnsupported { name: ext })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EdgeReport;

    pub(crate) fn square_export() -> SurveyExport {
        let points = vec![
            ExportPoint {
                role: PointRole::Landmark,
                projected: [500_500.0, 5_600_500.0],
                geographic: [31.006, 50.504],
            },
            ExportPoint {
                role: PointRole::Start,
                projected: [500_000.0, 5_600_000.0],
                geographic: [31.0, 50.5],
            },
            ExportPoint {
                role: PointRole::Turning(1),
                projected: [500_000.0, 5_600_100.0],
                geographic: [31.0, 50.5009],
            },
            ExportPoint {
                role: PointRole::Turning(2),
                projected: [500_100.0, 5_600_100.0],
                geographic: [31.0014, 50.5009],
            },
            ExportPoint {
                role: PointRole::Turning(3),
                projected: [500_100.0, 5_600_000.0],
                geographic: [31.0014, 50.5],
            },
        ];
        let edges = vec![
            EdgeReport {
                from: PointRole::Start,
                to: PointRole::Turning(1),
                distance_m: 100.0,
                true_bearing_deg: 0.0,
                magnetic_bearing_deg: 352.6,
            },
            EdgeReport {
                from: PointRole::Turning(1),
                to: PointRole::Turning(2),
                distance_m: 100.0,
                true_bearing_deg: 90.0,
                magnetic_bearing_deg: 82.6,
            },
            EdgeReport {
                from: PointRole::Turning(2),
                to: PointRole::Turning(3),
                distance_m: 100.0,
                true_bearing_deg: 180.0,
                magnetic_bearing_deg: 172.6,
            },
            EdgeReport {
                from: PointRole::Turning(3),
                to: PointRole::Start,
                distance_m: 100.0,
                true_bearing_deg: 270.0,
                magnetic_bearing_deg: 262.6,
            },
        ];
        SurveyExport {
            site_name: "Test Site".to_string(),
            zone: 36,
            declination_deg: 7.4,
            points,
            metrics: PolygonMetrics {
                area_sq_m: 10_000.0,
                perimeter_m: 400.0,
                closure_error_percent: 0.0,
                edges,
            },
        }
    }

    #[test]
    fn test_ring_points_excludes_references() {
        let export = square_export();
        let roles: Vec<_> = export.ring_points().map(|p| p.role).collect();
        assert_eq!(
            roles,
            vec![
                PointRole::Start,
                PointRole::Turning(1),
                PointRole::Turning(2),
                PointRole::Turning(3),
            ]
        );
    }

    #[test]
    fn test_writer_dispatch() {
        assert_eq!(writer_for("CSV").unwrap().format_name(), "CSV");
        assert_eq!(writer_for("geojson").unwrap().file_extension(), "geojson");
        assert_eq!(writer_for("kml").unwrap().format_name(), "KML");
        assert!(matches!(
            writer_for("dxf"),
            Err(FieldcalcError::FormatUnsupported { .. })
        ));
    }

    #[test]
    fn test_reader_dispatch() {
        assert_eq!(reader_for_extension("csv").unwrap().format_name(), "CSV");
        assert_eq!(reader_for_extension("KML").unwrap().format_name(), "KML");
        assert_eq!(
            reader_for_extension("json").unwrap().format_name(),
            "GeoJSON"
        );
        assert!(reader_for_extension("xlsx").is_err());
    }
}
