//! CSV adapter.
//!
//! The writer produces a field-book style report: a point table, an edge
//! table, and a summary block. The reader accepts plain `name,x,y` lines
//! with projected coordinates; a header row and blank lines are tolerated.

use crate::error::Result;
use crate::formats::{CoordSpace, FormatWriter, ImportedPoint, PointReader, SurveyExport};
use std::fmt::Write as _;

pub struct CsvWriter;

impl FormatWriter for CsvWriter {
    fn write(&self, export: &SurveyExport) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "Site,{}", export.site_name);
        let _ = writeln!(out, "UTM zone,{}N", export.zone);
        let _ = writeln!(out, "Magnetic declination (deg),{:.2}", export.declination_deg);
        out.push('\n');

        out.push_str("Name,Easting,Northing,Longitude,Latitude\n");
        for point in &export.points {
            let _ = writeln!(
                out,
                "{},{:.2},{:.2},{:.6},{:.6}",
                point.role,
                point.projected[0],
                point.projected[1],
                point.geographic[0],
                point.geographic[1]
            );
        }
        out.push('\n');

        out.push_str("From,To,Distance (m),True bearing (deg),Magnetic bearing (deg)\n");
        for edge in &export.metrics.edges {
            let _ = writeln!(
                out,
                "{},{},{:.2},{:.2},{:.2}",
                edge.from, edge.to, edge.distance_m, edge.true_bearing_deg, edge.magnetic_bearing_deg
            );
        }
        out.push('\n');

        let _ = writeln!(out, "Area (sq m),{:.2}", export.metrics.area_sq_m);
        let _ = writeln!(out, "Perimeter (m),{:.2}", export.metrics.perimeter_m);
        let _ = writeln!(
            out,
            "Closure error (%),{:.4}",
            export.metrics.closure_error_percent
        );

        Ok(out)
    }

    fn format_name(&self) -> &str {
        "CSV"
    }

    fn file_extension(&self) -> &str {
        "csv"
    }
}

pub struct CsvReader;

impl PointReader for CsvReader {
    fn parse(&self, content: &str) -> Result<Vec<ImportedPoint>> {
        let mut points = Vec::new();
        let mut skipped = 0usize;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 3 {
                skipped += 1;
                continue;
            }
            let (x, y) = match (fields[1].parse::<f64>(), fields[2].parse::<f64>()) {
                (Ok(x), Ok(y)) => (x, y),
                // Header row or malformed line.
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            points.push(ImportedPoint {
                name: fields[0].to_string(),
                coords: [x, y],
                space: CoordSpace::Projected,
            });
        }

        if skipped > 0 {
            tracing::debug!(skipped, "csv lines without name,x,y shape ignored");
        }
        Ok(points)
    }

    fn format_name(&self) -> &str {
        "CSV"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["csv", "txt"]
    }
}
