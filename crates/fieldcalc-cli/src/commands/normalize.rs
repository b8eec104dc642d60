//! Normalize command implementation

use crate::cli::NormalizeArgs;
use crate::commands::{read_points, resolve_points};
use crate::output::OutputWriter;
use anyhow::Result;
use fieldcalc_core::config::LayeredConfig;
use fieldcalc_core::geo::{normalize_ordering, ProjectionConfig, Transformer};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct PointRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Easting")]
    easting: String,
    #[tabled(rename = "Northing")]
    northing: String,
}

#[derive(Serialize)]
struct NormalizeOutput {
    ring: Vec<NormalizedPoint>,
    reference_points: Vec<NormalizedPoint>,
}

#[derive(Serialize)]
struct NormalizedPoint {
    label: String,
    easting: f64,
    northing: f64,
}

pub fn execute(args: NormalizeArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let projection = ProjectionConfig::new(config.zone.value)?;
    let transformer = Transformer::new(projection);

    let imported = read_points(&args.input)?;
    let points = resolve_points(&imported, &transformer, true)?;
    let normalized = normalize_ordering(points)?;

    if output.is_json() {
        let as_point = |p: &fieldcalc_core::models::SurveyPoint| NormalizedPoint {
            label: p.role.to_string(),
            easting: p.projected[0],
            northing: p.projected[1],
        };
        output.result(NormalizeOutput {
            ring: normalized.ring.vertices().iter().map(as_point).collect(),
            reference_points: normalized.reference_points.iter().map(as_point).collect(),
        })?;
        return Ok(());
    }

    output.section("Clockwise Ring");
    output.table(
        normalized
            .ring
            .vertices()
            .iter()
            .map(|p| PointRow {
                label: p.role.to_string(),
                easting: format!("{:.2}", p.projected[0]),
                northing: format!("{:.2}", p.projected[1]),
            })
            .collect(),
    );

    if !normalized.reference_points.is_empty() {
        output.section("Reference Points");
        output.table(
            normalized
                .reference_points
                .iter()
                .map(|p| PointRow {
                    label: p.role.to_string(),
                    easting: format!("{:.2}", p.projected[0]),
                    northing: format!("{:.2}", p.projected[1]),
                })
                .collect(),
        );
    }

    output.success(format!(
        "{} ring point(s) ordered clockwise",
        normalized.ring.len()
    ));
    Ok(())
}
