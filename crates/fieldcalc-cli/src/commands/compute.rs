//! Compute command implementation

use crate::cli::ComputeArgs;
use crate::commands::build_survey;
use crate::output::OutputWriter;
use anyhow::Result;
use fieldcalc_core::config::LayeredConfig;
use fieldcalc_core::geo::{compute_metrics, Fidelity};
use fieldcalc_core::models::EdgeReport;
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct EdgeRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Distance (m)")]
    distance: String,
    #[tabled(rename = "True bearing")]
    true_bearing: String,
    #[tabled(rename = "Magnetic bearing")]
    magnetic_bearing: String,
}

impl From<&EdgeReport> for EdgeRow {
    fn from(edge: &EdgeReport) -> Self {
        Self {
            from: edge.from.to_string(),
            to: edge.to.to_string(),
            distance: format!("{:.2}", edge.distance_m),
            true_bearing: format!("{:.2}°", edge.true_bearing_deg),
            magnetic_bearing: format!("{:.2}°", edge.magnetic_bearing_deg),
        }
    }
}

#[derive(Serialize)]
struct ComputeOutput {
    zone: u8,
    fidelity: Fidelity,
    declination_deg: f64,
    area_sq_m: f64,
    area_display: f64,
    area_unit: String,
    perimeter_m: f64,
    closure_error_percent: f64,
    edges: Vec<EdgeReport>,
}

pub async fn execute(
    args: ComputeArgs,
    config: &LayeredConfig,
    offline: bool,
    output: &OutputWriter,
) -> Result<()> {
    let survey = build_survey(&args.input, args.sort, config, offline, output).await?;
    let metrics = compute_metrics(&survey.ring, &survey.projection, survey.declination_deg)?;
    let unit = config.area_unit.value;

    if output.is_json() {
        output.result(ComputeOutput {
            zone: survey.projection.zone(),
            fidelity: survey.fidelity,
            declination_deg: survey.declination_deg,
            area_sq_m: metrics.area_sq_m,
            area_display: metrics.area_in(unit),
            area_unit: unit.suffix().to_string(),
            perimeter_m: metrics.perimeter_m,
            closure_error_percent: metrics.closure_error_percent,
            edges: metrics.edges,
        })?;
        return Ok(());
    }

    if survey.fidelity == Fidelity::Approximate {
        output.warning("flat-earth approximation in use; treat coordinates as rough");
    }

    output.section("Survey Metrics");
    output.kv("UTM zone", format!("{}N", survey.projection.zone()));
    output.kv("Magnetic declination", format!("{:.2}°", survey.declination_deg));
    output.kv(
        "Area",
        format!("{:.2} {}", metrics.area_in(unit), unit.suffix()),
    );
    output.kv("Perimeter", format!("{:.2} m", metrics.perimeter_m));
    output.kv(
        "Closure error",
        format!("{:.4} %", metrics.closure_error_percent),
    );
    if !survey.reference_points.is_empty() {
        output.info(format!(
            "{} reference point(s) excluded from the ring",
            survey.reference_points.len()
        ));
    }

    output.section("Edges");
    output.table(metrics.edges.iter().map(EdgeRow::from).collect());

    Ok(())
}
