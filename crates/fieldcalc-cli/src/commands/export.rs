//! Export command implementation

use crate::cli::ExportArgs;
use crate::commands::build_survey;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use fieldcalc_core::config::LayeredConfig;
use fieldcalc_core::formats::{writer_for, ExportPoint, SurveyExport};
use fieldcalc_core::geo::compute_metrics;
use std::fs;

pub async fn execute(
    args: ExportArgs,
    config: &LayeredConfig,
    offline: bool,
    output: &OutputWriter,
) -> Result<()> {
    let writer = writer_for(&args.to)?;
    let survey = build_survey(&args.input, args.sort, config, offline, output).await?;
    let metrics = compute_metrics(&survey.ring, &survey.projection, survey.declination_deg)?;

    let site_name = args.site.unwrap_or_else(|| {
        args.input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("survey")
            .to_string()
    });

    let mut points = Vec::with_capacity(survey.reference_points.len() + survey.ring.len());
    for point in survey
        .reference_points
        .iter()
        .chain(survey.ring.vertices().iter())
    {
        let geographic = survey.transformer.to_geographic(point.projected)?.coords;
        points.push(ExportPoint {
            role: point.role,
            projected: point.projected,
            geographic,
        });
    }

    let export = SurveyExport {
        site_name,
        zone: survey.projection.zone(),
        declination_deg: survey.declination_deg,
        points,
        metrics,
    };

    let rendered = writer.write(&export)?;
    let target = args
        .output
        .unwrap_or_else(|| args.input.with_extension(writer.file_extension()));
    if target == args.input {
        anyhow::bail!(
            "target {} is the input file; pass --output",
            target.display()
        );
    }
    fs::write(&target, rendered)
        .with_context(|| format!("cannot write {}", target.display()))?;

    output.success(format!(
        "{} export written to {}",
        writer.format_name(),
        target.display()
    ));
    Ok(())
}
