//! Command implementations

mod compute;
mod declination;
mod export;
mod normalize;
mod zone;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{bail, Context, Result};
use fieldcalc_core::config::{parse_area_unit, CliConfigOverrides, LayeredConfig};
use fieldcalc_core::declination::{is_plausible, DeclinationResolver, HttpProvider};
use fieldcalc_core::formats::{reader_for_extension, CoordSpace, ImportedPoint};
use fieldcalc_core::geo::{Fidelity, ProjectionConfig, Transformer};
use fieldcalc_core::models::{
    classify_required, NameClassifier, PointRole, PointSet, Ring, RoleClassifier, SurveyPoint,
};
use std::fs;
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;
    let offline = cli.offline;

    match cli.command {
        Commands::Compute(args) => compute::execute(args, &config, offline, &output).await,
        Commands::Normalize(args) => normalize::execute(args, &config, &output),
        Commands::Declination(args) => declination::execute(args, &config, offline, &output).await,
        Commands::Export(args) => export::execute(args, &config, offline, &output).await,
        Commands::Zone(args) => zone::execute(args, &output),
    }
}

/// Layered config: defaults, then file, then environment, then CLI flags.
fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config.load_from_file(path)?;
    } else if Path::new("fieldcalc.toml").exists() {
        config = config.load_from_file("fieldcalc.toml")?;
    }
    let mut config = config.load_from_env();

    let area_unit = cli.unit.as_deref().map(parse_area_unit).transpose()?;
    config.update_from_cli(CliConfigOverrides {
        zone: cli.zone,
        area_unit,
        declination: cli.declination,
        online_lookup: if cli.offline { Some(false) } else { None },
    });
    Ok(config)
}

/// A fully resolved survey ready for metrics or export.
pub(crate) struct Survey {
    pub projection: ProjectionConfig,
    pub transformer: Transformer,
    pub ring: Ring,
    pub reference_points: Vec<SurveyPoint>,
    pub declination_deg: f64,
    pub fidelity: Fidelity,
}

pub(crate) fn read_points(path: &Path) -> Result<Vec<ImportedPoint>> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let reader = reader_for_extension(extension)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let points = reader.parse(&content)?;
    if points.is_empty() {
        bail!("no points found in {}", path.display());
    }
    tracing::debug!(count = points.len(), format = reader.format_name(), "points read");
    Ok(points)
}

/// Classify names and bring every point into the working projected CRS.
///
/// In lenient mode an unrecognized name becomes a provisional turning point
/// (useful before normalization, which relabels anyway); in strict mode it
/// is an error.
pub(crate) fn resolve_points(
    imported: &[ImportedPoint],
    transformer: &Transformer,
    lenient: bool,
) -> Result<Vec<SurveyPoint>> {
    let classifier = NameClassifier;
    let mut points = Vec::with_capacity(imported.len());

    for (i, raw) in imported.iter().enumerate() {
        let role = if lenient {
            classifier
                .classify(&raw.name)
                .unwrap_or(PointRole::Turning(i as u32 + 1))
        } else {
            classify_required(&classifier, &raw.name)?
        };
        let projected = match raw.space {
            CoordSpace::Projected => raw.coords,
            CoordSpace::Geographic => transformer.from_geographic(raw.coords)?.coords,
        };
        points.push(SurveyPoint::new(role, projected));
    }
    Ok(points)
}

/// Run the import pipeline up to a validated ring and a declination value.
pub(crate) async fn build_survey(
    input: &Path,
    sort: bool,
    config: &LayeredConfig,
    offline: bool,
    output: &OutputWriter,
) -> Result<Survey> {
    let projection = ProjectionConfig::new(config.zone.value)?;
    let transformer = Transformer::new(projection);
    let fidelity = transformer.fidelity();

    let imported = read_points(input)?;
    let points = resolve_points(&imported, &transformer, sort)?;

    let (ring, reference_points) = if sort {
        let normalized = fieldcalc_core::geo::normalize_ordering(points)?;
        (normalized.ring, normalized.reference_points)
    } else {
        let mut set = PointSet::new();
        let mut references = Vec::new();
        for point in &points {
            if point.role.is_ring_member() {
                set.upsert(point.role, point.projected)?;
            } else {
                references.push(*point);
            }
        }
        (set.as_ring()?, references)
    };

    let declination_deg = match config.declination_override.value {
        Some(fixed) => fixed,
        None => {
            let centroid = ring_centroid(&ring);
            let geographic = transformer.to_geographic(centroid)?.coords;
            let resolver = make_resolver(config.online_lookup.value && !offline);
            let value = resolver.resolve(geographic[0], geographic[1]).await;
            if !is_plausible(value, geographic[0], geographic[1]) {
                output.warning(format!(
                    "declination {:.2}° looks implausible at ({:.4}, {:.4})",
                    value, geographic[0], geographic[1]
                ));
            }
            value
        }
    };

    Ok(Survey {
        projection,
        transformer,
        ring,
        reference_points,
        declination_deg,
        fidelity,
    })
}

pub(crate) fn make_resolver(online: bool) -> DeclinationResolver {
    let mut resolver = DeclinationResolver::new();
    if online {
        if let Ok(key) = std::env::var("FIELDCALC_NOAA_API_KEY") {
            resolver.push_provider(Box::new(HttpProvider::noaa(key)));
        }
    }
    resolver
}

fn ring_centroid(ring: &Ring) -> [f64; 2] {
    let n = ring.len() as f64;
    let (sx, sy) = ring
        .vertices()
        .iter()
        .fold((0.0, 0.0), |(sx, sy), v| (sx + v.projected[0], sy + v.projected[1]));
    [sx / n, sy / n]
}
