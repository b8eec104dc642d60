use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FieldCalc - geodetic survey polygon calculator
#[derive(Parser, Debug)]
#[command(name = "fieldcalc")]
#[command(about = "Geodetic survey polygon calculator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML config file (defaults to ./fieldcalc.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// UTM zone (1-60, northern hemisphere)
    #[arg(long, global = true)]
    pub zone: Option<u8>,

    /// Fixed magnetic declination in degrees; skips lookup
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub declination: Option<f64>,

    /// Area display unit (m2, ha, km2, acres)
    #[arg(long, global = true)]
    pub unit: Option<String>,

    /// Never query online declination providers
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute area, perimeter, bearings and closure for a point file
    Compute(ComputeArgs),

    /// Re-order scrambled points into a clockwise ring
    Normalize(NormalizeArgs),

    /// Resolve magnetic declination for a position
    Declination(DeclinationArgs),

    /// Export a survey to CSV, GeoJSON, or KML
    Export(ExportArgs),

    /// Show UTM zone facts for a longitude
    Zone(ZoneArgs),
}

#[derive(Parser, Debug)]
pub struct ComputeArgs {
    /// Input point file (csv, geojson, kml)
    pub input: PathBuf,

    /// Re-order points clockwise before computing; tolerates unlabeled names
    #[arg(long)]
    pub sort: bool,
}

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Input point file (csv, geojson, kml)
    pub input: PathBuf,
}

#[derive(Parser, Debug)]
pub struct DeclinationArgs {
    /// Longitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Decimal year (defaults to now)
    #[arg(long)]
    pub year: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Input point file (csv, geojson, kml)
    pub input: PathBuf,

    /// Target format (csv, geojson, kml)
    #[arg(long, default_value = "csv")]
    pub to: String,

    /// Output path (defaults to the input stem with the target extension)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Site name written into the export (defaults to the input stem)
    #[arg(long)]
    pub site: Option<String>,

    /// Re-order points clockwise before exporting
    #[arg(long)]
    pub sort: bool,
}

#[derive(Parser, Debug)]
pub struct ZoneArgs {
    /// Longitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lon: f64,
}
