//! Zone command implementation

use crate::cli::ZoneArgs;
use crate::output::OutputWriter;
use anyhow::Result;
use fieldcalc_core::declination::default_for_zone;
use fieldcalc_core::geo::ProjectionConfig;
use serde::Serialize;

#[derive(Serialize)]
struct ZoneOutput {
    lon: f64,
    zone: u8,
    central_meridian_deg: f64,
    epsg: u32,
    default_declination_deg: f64,
}

pub fn execute(args: ZoneArgs, output: &OutputWriter) -> Result<()> {
    let projection = ProjectionConfig::for_longitude(args.lon);

    if output.is_json() {
        output.result(ZoneOutput {
            lon: args.lon,
            zone: projection.zone(),
            central_meridian_deg: projection.central_meridian_deg(),
            epsg: projection.epsg(),
            default_declination_deg: default_for_zone(projection.zone()),
        })?;
        return Ok(());
    }

    output.section("UTM Zone");
    output.kv("Longitude", format!("{:.4}", args.lon));
    output.kv("Zone", format!("{}N", projection.zone()));
    output.kv("Central meridian", format!("{:.1}°", projection.central_meridian_deg()));
    output.kv("EPSG", projection.epsg());
    output.kv(
        "Default declination",
        format!("{:.1}°", default_for_zone(projection.zone())),
    );
    Ok(())
}
