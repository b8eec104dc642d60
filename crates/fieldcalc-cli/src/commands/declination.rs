//! Declination command implementation

use crate::cli::DeclinationArgs;
use crate::commands::make_resolver;
use crate::output::OutputWriter;
use anyhow::Result;
use fieldcalc_core::config::LayeredConfig;
use fieldcalc_core::declination::{decimal_year_now, default_for_zone, is_plausible};
use fieldcalc_core::geo::utm_zone_for_longitude;
use serde::Serialize;

#[derive(Serialize)]
struct DeclinationOutput {
    lon: f64,
    lat: f64,
    decimal_year: f64,
    declination_deg: f64,
    plausible: bool,
    zone: u8,
    zone_default_deg: f64,
}

pub async fn execute(
    args: DeclinationArgs,
    config: &LayeredConfig,
    offline: bool,
    output: &OutputWriter,
) -> Result<()> {
    let year = args.year.unwrap_or_else(decimal_year_now);
    let zone = utm_zone_for_longitude(args.lon);

    let declination = match config.declination_override.value {
        Some(fixed) => fixed,
        None => {
            let resolver = make_resolver(config.online_lookup.value && !offline);
            resolver.resolve_at(args.lon, args.lat, year).await
        }
    };
    let plausible = is_plausible(declination, args.lon, args.lat);

    if output.is_json() {
        output.result(DeclinationOutput {
            lon: args.lon,
            lat: args.lat,
            decimal_year: year,
            declination_deg: declination,
            plausible,
            zone,
            zone_default_deg: default_for_zone(zone),
        })?;
        return Ok(());
    }

    output.section("Magnetic Declination");
    output.kv("Position", format!("{:.4}, {:.4}", args.lon, args.lat));
    output.kv("Decimal year", format!("{:.2}", year));
    output.kv("Declination", format!("{:.2}°", declination));
    output.kv("UTM zone", format!("{}N", zone));
    output.kv("Zone default", format!("{:.1}°", default_for_zone(zone)));
    if !plausible {
        output.warning("value is outside the plausible range for this position");
    }
    Ok(())
}
