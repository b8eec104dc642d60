//! Coordinate transforms between a projected UTM CRS and geographic WGS84.
//!
//! The adapter is a strategy selection over [`ProjectionBackend`]s. The
//! default precise backend is a built-in Transverse Mercator (Krüger series);
//! the `proj-backend` cargo feature swaps in libproj via the `proj` crate.
//! The flat-earth tangent-plane backend is a degraded approximation and every
//! result it produces is tagged [`Fidelity::Approximate`] so callers can warn
//! the user instead of silently trusting it.

use crate::error::{FieldcalcError, Result};
use serde::Serialize;

/// WGS84 semi-major axis, meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM central scale factor.
const UTM_K0: f64 = 0.9996;
/// UTM false easting, meters.
const FALSE_EASTING: f64 = 500_000.0;

/// Meters per degree of latitude in the flat-earth approximation.
const FLAT_METERS_PER_DEG: f64 = 111_320.0;
/// Flat-earth anchor: latitude mapped to the anchor northing.
const FLAT_ANCHOR_LAT: f64 = 50.4;
/// Flat-earth anchor northing, meters.
const FLAT_ANCHOR_NORTHING: f64 = 5_500_000.0;

/// Projected coordinate system: UTM zone, WGS84 datum, northern hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectionConfig {
    zone: u8,
}

impl ProjectionConfig {
    pub fn new(zone: u8) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(FieldcalcError::InvalidZone { zone: zone as i32 });
        }
        Ok(Self { zone })
    }

    /// Zone auto-detection from a geographic longitude.
    pub fn for_longitude(lon: f64) -> Self {
        Self {
            zone: utm_zone_for_longitude(lon),
        }
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Central meridian of the zone, degrees.
    pub fn central_meridian_deg(&self) -> f64 {
        (self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    /// EPSG code of the projected CRS (northern hemisphere series).
    pub fn epsg(&self) -> u32 {
        32_600 + self.zone as u32
    }
}

/// UTM zone number for a longitude, clamped to 1..=60.
pub fn utm_zone_for_longitude(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / 6.0).floor() as i64 + 1;
    zone.clamp(1, 60) as u8
}

/// Whether a transform result came from a precise projection or the degraded
/// flat-earth approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fidelity {
    Precise,
    Approximate,
}

/// A transformed coordinate pair tagged with the fidelity that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOutput {
    /// `[lon, lat]` for geographic output, `[easting, northing]` for
    /// projected output.
    pub coords: [f64; 2],
    pub fidelity: Fidelity,
}

/// Forward/inverse projection between projected `[easting, northing]` and
/// geographic `[lon, lat]` for a configured zone.
pub trait ProjectionBackend: Send + Sync {
    fn fidelity(&self) -> Fidelity;
    fn to_geographic(&self, projected: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]>;
    fn from_geographic(&self, geographic: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]>;
}

/// The transform adapter handed to callers: validates inputs, delegates to
/// the selected backend, and tags results.
pub struct Transformer {
    cfg: ProjectionConfig,
    backend: Box<dyn ProjectionBackend>,
}

impl Transformer {
    /// Precise backend for the configured zone.
    #[cfg(not(feature = "proj-backend"))]
    pub fn new(cfg: ProjectionConfig) -> Self {
        Self {
            cfg,
            backend: Box::new(TransverseMercator),
        }
    }

    /// Precise backend for the configured zone (libproj).
    #[cfg(feature = "proj-backend")]
    pub fn new(cfg: ProjectionConfig) -> Self {
        Self {
            cfg,
            backend: Box::new(proj_backend::ProjBackend),
        }
    }

    /// Degraded flat-earth backend; results are tagged
    /// [`Fidelity::Approximate`].
    pub fn approximate(cfg: ProjectionConfig) -> Self {
        Self {
            cfg,
            backend: Box::new(FlatEarth),
        }
    }

    pub fn with_backend(cfg: ProjectionConfig, backend: Box<dyn ProjectionBackend>) -> Self {
        Self { cfg, backend }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.cfg
    }

    pub fn fidelity(&self) -> Fidelity {
        self.backend.fidelity()
    }

    /// Projected `[easting, northing]` to geographic `[lon, lat]`.
    pub fn to_geographic(&self, projected: [f64; 2]) -> Result<TransformOutput> {
        check_finite(projected)?;
        let coords = self.backend.to_geographic(projected, &self.cfg)?;
        Ok(TransformOutput {
            coords,
            fidelity: self.backend.fidelity(),
        })
    }

    /// Geographic `[lon, lat]` to projected `[easting, northing]`.
    pub fn from_geographic(&self, geographic: [f64; 2]) -> Result<TransformOutput> {
        check_finite(geographic)?;
        if geographic[1].abs() >= 90.0 {
            return Err(FieldcalcError::NonFiniteCoordinate {
                x: geographic[0],
                y: geographic[1],
            });
        }
        let coords = self.backend.from_geographic(geographic, &self.cfg)?;
        Ok(TransformOutput {
            coords,
            fidelity: self.backend.fidelity(),
        })
    }
}

fn check_finite(coords: [f64; 2]) -> Result<()> {
    if !coords[0].is_finite() || !coords[1].is_finite() {
        return Err(FieldcalcError::NonFiniteCoordinate {
            x: coords[0],
            y: coords[1],
        });
    }
    Ok(())
}

/// Built-in Transverse Mercator for UTM/WGS84, using the Krüger series
/// truncated at n⁴ (sub-millimeter over the UTM domain).
pub struct TransverseMercator;

struct Coefficients {
    /// Rectifying radius.
    radius: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
}

fn coefficients() -> Coefficients {
    let n = WGS84_F / (2.0 - WGS84_F);
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;
    Coefficients {
        radius: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
        alpha: [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49_561.0 * n4 / 161_280.0,
        ],
        beta: [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
            4397.0 * n4 / 161_280.0,
        ],
        delta: [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
            56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
            4279.0 * n4 / 630.0,
        ],
    }
}

impl ProjectionBackend for TransverseMercator {
    fn fidelity(&self) -> Fidelity {
        Fidelity::Precise
    }

    fn to_geographic(&self, projected: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]> {
        let c = coefficients();
        let scaled = UTM_K0 * c.radius;
        let xi = projected[1] / scaled;
        let eta = (projected[0] - FALSE_EASTING) / scaled;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in c.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        // Conformal latitude, then the series back to geographic latitude.
        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, d) in c.delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            phi += d * (k * chi).sin();
        }

        let lambda = eta_p.sinh().atan2(xi_p.cos());
        let lon = cfg.central_meridian_deg() + lambda.to_degrees();
        Ok([lon, phi.to_degrees()])
    }

    fn from_geographic(&self, geographic: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]> {
        let c = coefficients();
        let n = WGS84_F / (2.0 - WGS84_F);
        let es = 2.0 * n.sqrt() / (1.0 + n);

        let phi = geographic[1].to_radians();
        let lambda = (geographic[0] - cfg.central_meridian_deg()).to_radians();

        let t = (phi.sin().atanh() - es * (es * phi.sin()).atanh()).sinh();
        let xi_p = t.atan2(lambda.cos());
        let eta_p = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in c.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let scaled = UTM_K0 * c.radius;
        Ok([FALSE_EASTING + scaled * eta, scaled * xi])
    }
}

/// Flat-earth local tangent plane: lat 50.4 anchored at northing 5 500 000,
/// 111 320 m per degree, zone central meridian in longitude. Forward and
/// inverse are an exact pair.
pub struct FlatEarth;

impl ProjectionBackend for FlatEarth {
    fn fidelity(&self) -> Fidelity {
        Fidelity::Approximate
    }

    fn to_geographic(&self, projected: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]> {
        let lat = (projected[1] - FLAT_ANCHOR_NORTHING) / FLAT_METERS_PER_DEG + FLAT_ANCHOR_LAT;
        let lon = (projected[0] - FALSE_EASTING)
            / (FLAT_METERS_PER_DEG * lat.to_radians().cos())
            + cfg.central_meridian_deg();
        Ok([lon, lat])
    }

    fn from_geographic(&self, geographic: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]> {
        let lat = geographic[1];
        let northing = (lat - FLAT_ANCHOR_LAT) * FLAT_METERS_PER_DEG + FLAT_ANCHOR_NORTHING;
        let easting = (geographic[0] - cfg.central_meridian_deg())
            * FLAT_METERS_PER_DEG
            * lat.to_radians().cos()
            + FALSE_EASTING;
        Ok([easting, northing])
    }
}

#[cfg(feature = "proj-backend")]
mod proj_backend {
    use super::{Fidelity, ProjectionBackend, ProjectionConfig};
    use crate::error::{FieldcalcError, Result};

    /// libproj-backed precise transform.
    pub struct ProjBackend;

    fn converter(from: &str, to: &str) -> Result<proj::Proj> {
        proj::Proj::new_known_crs(from, to, None)
            .map_err(|e| FieldcalcError::ProjectionBackend(e.to_string()))
    }

    impl ProjectionBackend for ProjBackend {
        fn fidelity(&self) -> Fidelity {
            Fidelity::Precise
        }

        fn to_geographic(&self, projected: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]> {
            let proj = converter(&format!("EPSG:{}", cfg.epsg()), "EPSG:4326")?;
            let (lon, lat) = proj
                .convert((projected[0], projected[1]))
                .map_err(|e| FieldcalcError::ProjectionBackend(e.to_string()))?;
            Ok([lon, lat])
        }

        fn from_geographic(&self, geographic: [f64; 2], cfg: &ProjectionConfig) -> Result<[f64; 2]> {
            let proj = converter("EPSG:4326", &format!("EPSG:{}", cfg.epsg()))?;
            let (x, y) = proj
                .convert((geographic[0], geographic[1]))
                .map_err(|e| FieldcalcError::ProjectionBackend(e.to_string()))?;
            Ok([x, y])
        }
    }
}
