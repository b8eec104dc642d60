//! Error types for FieldCalc

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldcalcError {
    // Projection errors
    #[error("Invalid UTM zone {zone}: must be between 1 and 60")]
    InvalidZone { zone: i32 },

    #[error("Non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[cfg(feature = "proj-backend")]
    #[error("Projection backend error: {0}")]
    ProjectionBackend(String),

    // Point set errors
    #[error("Polygon incomplete: {reason}")]
    IncompletePolygon { reason: String },

    #[error("Turning point index {index} outside valid range 1..={limit}")]
    TurningIndexOutOfRange { index: u32, limit: u32 },

    // Metrics errors
    #[error("Insufficient points for polygon metrics: need at least 3, found {found}")]
    InsufficientPoints { found: usize },

    // Ordering errors
    #[error("Too few ring points after deduplication: need at least 3, found {found}")]
    TooFewRingPoints { found: usize },

    #[error("Ambiguous start point: {candidates} points classified as SP")]
    AmbiguousStartPoint { candidates: usize },

    // Import errors
    #[error("Unrecognized point role: {name}")]
    UnknownRole { name: String },

    #[error("Unsupported format: {name}")]
    FormatUnsupported { name: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, FieldcalcError>;
