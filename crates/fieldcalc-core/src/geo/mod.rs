//! Geo module: coordinate transforms, polygon metrics, ordering.

pub mod metrics;
pub mod ordering;
pub mod transform;

// Re-export key types for convenience
pub use metrics::{bearing_deg, compute_metrics, normalize_bearing};
pub use ordering::{normalize_ordering, Normalized};
pub use transform::{
    utm_zone_for_longitude, Fidelity, ProjectionBackend, ProjectionConfig, TransformOutput,
    Transformer,
};
