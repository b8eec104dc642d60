pub mod classify;
pub mod metrics;
pub mod point;

pub use classify::{classify_required, NameClassifier, RoleClassifier};
pub use metrics::{AreaUnit, EdgeReport, PolygonMetrics};
pub use point::{PointRole, PointSet, Ring, SurveyPoint, MAX_TURNING_POINTS};
