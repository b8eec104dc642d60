//! Canonical survey point types.
//!
//! These types carry projected (planar metric) coordinates as `[f64; 2]`
//! arrays so they serialize cleanly; the computational geo types are bridged
//! in the `geo` module.

use crate::error::{FieldcalcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Upper bound on turning points in a single traverse.
pub const MAX_TURNING_POINTS: u32 = 200;

/// Role of a survey point.
///
/// `Landmark` and `Benchmark` are reference points outside the closed ring.
/// `Start` is the origin/closing vertex (exactly one per polygon). `Turning`
/// points are the numbered boundary vertices; indices start at 1.
///
/// The derived ordering (LM < BM < SP < TP1 < TP2 < ...) gives `PointSet`
/// a deterministic iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PointRole {
    Landmark,
    Benchmark,
    Start,
    Turning(u32),
}

impl PointRole {
    /// Whether this role participates in the closed polygon ring.
    pub fn is_ring_member(&self) -> bool {
        matches!(self, PointRole::Start | PointRole::Turning(_))
    }
}

impl fmt::Display for PointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointRole::Landmark => write!(f, "LM"),
            PointRole::Benchmark => write!(f, "BM"),
            PointRole::Start => write!(f, "SP"),
            PointRole::Turning(k) => write!(f, "TP{}", k),
        }
    }
}

/// A named survey point with projected coordinates (easting, northing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyPoint {
    pub role: PointRole,
    pub projected: [f64; 2],
}

impl SurveyPoint {
    pub fn new(role: PointRole, projected: [f64; 2]) -> Self {
        Self { role, projected }
    }
}

/// The canonical, caller-owned collection of survey points.
///
/// The set enforces identity invariants only (at most one point per role,
/// turning indices within the configured range); geometric validation happens
/// downstream. Every mutation bumps `revision`, so consumers holding derived
/// snapshots can detect staleness.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: BTreeMap<PointRole, [f64; 2]>,
    tp_limit: u32,
    revision: u64,
}

impl Default for PointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSet {
    pub fn new() -> Self {
        Self {
            points: BTreeMap::new(),
            tp_limit: MAX_TURNING_POINTS,
            revision: 0,
        }
    }

    /// Create a set that accepts turning indices 1..=limit.
    pub fn with_turning_limit(limit: u32) -> Self {
        Self {
            points: BTreeMap::new(),
            tp_limit: limit.min(MAX_TURNING_POINTS),
            revision: 0,
        }
    }

    /// Insert or replace the point for a role.
    ///
    /// No geometric validation is performed here; only the turning index
    /// range is checked.
    pub fn upsert(&mut self, role: PointRole, projected: [f64; 2]) -> Result<()> {
        if let PointRole::Turning(k) = role {
            if k == 0 || k > self.tp_limit {
                return Err(FieldcalcError::TurningIndexOutOfRange {
                    index: k,
                    limit: self.tp_limit,
                });
            }
        }
        self.points.insert(role, projected);
        self.revision += 1;
        Ok(())
    }

    pub fn remove(&mut self, role: &PointRole) -> Option<[f64; 2]> {
        let removed = self.points.remove(role);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    pub fn get(&self, role: &PointRole) -> Option<[f64; 2]> {
        self.points.get(role).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn turning_limit(&self) -> u32 {
        self.tp_limit
    }

    /// Monotonic change counter; bumps on every mutation. Snapshots taken at
    /// an earlier revision are stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Grow or shrink the valid turning-point index range.
    ///
    /// Shrinking discards points whose index falls outside the new range;
    /// growing leaves the new slots empty.
    pub fn resize(&mut self, new_count: u32) {
        self.tp_limit = new_count.min(MAX_TURNING_POINTS);
        let limit = self.tp_limit;
        self.points
            .retain(|role, _| !matches!(role, PointRole::Turning(k) if *k > limit));
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.revision += 1;
    }

    /// Deterministic iteration in role order (LM, BM, SP, TP1..TPn).
    pub fn iter(&self) -> impl Iterator<Item = SurveyPoint> + '_ {
        self.points.iter().map(|(role, coords)| SurveyPoint::new(*role, *coords))
    }

    /// Snapshot the closed polygon ring `[SP, TP1..TPn]`.
    pub fn as_ring(&self) -> Result<Ring> {
        let sp = self.points.get(&PointRole::Start).copied().ok_or_else(|| {
            FieldcalcError::IncompletePolygon {
                reason: "no start point (SP) set".to_string(),
            }
        })?;

        let mut vertices = vec![SurveyPoint::new(PointRole::Start, sp)];
        for (role, coords) in &self.points {
            if let PointRole::Turning(_) = role {
                vertices.push(SurveyPoint::new(*role, *coords));
            }
        }

        if vertices.len() < 3 {
            return Err(FieldcalcError::IncompletePolygon {
                reason: format!("only {} ring points; at least 3 required", vertices.len()),
            });
        }

        Ring::try_new(vertices)
    }
}

/// The ordered sequence `[SP, TP1, TP2, ..., TPn]` defining the closed survey
/// polygon. The ring implicitly closes back to SP; it is not validated for
/// self-intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    vertices: Vec<SurveyPoint>,
}

impl Ring {
    /// Validate role/order invariants: SP first, then TP1..TPn contiguous.
    ///
    /// Length is not checked here; the metrics engine rejects rings shorter
    /// than 3 with `InsufficientPoints`.
    pub fn try_new(vertices: Vec<SurveyPoint>) -> Result<Self> {
        let first = vertices.first().ok_or_else(|| FieldcalcError::IncompletePolygon {
            reason: "empty ring".to_string(),
        })?;
        if first.role != PointRole::Start {
            return Err(FieldcalcError::IncompletePolygon {
                reason: format!("ring must begin with SP, found {}", first.role),
            });
        }
        for (i, vertex) in vertices[1..].iter().enumerate() {
            let expected = (i + 1) as u32;
            match vertex.role {
                PointRole::Turning(k) if k == expected => {}
                PointRole::Turning(k) => {
                    return Err(FieldcalcError::IncompletePolygon {
                        reason: format!(
                            "turning point indices not contiguous: expected TP{}, found TP{}",
                            expected, k
                        ),
                    });
                }
                other => {
                    return Err(FieldcalcError::IncompletePolygon {
                        reason: format!("{} cannot be part of the ring", other),
                    });
                }
            }
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[SurveyPoint] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn start(&self) -> &SurveyPoint {
        &self.vertices[0]
    }

    /// Traversal edges of the closed ring, including the closing edge back
    /// to SP.
    pub fn edges(&self) -> impl Iterator<Item = (&SurveyPoint, &SurveyPoint)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Same polygon traversed in the opposite direction: SP stays first, the
    /// turning points are visited in reverse order and relabeled TP1..TPn.
    pub fn reversed(&self) -> Ring {
        let mut vertices = vec![self.vertices[0]];
        for (i, vertex) in self.vertices[1..].iter().rev().enumerate() {
            vertices.push(SurveyPoint::new(PointRole::Turning(i as u32 + 1), vertex.projected));
        }
        Ring { vertices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_set() -> PointSet {
        let mut set = PointSet::new();
        set.upsert(PointRole::Start, [0.0, 0.0]).unwrap();
        set.upsert(PointRole::Turning(1), [0.0, 100.0]).unwrap();
        set.upsert(PointRole::Turning(2), [100.0, 100.0]).unwrap();
        set.upsert(PointRole::Turning(3), [100.0, 0.0]).unwrap();
        set
    }

    #[test]
    fn test_role_display() {
        assert_eq!(PointRole::Start.to_string(), "SP");
        assert_eq!(PointRole::Turning(7).to_string(), "TP7");
        assert_eq!(PointRole::Landmark.to_string(), "LM");
        assert_eq!(PointRole::Benchmark.to_string(), "BM");
    }

    #[test]
    fn test_role_ordering_is_deterministic() {
        let mut roles = vec![
            PointRole::Turning(2),
            PointRole::Start,
            PointRole::Landmark,
            PointRole::Turning(1),
            PointRole::Benchmark,
        ];
        roles.sort();
        assert_eq!(
            roles,
            vec![
                PointRole::Landmark,
                PointRole::Benchmark,
                PointRole::Start,
                PointRole::Turning(1),
                PointRole::Turning(2),
            ]
        );
    }

    #[test]
    fn test_as_ring_orders_vertices() {
        let set = square_set();
        let ring = set.as_ring().unwrap();
        let roles: Vec<_> = ring.vertices().iter().map(|v| v.role).collect();
        assert_eq!(
            roles,
            vec![
                PointRole::Start,
                PointRole::Turning(1),
                PointRole::Turning(2),
                PointRole::Turning(3),
            ]
        );
    }

    #[test]
    fn test_as_ring_requires_start_point() {
        let mut set = square_set();
        set.remove(&PointRole::Start);
        assert!(matches!(
            set.as_ring(),
            Err(FieldcalcError::IncompletePolygon { .. })
        ));
    }

    #[test]
    fn test_as_ring_rejects_gap_in_turning_indices() {
        let mut set = square_set();
        set.remove(&PointRole::Turning(2));
        set.upsert(PointRole::Turning(4), [50.0, -50.0]).unwrap();
        let err = set.as_ring().unwrap_err();
        assert!(err.to_string().contains("not contiguous"));
    }

    #[test]
    fn test_as_ring_rejects_too_few_points() {
        let mut set = PointSet::new();
        set.upsert(PointRole::Start, [0.0, 0.0]).unwrap();
        set.upsert(PointRole::Turning(1), [10.0, 0.0]).unwrap();
        assert!(matches!(
            set.as_ring(),
            Err(FieldcalcError::IncompletePolygon { .. })
        ));
    }

    #[test]
    fn test_landmark_and_benchmark_excluded_from_ring() {
        let mut set = square_set();
        set.upsert(PointRole::Landmark, [500.0, 500.0]).unwrap();
        set.upsert(PointRole::Benchmark, [-500.0, 0.0]).unwrap();
        let ring = set.as_ring().unwrap();
        assert_eq!(ring.len(), 4);
        assert!(ring.vertices().iter().all(|v| v.role.is_ring_member()));
    }

    #[test]
    fn test_resize_discards_out_of_range() {
        let mut set = square_set();
        set.resize(2);
        assert_eq!(set.get(&PointRole::Turning(3)), None);
        assert!(set.get(&PointRole::Turning(2)).is_some());
        // Growing leaves slots empty.
        set.resize(10);
        assert_eq!(set.get(&PointRole::Turning(5)), None);
    }

    #[test]
    fn test_upsert_rejects_out_of_range_index() {
        let mut set = PointSet::with_turning_limit(5);
        assert!(set.upsert(PointRole::Turning(0), [0.0, 0.0]).is_err());
        assert!(set.upsert(PointRole::Turning(6), [0.0, 0.0]).is_err());
        assert!(set.upsert(PointRole::Turning(5), [0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_revision_bumps_on_mutation() {
        let mut set = PointSet::new();
        let r0 = set.revision();
        set.upsert(PointRole::Start, [1.0, 2.0]).unwrap();
        let r1 = set.revision();
        assert!(r1 > r0);
        set.resize(4);
        assert!(set.revision() > r1);
        // Failed upsert does not bump.
        let r2 = set.revision();
        let _ = set.upsert(PointRole::Turning(0), [0.0, 0.0]);
        assert_eq!(set.revision(), r2);
    }

    #[test]
    fn test_ring_edges_close_back_to_start() {
        let ring = square_set().as_ring().unwrap();
        let edges: Vec<_> = ring.edges().collect();
        assert_eq!(edges.len(), 4);
        let (last_from, last_to) = edges[3];
        assert_eq!(last_from.role, PointRole::Turning(3));
        assert_eq!(last_to.role, PointRole::Start);
    }

    #[test]
    fn test_reversed_relabels_turning_points() {
        let ring = square_set().as_ring().unwrap();
        let rev = ring.reversed();
        assert_eq!(rev.start().projected, [0.0, 0.0]);
        assert_eq!(rev.vertices()[1].role, PointRole::Turning(1));
        assert_eq!(rev.vertices()[1].projected, [100.0, 0.0]);
        assert_eq!(rev.vertices()[3].projected, [0.0, 100.0]);
    }

    #[test]
    fn test_ring_try_new_rejects_wrong_first_role() {
        let vertices = vec![
            SurveyPoint::new(PointRole::Turning(1), [0.0, 0.0]),
            SurveyPoint::new(PointRole::Turning(2), [1.0, 0.0]),
            SurveyPoint::new(PointRole::Turning(3), [1.0, 1.0]),
        ];
        assert!(Ring::try_new(vertices).is_err());
    }
}
