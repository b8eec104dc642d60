//! Point ordering normalizer.
//!
//! Imported point sets often carry names but no trustworthy traversal order.
//! This module deduplicates them, picks the start point, and reorders the
//! remaining ring candidates into a clockwise traversal around the centroid,
//! relabeling them TP1..TPn.

use crate::error::{FieldcalcError, Result};
use crate::models::point::{PointRole, Ring, SurveyPoint, MAX_TURNING_POINTS};
use geo::algorithm::centroid::Centroid;
use geo::{MultiPoint, Point};
use std::f64::consts::TAU;

/// Result of normalization: the clockwise ring plus the reference points
/// (LM/BM) that never participate in it.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub ring: Ring,
    pub reference_points: Vec<SurveyPoint>,
}

/// Build a valid clockwise [`Ring`] from an unordered, possibly duplicated
/// set of classified points.
///
/// Policy: a point explicitly classified `SP` is the start point; with none
/// present, the first point in input order is promoted (callers wanting
/// interactive disambiguation should prompt before calling). More than one
/// explicit `SP` is an error. Output is deterministic for a fixed input
/// sequence.
pub fn normalize_ordering(points: Vec<SurveyPoint>) -> Result<Normalized> {
    // Exact-coordinate dedup, first occurrence wins. No distance tolerance.
    let mut deduped: Vec<SurveyPoint> = Vec::new();
    for point in points {
        if !deduped.iter().any(|p| p.projected == point.projected) {
            deduped.push(point);
        }
    }

    if deduped.is_empty() {
        return Err(FieldcalcError::TooFewRingPoints { found: 0 });
    }

    let explicit_sp = deduped
        .iter()
        .filter(|p| p.role == PointRole::Start)
        .count();
    if explicit_sp > 1 {
        return Err(FieldcalcError::AmbiguousStartPoint {
            candidates: explicit_sp,
        });
    }
    let sp_index = deduped
        .iter()
        .position(|p| p.role == PointRole::Start)
        .unwrap_or(0);
    let sp = SurveyPoint::new(PointRole::Start, deduped.remove(sp_index).projected);

    let (reference_points, mut candidates): (Vec<_>, Vec<_>) = deduped
        .into_iter()
        .partition(|p| matches!(p.role, PointRole::Landmark | PointRole::Benchmark));
    candidates.truncate(MAX_TURNING_POINTS as usize);

    let ring_len = candidates.len() + 1;
    if ring_len < 3 {
        return Err(FieldcalcError::TooFewRingPoints { found: ring_len });
    }

    // Centroid of SP plus all ring candidates (arithmetic mean of vertices).
    let cloud: MultiPoint<f64> = std::iter::once(&sp)
        .chain(candidates.iter())
        .map(|p| Point::new(p.projected[0], p.projected[1]))
        .collect::<Vec<_>>()
        .into();
    let centroid = match cloud.centroid() {
        Some(c) => c,
        None => unreachable!(),
    };

    let sp_angle = angle_from(&sp, &centroid);
    // Descending relative angle yields a clockwise traversal starting
    // immediately after SP. Stable sort keeps ties in input order.
    candidates.sort_by(|a, b| {
        let ka = (angle_from(a, &centroid) - sp_angle).rem_euclid(TAU);
        let kb = (angle_from(b, &centroid) - sp_angle).rem_euclid(TAU);
        kb.total_cmp(&ka)
    });

    let mut vertices = vec![sp];
    for (i, candidate) in candidates.into_iter().enumerate() {
        vertices.push(SurveyPoint::new(
            PointRole::Turning(i as u32 + 1),
            candidate.projected,
        ));
    }

    Ok(Normalized {
        ring: Ring::try_new(vertices)?,
        reference_points,
    })
}

fn angle_from(point: &SurveyPoint, centroid: &Point<f64>) -> f64 {
    (point.projected[1] - centroid.y()).atan2(point.projected[0] - centroid.x())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(role: PointRole, x: f64, y: f64) -> SurveyPoint {
        SurveyPoint::new(role, [x, y])
    }

    #[test]
    fn test_square_scrambled_input_traces_perimeter() {
        let input = vec![
            pt(PointRole::Turning(9), 100.0, 0.0),
            pt(PointRole::Turning(2), 0.0, 100.0),
            pt(PointRole::Start, 0.0, 0.0),
            pt(PointRole::Turning(5), 100.0, 100.0),
        ];
        let normalized = normalize_ordering(input).unwrap();
        let coords: Vec<_> = normalized
            .ring
            .vertices()
            .iter()
            .map(|v| v.projected)
            .collect();
        assert_eq!(
            coords,
            vec![[0.0, 0.0], [0.0, 100.0], [100.0, 100.0], [100.0, 0.0]]
        );
        // Relabeled contiguously after SP.
        assert_eq!(normalized.ring.vertices()[1].role, PointRole::Turning(1));
        assert_eq!(normalized.ring.vertices()[3].role, PointRole::Turning(3));
    }

    #[test]
    fn test_deterministic_across_calls() {
        let input = vec![
            pt(PointRole::Start, 12.0, 7.0),
            pt(PointRole::Turning(1), 80.0, 15.0),
            pt(PointRole::Turning(2), 95.0, 70.0),
            pt(PointRole::Turning(3), 40.0, 98.0),
            pt(PointRole::Turning(4), -10.0, 55.0),
        ];
        let a = normalize_ordering(input.clone()).unwrap();
        let b = normalize_ordering(input).unwrap();
        assert_eq!(a.ring, b.ring);
    }

    #[test]
    fn test_promotes_first_point_without_explicit_sp() {
        let input = vec![
            pt(PointRole::Turning(3), 0.0, 0.0),
            pt(PointRole::Turning(1), 0.0, 100.0),
            pt(PointRole::Turning(2), 100.0, 100.0),
        ];
        let normalized = normalize_ordering(input).unwrap();
        assert_eq!(normalized.ring.start().role, PointRole::Start);
        assert_eq!(normalized.ring.start().projected, [0.0, 0.0]);
    }

    #[test]
    fn test_multiple_explicit_sp_is_ambiguous() {
        let input = vec![
            pt(PointRole::Start, 0.0, 0.0),
            pt(PointRole::Start, 50.0, 50.0),
            pt(PointRole::Turning(1), 0.0, 100.0),
            pt(PointRole::Turning(2), 100.0, 100.0),
        ];
        assert!(matches!(
            normalize_ordering(input),
            Err(FieldcalcError::AmbiguousStartPoint { candidates: 2 })
        ));
    }

    #[test]
    fn test_reference_points_excluded_and_passed_through() {
        let input = vec![
            pt(PointRole::Start, 0.0, 0.0),
            pt(PointRole::Landmark, 500.0, 500.0),
            pt(PointRole::Turning(1), 0.0, 100.0),
            pt(PointRole::Benchmark, -300.0, 0.0),
            pt(PointRole::Turning(2), 100.0, 100.0),
            pt(PointRole::Turning(3), 100.0, 0.0),
        ];
        let normalized = normalize_ordering(input).unwrap();
        assert_eq!(normalized.ring.len(), 4);
        assert_eq!(normalized.reference_points.len(), 2);
        assert!(normalized
            .reference_points
            .iter()
            .all(|p| !p.role.is_ring_member()));
    }

    #[test]
    fn test_exact_duplicates_removed() {
        let input = vec![
            pt(PointRole::Start, 0.0, 0.0),
            pt(PointRole::Turning(1), 0.0, 100.0),
            pt(PointRole::Turning(2), 0.0, 100.0), // bit-identical duplicate
            pt(PointRole::Turning(3), 100.0, 100.0),
            pt(PointRole::Turning(4), 100.0, 0.0),
        ];
        let normalized = normalize_ordering(input).unwrap();
        assert_eq!(normalized.ring.len(), 4);
    }

    #[test]
    fn test_too_few_ring_points() {
        let input = vec![
            pt(PointRole::Start, 0.0, 0.0),
            pt(PointRole::Turning(1), 10.0, 10.0),
        ];
        assert!(matches!(
            normalize_ordering(input),
            Err(FieldcalcError::TooFewRingPoints { found: 2 })
        ));

        // Dedup can push a set below the threshold.
        let input = vec![
            pt(PointRole::Start, 0.0, 0.0),
            pt(PointRole::Turning(1), 10.0, 10.0),
            pt(PointRole::Turning(2), 10.0, 10.0),
        ];
        assert!(matches!(
            normalize_ordering(input),
            Err(FieldcalcError::TooFewRingPoints { found: 2 })
        ));

        assert!(matches!(
            normalize_ordering(vec![]),
            Err(FieldcalcError::TooFewRingPoints { found: 0 })
        ));
    }

    #[test]
    fn test_unnamed_points_become_ring_candidates() {
        // Points whose role came in as Turning with arbitrary indices are
        // ring candidates regardless of those indices.
        let input = vec![
            pt(PointRole::Turning(7), 0.0, 0.0),
            pt(PointRole::Turning(7), 100.0, 0.0),
            pt(PointRole::Turning(7), 100.0, 100.0),
            pt(PointRole::Turning(7), 0.0, 100.0),
        ];
        let normalized = normalize_ordering(input).unwrap();
        assert_eq!(normalized.ring.len(), 4);
        let roles: Vec<_> = normalized.ring.vertices().iter().map(|v| v.role).collect();
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
}
