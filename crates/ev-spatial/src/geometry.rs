//! Segment intersection, line of sight and ray casting.
//!
//! Everything here is pure and deterministic.  Non-finite coordinates never
//! intersect anything, so a corrupted position degrades to "visible" rather
//! than poisoning the caller with NaN comparisons.

use ev_core::{Rect, Vec2};

use crate::obstacles::ObstacleSet;

/// Determinant magnitude below which two segments are treated as parallel.
pub const PARALLEL_EPS: f32 = 1e-8;

/// Intersection point of segments `a1–a2` and `b1–b2`, if they cross.
///
/// Parallel and collinear segments report no intersection.
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    if !(a1.is_finite() && a2.is_finite() && b1.is_finite() && b2.is_finite()) {
        return None;
    }
    let r = a2 - a1;
    let s = b2 - b1;
    let det = r.cross(s);
    if det.abs() < PARALLEL_EPS {
        return None;
    }
    let qp = b1 - a1;
    let t = qp.cross(s) / det;
    let u = qp.cross(r) / det;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + r * t)
    } else {
        None
    }
}

/// `true` if segments `a1–a2` and `b1–b2` cross.
#[inline]
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    segment_intersection(a1, a2, b1, b2).is_some()
}

/// `true` if the segment crosses any edge of `rect` or has an endpoint
/// inside it.
pub fn segment_intersects_rect(p1: Vec2, p2: Vec2, rect: &Rect) -> bool {
    if !(p1.is_finite() && p2.is_finite()) {
        return false;
    }
    if rect.contains(p1) || rect.contains(p2) {
        return true;
    }
    rect.edges().iter().any(|&(e1, e2)| segments_intersect(p1, p2, e1, e2))
}

/// Squared distance from `p` to segment `a–b`.
pub fn point_segment_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= 0.0 {
        return p.distance_sq(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_sq(a + ab * t)
}

/// Squared distance between segment `p1–p2` and `rect`; zero when they
/// touch, infinite for non-finite input.
///
/// Without an intersection the closest pair always involves a segment
/// endpoint or a rectangle corner.
pub fn segment_rect_distance_sq(p1: Vec2, p2: Vec2, rect: &Rect) -> f32 {
    if !(p1.is_finite() && p2.is_finite()) {
        return f32::INFINITY;
    }
    if segment_intersects_rect(p1, p2, rect) {
        return 0.0;
    }
    let ends = rect.distance_sq_to(p1).min(rect.distance_sq_to(p2));
    rect.edges()
        .iter()
        .map(|&(corner, _)| point_segment_distance_sq(corner, p1, p2))
        .fold(ends, f32::min)
}

/// `true` if no wall blocks the straight segment between `p1` and `p2`.
///
/// Exits and doors are not part of the wall set and never block sight.
pub fn has_line_of_sight(p1: Vec2, p2: Vec2, obstacles: &ObstacleSet) -> bool {
    if !(p1.is_finite() && p2.is_finite()) {
        return true;
    }
    !obstacles.along(p1, p2).any(|wall| segment_intersects_rect(p1, p2, wall))
}

/// Cast a ray from `origin` along `angle` (radians) for up to `max_distance`.
///
/// Returns the closest point where the ray meets a wall edge, or the ray's
/// endpoint if nothing is hit.
pub fn cast_ray(origin: Vec2, angle: f32, max_distance: f32, obstacles: &ObstacleSet) -> Vec2 {
    let end = origin + Vec2::from_angle(angle) * max_distance;
    if !end.is_finite() {
        return end;
    }
    let mut best = end;
    let mut best_d2 = origin.distance_sq(end);
    for wall in obstacles.along(origin, end) {
        for (e1, e2) in wall.edges() {
            if let Some(hit) = segment_intersection(origin, end, e1, e2) {
                let d2 = origin.distance_sq(hit);
                if d2 < best_d2 {
                    best_d2 = d2;
                    best = hit;
                }
            }
        }
    }
    best
}
