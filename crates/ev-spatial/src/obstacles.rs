//! Static wall set with an R-tree for proximity and segment queries.
//!
//! # Spatial index
//!
//! Walls are bulk-loaded into an R-tree (via `rstar`) keyed by their
//! axis-aligned envelope.  Every query first collects the walls whose
//! envelope touches a query box and then runs the exact test, so results are
//! identical to scanning the full list; only the candidate count changes.

use rstar::{RTree, RTreeObject, AABB};

use ev_core::{Rect, Vec2};

use crate::geometry::segment_rect_distance_sq;

// ── R-tree wall entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct WallEntry {
    rect: Rect,
}

impl RTreeObject for WallEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.rect.min.x, self.rect.min.y], [self.rect.max.x, self.rect.max.y])
    }
}

// ── ObstacleSet ───────────────────────────────────────────────────────────────

/// The world bounds plus every movement- and sight-blocking rectangle.
pub struct ObstacleSet {
    bounds: Rect,
    walls: Vec<Rect>,
    tree: RTree<WallEntry>,
}

impl ObstacleSet {
    pub fn new(bounds: Rect, walls: Vec<Rect>) -> Self {
        let tree = RTree::bulk_load(walls.iter().map(|&rect| WallEntry { rect }).collect());
        Self { bounds, walls, tree }
    }

    /// A world with no walls.
    pub fn empty(bounds: Rect) -> Self {
        Self::new(bounds, Vec::new())
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// All walls in insertion order.
    #[inline]
    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Walls whose envelope touches `area` (closed test).
    pub fn in_box(&self, area: Rect) -> impl Iterator<Item = &Rect> + '_ {
        let envelope = AABB::from_corners([area.min.x, area.min.y], [area.max.x, area.max.y]);
        self.tree.locate_in_envelope_intersecting(&envelope).map(|e| &e.rect)
    }

    /// Walls that may lie within `margin` of `p`.
    #[inline]
    pub fn near(&self, p: Vec2, margin: f32) -> impl Iterator<Item = &Rect> + '_ {
        self.in_box(Rect::around(p, margin.max(0.0)))
    }

    /// Walls whose envelope touches the bounding box of segment `a–b`.
    #[inline]
    pub fn along(&self, a: Vec2, b: Vec2) -> impl Iterator<Item = &Rect> + '_ {
        self.in_box(Rect::new(a, b))
    }

    /// `true` if `area`'s interior overlaps any wall's interior.
    pub fn overlaps_any(&self, area: &Rect) -> bool {
        self.in_box(*area).any(|wall| wall.overlaps(area))
    }

    /// `true` if the disk at `center` with `radius` overlaps any wall.
    pub fn disk_hits_wall(&self, center: Vec2, radius: f32) -> bool {
        self.near(center, radius).any(|wall| wall.intersects_circle(center, radius))
    }

    /// `true` if a disk of `radius` moving straight from `from` to `to`
    /// would overlap a wall it is not already overlapping at `from`.
    pub fn sweep_hits_wall(&self, from: Vec2, to: Vec2, radius: f32) -> bool {
        let r2 = radius * radius;
        self.in_box(Rect::new(from, to).inflate(radius.max(0.0))).any(|wall| {
            !wall.intersects_circle(from, radius) && segment_rect_distance_sq(from, to, wall) < r2
        })
    }
}

impl std::fmt::Debug for ObstacleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstacleSet")
            .field("bounds", &self.bounds)
            .field("walls", &self.walls.len())
            .finish()
    }
}
