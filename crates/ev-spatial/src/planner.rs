//! Path planning trait and the default lattice A* implementation.
//!
//! # Pluggability
//!
//! `ev-mobility` plans through the [`Planner`] trait, so applications can
//! swap in a navigation mesh, a flow field or a precomputed roadmap without
//! touching the motion model.  The default [`GridPathfinder`] searches a
//! lattice anchored at the start point and needs no preprocessing, which
//! suits maps that are loaded once and queried rarely (a handful of
//! evacuation and pursuit requests per agent).
//!
//! # Failure
//!
//! Planning never errors.  An unreachable goal yields an empty [`Path`];
//! [`with_goal_fallback`] turns that into the straight-line fallback the
//! motion model expects.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};

use ev_core::{PlannerParams, Rect, Vec2};

use crate::obstacles::ObstacleSet;

// ── Path ──────────────────────────────────────────────────────────────────────

/// Ordered waypoints, consumed front to back.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    waypoints: VecDeque<Vec2>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-waypoint path straight to `goal`.
    pub fn direct(goal: Vec2) -> Self {
        Self { waypoints: VecDeque::from([goal]) }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self { waypoints: points.into_iter().collect() }
    }

    #[inline]
    pub fn front(&self) -> Option<Vec2> {
        self.waypoints.front().copied()
    }

    #[inline]
    pub fn back(&self) -> Option<Vec2> {
        self.waypoints.back().copied()
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<Vec2> {
        self.waypoints.pop_front()
    }

    pub fn push_back(&mut self, p: Vec2) {
        self.waypoints.push_back(p);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.waypoints.iter()
    }
}

/// Apply the caller-side planning policy: an empty path becomes a direct
/// path to `goal`; a path that stops short gets the exact goal appended.
pub fn with_goal_fallback(mut path: Path, goal: Vec2) -> Path {
    if path.is_empty() {
        return Path::direct(goal);
    }
    if path.back() != Some(goal) {
        path.push_back(goal);
    }
    path
}

// ── Planner trait ─────────────────────────────────────────────────────────────

/// Pluggable path planner.
pub trait Planner {
    /// Plan from `start` toward `goal` around the walls in `obstacles`.
    ///
    /// Returns an empty path when the goal is unreachable.
    fn find_path(&self, start: Vec2, goal: Vec2, obstacles: &ObstacleSet) -> Path;
}

// ── GridPathfinder ────────────────────────────────────────────────────────────

/// Best-first (A*) search over an 8-connected lattice of spacing `step`
/// anchored at the start point.
///
/// A lattice node is usable when it lies inside the world bounds and a
/// square probe of half-size `probe_half` around it does not overlap a wall.
/// The search ends at the first popped node within `goal_tolerance` of the
/// goal; the returned path starts at `start` and ends at that node.
///
/// Ties on `f = g + h` are broken by insertion order, so identical inputs
/// always produce identical paths.
#[derive(Clone, Debug, Default)]
pub struct GridPathfinder {
    pub params: PlannerParams,
}

impl GridPathfinder {
    pub fn new(params: PlannerParams) -> Self {
        Self { params }
    }
}

impl Planner for GridPathfinder {
    fn find_path(&self, start: Vec2, goal: Vec2, obstacles: &ObstacleSet) -> Path {
        astar(&self.params, start, goal, obstacles)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Lattice coordinates relative to the start point.
type Node = (i32, i32);

const NEIGHBOURS: [(i32, i32); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

/// Heap entry.  `Ord` is reversed so `BinaryHeap` pops the smallest `f`,
/// then the earliest `seq`.
struct OpenEntry {
    f: f32,
    seq: u64,
    node: Node,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

fn astar(params: &PlannerParams, start: Vec2, goal: Vec2, obstacles: &ObstacleSet) -> Path {
    if !(start.is_finite() && goal.is_finite()) || !(params.step > 0.0) {
        return Path::new();
    }

    let step = params.step;
    let bounds = obstacles.bounds();
    let position = |(i, j): Node| start + Vec2::new(i as f32 * step, j as f32 * step);

    let mut g: FxHashMap<Node, f32> = FxHashMap::default();
    let mut came_from: FxHashMap<Node, Node> = FxHashMap::default();
    let mut closed: FxHashSet<Node> = FxHashSet::default();
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    g.insert((0, 0), 0.0);
    open.push(OpenEntry { f: start.distance(goal), seq, node: (0, 0) });

    let mut expansions = 0usize;
    while let Some(OpenEntry { node, .. }) = open.pop() {
        // Skip stale heap entries.
        if !closed.insert(node) {
            continue;
        }

        let here = position(node);
        if here.distance(goal) <= params.goal_tolerance {
            return reconstruct(&came_from, node, position);
        }

        expansions += 1;
        if expansions > params.max_expansions {
            break;
        }

        let g_here = g.get(&node).copied().unwrap_or(f32::INFINITY);
        for (di, dj) in NEIGHBOURS {
            let next = (node.0 + di, node.1 + dj);
            if closed.contains(&next) {
                continue;
            }
            let p = position(next);
            if !bounds.contains(p) || blocked(p, params.probe_half, obstacles) {
                continue;
            }
            let cost = g_here + if di != 0 && dj != 0 { step * std::f32::consts::SQRT_2 } else { step };
            if cost < g.get(&next).copied().unwrap_or(f32::INFINITY) {
                g.insert(next, cost);
                came_from.insert(next, node);
                seq += 1;
                open.push(OpenEntry { f: cost + p.distance(goal), seq, node: next });
            }
        }
    }

    Path::new()
}

#[inline]
fn blocked(p: Vec2, probe_half: f32, obstacles: &ObstacleSet) -> bool {
    obstacles.overlaps_any(&Rect::around(p, probe_half))
}

fn reconstruct(came_from: &FxHashMap<Node, Node>, end: Node, position: impl Fn(Node) -> Vec2) -> Path {
    let mut nodes = vec![end];
    let mut cur = end;
    while let Some(&prev) = came_from.get(&cur) {
        nodes.push(prev);
        cur = prev;
    }
    nodes.reverse();
    Path::from_points(nodes.into_iter().map(position))
}
