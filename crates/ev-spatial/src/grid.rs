//! Uniform-grid spatial index over agent positions.
//!
//! # Layout
//!
//! The world bounds are split into `cols × rows` square cells of side
//! `cell_size`.  Each cell is a `Vec<AgentId>` bucket; a side table maps every
//! indexed agent to its current cell so `update` and `remove` never scan.
//!
//! Positions outside the bounds (including NaN) are clamped into the edge
//! cells, so an agent can never fall out of the index.
//!
//! `query_radius` returns every agent whose *cell* touches the query square.
//! Callers filter by exact distance; the index may over-return but never
//! misses an agent within `r` of the centre.

use rustc_hash::FxHashMap;

use ev_core::{AgentId, Rect, Vec2};

use crate::{SpatialError, SpatialResult};

pub struct SpatialIndex {
    bounds: Rect,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<AgentId>>,
    cell_of: FxHashMap<AgentId, usize>,
}

impl SpatialIndex {
    /// Create an empty index covering `bounds`.
    pub fn new(bounds: Rect, cell_size: f32) -> SpatialResult<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(SpatialError::InvalidCellSize(cell_size));
        }
        let cols = ((bounds.width() / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.height() / cell_size).ceil() as usize).max(1);
        Ok(Self {
            bounds,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            cell_of: FxHashMap::default(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions `(cols, rows)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Number of indexed agents.
    pub fn len(&self) -> usize {
        self.cell_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_of.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.cell_of.contains_key(&id)
    }

    /// Current `(col, row)` of an indexed agent.
    pub fn cell_of(&self, id: AgentId) -> Option<(usize, usize)> {
        self.cell_of.get(&id).map(|&c| (c % self.cols, c / self.cols))
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Index `id` at `pos`.  Re-inserting an indexed agent moves it.
    pub fn insert(&mut self, id: AgentId, pos: Vec2) {
        if self.cell_of.contains_key(&id) {
            self.update(id, pos);
            return;
        }
        let cell = self.cell_index(pos);
        self.cells[cell].push(id);
        self.cell_of.insert(id, cell);
    }

    /// Drop `id` from the index.  No-op if it was never inserted.
    pub fn remove(&mut self, id: AgentId) {
        if let Some(cell) = self.cell_of.remove(&id) {
            self.detach(id, cell);
        }
    }

    /// Move `id` to `pos`, re-bucketing only if the cell changed.
    /// No-op if it was never inserted.
    pub fn update(&mut self, id: AgentId, pos: Vec2) {
        let Some(&old) = self.cell_of.get(&id) else { return };
        let new = self.cell_index(pos);
        if new != old {
            self.detach(id, old);
            self.cells[new].push(id);
            self.cell_of.insert(id, new);
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.cell_of.clear();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Candidate agents within `r` of `center` (may include farther ones).
    ///
    /// `r <= 0` or a non-finite query yields an empty result.
    pub fn query_radius(&self, center: Vec2, r: f32) -> Vec<AgentId> {
        let mut out = Vec::new();
        if !(r > 0.0) || !center.is_finite() {
            return out;
        }
        let (c0, r0) = self.cell_coords(Vec2::new(center.x - r, center.y - r));
        let (c1, r1) = self.cell_coords(Vec2::new(center.x + r, center.y + r));
        for row in r0..=r1 {
            for col in c0..=c1 {
                out.extend_from_slice(&self.cells[row * self.cols + col]);
            }
        }
        out
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn detach(&mut self, id: AgentId, cell: usize) {
        let bucket = &mut self.cells[cell];
        if let Some(i) = bucket.iter().position(|&a| a == id) {
            bucket.swap_remove(i);
        }
    }

    fn cell_coords(&self, p: Vec2) -> (usize, usize) {
        let clamp = |v: f32, n: usize| -> usize {
            if !v.is_finite() {
                return if v == f32::INFINITY { n - 1 } else { 0 };
            }
            (v.floor().max(0.0) as usize).min(n - 1)
        };
        (
            clamp((p.x - self.bounds.min.x) / self.cell_size, self.cols),
            clamp((p.y - self.bounds.min.y) / self.cell_size, self.rows),
        )
    }

    #[inline]
    fn cell_index(&self, p: Vec2) -> usize {
        let (col, row) = self.cell_coords(p);
        row * self.cols + col
    }
}
