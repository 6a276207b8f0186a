//! Colour-coded obstacle-map loader.
//!
//! # Format
//!
//! A map is a JSON array of rows, each row an array of `[r, g, b]` pixels
//! (0–255).  Row `i`, column `j` covers the world square
//! `[j·scale, (j+1)·scale] × [i·scale, (i+1)·scale]`.
//!
//! | Colour | Meaning                                          |
//! |--------|--------------------------------------------------|
//! | black  | wall (blocks movement and sight)                 |
//! | green  | exit (evacuation goal; passable, transparent)    |
//! | red    | door (passable marker; blocks nothing)           |
//! | other  | free floor                                       |
//!
//! Horizontal runs of identical cells are merged into one rectangle per run,
//! which keeps a typical floor plan to a few hundred walls.
//!
//! # Failure
//!
//! [`load_map_file`] / [`load_map_str`] never fail: malformed input logs a
//! warning and yields an empty map, so the simulation still runs in an open
//! world.  The `try_` / [`parse_map`] variants return the error instead.

use std::path::Path as FsPath;

use tracing::{debug, warn};

use ev_core::{Rect, Vec2};

use crate::{SpatialError, SpatialResult};

// ── Cell classification ──────────────────────────────────────────────────────

/// What a single map pixel represents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CellKind {
    Free,
    Wall,
    Exit,
    Door,
}

impl CellKind {
    /// Classify an RGB pixel.
    pub fn classify(r: f64, g: f64, b: f64) -> CellKind {
        const DARK: f64 = 50.0;
        const BRIGHT: f64 = 150.0;
        const DIM: f64 = 100.0;
        if r < DARK && g < DARK && b < DARK {
            CellKind::Wall
        } else if g > BRIGHT && r < DIM && b < DIM {
            CellKind::Exit
        } else if r > BRIGHT && g < DIM && b < DIM {
            CellKind::Door
        } else {
            CellKind::Free
        }
    }
}

// ── WorldMap ──────────────────────────────────────────────────────────────────

/// Static layout: wall, exit and door rectangles in world units.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldMap {
    /// Width/height covered by the source grid (zero for an empty map).
    pub extent: Vec2,
    pub walls: Vec<Rect>,
    pub exits: Vec<Rect>,
    pub doors: Vec<Rect>,
}

impl WorldMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build directly from rectangles (synthetic maps, tests).
    pub fn from_rects(walls: Vec<Rect>, exits: Vec<Rect>, doors: Vec<Rect>) -> Self {
        let mut extent = Vec2::ZERO;
        for r in walls.iter().chain(&exits).chain(&doors) {
            extent.x = extent.x.max(r.max.x);
            extent.y = extent.y.max(r.max.y);
        }
        Self { extent, walls, exits, doors }
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.exits.is_empty() && self.doors.is_empty()
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a JSON pixel grid into a [`WorldMap`] with `scale` world units per cell.
pub fn parse_map(json: &str, scale: f32) -> SpatialResult<WorldMap> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(SpatialError::MapFormat(format!("scale must be positive, got {scale}")));
    }
    let grid: Vec<Vec<Vec<f64>>> = serde_json::from_str(json)?;

    let mut map = WorldMap::empty();
    let mut max_cols = 0usize;
    for (row, pixels) in grid.iter().enumerate() {
        max_cols = max_cols.max(pixels.len());
        let kinds = pixels
            .iter()
            .enumerate()
            .map(|(col, px)| match px.as_slice() {
                [r, g, b] => Ok(CellKind::classify(*r, *g, *b)),
                _ => Err(SpatialError::MapFormat(format!(
                    "pixel ({row}, {col}) has {} channels, expected 3",
                    px.len()
                ))),
            })
            .collect::<SpatialResult<Vec<_>>>()?;
        merge_row(&kinds, row, scale, &mut map);
    }
    map.extent = Vec2::new(max_cols as f32 * scale, grid.len() as f32 * scale);

    debug!(
        walls = map.walls.len(),
        exits = map.exits.len(),
        doors = map.doors.len(),
        "obstacle map parsed"
    );
    Ok(map)
}

/// Read and parse a map file.
pub fn try_load_map_file(path: impl AsRef<FsPath>, scale: f32) -> SpatialResult<WorldMap> {
    let text = std::fs::read_to_string(path)?;
    parse_map(&text, scale)
}

/// Parse a map, degrading to an empty map on error.
pub fn load_map_str(json: &str, scale: f32) -> WorldMap {
    parse_map(json, scale).unwrap_or_else(|e| {
        warn!(error = %e, "obstacle map rejected; running without obstacles");
        WorldMap::empty()
    })
}

/// Load a map file, degrading to an empty map if it is missing or malformed.
pub fn load_map_file(path: impl AsRef<FsPath>, scale: f32) -> WorldMap {
    let path = path.as_ref();
    try_load_map_file(path, scale).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "obstacle map unavailable; running without obstacles");
        WorldMap::empty()
    })
}

/// Merge horizontal runs of non-free cells in one row into rectangles.
fn merge_row(kinds: &[CellKind], row: usize, scale: f32, map: &mut WorldMap) {
    let y = row as f32 * scale;
    let mut col = 0;
    while col < kinds.len() {
        let kind = kinds[col];
        let start = col;
        while col < kinds.len() && kinds[col] == kind {
            col += 1;
        }
        let rect = Rect::from_xywh(start as f32 * scale, y, (col - start) as f32 * scale, scale);
        match kind {
            CellKind::Wall => map.walls.push(rect),
            CellKind::Exit => map.exits.push(rect),
            CellKind::Door => map.doors.push(rect),
            CellKind::Free => {}
        }
    }
}
