//! `ev-spatial`: geometry, obstacle indexing, agent indexing and path planning.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`geometry`]  | segment / rectangle intersection, line of sight, ray casting |
//! | [`obstacles`] | `ObstacleSet` (wall rectangles behind an R-tree)             |
//! | [`grid`]      | `SpatialIndex`, the uniform-grid agent index                 |
//! | [`planner`]   | `Planner` trait, `Path`, `GridPathfinder`                    |
//! | [`map`]       | `WorldMap`, colour-coded obstacle-map loader                 |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod geometry;
pub mod grid;
pub mod map;
pub mod obstacles;
pub mod planner;


pub use error::{SpatialError, SpatialResult};
pub use geometry::{
    cast_ray, has_line_of_sight, point_segment_distance_sq, segment_intersection, segment_intersects_rect,
    segment_rect_distance_sq, segments_intersect,
};
pub use grid::SpatialIndex;
pub use map::{load_map_file, load_map_str, parse_map, try_load_map_file, CellKind, WorldMap};
pub use obstacles::ObstacleSet;
pub use planner::{with_goal_fallback, GridPathfinder, Path, Planner};
