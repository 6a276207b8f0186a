//! Synthetic single-storey school floor plan.
//!
//! An 80 × 60 cell colour grid in the map-loader format: a central
//! east–west corridor with an exit at each end, four classrooms on each
//! side, and a door from every classroom into the corridor.

pub const COLS: usize = 80;
pub const ROWS: usize = 60;

const FREE: [u8; 3] = [255, 255, 255];
const WALL: [u8; 3] = [0, 0, 0];
const EXIT: [u8; 3] = [0, 200, 0];
const DOOR: [u8; 3] = [200, 0, 0];

/// Corridor walls (row indices).
const NORTH_WALL: usize = 26;
const SOUTH_WALL: usize = 33;
/// Classroom dividers (column indices).
const DIVIDERS: [usize; 3] = [20, 40, 60];
/// First column of each classroom door; doors are three cells wide.
const DOORS: [usize; 4] = [9, 29, 49, 69];

/// Render the floor plan as the JSON the map loader reads.
pub fn school_json() -> Result<String, serde_json::Error> {
    let mut grid = vec![vec![FREE; COLS]; ROWS];

    for row in [NORTH_WALL, SOUTH_WALL] {
        for col in 0..COLS {
            grid[row][col] = WALL;
        }
        for start in DOORS {
            for col in start..start + 3 {
                grid[row][col] = DOOR;
            }
        }
    }

    for col in DIVIDERS {
        for row in (0..NORTH_WALL).chain(SOUTH_WALL + 1..ROWS) {
            grid[row][col] = WALL;
        }
    }

    for row in NORTH_WALL + 2..SOUTH_WALL - 1 {
        grid[row][0] = EXIT;
        grid[row][COLS - 1] = EXIT;
    }

    serde_json::to_string(&grid)
}
