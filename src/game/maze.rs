//! Maze generation
//!
//! Randomized depth-first backtracking carves a spanning tree over every
//! cell, then a post-pass knocks out small 2x2 rooms on a fixed stride to
//! add loops. Spawn points, pickup sites and decorations are derived from
//! the finished passages.

use bitvec::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::constants::map::*;
use crate::game::grid::{CellCoord, Direction, Grid};
use crate::util::vec2::Vec2;

/// Maze setup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("maze must be at least 3x3 cells, got {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },
}

/// Cosmetic decoration kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Tree,
    Stone,
    Bush,
}

/// Stones come up twice as often as the others
const DECORATION_TABLE: [DecorationKind; 4] = [
    DecorationKind::Tree,
    DecorationKind::Stone,
    DecorationKind::Bush,
    DecorationKind::Stone,
];

/// A cosmetic prop. Has no collision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoration {
    pub position: Vec2,
    pub kind: DecorationKind,
    pub scale: f32,
    pub rotation: f32,
}

/// A generated map: passages plus everything derived from them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    pub grid: Grid,
    /// Index 0 is the centre spawn, the rest are corners
    pub spawns: Vec<CellCoord>,
    pub pickup_sites: Vec<CellCoord>,
    pub decorations: Vec<Decoration>,
    pub room_count: usize,
}

impl Maze {
    /// Generate a connected maze of `cols x rows` cells.
    ///
    /// Fails fast on grids too small to carve; never yields a disconnected map.
    pub fn generate<R: Rng>(
        cols: usize,
        rows: usize,
        pickup_cap: usize,
        rng: &mut R,
    ) -> Result<Self, MazeError> {
        let mut grid = Grid::new(cols, rows)?;
        carve_spanning_tree(&mut grid, rng);
        let room_count = open_rooms(&mut grid);
        let spawns = spawn_points(&grid);
        let dead_ends = dead_ends(&grid);
        let dead_end_count = dead_ends.len();
        let pickup_sites = choose_pickup_sites(dead_ends, pickup_cap, rng);
        let decorations = decorate(&grid, rng);

        debug!(
            cols,
            rows,
            dead_ends = dead_end_count,
            pickups = pickup_sites.len(),
            rooms = room_count,
            decorations = decorations.len(),
            "Maze generated"
        );

        Ok(Self {
            grid,
            spawns,
            pickup_sites,
            decorations,
            room_count,
        })
    }

    /// Spawn cell for an agent. Agent 0 takes the centre; agent `i` takes
    /// corner `i`, and agents past the last corner share it.
    pub fn spawn_for(&self, agent_index: usize) -> CellCoord {
        let last = self.spawns.len().saturating_sub(1);
        self.spawns[agent_index.min(last)]
    }
}

/// Depth-first backtracking with an explicit stack, starting at (1, 1).
fn carve_spanning_tree<R: Rng>(grid: &mut Grid, rng: &mut R) {
    let mut visited = bitvec![0; grid.len()];
    let start = CellCoord::new(1, 1);
    visited.set(grid.index(start), true);

    let mut stack = Vec::with_capacity(grid.len());
    stack.push(start);

    while let Some(&current) = stack.last() {
        let mut dirs = Direction::ALL;
        dirs.shuffle(rng);

        let next = dirs.into_iter().find_map(|dir| {
            grid.neighbor(current, dir)
                .filter(|n| !visited[grid.index(*n)])
                .map(|n| (dir, n))
        });

        match next {
            Some((dir, cell)) => {
                grid.carve(current, dir);
                visited.set(grid.index(cell), true);
                stack.push(cell);
            }
            None => {
                stack.pop();
            }
        }
    }
}

/// Open a 2x2 room every `ROOM_STRIDE` cells. Returns the number of rooms.
fn open_rooms(grid: &mut Grid) -> usize {
    let mut rooms = 0;
    for row in (1..grid.rows() - 2).step_by(ROOM_STRIDE) {
        for col in (1..grid.cols() - 2).step_by(ROOM_STRIDE) {
            let top_left = CellCoord::new(col, row);
            let top_right = CellCoord::new(col + 1, row);
            let bottom_left = CellCoord::new(col, row + 1);
            grid.carve(top_left, Direction::East);
            grid.carve(top_left, Direction::South);
            grid.carve(top_right, Direction::South);
            grid.carve(bottom_left, Direction::East);
            rooms += 1;
        }
    }
    rooms
}

/// Centre first, then the four corners inset by `SPAWN_MARGIN`
fn spawn_points(grid: &Grid) -> Vec<CellCoord> {
    let near_col = SPAWN_MARGIN.min(grid.cols() - 1);
    let near_row = SPAWN_MARGIN.min(grid.rows() - 1);
    let far_col = grid.cols().saturating_sub(1 + SPAWN_MARGIN);
    let far_row = grid.rows().saturating_sub(1 + SPAWN_MARGIN);
    vec![
        CellCoord::new(grid.cols() / 2, grid.rows() / 2),
        CellCoord::new(near_col, near_row),
        CellCoord::new(far_col, near_row),
        CellCoord::new(near_col, far_row),
        CellCoord::new(far_col, far_row),
    ]
}

/// Cells with exactly one open passage, in row-major order
pub fn dead_ends(grid: &Grid) -> Vec<CellCoord> {
    grid.coords()
        .filter(|&c| grid.passages(c).count() == 1)
        .collect()
}

/// Random sample (without replacement) of at most `cap` dead ends
fn choose_pickup_sites<R: Rng>(
    mut candidates: Vec<CellCoord>,
    cap: usize,
    rng: &mut R,
) -> Vec<CellCoord> {
    candidates.shuffle(rng);
    candidates.truncate(cap);
    candidates
}

fn decorate<R: Rng>(grid: &Grid, rng: &mut R) -> Vec<Decoration> {
    let mut decorations = Vec::new();
    for cell in grid.coords() {
        if grid.passages(cell).count() < 3 || !rng.gen_bool(DECORATION_CHANCE) {
            continue;
        }
        let offset = Vec2::new(
            rng.gen_range(-DECORATION_JITTER..DECORATION_JITTER),
            rng.gen_range(-DECORATION_JITTER..DECORATION_JITTER),
        );
        let kind = DECORATION_TABLE[rng.gen_range(0..DECORATION_TABLE.len())];
        decorations.push(Decoration {
            position: cell.center() + offset,
            kind,
            scale: rng.gen_range(0.7..1.3),
            rotation: rng.gen_range(0.0..std::f32::consts::TAU),
        });
    }
    decorations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn generate(seed: u64, cols: usize, rows: usize) -> Maze {
        let mut rng = StdRng::seed_from_u64(seed);
        Maze::generate(cols, rows, DEFAULT_PICKUP_CAP, &mut rng).unwrap()
    }

    /// Cells reachable from `start` through open passages
    fn reachable(grid: &Grid, start: CellCoord) -> Vec<bool> {
        let mut seen = vec![false; grid.len()];
        let mut queue = VecDeque::from([start]);
        seen[grid.index(start)] = true;
        while let Some(cell) = queue.pop_front() {
            for next in grid.open_neighbors(cell) {
                let idx = grid.index(next);
                if !seen[idx] {
                    seen[idx] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_every_cell_reachable() {
        for seed in 0..40 {
            let cols = 3 + (seed as usize * 7) % 30;
            let rows = 3 + (seed as usize * 5) % 20;
            let maze = generate(seed, cols, rows);
            let seen = reachable(&maze.grid, CellCoord::new(0, 0));
            assert!(
                seen.iter().all(|&s| s),
                "seed {seed}: {cols}x{rows} maze is disconnected"
            );
        }
    }

    #[test]
    fn test_passages_are_symmetric() {
        for seed in 0..20 {
            let maze = generate(seed, DEFAULT_COLS, DEFAULT_ROWS);
            let grid = &maze.grid;
            for cell in grid.coords() {
                for dir in Direction::ALL {
                    match grid.neighbor(cell, dir) {
                        Some(n) => assert_eq!(
                            grid.is_open(cell, dir),
                            grid.is_open(n, dir.opposite()),
                            "seed {seed}: asymmetric edge at {cell:?} {dir:?}"
                        ),
                        None => assert!(
                            !grid.is_open(cell, dir),
                            "seed {seed}: border open at {cell:?} {dir:?}"
                        ),
                    }
                }
            }
        }
    }

    #[test]
    fn test_default_map_corner_to_corner() {
        let maze = generate(42, DEFAULT_COLS, DEFAULT_ROWS);
        let seen = reachable(&maze.grid, CellCoord::new(1, 1));
        assert!(seen[maze.grid.index(CellCoord::new(33, 23))]);
    }

    #[test]
    fn test_pickup_sites_capped() {
        for seed in 0..10 {
            let maze = generate(seed, DEFAULT_COLS, DEFAULT_ROWS);
            assert!(maze.pickup_sites.len() <= DEFAULT_PICKUP_CAP);
            for site in &maze.pickup_sites {
                assert_eq!(maze.grid.passages(*site).count(), 1);
            }
        }
    }

    #[test]
    fn test_pickup_sites_use_all_dead_ends_under_cap() {
        let mut rng = StdRng::seed_from_u64(7);
        let maze = Maze::generate(DEFAULT_COLS, DEFAULT_ROWS, 10_000, &mut rng).unwrap();
        let mut sites = maze.pickup_sites.clone();
        sites.sort();
        assert_eq!(sites, dead_ends(&maze.grid));
    }

    #[test]
    fn test_rooms_opened() {
        let maze = generate(3, DEFAULT_COLS, DEFAULT_ROWS);
        // rows 1, 8, 15, 22 x cols 1, 8, 15, 22, 29
        assert_eq!(maze.room_count, 20);
        let grid = &maze.grid;
        let tl = CellCoord::new(8, 15);
        assert!(grid.is_open(tl, Direction::East));
        assert!(grid.is_open(tl, Direction::South));
        assert!(grid.is_open(CellCoord::new(9, 16), Direction::North));
        assert!(grid.is_open(CellCoord::new(9, 16), Direction::West));
    }

    #[test]
    fn test_spawns() {
        let maze = generate(1, DEFAULT_COLS, DEFAULT_ROWS);
        assert_eq!(
            maze.spawns,
            vec![
                CellCoord::new(17, 12),
                CellCoord::new(2, 2),
                CellCoord::new(32, 2),
                CellCoord::new(2, 22),
                CellCoord::new(32, 22),
            ]
        );
        assert_eq!(maze.spawn_for(0), CellCoord::new(17, 12));
        assert_eq!(maze.spawn_for(1), CellCoord::new(2, 2));
        assert_eq!(maze.spawn_for(9), CellCoord::new(32, 22));
    }

    #[test]
    fn test_spawns_on_smallest_grid() {
        let maze = generate(1, 3, 3);
        assert!(maze.spawns.iter().all(|s| maze.grid.contains(*s)));
        assert_eq!(maze.room_count, 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut rng = StdRng::seed_from_u64(0);
        for (cols, rows) in [(0, 0), (1, 1), (2, 25), (35, 2)] {
            let err = Maze::generate(cols, rows, 18, &mut rng).unwrap_err();
            assert_eq!(err, MazeError::InvalidDimensions { cols, rows });
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = generate(99, DEFAULT_COLS, DEFAULT_ROWS);
        let b = generate(99, DEFAULT_COLS, DEFAULT_ROWS);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.pickup_sites, b.pickup_sites);
    }

    #[test]
    fn test_decorations_only_in_open_cells() {
        let maze = generate(5, DEFAULT_COLS, DEFAULT_ROWS);
        for deco in &maze.decorations {
            let cell = maze.grid.cell_at(deco.position).unwrap();
            assert!(maze.grid.passages(cell).count() >= 3);
            assert!((0.7..1.3).contains(&deco.scale));
        }
    }
}
