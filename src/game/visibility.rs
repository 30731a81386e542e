//! Line of sight
//!
//! Sampled, not exact: the segment is walked in steps no longer than a wall
//! band and fails on the first sample that lands in a wall. A crossed band
//! always contains a sample; only a segment grazing a pillar corner can slip
//! past.

use crate::game::collision::is_wall;
use crate::game::constants::visibility::LOS_STEP;
use crate::game::grid::Grid;
use crate::util::vec2::Vec2;

/// True if no interior sample of the segment `from -> to` is inside a wall.
/// The endpoints themselves are not tested.
pub fn has_los(grid: &Grid, from: Vec2, to: Vec2) -> bool {
    let delta = to - from;
    let steps = (delta.length() / LOS_STEP).ceil() as usize;
    (1..steps).all(|i| {
        let t = i as f32 / steps as f32;
        !is_wall(grid, from + delta * t)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::{CellCoord, Direction};
    use crate::game::maze::Maze;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// 4x1 corridor, open between cells 0-1 and 1-2, closed between 2-3
    fn corridor() -> Grid {
        let mut grid = Grid::new(4, 3).unwrap();
        grid.carve(CellCoord::new(0, 1), Direction::East);
        grid.carve(CellCoord::new(1, 1), Direction::East);
        grid
    }

    #[test]
    fn test_clear_along_open_corridor() {
        let grid = corridor();
        let a = CellCoord::new(0, 1).center();
        let b = CellCoord::new(2, 1).center();
        assert!(has_los(&grid, a, b));
        assert!(has_los(&grid, b, a));
    }

    #[test]
    fn test_blocked_by_closed_edge() {
        let grid = corridor();
        let a = CellCoord::new(1, 1).center();
        let b = CellCoord::new(3, 1).center();
        assert!(!has_los(&grid, a, b));
    }

    #[test]
    fn test_blocked_through_pillar() {
        let grid = corridor();
        // straight down through the open cell's SE pillar
        let a = Vec2::new(124.0, 70.0);
        let b = Vec2::new(124.0, 140.0);
        assert!(!has_los(&grid, a, b));
    }

    #[test]
    fn test_degenerate_segments() {
        let grid = corridor();
        let a = CellCoord::new(0, 1).center();
        assert!(has_los(&grid, a, a));
        assert!(has_los(&grid, a, a + Vec2::new(3.0, 0.0)));
    }

    /// Along a line through cell centres every crossed wall band is 16 px
    /// wide, so sampling there is exact and sub-segments of a clear segment
    /// must stay clear.
    #[test]
    fn test_clear_segment_has_clear_subsegments() {
        let mut rng = StdRng::seed_from_u64(5);
        let maze = Maze::generate(35, 25, 18, &mut rng).unwrap();
        let grid = &maze.grid;
        let mut clear_cases = 0;

        for _ in 0..4_000 {
            let (a, b) = if rng.gen_bool(0.5) {
                let row = rng.gen_range(0..grid.rows());
                let c0 = rng.gen_range(0..grid.cols());
                let c1 = rng.gen_range(0..grid.cols());
                (CellCoord::new(c0, row).center(), CellCoord::new(c1, row).center())
            } else {
                let col = rng.gen_range(0..grid.cols());
                let r0 = rng.gen_range(0..grid.rows());
                let r1 = rng.gen_range(0..grid.rows());
                (CellCoord::new(col, r0).center(), CellCoord::new(col, r1).center())
            };
            if !has_los(grid, a, b) {
                continue;
            }
            clear_cases += 1;
            for _ in 0..8 {
                let mut t0: f32 = rng.gen_range(0.01..0.99);
                let mut t1: f32 = rng.gen_range(0.01..0.99);
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                let p = a.lerp(b, t0);
                let q = a.lerp(b, t1);
                assert!(has_los(grid, p, q), "{a:?}->{b:?} clear but {p:?}->{q:?} blocked");
            }
        }
        assert!(clear_cases > 100);
    }
}
