//! A* over the passage graph
//!
//! Nodes are cells, edges are open passages, every step costs 1 and the
//! heuristic is Manhattan distance, so returned paths are shortest in cell
//! count. Among equal f-scores the node queued first is expanded first.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bitvec::prelude::*;

use crate::game::grid::{CellCoord, Grid};
use crate::util::vec2::Vec2;

const NO_PARENT: u32 = u32::MAX;

/// Path between the cells containing two world points.
///
/// The start cell is excluded and the goal cell included. Empty when both
/// points share a cell, when either is off the map, or when the goal cannot
/// be reached.
pub fn find_path(grid: &Grid, start: Vec2, goal: Vec2) -> Vec<CellCoord> {
    match (grid.cell_at(start), grid.cell_at(goal)) {
        (Some(s), Some(g)) => find_cell_path(grid, s, g),
        _ => Vec::new(),
    }
}

/// Cell-space A*. Same contract as [`find_path`].
pub fn find_cell_path(grid: &Grid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if start == goal || !grid.contains(start) || !grid.contains(goal) {
        return Vec::new();
    }

    let n = grid.len();
    let start_idx = grid.index(start);
    let goal_idx = grid.index(goal);

    let mut g_score: Vec<u32> = vec![u32::MAX; n];
    let mut came_from: Vec<u32> = vec![NO_PARENT; n];
    let mut closed: BitVec = BitVec::repeat(false, n);

    // (f, insertion sequence, cell index); the sequence makes ties FIFO
    let mut open: BinaryHeap<Reverse<(u32, u32, u32)>> = BinaryHeap::new();
    let mut seq: u32 = 0;
    g_score[start_idx] = 0;
    open.push(Reverse((start.manhattan(goal) as u32, seq, start_idx as u32)));

    while let Some(Reverse((_, _, cur))) = open.pop() {
        let cur = cur as usize;
        if closed[cur] {
            continue;
        }
        if cur == goal_idx {
            return reconstruct(grid, &came_from, start_idx, goal_idx);
        }
        closed.set(cur, true);

        let cell = grid.coord(cur);
        let next_g = g_score[cur] + 1;
        for next in grid.open_neighbors(cell) {
            let idx = grid.index(next);
            if closed[idx] || next_g >= g_score[idx] {
                continue;
            }
            g_score[idx] = next_g;
            came_from[idx] = cur as u32;
            seq += 1;
            let f = next_g + next.manhattan(goal) as u32;
            open.push(Reverse((f, seq, idx as u32)));
        }
    }

    Vec::new()
}

/// Walk parent links back from the goal, stopping before the start cell
fn reconstruct(grid: &Grid, came_from: &[u32], start_idx: usize, goal_idx: usize) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cur = goal_idx;
    while cur != start_idx {
        path.push(grid.coord(cur));
        let parent = came_from[cur];
        if parent == NO_PARENT {
            break;
        }
        cur = parent as usize;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::Direction;
    use crate::game::maze::Maze;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::VecDeque;

    fn maze(seed: u64) -> Maze {
        let mut rng = StdRng::seed_from_u64(seed);
        Maze::generate(35, 25, 18, &mut rng).unwrap()
    }

    /// Exhaustive BFS distance in steps
    fn bfs_distance(grid: &Grid, start: CellCoord, goal: CellCoord) -> Option<usize> {
        let mut dist = vec![usize::MAX; grid.len()];
        let mut queue = VecDeque::from([start]);
        dist[grid.index(start)] = 0;
        while let Some(cell) = queue.pop_front() {
            if cell == goal {
                return Some(dist[grid.index(cell)]);
            }
            let d = dist[grid.index(cell)];
            for next in grid.open_neighbors(cell) {
                let idx = grid.index(next);
                if dist[idx] == usize::MAX {
                    dist[idx] = d + 1;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn assert_walkable(grid: &Grid, start: CellCoord, path: &[CellCoord]) {
        let mut prev = start;
        for &step in path {
            assert_eq!(prev.manhattan(step), 1, "{prev:?} -> {step:?} is not a single step");
            assert!(
                grid.open_neighbors(prev).any(|n| n == step),
                "{prev:?} -> {step:?} crosses a wall"
            );
            prev = step;
        }
    }

    #[test]
    fn test_matches_bfs_distance() {
        for seed in 0..5 {
            let maze = maze(seed);
            let grid = &maze.grid;
            let mut rng = StdRng::seed_from_u64(seed + 100);
            for _ in 0..200 {
                let start = CellCoord::new(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()));
                let goal = CellCoord::new(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()));
                let path = find_cell_path(grid, start, goal);
                let expected = bfs_distance(grid, start, goal).unwrap();
                assert_eq!(path.len(), expected, "seed {seed}: {start:?} -> {goal:?}");
                if start != goal {
                    assert_eq!(path.last(), Some(&goal));
                    assert_walkable(grid, start, &path);
                }
            }
        }
    }

    #[test]
    fn test_corner_to_corner() {
        let maze = maze(42);
        let path = find_cell_path(&maze.grid, CellCoord::new(1, 1), CellCoord::new(33, 23));
        assert!(!path.is_empty());
        assert!(path.len() >= 32 + 22);
        assert_walkable(&maze.grid, CellCoord::new(1, 1), &path);
    }

    #[test]
    fn test_same_cell_is_empty() {
        let maze = maze(1);
        let a = Vec2::new(100.0, 100.0);
        let b = Vec2::new(110.0, 90.0);
        assert!(find_path(&maze.grid, a, b).is_empty());
    }

    #[test]
    fn test_off_map_is_empty() {
        let maze = maze(1);
        let inside = CellCoord::new(3, 3).center();
        assert!(find_path(&maze.grid, inside, Vec2::new(-10.0, 50.0)).is_empty());
        assert!(find_path(&maze.grid, Vec2::new(1e6, 50.0), inside).is_empty());
        assert!(find_cell_path(&maze.grid, CellCoord::new(99, 0), CellCoord::new(0, 0)).is_empty());
    }

    #[test]
    fn test_unreachable_is_empty() {
        // two carved islands with no link between them
        let mut grid = Grid::new(4, 3).unwrap();
        grid.carve(CellCoord::new(0, 0), Direction::East);
        grid.carve(CellCoord::new(2, 2), Direction::East);
        assert!(find_cell_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 2)).is_empty());
        assert_eq!(
            find_cell_path(&grid, CellCoord::new(0, 0), CellCoord::new(1, 0)),
            vec![CellCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_world_path_uses_containing_cells() {
        let maze = maze(8);
        let start = CellCoord::new(2, 2);
        let goal = CellCoord::new(30, 20);
        let from_world = find_path(
            &maze.grid,
            start.center() + Vec2::new(-20.0, 15.0),
            goal.center() + Vec2::new(20.0, -15.0),
        );
        assert_eq!(from_world, find_cell_path(&maze.grid, start, goal));
    }

    #[test]
    fn test_deterministic() {
        let maze = maze(3);
        let a = find_cell_path(&maze.grid, CellCoord::new(0, 0), CellCoord::new(34, 24));
        let b = find_cell_path(&maze.grid, CellCoord::new(0, 0), CellCoord::new(34, 24));
        assert_eq!(a, b);
    }
}
