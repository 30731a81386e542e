//! Passage grid
//!
//! The maze is a `cols x rows` array of cells. Each cell stores which of its
//! four edges are open passages; walls are whatever is left closed. The grid
//! is written once by the generator and only read afterwards.

use serde::{Deserialize, Serialize};

use crate::game::collision;
use crate::game::constants::map::{MIN_DIMENSION, TILE_SIZE};
use crate::game::maze::MazeError;
use crate::game::pathfinding;
use crate::game::visibility;
use crate::util::vec2::Vec2;

/// One of the four cell edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Scan order used by the generator shuffle and by A* expansion
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Direction::North => 0b0001,
            Direction::South => 0b0010,
            Direction::East => 0b0100,
            Direction::West => 0b1000,
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// (column, row) step; rows grow southward
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Open-passage set of a single cell (4-bit mask)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passages(u8);

impl Passages {
    pub const NONE: Passages = Passages(0);

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_open(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    #[inline]
    pub fn open(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    /// Number of open edges
    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Grid coordinate of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: usize,
    pub row: usize,
}

impl CellCoord {
    #[inline]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Manhattan distance in cells
    #[inline]
    pub fn manhattan(self, other: CellCoord) -> usize {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// World-space centre of this cell
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    /// World-space top-left corner of this cell
    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.col as f32 * TILE_SIZE, self.row as f32 * TILE_SIZE)
    }
}

/// Fixed-size passage grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Passages>,
}

impl Grid {
    /// Create a grid with every wall closed
    pub fn new(cols: usize, rows: usize) -> Result<Self, MazeError> {
        if cols < MIN_DIMENSION || rows < MIN_DIMENSION {
            return Err(MazeError::InvalidDimensions { cols, rows });
        }
        Ok(Self {
            cols,
            rows,
            cells: vec![Passages::NONE; cols * rows],
        })
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// World width in pixels
    #[inline]
    pub fn width(&self) -> f32 {
        self.cols as f32 * TILE_SIZE
    }

    /// World height in pixels
    #[inline]
    pub fn height(&self) -> f32 {
        self.rows as f32 * TILE_SIZE
    }

    #[inline]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.col < self.cols && cell.row < self.rows
    }

    /// Flat row-major index
    #[inline]
    pub fn index(&self, cell: CellCoord) -> usize {
        cell.row * self.cols + cell.col
    }

    #[inline]
    pub fn coord(&self, index: usize) -> CellCoord {
        CellCoord::new(index % self.cols, index / self.cols)
    }

    /// Passage mask of a cell; out-of-range cells are fully closed
    #[inline]
    pub fn passages(&self, cell: CellCoord) -> Passages {
        if self.contains(cell) {
            self.cells[self.index(cell)]
        } else {
            Passages::NONE
        }
    }

    #[inline]
    pub fn is_open(&self, cell: CellCoord, dir: Direction) -> bool {
        self.passages(cell).is_open(dir)
    }

    /// Neighbouring cell in `dir`, if it lies on the grid
    pub fn neighbor(&self, cell: CellCoord, dir: Direction) -> Option<CellCoord> {
        let (dc, dr) = dir.delta();
        let col = cell.col.checked_add_signed(dc)?;
        let row = cell.row.checked_add_signed(dr)?;
        let next = CellCoord::new(col, row);
        self.contains(next).then_some(next)
    }

    /// Open the edge between `cell` and its neighbour in `dir` on both sides.
    /// Returns the neighbour, or `None` (and changes nothing) at the border.
    pub fn carve(&mut self, cell: CellCoord, dir: Direction) -> Option<CellCoord> {
        let next = self.neighbor(cell, dir)?;
        let a = self.index(cell);
        let b = self.index(next);
        self.cells[a].open(dir);
        self.cells[b].open(dir.opposite());
        Some(next)
    }

    /// Neighbours reachable through an open passage
    pub fn open_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&dir| self.is_open(cell, dir))
            .filter_map(move |dir| self.neighbor(cell, dir))
    }

    /// Cell containing a world point, if the point is on the map
    pub fn cell_at(&self, pos: Vec2) -> Option<CellCoord> {
        if !(pos.x >= 0.0 && pos.y >= 0.0) {
            return None;
        }
        let cell = CellCoord::new(
            (pos.x / TILE_SIZE).floor() as usize,
            (pos.y / TILE_SIZE).floor() as usize,
        );
        self.contains(cell).then_some(cell)
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| CellCoord::new(col, row)))
    }
}

/// Spatial queries an agent needs from the world.
///
/// `Grid` answers them from its passages. Tests substitute their own
/// implementation to observe which queries a controller makes.
pub trait WorldGeometry {
    /// True if the world point lies inside a wall or off the map
    fn is_wall(&self, pos: Vec2) -> bool;
    /// Push a circle out of every wall it overlaps
    fn resolve_circle(&self, pos: Vec2, radius: f32) -> Vec2;
    /// Sampled line-of-sight test between two world points
    fn has_los(&self, from: Vec2, to: Vec2) -> bool;
    /// Cell path from the cell of `start` to the cell of `goal`,
    /// excluding the start cell
    fn find_path(&self, start: Vec2, goal: Vec2) -> Vec<CellCoord>;
    /// World bounds (width, height)
    fn bounds(&self) -> Vec2;
}

impl WorldGeometry for Grid {
    fn is_wall(&self, pos: Vec2) -> bool {
        collision::is_wall(self, pos)
    }

    fn resolve_circle(&self, pos: Vec2, radius: f32) -> Vec2 {
        collision::resolve_circle(self, pos, radius)
    }

    fn has_los(&self, from: Vec2, to: Vec2) -> bool {
        visibility::has_los(self, from, to)
    }

    fn find_path(&self, start: Vec2, goal: Vec2) -> Vec<CellCoord> {
        pathfinding::find_path(self, start, goal)
    }

    fn bounds(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_small_grids() {
        assert!(matches!(
            Grid::new(2, 10),
            Err(MazeError::InvalidDimensions { cols: 2, rows: 10 })
        ));
        assert!(Grid::new(0, 0).is_err());
        assert!(Grid::new(3, 3).is_ok());
    }

    #[test]
    fn test_new_grid_is_closed() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.len(), 12);
        assert!(grid.coords().all(|c| grid.passages(c) == Passages::NONE));
    }

    #[test]
    fn test_direction_bits_are_distinct() {
        let mask = Direction::ALL.iter().fold(0u8, |acc, d| acc | d.bit());
        assert_eq!(mask, 0b1111);
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dc, dr) = dir.delta();
            let (oc, or) = dir.opposite().delta();
            assert_eq!((dc + oc, dr + or), (0, 0));
        }
    }

    #[test]
    fn test_carve_is_symmetric() {
        let mut grid = Grid::new(3, 3).unwrap();
        let a = CellCoord::new(1, 1);
        let b = grid.carve(a, Direction::East).unwrap();
        assert_eq!(b, CellCoord::new(2, 1));
        assert!(grid.is_open(a, Direction::East));
        assert!(grid.is_open(b, Direction::West));
        assert_eq!(grid.passages(a).count(), 1);
    }

    #[test]
    fn test_carve_at_border_is_noop() {
        let mut grid = Grid::new(3, 3).unwrap();
        assert!(grid.carve(CellCoord::new(0, 0), Direction::North).is_none());
        assert_eq!(grid.passages(CellCoord::new(0, 0)), Passages::NONE);
    }

    #[test]
    fn test_cell_at() {
        let grid = Grid::new(5, 4).unwrap();
        assert_eq!(grid.cell_at(Vec2::new(10.0, 10.0)), Some(CellCoord::new(0, 0)));
        assert_eq!(grid.cell_at(Vec2::new(64.0, 130.0)), Some(CellCoord::new(1, 2)));
        assert_eq!(grid.cell_at(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(5.0 * 64.0, 10.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(f32::NAN, 10.0)), None);
    }

    #[test]
    fn test_index_roundtrip() {
        let grid = Grid::new(7, 5).unwrap();
        for cell in grid.coords() {
            assert_eq!(grid.coord(grid.index(cell)), cell);
        }
    }

    #[test]
    fn test_cell_center() {
        assert_eq!(CellCoord::new(0, 0).center(), Vec2::new(32.0, 32.0));
        assert_eq!(CellCoord::new(2, 1).center(), Vec2::new(160.0, 96.0));
    }
}
