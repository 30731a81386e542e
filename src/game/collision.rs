//! Circle vs wall collision
//!
//! Walls are never stored. For any query the resolver derives axis-aligned
//! rectangles from the closed edges of the cells around the query, plus the
//! four corner pillars every cell carries. Pillars are solid regardless of
//! passages, which seals the diagonal gaps at wall junctions.
//!
//! Overlapping rectangles are resolved one after another in scan order, not
//! solved simultaneously. The sweep repeats until a full pass moves nothing.

use smallvec::SmallVec;

use crate::game::constants::collision::{CONTACT_EPSILON, MAX_PASSES};
use crate::game::constants::map::{TILE_SIZE, WALL_THICKNESS};
use crate::game::grid::{CellCoord, Direction, Grid};
use crate::util::vec2::Vec2;

/// Axis-aligned solid rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl WallRect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Closest point of the rectangle to `p`
    #[inline]
    pub fn nearest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.max(self.x).min(self.x + self.w),
            p.y.max(self.y).min(self.y + self.h),
        )
    }

    /// Distance from `p` to the rectangle (0 inside)
    #[inline]
    pub fn distance_to(&self, p: Vec2) -> f32 {
        self.nearest_point(p).distance_to(p)
    }
}

/// Solid rectangles owned by one cell: closed edge bands, then pillars.
/// At most 4 bands + 4 pillars, so the list never spills to the heap.
pub fn cell_wall_rects(grid: &Grid, cell: CellCoord) -> SmallVec<[WallRect; 8]> {
    let passages = grid.passages(cell);
    let origin = cell.origin();
    let (wx, wy) = (origin.x, origin.y);
    let t = WALL_THICKNESS;
    let far = TILE_SIZE - t;

    let mut rects = SmallVec::new();
    if !passages.is_open(Direction::North) {
        rects.push(WallRect::new(wx, wy, TILE_SIZE, t));
    }
    if !passages.is_open(Direction::South) {
        rects.push(WallRect::new(wx, wy + far, TILE_SIZE, t));
    }
    if !passages.is_open(Direction::West) {
        rects.push(WallRect::new(wx, wy, t, TILE_SIZE));
    }
    if !passages.is_open(Direction::East) {
        rects.push(WallRect::new(wx + far, wy, t, TILE_SIZE));
    }
    rects.push(WallRect::new(wx, wy, t, t));
    rects.push(WallRect::new(wx + far, wy, t, t));
    rects.push(WallRect::new(wx, wy + far, t, t));
    rects.push(WallRect::new(wx + far, wy + far, t, t));
    rects
}

/// True if the world point is inside a wall band, a pillar, or off the map
pub fn is_wall(grid: &Grid, pos: Vec2) -> bool {
    if !(pos.x >= 0.0 && pos.x < grid.width() && pos.y >= 0.0 && pos.y < grid.height()) {
        return true;
    }
    let Some(cell) = grid.cell_at(pos) else {
        return true;
    };

    let t = WALL_THICKNESS;
    let far = TILE_SIZE - t;
    let local = pos - cell.origin();
    let near_x = local.x < t;
    let near_y = local.y < t;
    let far_x = local.x > far;
    let far_y = local.y > far;

    if (near_x || far_x) && (near_y || far_y) {
        return true;
    }

    let passages = grid.passages(cell);
    (near_y && !passages.is_open(Direction::North))
        || (far_y && !passages.is_open(Direction::South))
        || (near_x && !passages.is_open(Direction::West))
        || (far_x && !passages.is_open(Direction::East))
}

/// Move a circle so it overlaps no wall and stays inside the map.
///
/// The result is stable: resolving an already-resolved position returns it
/// unchanged.
pub fn resolve_circle(grid: &Grid, pos: Vec2, radius: f32) -> Vec2 {
    let mut current = pos;
    for _ in 0..MAX_PASSES {
        let next = resolve_pass(grid, current, radius);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Inner playable box for a circle of `radius`
fn interior_bounds(grid: &Grid, radius: f32) -> (Vec2, Vec2) {
    let inset = WALL_THICKNESS + radius;
    let min = Vec2::new(inset, inset);
    let max = Vec2::new(
        (grid.width() - inset).max(inset),
        (grid.height() - inset).max(inset),
    );
    (min, max)
}

/// One clamp plus one sweep over the cells the circle's bounding box touches
fn resolve_pass(grid: &Grid, pos: Vec2, radius: f32) -> Vec2 {
    let (min, max) = interior_bounds(grid, radius);
    let mut p = pos.clamp(min, max);

    let col0 = cell_floor(p.x - radius);
    let col1 = cell_floor(p.x + radius).min(grid.cols() - 1);
    let row0 = cell_floor(p.y - radius);
    let row1 = cell_floor(p.y + radius).min(grid.rows() - 1);

    for row in row0..=row1 {
        for col in col0..=col1 {
            for rect in cell_wall_rects(grid, CellCoord::new(col, row)) {
                p = push_out_of_rect(grid, p, radius, &rect);
            }
        }
    }
    p
}

#[inline]
fn cell_floor(v: f32) -> usize {
    (v / TILE_SIZE).floor().max(0.0) as usize
}

/// Push one circle out of one rectangle.
///
/// Outside the rectangle the centre is projected along the nearest-point
/// normal to exactly `radius`. A centre inside (nearest distance 0) is handed
/// to [`escape_buried`].
fn push_out_of_rect(grid: &Grid, center: Vec2, radius: f32, rect: &WallRect) -> Vec2 {
    let near = rect.nearest_point(center);
    let offset = center - near;
    let dist_sq = offset.length_sq();

    if dist_sq == 0.0 {
        return escape_buried(grid, center, radius, rect);
    }

    let reach = radius - CONTACT_EPSILON;
    if dist_sq < reach * reach {
        let dist = dist_sq.sqrt();
        return near + offset * (radius / dist);
    }
    center
}

/// Move a centre buried in `rect` out of solid ground.
///
/// From each face of `rect` the walk continues across neighbouring wall
/// blocks until it reaches free space, so a centre inside two touching bands
/// leaves the pair instead of bouncing between them. The shortest walk wins.
/// Every solid boundary sits on a `WALL_THICKNESS` multiple, so the walk steps
/// one block at a time. If every walk runs off the map, the centre drops into
/// the free interior of its own cell.
fn escape_buried(grid: &Grid, center: Vec2, radius: f32, rect: &WallRect) -> Vec2 {
    let exits = [
        (Axis::X, -1.0, rect.x),
        (Axis::X, 1.0, rect.x + rect.w),
        (Axis::Y, -1.0, rect.y),
        (Axis::Y, 1.0, rect.y + rect.h),
    ];

    let mut best: Option<(f32, Vec2)> = None;
    for (axis, sign, face) in exits {
        let Some(edge) = first_free_edge(grid, center, axis, sign, face) else {
            continue;
        };
        let dist = (edge - axis.of(center)).abs();
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, axis.with(center, edge + sign * radius)));
        }
    }

    match best {
        Some((_, exit)) => exit,
        None => grid
            .cell_at(center)
            .map_or(center, |cell| cell_interior_point(cell, center, radius)),
    }
}

/// Closest point to `p` where a circle of `radius` clears every wall the
/// cell could own, open or closed
fn cell_interior_point(cell: CellCoord, p: Vec2, radius: f32) -> Vec2 {
    let inset = WALL_THICKNESS + radius;
    let origin = cell.origin();
    p.clamp(
        origin + Vec2::new(inset, inset),
        origin + Vec2::new(TILE_SIZE - inset, TILE_SIZE - inset),
    )
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn of(self, p: Vec2) -> f32 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    #[inline]
    fn with(self, p: Vec2, v: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(v, p.y),
            Axis::Y => Vec2::new(p.x, v),
        }
    }
}

/// Walk from `face` in direction `sign` along `axis` until the next block is
/// free. `None` if the walk leaves the map first.
fn first_free_edge(grid: &Grid, center: Vec2, axis: Axis, sign: f32, face: f32) -> Option<f32> {
    let limit = match axis {
        Axis::X => grid.width(),
        Axis::Y => grid.height(),
    };
    let mut edge = face;
    while edge > 0.0 && edge < limit {
        if !is_wall(grid, axis.with(center, edge + sign * WALL_THICKNESS * 0.5)) {
            return Some(edge);
        }
        edge += sign * WALL_THICKNESS;
    }
    None
}
