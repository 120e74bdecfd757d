//! Road connectivity derived from the tile grid.
//!
//! The road graph is never stored: an edge exists between two adjacent road
//! tiles when each one opens toward the other. A curve or T-junction only
//! faces some of its neighbors, so adjacency alone is not enough.

use pathfinding::prelude::bfs_reach;

use crate::grid::{Direction, GridPos, WorldGrid};

/// The single mutual-connectivity primitive: `a` opens toward `dir` and the
/// neighbor in that direction opens back toward `a`.
pub fn tiles_adjacent(grid: &WorldGrid, a: GridPos, dir: Direction) -> bool {
    grid.tile_connects(a, dir) && grid.tile_connects(a.step(dir), dir.opposite())
}

/// Road neighbors of `pos`, enumerated North, East, South, West.
pub fn connected_neighbors(grid: &WorldGrid, pos: GridPos) -> Vec<GridPos> {
    Direction::ALL
        .into_iter()
        .filter(|dir| tiles_adjacent(grid, pos, *dir))
        .map(|dir| pos.step(dir))
        .collect()
}

/// True when `a` and `b` are grid neighbors joined by a road edge.
pub fn is_edge(grid: &WorldGrid, a: GridPos, b: GridPos) -> bool {
    Direction::from_offset(b.x - a.x, b.y - a.y).is_some_and(|dir| tiles_adjacent(grid, a, dir))
}

pub fn degree(grid: &WorldGrid, pos: GridPos) -> usize {
    Direction::ALL
        .into_iter()
        .filter(|dir| tiles_adjacent(grid, pos, *dir))
        .count()
}

/// Every road tile in the same connected component as `start`, in BFS order.
/// Empty when `start` is not a road tile.
pub fn reachable_from(grid: &WorldGrid, start: GridPos) -> Vec<GridPos> {
    if !grid.is_road(start) {
        return Vec::new();
    }
    bfs_reach(start, |node| connected_neighbors(grid, *node)).collect()
}

/// Every consecutive pair of `path` is joined by a road edge.
pub fn is_consistent_path(grid: &WorldGrid, path: &[GridPos]) -> bool {
    path.windows(2).all(|pair| is_edge(grid, pair[0], pair[1]))
}
