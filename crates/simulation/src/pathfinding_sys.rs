use pathfinding::prelude::bfs;

use crate::grid::{GridPos, WorldGrid};
use crate::roads::connected_neighbors;

/// Shortest path (by hop count) over the road graph, inclusive of both ends.
///
/// `start == goal` yields `[start]` whatever the tile is. Otherwise both ends
/// must be road tiles. Neighbors are expanded North, East, South, West, so
/// ties between equal-length routes always break the same way.
pub fn find_path(grid: &WorldGrid, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !grid.is_road(start) || !grid.is_road(goal) {
        return None;
    }

    bfs(
        &start,
        |node| connected_neighbors(grid, *node),
        |node| *node == goal,
    )
}

/// Road tile closest to `target` by squared Euclidean distance.
/// Linear scan in row-major order; the first minimum wins.
pub fn nearest_road(grid: &WorldGrid, target: GridPos) -> Option<GridPos> {
    let mut best: Option<(GridPos, i64)> = None;
    for pos in grid.road_tiles() {
        let dist = pos.distance_squared(target);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((pos, dist)),
        }
    }
    best.map(|(pos, _)| pos)
}

/// `target` itself when it is a road, otherwise the nearest road tile.
pub fn resolve_road_target(grid: &WorldGrid, target: GridPos) -> Option<GridPos> {
    if grid.is_road(target) {
        Some(target)
    } else {
        nearest_road(grid, target)
    }
}
