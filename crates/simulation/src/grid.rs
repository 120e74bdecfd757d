use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{GRID_HEIGHT, GRID_WIDTH, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileType {
    #[default]
    Ground,
    Road,         // straight segment
    RoadCurved,   // quarter turn, two perpendicular exits
    RoadCrossroad,
    RoadTJunction,
}

impl TileType {
    pub fn is_road(self) -> bool {
        !matches!(self, TileType::Ground)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Unknown angles fall back to `R0`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::R90,
            180 => Rotation::R180,
            270 => Rotation::R270,
            _ => Rotation::R0,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

/// Cardinal direction in screen orientation: north is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Neighbor enumeration order. Path tie-breaking depends on it.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, 1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_squared(self, other: GridPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// World-space center of this tile.
    pub fn center(self) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * TILE_SIZE,
            (self.y as f32 + 0.5) * TILE_SIZE,
        )
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Tile {
    pub tile_type: TileType,
    pub rotation: Rotation,
}

impl Tile {
    pub const GROUND: Tile = Tile {
        tile_type: TileType::Ground,
        rotation: Rotation::R0,
    };

    pub fn new(tile_type: TileType, rotation: Rotation) -> Self {
        Self {
            tile_type,
            rotation,
        }
    }

    #[inline]
    pub fn is_road(&self) -> bool {
        self.tile_type.is_road()
    }

    /// Whether this tile opens toward `dir`.
    pub fn connects(&self, dir: Direction) -> bool {
        use Direction::*;
        match self.tile_type {
            TileType::Ground => false,
            TileType::RoadCrossroad => true,
            TileType::Road => match self.rotation {
                Rotation::R0 | Rotation::R180 => matches!(dir, North | South),
                Rotation::R90 | Rotation::R270 => matches!(dir, East | West),
            },
            TileType::RoadCurved => {
                let exits: [Direction; 2] = match self.rotation {
                    Rotation::R0 => [South, East],
                    Rotation::R90 => [West, South],
                    Rotation::R180 => [North, West],
                    Rotation::R270 => [East, North],
                };
                exits.contains(&dir)
            }
            TileType::RoadTJunction => {
                let exits: [Direction; 3] = match self.rotation {
                    Rotation::R0 => [North, East, West],
                    Rotation::R90 => [North, East, South],
                    Rotation::R180 => [East, South, West],
                    Rotation::R270 => [North, South, West],
                };
                exits.contains(&dir)
            }
        }
    }

    pub fn exits(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.connects(*d))
    }
}

/// Dense row-major tile grid. The shape is fixed at construction.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGrid {
    tiles: Vec<Tile>,
    pub width: usize,
    pub height: usize,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl WorldGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            tiles: vec![Tile::GROUND; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    /// Re-type a tile. Returns false (and does nothing) when out of bounds.
    pub fn set_tile(&mut self, pos: GridPos, tile_type: TileType, rotation: Rotation) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.tiles[i] = Tile::new(tile_type, rotation);
                true
            }
            None => false,
        }
    }

    pub fn is_road(&self, pos: GridPos) -> bool {
        self.get(pos).is_some_and(Tile::is_road)
    }

    /// Out-of-bounds positions connect nowhere.
    pub fn tile_connects(&self, pos: GridPos, dir: Direction) -> bool {
        self.get(pos).is_some_and(|t| t.connects(dir))
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        let width = self.width;
        (0..self.tiles.len()).map(move |i| GridPos::new((i % width) as i32, (i / width) as i32))
    }

    pub fn road_tiles(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.positions().filter(|p| self.is_road(*p))
    }

    pub fn world_to_grid(world: Vec2) -> GridPos {
        GridPos::new(
            (world.x / TILE_SIZE).floor() as i32,
            (world.y / TILE_SIZE).floor() as i32,
        )
    }
}
