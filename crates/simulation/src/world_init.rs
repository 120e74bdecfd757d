// =============================================================================
// Default playground: a 20x20 town with three avenues, cross streets, two
// small loops, a couple of dead ends and five cars.
// =============================================================================

use std::ops::RangeInclusive;

use bevy::prelude::*;

use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use crate::grid::{GridPos, Rotation, TileType, WorldGrid};
use crate::movement::MotionTable;
use crate::vehicles::{Vehicle, VehicleId, VehicleRoster};

/// Marker resource that, when present, causes `init_world` to leave the grid
/// and roster empty. Used by the test harness to start from a blank world.
#[derive(Resource)]
pub struct SkipWorldInit;

pub fn init_world(
    mut grid: ResMut<WorldGrid>,
    mut roster: ResMut<VehicleRoster>,
    mut motions: ResMut<MotionTable>,
    skip: Option<Res<SkipWorldInit>>,
) {
    if skip.is_some() {
        return;
    }
    let (world, vehicles) = build_default_world();
    *grid = world;
    *roster = vehicles;
    motions.reset_from(&roster);
    info!(
        "default world ready: {} road tiles, {} vehicles",
        grid.road_tiles().count(),
        roster.len()
    );
}

pub fn build_default_world() -> (WorldGrid, VehicleRoster) {
    let mut grid = WorldGrid::new(GRID_WIDTH, GRID_HEIGHT);
    build_default_roads(&mut grid);

    let mut roster = VehicleRoster::default();
    for (id, x, y, heading, speed, hue) in [
        ("car1", 5, 3, 90.0, 1.0, 0.0),
        ("car2", 9, 3, 90.0, 0.6, 200.0),
        ("car3", 7, 6, 0.0, 0.8, 100.0),
        ("car4", 4, 12, 180.0, 0.4, 40.0),
        ("car5", 16, 7, 0.0, 0.7, 300.0),
    ] {
        roster.add(Vehicle::new(id, GridPos::new(x, y), heading, speed, hue));
    }
    roster.active = Some(VehicleId::from("car1"));

    (grid, roster)
}

// =============================================================================
// Road helpers
// =============================================================================

/// Later placements overwrite earlier ones, which is how junctions are cut
/// into straight runs.
struct Paver<'a> {
    grid: &'a mut WorldGrid,
}

impl Paver<'_> {
    fn put(&mut self, x: i32, y: i32, tile_type: TileType, degrees: i32) -> &mut Self {
        self.grid
            .set_tile(GridPos::new(x, y), tile_type, Rotation::from_degrees(degrees));
        self
    }

    fn road(&mut self, x: i32, y: i32, degrees: i32) -> &mut Self {
        self.put(x, y, TileType::Road, degrees)
    }

    fn curve(&mut self, x: i32, y: i32, degrees: i32) -> &mut Self {
        self.put(x, y, TileType::RoadCurved, degrees)
    }

    fn cross(&mut self, x: i32, y: i32) -> &mut Self {
        self.put(x, y, TileType::RoadCrossroad, 0)
    }

    fn tjunc(&mut self, x: i32, y: i32, degrees: i32) -> &mut Self {
        self.put(x, y, TileType::RoadTJunction, degrees)
    }

    /// East-west straight run along row `y`.
    fn row(&mut self, y: i32, xs: RangeInclusive<i32>) -> &mut Self {
        for x in xs {
            self.road(x, y, 90);
        }
        self
    }

    /// North-south straight run along column `x`.
    fn column(&mut self, x: i32, ys: RangeInclusive<i32>) -> &mut Self {
        for y in ys {
            self.road(x, y, 0);
        }
        self
    }
}

fn build_default_roads(grid: &mut WorldGrid) {
    let mut p = Paver { grid };

    // --- Avenue, row 3 ---
    p.curve(2, 3, 0)
        .row(3, 3..=6)
        .cross(7, 3)
        .row(3, 8..=10)
        .tjunc(11, 3, 180)
        .row(3, 12..=15)
        .tjunc(16, 3, 180)
        .curve(17, 3, 90);

    // --- Avenue, row 10 ---
    p.curve(2, 10, 270)
        .row(10, 3..=6)
        .cross(7, 10)
        .row(10, 8..=10)
        .cross(11, 10)
        .row(10, 12..=15)
        .tjunc(16, 10, 0)
        .curve(17, 10, 180);

    // --- Avenue, row 16 ---
    p.curve(4, 16, 270)
        .row(16, 5..=6)
        .tjunc(7, 16, 0)
        .row(16, 8..=10)
        .cross(11, 16)
        .row(16, 12..=13)
        .curve(14, 16, 180);

    // --- Cross streets ---
    p.column(2, 4..=9);
    p.column(7, 4..=9).column(7, 11..=15);
    p.column(11, 4..=9).column(11, 11..=15);
    p.column(16, 4..=9);
    p.column(17, 4..=9);

    // --- Loop north of the row 3 avenue ---
    p.curve(4, 1, 0)
        .row(1, 5..=6)
        .curve(7, 1, 90)
        .road(4, 2, 0)
        .road(7, 2, 0)
        .tjunc(4, 3, 0);

    // --- Dead-end spur north of row 3 ---
    p.column(14, 1..=2).tjunc(14, 3, 0);

    // --- Loop in the south-east ---
    p.tjunc(14, 13, 90)
        .row(13, 15..=16)
        .curve(17, 13, 90)
        .road(14, 14, 0)
        .road(17, 14, 0)
        .curve(14, 15, 270)
        .row(15, 15..=16)
        .curve(17, 15, 180)
        .column(14, 11..=12)
        .tjunc(14, 10, 180);

    // --- Dead end south of the row 16 crossroad ---
    p.column(11, 17..=19);

    // --- Connector between rows 10 and 16 ---
    p.column(4, 13..=15).tjunc(4, 10, 180).column(4, 11..=12);
}
