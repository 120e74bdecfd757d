//! # TestWorld: headless harness for the playground simulation
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `SimulationPlugin` with a
//! manual clock so scenario tests can drive frames, send pointer events and
//! inspect resources without a window or renderer.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::gesture::{PointerId, PointerInput};
use crate::grid::{GridPos, Rotation, TileType, WorldGrid};
use crate::movement::{MotionTable, VehicleMotion};
use crate::vehicles::{Vehicle, VehicleId, VehicleRoster};
use crate::viewport::{Viewport, ViewportSize};
use crate::world_init::SkipWorldInit;
use crate::SimulationPlugin;

/// Default frame length: 60 Hz.
pub const FRAME: Duration = Duration::from_micros(16_667);

pub struct TestWorld {
    app: App,
    clock_ms: u64,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Blank 20x20 ground grid, no vehicles, default viewport.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

        // Insert the marker BEFORE SimulationPlugin so init_world skips.
        app.insert_resource(SkipWorldInit);
        app.add_plugins(SimulationPlugin);

        // Run one update so Startup systems execute (init_world will no-op).
        app.update();
        Self { app, clock_ms: 0 }
    }

    /// The default town with its five cars.
    pub fn with_default_world() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
        app.add_plugins(SimulationPlugin);
        app.update();
        Self { app, clock_ms: 0 }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_grid(mut self, grid: WorldGrid) -> Self {
        self.app.insert_resource(grid);
        self
    }

    pub fn with_tile(mut self, x: i32, y: i32, tile_type: TileType, rotation: Rotation) -> Self {
        self.app
            .world_mut()
            .resource_mut::<WorldGrid>()
            .set_tile(GridPos::new(x, y), tile_type, rotation);
        self
    }

    /// East-west road from `x0` to `x1` inclusive along row `y`.
    pub fn with_row_road(mut self, y: i32, x0: i32, x1: i32) -> Self {
        {
            let mut grid = self.app.world_mut().resource_mut::<WorldGrid>();
            for x in x0.min(x1)..=x0.max(x1) {
                grid.set_tile(GridPos::new(x, y), TileType::Road, Rotation::R90);
            }
        }
        self
    }

    /// North-south road from `y0` to `y1` inclusive along column `x`.
    pub fn with_column_road(mut self, x: i32, y0: i32, y1: i32) -> Self {
        {
            let mut grid = self.app.world_mut().resource_mut::<WorldGrid>();
            for y in y0.min(y1)..=y0.max(y1) {
                grid.set_tile(GridPos::new(x, y), TileType::Road, Rotation::R0);
            }
        }
        self
    }

    /// Adds a vehicle and seeds its motion. The first one becomes active.
    pub fn with_vehicle(mut self, id: &str, x: i32, y: i32, speed: f32) -> Self {
        let vehicle = Vehicle::new(id, GridPos::new(x, y), 0.0, speed, 0.0);
        let world = self.app.world_mut();
        world.resource_mut::<VehicleRoster>().add(vehicle);
        world.resource_scope(|world, mut motions: Mut<MotionTable>| {
            motions.sync_with(world.resource::<VehicleRoster>());
        });
        self
    }

    pub fn with_viewport(mut self, pan: Vec2, scale: f32) -> Self {
        {
            let mut viewport = self.app.world_mut().resource_mut::<Viewport>();
            viewport.pan = pan;
            viewport.scale = scale;
        }
        self
    }

    pub fn with_screen(mut self, size: Vec2) -> Self {
        self.app.insert_resource(ViewportSize(size));
        self
    }

    // -----------------------------------------------------------------------
    // Driving the app
    // -----------------------------------------------------------------------

    /// Run `n` frames of `FRAME` each.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.clock_ms += FRAME.as_millis() as u64;
            self.app.update();
        }
    }

    /// Run frames until `secs` of simulated time have passed.
    pub fn run_for(&mut self, secs: f32) {
        let frames = (secs / FRAME.as_secs_f32()).ceil() as u32;
        self.tick(frames);
    }

    /// Single frame with an explicit delta (the simulation clamps it).
    pub fn tick_with(&mut self, dt: Duration) {
        self.app
            .insert_resource(TimeUpdateStrategy::ManualDuration(dt));
        self.clock_ms += dt.as_millis() as u64;
        self.app.update();
        self.app
            .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    }

    /// Milliseconds on the input clock, advanced by every tick.
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn send(&mut self, input: PointerInput) {
        self.app.world_mut().send_event(input);
    }

    pub fn pointer_down(&mut self, id: PointerId, pos: Vec2) {
        let time_ms = self.clock_ms;
        self.send(PointerInput::Down { id, pos, time_ms });
    }

    pub fn pointer_move(&mut self, id: PointerId, pos: Vec2) {
        self.send(PointerInput::Move { id, pos });
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        let time_ms = self.clock_ms;
        self.send(PointerInput::Up { id, time_ms });
    }

    /// Down and up at `pos` within a couple of frames.
    pub fn tap(&mut self, pos: Vec2) {
        self.pointer_down(1, pos);
        self.tick(1);
        self.pointer_up(1);
        self.tick(1);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn grid(&self) -> &WorldGrid {
        self.resource::<WorldGrid>()
    }

    pub fn roster(&self) -> &VehicleRoster {
        self.resource::<VehicleRoster>()
    }

    pub fn viewport(&self) -> &Viewport {
        self.resource::<Viewport>()
    }

    pub fn vehicle(&self, id: &str) -> &Vehicle {
        self.roster()
            .get(&VehicleId::from(id))
            .unwrap_or_else(|| panic!("no vehicle {id}"))
    }

    pub fn motion(&self, id: &str) -> &VehicleMotion {
        self.resource::<MotionTable>()
            .get(&VehicleId::from(id))
            .unwrap_or_else(|| panic!("no motion for {id}"))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.roster().active.as_ref().map(VehicleId::as_str)
    }

    /// Screen position of the center of tile (x, y) under the current viewport.
    pub fn tile_on_screen(&self, x: i32, y: i32) -> Vec2 {
        self.viewport()
            .world_to_screen(GridPos::new(x, y).center())
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_vehicle_at(&self, id: &str, x: i32, y: i32) {
        let pos = self.vehicle(id).pos;
        assert_eq!(
            pos,
            GridPos::new(x, y),
            "expected {id} at ({x}, {y}), found {pos:?}"
        );
    }

    pub fn assert_idle(&self, id: &str) {
        let motion = self.motion(id);
        assert!(!motion.moving, "{id} should be idle");
        assert!(motion.path.is_empty(), "{id} should have no path");
    }

    pub fn assert_moving(&self, id: &str) {
        assert!(self.motion(id).moving, "{id} should be moving");
    }
}
