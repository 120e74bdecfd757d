use bevy::prelude::*;

pub mod config;
pub mod gesture;
pub mod grid;
pub mod movement;
pub mod navigation;
pub mod pathfinding_sys;
pub mod roads;
pub mod simulation_sets;
pub mod vehicles;
pub mod viewport;
pub mod world_init;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::SimulationSet;

use config::MAX_FRAME_DT;

/// This frame's delta in seconds, clamped so a stalled frame can't push
/// vehicles several tiles at once.
pub fn frame_dt(time: &Time) -> f32 {
    let dt = time.delta_secs();
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<grid::WorldGrid>()
            .init_resource::<vehicles::VehicleRoster>()
            .init_resource::<movement::MotionTable>()
            .init_resource::<viewport::Viewport>()
            .init_resource::<viewport::ViewportSize>()
            .init_resource::<gesture::PointerSession>()
            .add_event::<gesture::PointerInput>()
            .add_event::<navigation::SaveRequested>()
            .configure_sets(
                Update,
                (
                    SimulationSet::Input,
                    SimulationSet::Motion,
                    SimulationSet::Camera,
                )
                    .chain(),
            )
            .add_systems(Startup, world_init::init_world)
            .add_systems(
                Update,
                gesture::process_pointer_input.in_set(SimulationSet::Input),
            )
            .add_systems(
                Update,
                (movement::sync_motion_table, movement::advance_vehicles)
                    .chain()
                    .in_set(SimulationSet::Motion),
            )
            .add_systems(
                Update,
                viewport::camera_follow.in_set(SimulationSet::Camera),
            );
    }
}
