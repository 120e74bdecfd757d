//! Per-frame ordering via `SystemSet` phases in the `Update` schedule.
//!
//! ```text
//! Input  →  Motion  →  Camera
//! ```
//!
//! * **Input** – Pointer events are applied in delivery order. Taps may
//!   select a vehicle or start a route, and both take effect before motion.
//! * **Motion** – Every vehicle advances along its path, then idle vehicles
//!   relax their squash and tilt.
//! * **Camera** – Camera-follow reads this frame's vehicle positions.
//!
//! Renderers and persistence read state after `Camera` and never write to
//! the simulation resources.

use bevy::prelude::*;

/// Configured as a chain: `Input` → `Motion` → `Camera`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Motion,
    Camera,
}
