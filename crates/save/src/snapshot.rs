//! Moving state between the live world and a `SaveSnapshot`.

use bevy::prelude::*;

use simulation::grid::{GridPos, WorldGrid};
use simulation::movement::MotionTable;
use simulation::vehicles::{VehicleId, VehicleRoster};
use simulation::viewport::{clamp_scale, Viewport};

use crate::save_types::{SaveSnapshot, SavedPan, SavedVehicle, CURRENT_SAVE_VERSION};

pub fn capture_snapshot(roster: &VehicleRoster, viewport: &Viewport) -> SaveSnapshot {
    SaveSnapshot {
        version: CURRENT_SAVE_VERSION,
        vehicles: roster
            .iter()
            .map(|v| SavedVehicle {
                id: v.id.as_str().to_owned(),
                x: v.pos.x,
                y: v.pos.y,
                heading: v.heading,
                speed: v.speed,
                hue: v.hue,
            })
            .collect(),
        active_vehicle: roster.active.as_ref().map(|id| id.as_str().to_owned()),
        pan: Some(SavedPan {
            x: viewport.pan.x,
            y: viewport.pan.y,
        }),
        scale: Some(viewport.scale),
    }
}

/// What `apply_snapshot` actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub vehicles_restored: usize,
    /// The snapshot's vehicle count differed from the roster, so no
    /// per-vehicle state was touched.
    pub count_mismatch: bool,
    pub active_restored: bool,
    pub pan_restored: bool,
    pub scale_restored: bool,
}

impl RestoreReport {
    pub fn restored_anything(&self) -> bool {
        self.vehicles_restored > 0 || self.active_restored || self.pan_restored || self.scale_restored
    }
}

fn restored_heading(heading: f32) -> f32 {
    if heading.is_finite() {
        heading.rem_euclid(360.0)
    } else {
        0.0
    }
}

/// Restores vehicle positions, the active vehicle and the viewport framing,
/// then re-seeds every vehicle's motion from its (possibly restored) state.
///
/// Per-vehicle state is matched by index and only restored when the ids
/// agree. Positions outside the grid are ignored. Speed and hue always come
/// from the roster.
pub fn apply_snapshot(
    snapshot: &SaveSnapshot,
    grid: &WorldGrid,
    roster: &mut VehicleRoster,
    motions: &mut MotionTable,
    viewport: &mut Viewport,
) -> RestoreReport {
    let mut report = RestoreReport::default();

    if snapshot.vehicles.len() == roster.len() {
        for (saved, vehicle) in snapshot.vehicles.iter().zip(roster.vehicles.iter_mut()) {
            if saved.id != vehicle.id.as_str() {
                continue;
            }
            let pos = GridPos::new(saved.x, saved.y);
            if !grid.in_bounds(pos) {
                continue;
            }
            vehicle.pos = pos;
            vehicle.heading = restored_heading(saved.heading);
            report.vehicles_restored += 1;
        }
    } else {
        report.count_mismatch = true;
    }

    if let Some(active) = snapshot.active_vehicle.as_deref() {
        let id = VehicleId::from(active);
        if roster.contains(&id) {
            roster.active = Some(id);
            report.active_restored = true;
        }
    }

    if let Some(pan) = snapshot.pan {
        let pan = Vec2::new(pan.x, pan.y);
        if pan.is_finite() {
            viewport.pan = pan;
            report.pan_restored = true;
        }
    }

    if let Some(scale) = snapshot.scale {
        if scale.is_finite() && scale > 0.0 {
            viewport.scale = clamp_scale(scale);
            report.scale_restored = true;
        }
    }

    motions.reset_from(roster);
    report
}
