use std::collections::HashMap;
use std::f32::consts::PI;

use bevy::prelude::*;

use crate::config::{
    BASE_SPEED, HEADING_RATE, IDLE_SQUASH_RATE, IDLE_TILT_RATE, LAUNCH_SQUASH_DEPTH,
    LAUNCH_SQUASH_WINDOW, MAX_TILT, SQUASH_RATE, STOP_SQUASH, TILT_GAIN, TILT_RATE,
};
use crate::grid::GridPos;
use crate::vehicles::{sanitize_speed, Vehicle, VehicleId, VehicleRoster};

/// `3t² − 2t³`, the easing applied to progress along a segment.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Maps any angle difference into `(-180, 180]`.
#[inline]
pub fn wrap_degrees(diff: f32) -> f32 {
    180.0 - (180.0 - diff).rem_euclid(360.0)
}

/// Interpolates along the shorter arc. The result is not normalized.
#[inline]
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    a + wrap_degrees(b - a) * t
}

#[inline]
fn ease(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (dt * rate).min(1.0)
}

/// Per-vehicle animation state. Owns the smooth pixel position, the path being
/// driven and the cosmetic tilt/squash values.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleMotion {
    pub pixel: Vec2,
    pub heading: f32,
    pub prev_heading: f32,
    pub path: Vec<GridPos>,
    /// Index of the waypoint the current segment starts from.
    pub segment: usize,
    /// Fraction of the current segment covered, in `[0, 1)` while moving.
    pub progress: f32,
    pub moving: bool,
    pub tilt: f32,
    pub squash: f32,
    /// Seconds left in the launch squash animation.
    pub just_started: f32,
}

impl VehicleMotion {
    pub fn new(vehicle: &Vehicle) -> Self {
        Self {
            pixel: vehicle.pos.center(),
            heading: vehicle.heading,
            prev_heading: vehicle.heading,
            path: Vec::new(),
            segment: 0,
            progress: 0.0,
            moving: false,
            tilt: 0.0,
            squash: 1.0,
            just_started: 0.0,
        }
    }

    /// Begin driving `path`. Paths shorter than two waypoints are rejected
    /// and leave the state untouched.
    pub fn start_path(&mut self, path: Vec<GridPos>) -> bool {
        if path.len() < 2 {
            return false;
        }
        if self.moving {
            self.stop();
        }
        self.path = path;
        self.segment = 0;
        self.progress = 0.0;
        self.moving = true;
        self.just_started = LAUNCH_SQUASH_WINDOW;
        true
    }

    pub fn stop(&mut self) {
        self.moving = false;
        self.path.clear();
        self.segment = 0;
        self.progress = 0.0;
        self.squash = STOP_SQUASH;
    }

    pub fn current_waypoint(&self) -> Option<GridPos> {
        if self.moving {
            self.path.get(self.segment).copied()
        } else {
            None
        }
    }

    /// Moves the vehicle's logical position onto the waypoint the current
    /// segment started from. No effect while idle.
    pub fn snap_to_current_waypoint(&self, vehicle: &mut Vehicle) {
        if let Some(waypoint) = self.current_waypoint() {
            vehicle.pos = waypoint;
        }
    }

    /// One simulation step. Returns true on the tick the vehicle arrives.
    pub fn advance(&mut self, vehicle: &mut Vehicle, dt: f32) -> bool {
        if !self.moving || self.path.len() < 2 {
            return false;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.progress += dt * BASE_SPEED * sanitize_speed(vehicle.speed);

        let last = self.path.len() - 1;
        while self.progress >= 1.0 && self.segment < last {
            self.segment += 1;
            self.progress -= 1.0;
        }

        if self.segment >= last {
            let end = self.path[last];
            self.pixel = end.center();
            vehicle.pos = end;
            self.stop();
            return true;
        }

        let from = self.path[self.segment];
        let to = self.path[self.segment + 1];
        let st = smoothstep(self.progress.min(1.0));
        self.pixel = from.center() + (to.center() - from.center()) * st;

        let dx = (to.x - from.x) as f32;
        let dy = (to.y - from.y) as f32;
        if dx != 0.0 || dy != 0.0 {
            let target = dy.atan2(dx).to_degrees();
            self.prev_heading = self.heading;
            self.heading = lerp_angle(self.heading, target, (dt * HEADING_RATE).min(1.0))
                .rem_euclid(360.0);
        }

        let angular_velocity = wrap_degrees(self.heading - self.prev_heading);
        let target_tilt = (angular_velocity * TILT_GAIN).clamp(-MAX_TILT, MAX_TILT);
        self.tilt = ease(self.tilt, target_tilt, TILT_RATE, dt);

        if self.just_started > 0.0 {
            self.just_started -= dt;
            let phase = (self.just_started / LAUNCH_SQUASH_WINDOW).max(0.0);
            self.squash = 1.0 - LAUNCH_SQUASH_DEPTH * (phase * PI).sin();
        } else {
            self.squash = ease(self.squash, 1.0, SQUASH_RATE, dt);
        }

        vehicle.pos = from;
        vehicle.heading = self.heading;
        false
    }

    /// Springs squash and tilt back to rest. Only applies while idle.
    pub fn relax_idle(&mut self, dt: f32) {
        if self.moving {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.squash = ease(self.squash, 1.0, IDLE_SQUASH_RATE, dt);
        self.tilt = ease(self.tilt, 0.0, IDLE_TILT_RATE, dt);
    }
}

/// Motion state for every vehicle, keyed by id.
#[derive(Resource, Debug, Default)]
pub struct MotionTable {
    motions: HashMap<VehicleId, VehicleMotion>,
}

impl MotionTable {
    pub fn from_roster(roster: &VehicleRoster) -> Self {
        let mut table = Self::default();
        table.reset_from(roster);
        table
    }

    pub fn get(&self, id: &VehicleId) -> Option<&VehicleMotion> {
        self.motions.get(id)
    }

    pub fn get_mut(&mut self, id: &VehicleId) -> Option<&mut VehicleMotion> {
        self.motions.get_mut(id)
    }

    pub fn contains(&self, id: &VehicleId) -> bool {
        self.motions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VehicleId, &VehicleMotion)> {
        self.motions.iter()
    }

    /// Adds idle motion for vehicles that have none and drops motion for
    /// vehicles no longer in the roster. Existing motion is kept.
    pub fn sync_with(&mut self, roster: &VehicleRoster) {
        self.motions.retain(|id, _| roster.contains(id));
        for vehicle in roster.iter() {
            self.motions
                .entry(vehicle.id.clone())
                .or_insert_with(|| VehicleMotion::new(vehicle));
        }
    }

    /// Discards all motion and re-seeds from the roster.
    pub fn reset_from(&mut self, roster: &VehicleRoster) {
        self.motions = roster
            .iter()
            .map(|v| (v.id.clone(), VehicleMotion::new(v)))
            .collect();
    }

    /// Advances every vehicle in roster order, then relaxes the idle ones.
    /// Returns the ids of vehicles that arrived during this step.
    pub fn advance_all(&mut self, roster: &mut VehicleRoster, dt: f32) -> Vec<VehicleId> {
        let mut arrived = Vec::new();
        for vehicle in roster.vehicles.iter_mut() {
            let Some(motion) = self.motions.get_mut(&vehicle.id) else {
                continue;
            };
            if motion.advance(vehicle, dt) {
                arrived.push(vehicle.id.clone());
            }
            motion.relax_idle(dt);
        }
        arrived
    }
}

pub fn sync_motion_table(roster: Res<VehicleRoster>, mut motions: ResMut<MotionTable>) {
    if roster.is_changed() {
        motions.sync_with(&roster);
    }
}

pub fn advance_vehicles(
    time: Res<Time>,
    mut roster: ResMut<VehicleRoster>,
    mut motions: ResMut<MotionTable>,
) {
    let dt = crate::frame_dt(&time);
    if dt <= 0.0 {
        return;
    }
    for id in motions.advance_all(&mut roster, dt) {
        debug!("vehicle {id} arrived at its destination");
    }
}
