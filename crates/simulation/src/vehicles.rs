use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::GridPos;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical vehicle. `pos` only changes at waypoint boundaries; the smooth
/// on-screen position lives in `movement::VehicleMotion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub pos: GridPos,
    /// Degrees, 0 = east, 90 = south (screen orientation).
    pub heading: f32,
    /// Speed multiplier, always > 0.
    pub speed: f32,
    /// Display hue in degrees, consumed by the renderer only.
    pub hue: f32,
}

impl Vehicle {
    pub fn new(id: impl Into<VehicleId>, pos: GridPos, heading: f32, speed: f32, hue: f32) -> Self {
        Self {
            id: id.into(),
            pos,
            heading: if heading.is_finite() {
                heading.rem_euclid(360.0)
            } else {
                0.0
            },
            speed: sanitize_speed(speed),
            hue,
        }
    }
}

/// Non-positive or non-finite multipliers fall back to 1.0.
pub fn sanitize_speed(speed: f32) -> f32 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    }
}

/// Every vehicle in the world plus the one the player is driving.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct VehicleRoster {
    pub vehicles: Vec<Vehicle>,
    pub active: Option<VehicleId>,
}

impl VehicleRoster {
    /// Adds a vehicle. The first vehicle added becomes active.
    /// Returns false when the id is already taken.
    pub fn add(&mut self, vehicle: Vehicle) -> bool {
        if self.contains(&vehicle.id) {
            return false;
        }
        if self.active.is_none() {
            self.active = Some(vehicle.id.clone());
        }
        self.vehicles.push(vehicle);
        true
    }

    pub fn remove(&mut self, id: &VehicleId) -> Option<Vehicle> {
        let index = self.vehicles.iter().position(|v| &v.id == id)?;
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        Some(self.vehicles.remove(index))
    }

    pub fn contains(&self, id: &VehicleId) -> bool {
        self.vehicles.iter().any(|v| &v.id == id)
    }

    pub fn get(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    pub fn get_mut(&mut self, id: &VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| &v.id == id)
    }

    pub fn active_vehicle(&self) -> Option<&Vehicle> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    pub fn active_vehicle_mut(&mut self) -> Option<&mut Vehicle> {
        let id = self.active.clone()?;
        self.get_mut(&id)
    }

    pub fn is_active(&self, id: &VehicleId) -> bool {
        self.active.as_ref() == Some(id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }
}
