use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Schema version written into new snapshots.
/// v1: bitcode payload behind the binary file header
pub const CURRENT_SAVE_VERSION: u32 = 1;

/// Headerless JSON snapshots carry no version; they decode as this.
pub const LEGACY_SAVE_VERSION: u32 = 0;

fn legacy_version() -> u32 {
    LEGACY_SAVE_VERSION
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq)]
pub struct SavedVehicle {
    pub id: String,
    pub x: i32,
    pub y: i32,
    #[serde(alias = "angle", default)]
    pub heading: f32,
    #[serde(default)]
    pub speed: f32,
    #[serde(default)]
    pub hue: f32,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq)]
pub struct SavedPan {
    pub x: f32,
    pub y: f32,
}

/// Vehicle positions plus viewport framing. Everything except the vehicle
/// list is optional so partially written snapshots still restore what they
/// have.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub vehicles: Vec<SavedVehicle>,
    #[serde(default, alias = "activeVehicleId")]
    pub active_vehicle: Option<String>,
    #[serde(default)]
    pub pan: Option<SavedPan>,
    #[serde(default)]
    pub scale: Option<f32>,
}

impl SaveSnapshot {
    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        bitcode::decode(bytes)
    }
}
