pub const GRID_WIDTH: usize = 20;
pub const GRID_HEIGHT: usize = 20;
/// World units (pixels at scale 1.0) per tile edge.
pub const TILE_SIZE: f32 = 128.0;
pub const WORLD_WIDTH: f32 = GRID_WIDTH as f32 * TILE_SIZE;
pub const WORLD_HEIGHT: f32 = GRID_HEIGHT as f32 * TILE_SIZE;

pub const MIN_SCALE: f32 = 0.3;
pub const MAX_SCALE: f32 = 3.0;

/// Upper bound on a single frame's delta so a stalled frame can't teleport vehicles.
pub const MAX_FRAME_DT: f32 = 0.1;

// --- Vehicle motion ---

/// Waypoints per second at speed multiplier 1.0.
pub const BASE_SPEED: f32 = 3.0;
pub const HEADING_RATE: f32 = 10.0;
pub const TILT_RATE: f32 = 8.0;
pub const TILT_GAIN: f32 = 0.8;
/// Max banking angle in degrees.
pub const MAX_TILT: f32 = 3.5;
pub const SQUASH_RATE: f32 = 6.0;
pub const LAUNCH_SQUASH_WINDOW: f32 = 0.25;
pub const LAUNCH_SQUASH_DEPTH: f32 = 0.08;
pub const STOP_SQUASH: f32 = 0.92;
pub const IDLE_SQUASH_RATE: f32 = 8.0;
pub const IDLE_TILT_RATE: f32 = 6.0;

// --- Camera ---

pub const FOLLOW_RATE: f32 = 2.5;
/// Follow disengages once the idle vehicle is within this many pixels (L1) of center.
pub const FOLLOW_SETTLE_PX: f32 = 1.0;
pub const WHEEL_ZOOM_IN: f32 = 1.08;
pub const WHEEL_ZOOM_OUT: f32 = 0.92;
pub const FIT_TILES_X: f32 = 10.0;
pub const FIT_TILES_Y: f32 = 14.0;
pub const FIT_MAX_SCALE: f32 = 1.2;

// --- Gestures ---

pub const TAP_MAX_MS: u64 = 400;
pub const PAN_THRESHOLD_PX: f32 = 8.0;
/// Tap pick radius around a vehicle, in tiles (world space).
pub const VEHICLE_PICK_RADIUS: f32 = 0.7;
