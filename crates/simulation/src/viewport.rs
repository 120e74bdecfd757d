//! Screen/world transform and the camera that follows the active vehicle.
//!
//! `screen = world * scale + pan`. Every zoom keeps a screen-space anchor
//! fixed, and any direct manipulation by the user disengages camera-follow.

use bevy::prelude::*;

use crate::config::{
    FIT_MAX_SCALE, FIT_TILES_X, FIT_TILES_Y, FOLLOW_RATE, FOLLOW_SETTLE_PX, MAX_SCALE, MIN_SCALE,
    TILE_SIZE, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use crate::grid::{GridPos, WorldGrid};
use crate::movement::MotionTable;
use crate::vehicles::VehicleRoster;

/// Size of the drawing surface in screen pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize(pub Vec2);

impl Default for ViewportSize {
    fn default() -> Self {
        Self(Vec2::new(1280.0, 720.0))
    }
}

pub fn clamp_scale(scale: f32) -> f32 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Viewport {
    pub pan: Vec2,
    pub scale: f32,
    pub camera_following: bool,
    /// Free-running clock for the active-vehicle highlight.
    pub pulse_time: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: 1.0,
            camera_following: false,
            pulse_time: 0.0,
        }
    }
}

impl Viewport {
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.scale
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.pan
    }

    pub fn screen_to_tile(&self, screen: Vec2) -> GridPos {
        WorldGrid::world_to_grid(self.screen_to_world(screen))
    }

    /// Scales by `factor` around a fixed screen point. The world point under
    /// `anchor` stays under `anchor` unless the scale clamp kicks in.
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        self.camera_following = false;
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_scale = clamp_scale(self.scale * factor);
        self.pan = anchor - (anchor - self.pan) * (new_scale / self.scale);
        self.scale = new_scale;
    }

    /// Mouse wheel step: scrolling up zooms in.
    pub fn wheel_zoom(&mut self, anchor: Vec2, delta_y: f32) {
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
        self.zoom_at(anchor, factor);
    }

    /// Two-finger update: scale by `ratio` about the previous midpoint and
    /// translate by the midpoint's movement.
    pub fn pinch(&mut self, prev_center: Vec2, center: Vec2, ratio: f32) {
        self.camera_following = false;
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        let new_scale = clamp_scale(self.scale * ratio);
        self.pan = self.pan + (center - prev_center)
            - (prev_center - self.pan) * (new_scale / self.scale - 1.0);
        self.scale = new_scale;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera_following = false;
        self.pan += delta;
    }

    /// Pan that puts `target` at the center of `screen` at the current scale.
    pub fn centered_pan(&self, target: Vec2, screen: Vec2) -> Vec2 {
        screen / 2.0 - target * self.scale
    }

    /// Eases toward centering `target`. Once the followed vehicle is idle and
    /// the camera has settled, follow turns itself off.
    pub fn follow(&mut self, target: Vec2, moving: bool, screen: Vec2, dt: f32) {
        if !self.camera_following {
            return;
        }
        let goal = self.centered_pan(target, screen);
        self.pan += (goal - self.pan) * (dt * FOLLOW_RATE).min(1.0);

        if !moving {
            let remaining = (goal - self.pan).abs();
            if remaining.x + remaining.y < FOLLOW_SETTLE_PX {
                self.camera_following = false;
            }
        }
    }

    /// Initial framing: about 10x14 tiles visible, never zoomed past 1.2.
    pub fn fit_to(&mut self, target: Vec2, screen: Vec2) {
        let fit = (screen.x / (FIT_TILES_X * TILE_SIZE))
            .min(screen.y / (FIT_TILES_Y * TILE_SIZE))
            .min(FIT_MAX_SCALE);
        self.scale = if fit.is_finite() && fit > 0.0 {
            clamp_scale(fit)
        } else {
            1.0
        };
        self.pan = self.centered_pan(target, screen);
    }

    pub fn tick_pulse(&mut self, dt: f32) {
        self.pulse_time += dt;
    }
}

/// Keeps the active vehicle in view. Runs after motion so it sees this
/// frame's pixel positions.
pub fn camera_follow(
    time: Res<Time>,
    size: Res<ViewportSize>,
    roster: Res<VehicleRoster>,
    motions: Res<MotionTable>,
    mut viewport: ResMut<Viewport>,
) {
    let dt = crate::frame_dt(&time);
    viewport.tick_pulse(dt);

    if !viewport.camera_following {
        return;
    }
    let Some(motion) = roster.active.as_ref().and_then(|id| motions.get(id)) else {
        return;
    };
    viewport.follow(motion.pixel, motion.moving, size.0, dt);
    if !viewport.camera_following {
        debug!("camera settled on active vehicle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let vp = Viewport {
            pan: Vec2::new(-300.0, 45.0),
            scale: 1.7,
            ..default()
        };
        let p = Vec2::new(123.0, 456.0);
        assert!(approx(vp.world_to_screen(vp.screen_to_world(p)), p));
    }

    #[test]
    fn test_screen_to_tile() {
        let vp = Viewport {
            pan: Vec2::new(10.0, 10.0),
            scale: 0.5,
            ..default()
        };
        let screen = vp.world_to_screen(GridPos::new(1, 1).center());
        assert_eq!(vp.screen_to_tile(screen), GridPos::new(1, 1));
        assert_eq!(vp.screen_to_tile(Vec2::new(0.0, 0.0)), GridPos::new(-1, -1));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut vp = Viewport {
            pan: Vec2::new(40.0, -25.0),
            scale: 1.0,
            camera_following: true,
            ..default()
        };
        let anchor = Vec2::new(300.0, 200.0);
        let before = vp.screen_to_world(anchor);
        vp.zoom_at(anchor, 1.5);
        assert!((vp.scale - 1.5).abs() < 1e-6);
        assert!(approx(vp.world_to_screen(before), anchor));
        assert!(!vp.camera_following);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::default();
        vp.zoom_at(Vec2::ZERO, 100.0);
        assert_eq!(vp.scale, MAX_SCALE);
        vp.zoom_at(Vec2::ZERO, 0.0001);
        assert_eq!(vp.scale, MIN_SCALE);
        vp.zoom_at(Vec2::ZERO, f32::NAN);
        assert_eq!(vp.scale, MIN_SCALE);
    }

    #[test]
    fn test_wheel_direction() {
        let mut vp = Viewport::default();
        vp.wheel_zoom(Vec2::new(50.0, 50.0), -120.0);
        assert!((vp.scale - WHEEL_ZOOM_IN).abs() < 1e-6);
        vp.wheel_zoom(Vec2::new(50.0, 50.0), 120.0);
        assert!((vp.scale - WHEEL_ZOOM_IN * WHEEL_ZOOM_OUT).abs() < 1e-6);
    }

    #[test]
    fn test_pinch_anchors_on_previous_center() {
        let mut vp = Viewport {
            pan: Vec2::new(12.0, 34.0),
            scale: 1.2,
            ..default()
        };
        let c = Vec2::new(400.0, 300.0);
        let under = vp.screen_to_world(c);
        vp.pinch(c, c, 2.0);
        assert!((vp.scale - 2.4).abs() < 1e-5);
        assert!(approx(vp.world_to_screen(under), c));
    }

    #[test]
    fn test_pinch_translates_with_center() {
        let mut vp = Viewport::default();
        vp.pinch(Vec2::new(100.0, 100.0), Vec2::new(130.0, 90.0), 1.0);
        assert!(approx(vp.pan, Vec2::new(30.0, -10.0)));
        vp.pinch(Vec2::ZERO, Vec2::ZERO, f32::INFINITY);
        assert_eq!(vp.scale, 1.0);
    }

    #[test]
    fn test_follow_converges_and_disengages() {
        let screen = Vec2::new(800.0, 600.0);
        let target = Vec2::new(1000.0, 1000.0);
        let mut vp = Viewport {
            camera_following: true,
            ..default()
        };
        for _ in 0..600 {
            vp.follow(target, false, screen, 1.0 / 60.0);
        }
        assert!(!vp.camera_following);
        let off = (vp.world_to_screen(target) - screen / 2.0).abs();
        assert!(off.x + off.y < FOLLOW_SETTLE_PX);
    }

    #[test]
    fn test_follow_stays_engaged_while_moving() {
        let screen = Vec2::new(800.0, 600.0);
        let mut vp = Viewport {
            camera_following: true,
            ..default()
        };
        for _ in 0..600 {
            vp.follow(Vec2::new(64.0, 64.0), true, screen, 1.0 / 60.0);
        }
        assert!(vp.camera_following);
    }

    #[test]
    fn test_fit_to_caps_scale() {
        let mut vp = Viewport::default();
        let target = GridPos::new(5, 3).center();
        vp.fit_to(target, Vec2::new(4000.0, 4000.0));
        assert_eq!(vp.scale, FIT_MAX_SCALE);
        assert!(approx(vp.world_to_screen(target), Vec2::new(2000.0, 2000.0)));

        vp.fit_to(target, Vec2::new(390.0, 844.0));
        assert!((vp.scale - 390.0 / (FIT_TILES_X * TILE_SIZE)).abs() < 1e-6);
    }
}
