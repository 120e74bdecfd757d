//! Turns raw pointer events into taps, pans, pinches and wheel zooms.
//!
//! A single pointer starts as a tap candidate. Moving it more than
//! `PAN_THRESHOLD_PX` on either axis turns it into a pan; a second pointer
//! turns the session into a pinch. A tap fires on release only if the
//! pointer never moved and was held for less than `TAP_MAX_MS`.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::config::{PAN_THRESHOLD_PX, TAP_MAX_MS};
use crate::grid::WorldGrid;
use crate::movement::MotionTable;
use crate::navigation::{handle_tap, SaveRequested, TapOutcome};
use crate::vehicles::VehicleRoster;
use crate::viewport::Viewport;

pub type PointerId = u64;

/// Raw input as delivered by the platform layer, in screen pixels.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down {
        id: PointerId,
        pos: Vec2,
        time_ms: u64,
    },
    Move {
        id: PointerId,
        pos: Vec2,
    },
    Up {
        id: PointerId,
        time_ms: u64,
    },
    Cancel {
        id: PointerId,
    },
    Wheel {
        pos: Vec2,
        delta_y: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    /// One pointer down, still a tap candidate.
    Pending,
    Panning,
    Pinching,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PointerSession {
    /// Active pointers. Pinch uses the two lowest ids.
    pointers: BTreeMap<PointerId, Vec2>,
    tap_start_ms: u64,
    tap_start_pos: Vec2,
    moved: bool,
    panning: bool,
    pan_ref: Vec2,
    pinch_dist: f32,
    pinch_center: Vec2,
}

impl PointerSession {
    pub fn mode(&self) -> GestureMode {
        match self.pointers.len() {
            0 => GestureMode::Idle,
            1 if self.panning => GestureMode::Panning,
            1 => GestureMode::Pending,
            _ => GestureMode::Pinching,
        }
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Distance and midpoint of the first two pointers.
    fn pinch_pair(&self) -> Option<(f32, Vec2)> {
        let mut it = self.pointers.values();
        let a = *it.next()?;
        let b = *it.next()?;
        Some((a.distance(b), (a + b) / 2.0))
    }

    fn rebaseline(&mut self) {
        if let Some((dist, center)) = self.pinch_pair() {
            self.pinch_dist = dist;
            self.pinch_center = center;
        } else if let Some(&remaining) = self.pointers.values().next() {
            // Continue panning from where the remaining finger is now.
            self.pan_ref = remaining;
        }
    }

    pub fn pointer_down(&mut self, id: PointerId, pos: Vec2, time_ms: u64) {
        self.pointers.insert(id, pos);
        if self.pointers.len() == 1 {
            self.tap_start_ms = time_ms;
            self.tap_start_pos = pos;
            self.pan_ref = pos;
            self.moved = false;
            self.panning = false;
        } else {
            self.rebaseline();
            self.panning = true;
        }
    }

    pub fn pointer_move(&mut self, id: PointerId, pos: Vec2, viewport: &mut Viewport) {
        let Some(slot) = self.pointers.get_mut(&id) else {
            return;
        };
        *slot = pos;

        if self.pointers.len() == 1 {
            let delta = pos - self.pan_ref;
            if !self.panning && (delta.x.abs() > PAN_THRESHOLD_PX || delta.y.abs() > PAN_THRESHOLD_PX)
            {
                self.panning = true;
                self.moved = true;
                viewport.camera_following = false;
            }
            if self.panning {
                viewport.pan_by(delta);
                self.pan_ref = pos;
            }
        } else if let Some((dist, center)) = self.pinch_pair() {
            let ratio = if self.pinch_dist > 0.0 {
                dist / self.pinch_dist
            } else {
                1.0
            };
            viewport.pinch(self.pinch_center, center, ratio);
            self.pinch_dist = dist;
            self.pinch_center = center;
            self.moved = true;
        }
    }

    /// Releases a pointer. Returns the tap position when the release
    /// completes a tap.
    pub fn pointer_up(&mut self, id: PointerId, time_ms: u64) -> Option<Vec2> {
        let before = self.pointers.len();
        self.pointers.remove(&id)?;

        let elapsed = time_ms.saturating_sub(self.tap_start_ms);
        let tap = (before == 1 && !self.moved && elapsed < TAP_MAX_MS).then_some(self.tap_start_pos);

        self.rebaseline();
        tap
    }

    /// Drops a pointer without ever producing a tap. The remaining pointers
    /// are re-anchored so the next move does not jump.
    pub fn pointer_cancel(&mut self, id: PointerId) {
        if self.pointers.remove(&id).is_some() {
            self.rebaseline();
        }
    }
}

/// Applies pointer events in delivery order and resolves completed taps.
pub fn process_pointer_input(
    mut events: EventReader<PointerInput>,
    mut session: ResMut<PointerSession>,
    grid: Res<WorldGrid>,
    mut roster: ResMut<VehicleRoster>,
    mut motions: ResMut<MotionTable>,
    mut viewport: ResMut<Viewport>,
    mut save_requests: EventWriter<SaveRequested>,
) {
    for event in events.read() {
        match *event {
            PointerInput::Down { id, pos, time_ms } => session.pointer_down(id, pos, time_ms),
            PointerInput::Move { id, pos } => session.pointer_move(id, pos, &mut viewport),
            PointerInput::Up { id, time_ms } => {
                let Some(tap) = session.pointer_up(id, time_ms) else {
                    continue;
                };
                let outcome = handle_tap(tap, &grid, &mut roster, &mut motions, &mut viewport);
                debug!("tap at {tap:?}: {outcome:?}");
                if let TapOutcome::Selected(_) = outcome {
                    save_requests.send(SaveRequested);
                }
            }
            PointerInput::Cancel { id } => session.pointer_cancel(id),
            PointerInput::Wheel { pos, delta_y } => viewport.wheel_zoom(pos, delta_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_still_release_is_tap() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::new(100.0, 100.0), 1_000);
        assert_eq!(session.mode(), GestureMode::Pending);
        session.pointer_move(1, Vec2::new(104.0, 97.0), &mut vp);
        assert_eq!(vp.pan, Vec2::ZERO);
        assert_eq!(
            session.pointer_up(1, 1_200),
            Some(Vec2::new(100.0, 100.0))
        );
        assert_eq!(session.mode(), GestureMode::Idle);
    }

    #[test]
    fn test_slow_release_is_not_tap() {
        let mut session = PointerSession::default();
        session.pointer_down(1, Vec2::ZERO, 1_000);
        assert_eq!(session.pointer_up(1, 1_400), None);
    }

    #[test]
    fn test_drag_pans_and_suppresses_tap() {
        let mut session = PointerSession::default();
        let mut vp = Viewport {
            camera_following: true,
            ..default()
        };
        session.pointer_down(1, Vec2::new(100.0, 100.0), 0);
        session.pointer_move(1, Vec2::new(112.0, 100.0), &mut vp);
        assert_eq!(session.mode(), GestureMode::Panning);
        assert!(!vp.camera_following);
        assert_eq!(vp.pan, Vec2::new(12.0, 0.0));

        session.pointer_move(1, Vec2::new(115.0, 90.0), &mut vp);
        assert_eq!(vp.pan, Vec2::new(15.0, -10.0));
        assert_eq!(session.pointer_up(1, 50), None);
    }

    #[test]
    fn test_threshold_is_per_axis() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::ZERO, 0);
        // Diagonal of length ~9.9 but neither axis exceeds 8.
        session.pointer_move(1, Vec2::new(7.0, 7.0), &mut vp);
        assert_eq!(session.mode(), GestureMode::Pending);
        session.pointer_move(1, Vec2::new(0.0, 8.5), &mut vp);
        assert_eq!(session.mode(), GestureMode::Panning);
    }

    #[test]
    fn test_pinch_zooms_about_midpoint() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::new(100.0, 200.0), 0);
        session.pointer_down(2, Vec2::new(300.0, 200.0), 10);
        assert_eq!(session.mode(), GestureMode::Pinching);

        let mid = Vec2::new(200.0, 200.0);
        let under = vp.screen_to_world(mid);
        session.pointer_move(1, Vec2::new(0.0, 200.0), &mut vp);
        session.pointer_move(2, Vec2::new(400.0, 200.0), &mut vp);
        assert!((vp.scale - 2.0).abs() < 1e-4);
        assert!((vp.world_to_screen(under) - mid).length() < 1e-3);

        assert_eq!(session.pointer_up(2, 30), None);
        assert_eq!(session.pointer_up(1, 40), None);
    }

    #[test]
    fn test_pinch_release_resumes_pan_without_jump() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::new(100.0, 100.0), 0);
        session.pointer_down(2, Vec2::new(200.0, 100.0), 0);
        session.pointer_move(2, Vec2::new(250.0, 100.0), &mut vp);
        session.pointer_up(1, 100);
        assert_eq!(session.mode(), GestureMode::Panning);

        let pan = vp.pan;
        session.pointer_move(2, Vec2::new(252.0, 100.0), &mut vp);
        assert_eq!(vp.pan, pan + Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_still_two_finger_touch_taps_on_last_release() {
        let mut session = PointerSession::default();
        session.pointer_down(1, Vec2::new(10.0, 10.0), 0);
        session.pointer_down(2, Vec2::new(90.0, 10.0), 5);
        // Two pointers down: never a tap.
        assert_eq!(session.pointer_up(2, 20), None);
        assert_eq!(session.pointer_up(1, 30), Some(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_moved_pinch_never_taps() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::new(10.0, 10.0), 0);
        session.pointer_down(2, Vec2::new(90.0, 10.0), 5);
        session.pointer_move(2, Vec2::new(120.0, 10.0), &mut vp);
        assert_eq!(session.pointer_up(2, 20), None);
        assert_eq!(session.pointer_up(1, 30), None);
    }

    #[test]
    fn test_third_pointer_release_keeps_scale() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::new(100.0, 100.0), 0);
        session.pointer_down(2, Vec2::new(200.0, 100.0), 0);
        session.pointer_move(2, Vec2::new(250.0, 100.0), &mut vp);
        session.pointer_down(3, Vec2::new(600.0, 400.0), 10);
        assert_eq!(session.pointer_count(), 3);
        assert_eq!(session.pointer_up(3, 20), None);
        assert_eq!(session.mode(), GestureMode::Pinching);

        // Same distance and midpoint as before the third pointer.
        let scale = vp.scale;
        let pan = vp.pan;
        session.pointer_move(1, Vec2::new(100.0, 100.0), &mut vp);
        assert!((vp.scale - scale).abs() < 1e-6);
        assert!((vp.pan - pan).length() < 1e-3);

        session.pointer_move(2, Vec2::new(325.0, 100.0), &mut vp);
        assert!((vp.scale - scale * 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_cancel_during_pinch_resumes_pan_without_jump() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::new(100.0, 100.0), 0);
        session.pointer_down(2, Vec2::new(200.0, 100.0), 0);
        session.pointer_move(2, Vec2::new(260.0, 100.0), &mut vp);
        session.pointer_cancel(1);
        assert_eq!(session.pointer_count(), 1);

        let pan = vp.pan;
        session.pointer_move(2, Vec2::new(263.0, 104.0), &mut vp);
        assert_eq!(vp.pan, pan + Vec2::new(3.0, 4.0));
        assert_eq!(session.pointer_up(2, 50), None);
    }

    #[test]
    fn test_degenerate_pinch_baseline() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_down(1, Vec2::new(50.0, 50.0), 0);
        session.pointer_down(2, Vec2::new(50.0, 50.0), 0);
        session.pointer_move(2, Vec2::new(80.0, 50.0), &mut vp);
        assert!(vp.scale.is_finite());
        assert_eq!(vp.scale, 1.0);
    }

    #[test]
    fn test_unknown_pointer_ignored() {
        let mut session = PointerSession::default();
        let mut vp = Viewport::default();
        session.pointer_move(9, Vec2::new(500.0, 500.0), &mut vp);
        assert_eq!(session.pointer_up(9, 0), None);
        session.pointer_cancel(9);
        assert_eq!(session.mode(), GestureMode::Idle);
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn test_cancel_never_taps() {
        let mut session = PointerSession::default();
        session.pointer_down(1, Vec2::ZERO, 0);
        session.pointer_cancel(1);
        assert_eq!(session.pointer_count(), 0);
        assert_eq!(session.pointer_up(1, 10), None);
    }
}
