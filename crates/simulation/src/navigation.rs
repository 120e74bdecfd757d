//! What a tap means: select the vehicle under the finger, or send the active
//! vehicle to the tapped tile.

use bevy::prelude::*;

use crate::config::{TILE_SIZE, VEHICLE_PICK_RADIUS};
use crate::grid::{GridPos, WorldGrid};
use crate::movement::MotionTable;
use crate::pathfinding_sys::{find_path, resolve_road_target};
use crate::vehicles::{VehicleId, VehicleRoster};
use crate::viewport::Viewport;

/// Emitted when the world changed in a way that should be persisted right away.
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveRequested;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// The active vehicle is now driving `hops` segments toward `goal`.
    Started { goal: GridPos, hops: usize },
    /// The resolved goal is the tile the vehicle is on.
    AlreadyThere,
    NoRoute,
    /// The grid has no road tile at all.
    NoRoad,
    NoActiveVehicle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Selected(VehicleId),
    AlreadyActive(VehicleId),
    Navigate(NavigateOutcome),
}

/// Closest vehicle (by animated position) within the pick radius of the
/// world point under `screen`.
pub fn vehicle_near_screen_pos(
    screen: Vec2,
    roster: &VehicleRoster,
    motions: &MotionTable,
    viewport: &Viewport,
) -> Option<VehicleId> {
    let world = viewport.screen_to_world(screen);
    let threshold = TILE_SIZE * VEHICLE_PICK_RADIUS;

    let mut best: Option<(&VehicleId, f32)> = None;
    for vehicle in roster.iter() {
        let Some(motion) = motions.get(&vehicle.id) else {
            continue;
        };
        let dist = world.distance(motion.pixel);
        if dist >= threshold {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((&vehicle.id, dist));
        }
    }
    best.map(|(id, _)| id.clone())
}

/// Makes `id` the active vehicle. The previously active vehicle, if it was
/// driving, is snapped to its current waypoint and stopped.
/// Returns false when `id` is unknown or already active.
pub fn switch_to_vehicle(
    id: &VehicleId,
    roster: &mut VehicleRoster,
    motions: &mut MotionTable,
    viewport: &mut Viewport,
) -> bool {
    if roster.is_active(id) || !roster.contains(id) {
        return false;
    }

    if let Some(current) = roster.active_vehicle_mut() {
        if let Some(motion) = motions.get_mut(&current.id) {
            if motion.moving {
                motion.snap_to_current_waypoint(current);
                motion.stop();
            }
        }
    }

    roster.active = Some(id.clone());
    if motions.contains(id) {
        viewport.camera_following = true;
    }
    true
}

/// Plans a route for the active vehicle to `target`, redirecting to the
/// nearest road when `target` is not one. A vehicle already in motion
/// restarts from the waypoint it last passed.
pub fn navigate_active_vehicle_to(
    target: GridPos,
    grid: &WorldGrid,
    roster: &mut VehicleRoster,
    motions: &mut MotionTable,
    viewport: &mut Viewport,
) -> NavigateOutcome {
    let Some(vehicle) = roster.active_vehicle_mut() else {
        return NavigateOutcome::NoActiveVehicle;
    };
    let Some(motion) = motions.get_mut(&vehicle.id) else {
        return NavigateOutcome::NoActiveVehicle;
    };

    motion.snap_to_current_waypoint(vehicle);
    let start = vehicle.pos;

    let Some(goal) = resolve_road_target(grid, target) else {
        return NavigateOutcome::NoRoad;
    };

    match find_path(grid, start, goal) {
        Some(path) if path.len() >= 2 => {
            let hops = path.len() - 1;
            motion.stop();
            motion.start_path(path);
            viewport.camera_following = true;
            NavigateOutcome::Started { goal, hops }
        }
        Some(_) => NavigateOutcome::AlreadyThere,
        None => NavigateOutcome::NoRoute,
    }
}

/// Resolves a confirmed tap at `screen`.
pub fn handle_tap(
    screen: Vec2,
    grid: &WorldGrid,
    roster: &mut VehicleRoster,
    motions: &mut MotionTable,
    viewport: &mut Viewport,
) -> TapOutcome {
    if let Some(id) = vehicle_near_screen_pos(screen, roster, motions, viewport) {
        return if switch_to_vehicle(&id, roster, motions, viewport) {
            TapOutcome::Selected(id)
        } else {
            TapOutcome::AlreadyActive(id)
        };
    }

    let tile = viewport.screen_to_tile(screen);
    TapOutcome::Navigate(navigate_active_vehicle_to(
        tile, grid, roster, motions, viewport,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Rotation, TileType};
    use crate::vehicles::Vehicle;

    /// Row 0 is an east-west road; everything else is ground.
    fn setup() -> (WorldGrid, VehicleRoster, MotionTable, Viewport) {
        let mut grid = WorldGrid::new(6, 4);
        for x in 0..6 {
            grid.set_tile(GridPos::new(x, 0), TileType::Road, Rotation::R90);
        }
        let mut roster = VehicleRoster::default();
        roster.add(Vehicle::new("a", GridPos::new(0, 0), 0.0, 1.0, 0.0));
        roster.add(Vehicle::new("b", GridPos::new(4, 0), 180.0, 1.0, 0.0));
        let motions = MotionTable::from_roster(&roster);
        (grid, roster, motions, Viewport::default())
    }

    #[test]
    fn test_pick_nearest_within_radius() {
        let (_, roster, motions, viewport) = setup();
        let on_b = GridPos::new(4, 0).center() + Vec2::new(20.0, 10.0);
        assert_eq!(
            vehicle_near_screen_pos(on_b, &roster, &motions, &viewport),
            Some(VehicleId::from("b"))
        );
        let between = GridPos::new(2, 0).center();
        assert_eq!(
            vehicle_near_screen_pos(between, &roster, &motions, &viewport),
            None
        );
    }

    #[test]
    fn test_switch_stops_previous_vehicle_on_waypoint() {
        let (grid, mut roster, mut motions, mut viewport) = setup();
        let outcome = navigate_active_vehicle_to(
            GridPos::new(3, 0),
            &grid,
            &mut roster,
            &mut motions,
            &mut viewport,
        );
        assert_eq!(
            outcome,
            NavigateOutcome::Started {
                goal: GridPos::new(3, 0),
                hops: 3
            }
        );
        motions.advance_all(&mut roster, 0.4);

        viewport.camera_following = false;
        let b = VehicleId::from("b");
        assert!(switch_to_vehicle(&b, &mut roster, &mut motions, &mut viewport));
        assert!(roster.is_active(&b));
        assert!(viewport.camera_following);

        let a = VehicleId::from("a");
        assert!(!motions.get(&a).unwrap().moving);
        assert_eq!(roster.get(&a).unwrap().pos, GridPos::new(1, 0));

        assert!(!switch_to_vehicle(&b, &mut roster, &mut motions, &mut viewport));
        assert!(!switch_to_vehicle(
            &VehicleId::from("ghost"),
            &mut roster,
            &mut motions,
            &mut viewport
        ));
    }

    #[test]
    fn test_navigate_redirects_to_nearest_road() {
        let (grid, mut roster, mut motions, mut viewport) = setup();
        let outcome = navigate_active_vehicle_to(
            GridPos::new(2, 3),
            &grid,
            &mut roster,
            &mut motions,
            &mut viewport,
        );
        assert_eq!(
            outcome,
            NavigateOutcome::Started {
                goal: GridPos::new(2, 0),
                hops: 2
            }
        );
        let motion = motions.get(&VehicleId::from("a")).unwrap();
        assert_eq!(motion.path.last(), Some(&GridPos::new(2, 0)));
    }

    #[test]
    fn test_navigate_with_no_roads_is_noop() {
        let (_, mut roster, mut motions, mut viewport) = setup();
        let empty = WorldGrid::new(6, 4);
        let before = motions.get(&VehicleId::from("a")).cloned();
        let outcome = navigate_active_vehicle_to(
            GridPos::new(1, 1),
            &empty,
            &mut roster,
            &mut motions,
            &mut viewport,
        );
        assert_eq!(outcome, NavigateOutcome::NoRoad);
        assert_eq!(motions.get(&VehicleId::from("a")).cloned(), before);
        assert!(!viewport.camera_following);
    }

    #[test]
    fn test_navigate_to_own_tile_and_unreachable() {
        let (mut grid, mut roster, mut motions, mut viewport) = setup();
        assert_eq!(
            navigate_active_vehicle_to(
                GridPos::new(0, 0),
                &grid,
                &mut roster,
                &mut motions,
                &mut viewport
            ),
            NavigateOutcome::AlreadyThere
        );

        grid.set_tile(GridPos::new(1, 0), TileType::Road, Rotation::R0);
        assert_eq!(
            navigate_active_vehicle_to(
                GridPos::new(5, 0),
                &grid,
                &mut roster,
                &mut motions,
                &mut viewport
            ),
            NavigateOutcome::NoRoute
        );
        assert!(!motions.get(&VehicleId::from("a")).unwrap().moving);
    }

    #[test]
    fn test_navigate_without_active_vehicle() {
        let (grid, mut roster, mut motions, mut viewport) = setup();
        roster.active = None;
        assert_eq!(
            navigate_active_vehicle_to(
                GridPos::new(3, 0),
                &grid,
                &mut roster,
                &mut motions,
                &mut viewport
            ),
            NavigateOutcome::NoActiveVehicle
        );
    }

    #[test]
    fn test_handle_tap_dispatch() {
        let (grid, mut roster, mut motions, mut viewport) = setup();
        let on_a = GridPos::new(0, 0).center();
        assert_eq!(
            handle_tap(on_a, &grid, &mut roster, &mut motions, &mut viewport),
            TapOutcome::AlreadyActive(VehicleId::from("a"))
        );

        let ground = GridPos::new(2, 2).center();
        assert!(matches!(
            handle_tap(ground, &grid, &mut roster, &mut motions, &mut viewport),
            TapOutcome::Navigate(NavigateOutcome::Started { .. })
        ));

        let on_b = GridPos::new(4, 0).center();
        assert_eq!(
            handle_tap(on_b, &grid, &mut roster, &mut motions, &mut viewport),
            TapOutcome::Selected(VehicleId::from("b"))
        );
    }
}
