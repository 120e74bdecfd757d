use std::path::PathBuf;

use bevy::prelude::*;
use simulation::grid::WorldGrid;
use simulation::movement::MotionTable;
use simulation::navigation::SaveRequested;
use simulation::vehicles::VehicleRoster;
use simulation::viewport::{Viewport, ViewportSize};
use simulation::SimulationSet;

use crate::save_error::SaveError;
use crate::snapshot::{apply_snapshot, capture_snapshot};
use crate::storage::{load_snapshot, save_snapshot, FileStorage, SaveStorage};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveGameEvent;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct LoadGameEvent;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: f32 = 5.0;

#[derive(Resource, Debug, Clone)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub interval_secs: f32,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
        }
    }
}

/// Seconds since the last autosave.
#[derive(Resource, Debug, Default)]
pub struct AutosaveTimer {
    pub elapsed: f32,
}

/// Snapshot location used when no `SaveStorage` was provided.
#[derive(Resource, Debug, Clone)]
pub struct SavePath(pub PathBuf);

impl Default for SavePath {
    fn default() -> Self {
        Self(PathBuf::from("road_playground.sav"))
    }
}

/// Outcome of the most recent save and load, for status displays.
#[derive(Resource, Debug, Default)]
pub struct SaveStatus {
    pub saves: u32,
    pub last_save_error: Option<String>,
    pub last_load_error: Option<String>,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveSystems;

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveGameEvent>()
            .add_event::<LoadGameEvent>()
            .init_resource::<SavePath>()
            .init_resource::<AutosaveConfig>()
            .init_resource::<AutosaveTimer>()
            .init_resource::<SaveStatus>();

        // Tests and embedders may install their own backend first.
        if !app.world().contains_resource::<SaveStorage>() {
            let path = app.world().resource::<SavePath>().0.clone();
            app.insert_resource(SaveStorage::new(FileStorage::new(path)));
        }

        app.configure_sets(Update, SaveSystems.after(SimulationSet::Camera))
            .add_systems(PostStartup, load_or_fit_on_startup)
            .add_systems(
                Update,
                (
                    forward_save_requests,
                    tick_autosave,
                    handle_load_events,
                    handle_save_events,
                )
                    .chain()
                    .in_set(SaveSystems),
            );
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Simulation-side requests (vehicle switch) become save events.
fn forward_save_requests(
    mut requests: EventReader<SaveRequested>,
    mut saves: EventWriter<SaveGameEvent>,
) {
    if requests.read().count() > 0 {
        saves.send(SaveGameEvent);
    }
}

fn tick_autosave(
    time: Res<Time>,
    config: Res<AutosaveConfig>,
    mut timer: ResMut<AutosaveTimer>,
    mut saves: EventWriter<SaveGameEvent>,
) {
    if !config.enabled {
        return;
    }
    timer.elapsed += time.delta_secs();
    if timer.elapsed >= config.interval_secs {
        timer.elapsed = 0.0;
        saves.send(SaveGameEvent);
    }
}

/// Writes at most one snapshot per frame, however many saves were requested.
fn handle_save_events(
    mut events: EventReader<SaveGameEvent>,
    storage: Res<SaveStorage>,
    roster: Res<VehicleRoster>,
    viewport: Res<Viewport>,
    mut timer: ResMut<AutosaveTimer>,
    mut status: ResMut<SaveStatus>,
) {
    if events.read().count() == 0 {
        return;
    }
    let snapshot = capture_snapshot(&roster, &viewport);
    match save_snapshot(storage.0.as_ref(), &snapshot) {
        Ok(bytes) => {
            debug!("saved snapshot ({bytes} bytes, {} vehicles)", snapshot.vehicles.len());
            status.saves += 1;
            status.last_save_error = None;
        }
        Err(e) => {
            warn!("Save failed: {e}");
            status.last_save_error = Some(e.to_string());
        }
    }
    timer.elapsed = 0.0;
}

fn handle_load_events(
    mut events: EventReader<LoadGameEvent>,
    storage: Res<SaveStorage>,
    grid: Res<WorldGrid>,
    mut roster: ResMut<VehicleRoster>,
    mut motions: ResMut<MotionTable>,
    mut viewport: ResMut<Viewport>,
    mut status: ResMut<SaveStatus>,
) {
    if events.read().count() == 0 {
        return;
    }
    match load_snapshot(storage.0.as_ref()) {
        Ok(snapshot) => {
            let report = apply_snapshot(&snapshot, &grid, &mut roster, &mut motions, &mut viewport);
            info!("Loaded snapshot: {report:?}");
            status.last_load_error = None;
        }
        Err(e) => {
            warn!("Load failed: {e}");
            status.last_load_error = Some(e.to_string());
        }
    }
}

/// Restores the last snapshot, or frames the active vehicle when there is
/// none (or it can't be read).
fn load_or_fit_on_startup(
    storage: Res<SaveStorage>,
    grid: Res<WorldGrid>,
    size: Res<ViewportSize>,
    mut roster: ResMut<VehicleRoster>,
    mut motions: ResMut<MotionTable>,
    mut viewport: ResMut<Viewport>,
    mut status: ResMut<SaveStatus>,
) {
    match load_snapshot(storage.0.as_ref()) {
        Ok(snapshot) => {
            let report = apply_snapshot(&snapshot, &grid, &mut roster, &mut motions, &mut viewport);
            info!("Restored saved state: {report:?}");
            return;
        }
        Err(SaveError::NoData) => debug!("no saved state, using defaults"),
        Err(e) => {
            warn!("Ignoring saved state: {e}");
            status.last_load_error = Some(e.to_string());
        }
    }

    if let Some(active) = roster.active_vehicle() {
        viewport.fit_to(active.pos.center(), size.0);
    }
}
