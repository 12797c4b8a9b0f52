//! The spawn-and-place tool: hold Alt to preview a spawn location under the
//! cursor, press the left mouse button to spawn, then drag to size and orient
//! the object before releasing. The transform math lives in
//! `shrike_placement`; this module owns the session state machine and the
//! world interaction around it.

use bevy::{
    picking::mesh_picking::ray_cast::MeshRayCast,
    prelude::*,
    window::{PrimaryWindow, WindowFocused},
};
use bevy::camera::primitives::Aabb;
use shrike_placement::{
    PlacementSettings, apply_offsets, compute_anchor_transform,
    compute_cursor_plane_intersection, compute_oriented_rotation, compute_scale,
    is_negligible_scale,
};

use crate::palette::{self, PaletteEntry, SpawnPalette};
use crate::selection::Selection;
use crate::snapping::SnapSettings;
use crate::trace::trace_world_for_position;
use crate::viewport::{EditorCamera, cursor_ray};
use crate::EditorEntity;

pub struct SpawnPlacePlugin;

impl Plugin for SpawnPlacePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlaceToolState>().add_systems(
            Update,
            (
                place_activate,
                place_preview_update,
                place_commit,
                place_drag_update,
                place_reroll,
                place_release,
                place_abort,
            )
                .chain(),
        );
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Marker on the preview proxy so overlays and traces can recognize it.
#[derive(Component)]
pub struct PlacePreview;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacePhase {
    /// Alt is held, a proxy follows the cursor across surfaces.
    Previewing,
    /// The left mouse button is held, dragging sizes and orients the object.
    Placing,
}

/// Everything one placement session carries between frames.
pub struct ActivePlacement {
    pub phase: PlacePhase,
    pub entry: PaletteEntry,
    pub proxy: Option<Entity>,
    pub object: Option<Entity>,
    /// Transform at the committed (or previewed) hit point, unit scale.
    pub anchor: Transform,
    /// Last valid cursor intersection with the anchor plane.
    pub cursor_plane_hit: Vec3,
    /// Local bounding half-extent of the object at unit scale.
    pub reference_extent: Vec3,
    /// False until the extent was read from a real `Aabb` (GLTF scenes load
    /// their meshes a few frames after spawning).
    pub extent_resolved: bool,
    /// Selection to restore when the session ends without placing anything.
    pub saved_selection: Vec<Entity>,
    warned_fallback: bool,
    warned_recovered: bool,
}

/// Resource driving the tool. `active` is `None` while the tool is idle.
#[derive(Resource, Default)]
pub struct PlaceToolState {
    pub active: Option<ActivePlacement>,
}

impl PlaceToolState {
    /// Viewport click-selection is suppressed while a session is running.
    pub fn selection_allowed(&self) -> bool {
        self.active.is_none()
    }

    /// Rerolling only applies while dragging; the preview transform uses no
    /// random values.
    pub fn reroll_allowed(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.phase == PlacePhase::Placing)
    }
}

fn alt_pressed(keys: &ButtonInput<KeyCode>) -> bool {
    keys.pressed(KeyCode::AltLeft) || keys.pressed(KeyCode::AltRight)
}

fn alt_just_pressed(keys: &ButtonInput<KeyCode>) -> bool {
    keys.just_pressed(KeyCode::AltLeft) || keys.just_pressed(KeyCode::AltRight)
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

fn place_activate(
    mut state: ResMut<PlaceToolState>,
    mut settings: ResMut<PlacementSettings>,
    mut palette: ResMut<SpawnPalette>,
    mut selection: ResMut<Selection>,
    snap: Res<SnapSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    mut ray_cast: MeshRayCast,
    editor_entities: Query<(), With<EditorEntity>>,
    parents: Query<&ChildOf>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
) {
    if state.active.is_some() || !alt_just_pressed(&keys) {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, cam_tf)) = cameras.single() else {
        return;
    };
    let Some(ray) = cursor_ray(window, camera, cam_tf) else {
        return;
    };

    // No surface under the cursor means the tool stays idle; Alt alone does
    // not start a session.
    let hit = trace_world_for_position(ray, &mut ray_cast, &[], &editor_entities, &parents);
    let Ok(anchor) = compute_anchor_transform(hit.as_ref(), &settings, snap.rotate_increment)
    else {
        return;
    };

    state.active = start_preview_session(
        anchor,
        &mut settings,
        &mut palette,
        &mut selection,
        &mut commands,
        &mut meshes,
        &mut materials,
        &asset_server,
    );
}

/// Pick the next asset, spawn its preview proxy at the anchor, and stash the
/// current selection. Shared between fresh activation and the roll-over after
/// a placement while Alt stays held.
fn start_preview_session(
    anchor: Transform,
    settings: &mut PlacementSettings,
    palette: &mut SpawnPalette,
    selection: &mut Selection,
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    asset_server: &AssetServer,
) -> Option<ActivePlacement> {
    let Some(entry) = palette.pick() else {
        warn!("No placeable assets selected, nothing to spawn");
        return None;
    };

    settings.regenerate_random_values();

    let proxy = palette::spawn_entry(commands, meshes, materials, asset_server, &entry, anchor);
    commands.entity(proxy).insert(PlacePreview);

    let saved_selection = selection.entities.clone();
    selection.clear(commands);

    let reference_extent = entry.extent_hint().unwrap_or(Vec3::splat(0.5));
    let extent_resolved = entry.extent_hint().is_some();

    Some(ActivePlacement {
        phase: PlacePhase::Previewing,
        entry,
        proxy: Some(proxy),
        object: None,
        anchor,
        cursor_plane_hit: anchor.translation,
        reference_extent,
        extent_resolved,
        saved_selection,
        warned_fallback: false,
        warned_recovered: false,
    })
}

// ---------------------------------------------------------------------------
// Previewing
// ---------------------------------------------------------------------------

fn place_preview_update(
    mut state: ResMut<PlaceToolState>,
    settings: Res<PlacementSettings>,
    snap: Res<SnapSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    mut ray_cast: MeshRayCast,
    editor_entities: Query<(), With<EditorEntity>>,
    parents: Query<&ChildOf>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(active) = state.active.as_mut() else {
        return;
    };
    if active.phase != PlacePhase::Previewing {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, cam_tf)) = cameras.single() else {
        return;
    };
    let Some(ray) = cursor_ray(window, camera, cam_tf) else {
        return;
    };

    let ignore: Vec<Entity> = active.proxy.into_iter().collect();
    let Some(hit) =
        trace_world_for_position(ray, &mut ray_cast, &ignore, &editor_entities, &parents)
    else {
        // Cursor moved off all geometry; the proxy stays on the last surface.
        return;
    };

    if let Ok(anchor) = compute_anchor_transform(Some(&hit), &settings, snap.rotate_increment) {
        active.anchor = anchor;
        active.cursor_plane_hit = anchor.translation;
        if let Some(proxy) = active.proxy
            && let Ok(mut transform) = transforms.get_mut(proxy)
        {
            *transform = anchor;
        }
    }
}

// ---------------------------------------------------------------------------
// Commit (press)
// ---------------------------------------------------------------------------

fn place_commit(
    mut state: ResMut<PlaceToolState>,
    settings: Res<PlacementSettings>,
    snap: Res<SnapSettings>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    mut ray_cast: MeshRayCast,
    editor_entities: Query<(), With<EditorEntity>>,
    parents: Query<&ChildOf>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
) {
    let Some(active) = state.active.as_mut() else {
        return;
    };
    if active.phase != PlacePhase::Previewing || !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, cam_tf)) = cameras.single() else {
        return;
    };
    let Some(ray) = cursor_ray(window, camera, cam_tf) else {
        return;
    };

    let ignore: Vec<Entity> = active.proxy.into_iter().collect();
    let Some(hit) =
        trace_world_for_position(ray, &mut ray_cast, &ignore, &editor_entities, &parents)
    else {
        // Pressing over empty space does nothing; the session keeps previewing.
        return;
    };
    let Ok(anchor) = compute_anchor_transform(Some(&hit), &settings, snap.rotate_increment)
    else {
        return;
    };

    if let Some(proxy) = active.proxy.take() {
        commands.entity(proxy).despawn();
    }

    let object = palette::spawn_entry(
        &mut commands,
        &mut meshes,
        &mut materials,
        &asset_server,
        &active.entry,
        anchor,
    );

    active.object = Some(object);
    active.anchor = anchor;
    active.cursor_plane_hit = anchor.translation;
    active.phase = PlacePhase::Placing;
}

// ---------------------------------------------------------------------------
// Dragging
// ---------------------------------------------------------------------------

fn place_drag_update(
    mut state: ResMut<PlaceToolState>,
    settings: Res<PlacementSettings>,
    snap: Res<SnapSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    aabbs: Query<&Aabb>,
    children: Query<&Children>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(active) = state.active.as_mut() else {
        return;
    };
    if active.phase != PlacePhase::Placing {
        return;
    }
    let Some(object) = active.object else { return };

    // GLTF extents become available once the scene's meshes have loaded.
    if !active.extent_resolved
        && let Some(extent) = palette::resolve_extent(object, &aabbs, &children)
    {
        active.reference_extent = extent;
        active.extent_resolved = true;
    }

    if let Ok(window) = windows.single()
        && let Ok((camera, cam_tf)) = cameras.single()
        && let Some(ray) = cursor_ray(window, camera, cam_tf)
    {
        active.cursor_plane_hit = compute_cursor_plane_intersection(
            &active.anchor,
            ray.origin,
            *ray.direction,
            active.cursor_plane_hit,
        );
    }

    let scale = compute_scale(
        active.cursor_plane_hit,
        &active.anchor,
        active.reference_extent,
        &settings,
    );
    if scale.recovered && !active.warned_recovered {
        warn!("Placement scale was not finite, clamped to a safe default");
        active.warned_recovered = true;
    }

    let oriented = compute_oriented_rotation(
        &active.anchor,
        active.cursor_plane_hit,
        &settings,
        snap.rotate_increment,
    );
    if oriented.fallback && !active.warned_fallback {
        warn!(
            "Axis alignment configuration is contradictory, using default orientation"
        );
        active.warned_fallback = true;
    }

    let transform = apply_offsets(
        Transform {
            translation: active.anchor.translation,
            rotation: oriented.rotation,
            scale: scale.value,
        },
        &settings,
    );
    if let Ok(mut object_transform) = transforms.get_mut(object) {
        *object_transform = transform;
    }
}

// ---------------------------------------------------------------------------
// Reroll
// ---------------------------------------------------------------------------

fn place_reroll(
    state: Res<PlaceToolState>,
    mut settings: ResMut<PlacementSettings>,
    keys: Res<ButtonInput<KeyCode>>,
) {
    if !state.reroll_allowed() || !keys.just_pressed(KeyCode::KeyR) {
        return;
    }
    // The next drag-update frame recomputes the transform from the new values.
    settings.regenerate_random_values();
}

// ---------------------------------------------------------------------------
// Release and abort
// ---------------------------------------------------------------------------

fn place_release(
    mut state: ResMut<PlaceToolState>,
    mut settings: ResMut<PlacementSettings>,
    mut palette: ResMut<SpawnPalette>,
    mut selection: ResMut<Selection>,
    snap: Res<SnapSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    mut ray_cast: MeshRayCast,
    editor_entities: Query<(), With<EditorEntity>>,
    parents: Query<&ChildOf>,
    transforms: Query<&Transform>,
    mut commands: Commands,
    // Grouped so the system stays within Bevy's 16-parameter tuple limit.
    (mut meshes, mut materials): (ResMut<Assets<Mesh>>, ResMut<Assets<StandardMaterial>>),
    asset_server: Res<AssetServer>,
) {
    let finishing = state
        .active
        .as_ref()
        .is_some_and(|a| a.phase == PlacePhase::Placing)
        && buttons.just_released(MouseButton::Left);
    if !finishing {
        return;
    }
    let Some(mut active) = state.active.take() else {
        return;
    };

    let discarded = finalize_placement(&mut active, &transforms, &mut selection, &mut commands);

    // With Alt still held the tool rolls straight into previewing the next
    // asset; otherwise it goes idle.
    if !alt_pressed(&keys) {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, cam_tf)) = cameras.single() else {
        return;
    };
    let Some(ray) = cursor_ray(window, camera, cam_tf) else {
        return;
    };

    // A just-discarded object's despawn is still a deferred command; keep it
    // out of the re-trace so the new preview cannot anchor onto it.
    let ignore: Vec<Entity> = discarded.into_iter().collect();
    let hit = trace_world_for_position(ray, &mut ray_cast, &ignore, &editor_entities, &parents);
    let Ok(anchor) = compute_anchor_transform(hit.as_ref(), &settings, snap.rotate_increment)
    else {
        return;
    };

    state.active = start_preview_session(
        anchor,
        &mut settings,
        &mut palette,
        &mut selection,
        &mut commands,
        &mut meshes,
        &mut materials,
        &asset_server,
    );
}

fn place_abort(
    mut state: ResMut<PlaceToolState>,
    mut selection: ResMut<Selection>,
    keys: Res<ButtonInput<KeyCode>>,
    mut focus_events: MessageReader<WindowFocused>,
    transforms: Query<&Transform>,
    mut commands: Commands,
) {
    let lost_focus = focus_events.read().any(|event| !event.focused);
    let alt_released = (keys.just_released(KeyCode::AltLeft)
        || keys.just_released(KeyCode::AltRight))
        && !alt_pressed(&keys);
    if state.active.is_none() || (!alt_released && !lost_focus) {
        return;
    }
    let Some(mut active) = state.active.take() else {
        return;
    };

    match active.phase {
        PlacePhase::Previewing => {
            if let Some(proxy) = active.proxy.take() {
                commands.entity(proxy).despawn();
            }
            let saved = active.saved_selection.clone();
            selection.restore(&mut commands, &saved);
        }
        // Mid-drag the same rule as a mouse release applies: a negligible
        // drag discards the object, anything else keeps it.
        PlacePhase::Placing => {
            let _ = finalize_placement(&mut active, &transforms, &mut selection, &mut commands);
        }
    }
}

/// Keep or discard the dragged object based on its final scale, and update
/// the selection accordingly. Returns the discarded entity, if any, so the
/// caller can exclude it from a re-trace while its despawn is still deferred.
fn finalize_placement(
    active: &mut ActivePlacement,
    transforms: &Query<&Transform>,
    selection: &mut Selection,
    commands: &mut Commands,
) -> Option<Entity> {
    let object = active.object.take()?;
    let scale = transforms
        .get(object)
        .map(|t| t.scale)
        .unwrap_or(Vec3::ONE);

    if is_negligible_scale(scale) {
        commands.entity(object).despawn();
        let saved = active.saved_selection.clone();
        selection.restore(commands, &saved);
        Some(object)
    } else {
        selection.select_single(commands, object);
        active.saved_selection = vec![object];
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteSource;
    use crate::selection::Selected;
    use bevy::ecs::system::SystemState;

    fn test_session(
        phase: PlacePhase,
        object: Option<Entity>,
        saved_selection: Vec<Entity>,
    ) -> ActivePlacement {
        ActivePlacement {
            phase,
            entry: PaletteEntry {
                name: "Cube".into(),
                source: PaletteSource::Cuboid {
                    half_extent: Vec3::splat(0.5),
                },
            },
            proxy: None,
            object,
            anchor: Transform::IDENTITY,
            cursor_plane_hit: Vec3::ZERO,
            reference_extent: Vec3::splat(0.5),
            extent_resolved: true,
            saved_selection,
            warned_fallback: false,
            warned_recovered: false,
        }
    }

    fn run_finalize(
        world: &mut World,
        active: &mut ActivePlacement,
        selection: &mut Selection,
    ) -> Option<Entity> {
        let mut system_state: SystemState<(Query<&Transform>, Commands)> =
            SystemState::new(world);
        let discarded = {
            let (transforms, mut commands) = system_state.get_mut(world);
            finalize_placement(active, &transforms, selection, &mut commands)
        };
        system_state.apply(world);
        discarded
    }

    #[test]
    fn idle_state_allows_selection() {
        let state = PlaceToolState::default();
        assert!(state.selection_allowed());
    }

    #[test]
    fn active_session_suppresses_selection() {
        let state = PlaceToolState {
            active: Some(test_session(PlacePhase::Previewing, None, Vec::new())),
        };
        assert!(!state.selection_allowed());
    }

    #[test]
    fn reroll_only_applies_while_placing() {
        let mut state = PlaceToolState::default();
        assert!(!state.reroll_allowed());

        state.active = Some(test_session(PlacePhase::Previewing, None, Vec::new()));
        assert!(!state.reroll_allowed());

        state.active.as_mut().unwrap().phase = PlacePhase::Placing;
        assert!(state.reroll_allowed());
    }

    #[test]
    fn negligible_release_discards_the_object_and_restores_selection() {
        let mut world = World::new();
        let previous = world.spawn((Transform::IDENTITY, Selected)).id();
        let object = world.spawn(Transform::from_scale(Vec3::ZERO)).id();

        let mut selection = Selection::default();
        selection.entities.push(previous);
        let mut active = test_session(PlacePhase::Placing, Some(object), vec![previous]);

        let discarded = run_finalize(&mut world, &mut active, &mut selection);

        assert_eq!(discarded, Some(object));
        assert!(world.get_entity(object).is_err());
        assert_eq!(selection.entities, vec![previous]);
        assert!(world.entity(previous).contains::<Selected>());
    }

    #[test]
    fn meaningful_release_keeps_and_selects_the_object() {
        let mut world = World::new();
        let previous = world.spawn((Transform::IDENTITY, Selected)).id();
        let object = world.spawn(Transform::from_scale(Vec3::splat(1.5))).id();

        let mut selection = Selection::default();
        selection.entities.push(previous);
        let mut active = test_session(PlacePhase::Placing, Some(object), vec![previous]);

        let discarded = run_finalize(&mut world, &mut active, &mut selection);

        assert_eq!(discarded, None);
        assert!(world.get_entity(object).is_ok());
        assert_eq!(selection.entities, vec![object]);
        assert!(world.entity(object).contains::<Selected>());
        assert!(!world.entity(previous).contains::<Selected>());
        assert_eq!(active.saved_selection, vec![object]);
    }
}
