use bevy::{
    picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility},
    prelude::*,
    window::PrimaryWindow,
};

use crate::spawn_place::PlaceToolState;
use crate::selection::Selection;
use crate::viewport::{EditorCamera, cursor_ray};
use crate::EditorEntity;

/// Click-to-select in the 3D viewport. Plain click selects the entity under
/// the cursor, Ctrl+Click toggles it, clicking empty space clears the
/// selection. Disabled entirely while a placement session is running.
pub struct ViewportSelectPlugin;

impl Plugin for ViewportSelectPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, viewport_click_select);
    }
}

fn viewport_click_select(
    place_state: Res<PlaceToolState>,
    mut selection: ResMut<Selection>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    mut ray_cast: MeshRayCast,
    editor_entities: Query<(), With<EditorEntity>>,
    parents: Query<&ChildOf>,
    names: Query<(), With<Name>>,
    mut commands: Commands,
) {
    if !place_state.selection_allowed() || !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, cam_tf)) = cameras.single() else {
        return;
    };
    let Some(ray) = cursor_ray(window, camera, cam_tf) else {
        return;
    };

    let ctrl = keys.pressed(KeyCode::ControlLeft) || keys.pressed(KeyCode::ControlRight);

    // Hits land on leaf meshes; walk up to the named scene root, which is
    // the entity the user thinks of as "the object".
    let settings = MeshRayCastSettings::default().with_visibility(RayCastVisibility::Any);
    let hit_entity = ray_cast
        .cast_ray(ray, &settings)
        .iter()
        .map(|(entity, _)| *entity)
        .find(|entity| !editor_entities.contains(*entity))
        .map(|entity| find_selectable_ancestor(entity, &parents, &names));

    match hit_entity {
        Some(entity) => {
            if ctrl {
                selection.toggle(&mut commands, entity);
            } else {
                selection.select_single(&mut commands, entity);
            }
        }
        None if !ctrl => selection.clear(&mut commands),
        None => {}
    }
}

/// Walk up from a hit mesh to the nearest named ancestor. Falls back to the
/// hit entity itself when nothing above it carries a `Name`.
fn find_selectable_ancestor(
    entity: Entity,
    parents: &Query<&ChildOf>,
    names: &Query<(), With<Name>>,
) -> Entity {
    let mut current = entity;
    loop {
        if names.contains(current) {
            return current;
        }
        match parents.get(current) {
            Ok(&ChildOf(parent)) => current = parent,
            Err(_) => return entity,
        }
    }
}
