use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGrid, InfiniteGridPlugin};

use crate::EditorEntity;

/// Marker on the editor's 3D viewport camera.
#[derive(Component)]
pub struct EditorCamera;

pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InfiniteGridPlugin)
            .add_systems(Startup, setup_viewport);
    }
}

fn setup_viewport(mut commands: Commands) {
    commands.spawn((
        Name::new("Editor Camera"),
        Camera3d::default(),
        Transform::from_xyz(8.0, 6.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
        EditorCamera,
        EditorEntity,
    ));

    commands.spawn((InfiniteGrid, EditorEntity));
}

/// Build a world-space ray from the window cursor through the editor camera.
pub fn cursor_ray(window: &Window, camera: &Camera, cam_tf: &GlobalTransform) -> Option<Ray3d> {
    let cursor_pos = window.cursor_position()?;
    camera.viewport_to_world(cam_tf, cursor_pos).ok()
}
