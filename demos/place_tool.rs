use bevy::prelude::*;
use shrike::ShrikeEditorPlugin;

fn main() -> AppExit {
    App::new()
        .add_plugins((DefaultPlugins, ShrikeEditorPlugin))
        .add_systems(Startup, spawn_scene)
        .run()
}

fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Directional light with shadows, positioned away from origin
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 10000.0,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0)
            .with_rotation(Quat::from_euler(EulerRot::XYZ, -0.8, 0.4, 0.0)),
    ));

    let ground_material = materials.add(Color::srgb(0.35, 0.4, 0.35));

    // Ground slab to place onto
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Cuboid::new(20.0, 0.2, 20.0))),
        MeshMaterial3d(ground_material.clone()),
        Transform::from_xyz(0.0, -0.1, 0.0),
    ));

    // Tilted ramp so normal alignment is visible
    commands.spawn((
        Name::new("Ramp"),
        Mesh3d(meshes.add(Cuboid::new(6.0, 0.2, 4.0))),
        MeshMaterial3d(ground_material),
        Transform::from_xyz(5.0, 1.0, -3.0)
            .with_rotation(Quat::from_rotation_z(30.0_f32.to_radians())),
    ));
}
