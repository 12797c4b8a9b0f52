use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGrid, InfiniteGridSettings};

pub struct SnappingPlugin;

impl Plugin for SnappingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SnapSettings>()
            .init_resource::<GridSettings>()
            .add_systems(Update, sync_grid_settings);
    }
}

/// Editor-global snap increments. The rotation grid interval is read live by
/// the placement solver each frame; per-axis opt-in lives in
/// `PlacementSettings::snap_rotation_to_grid`.
#[derive(Resource)]
pub struct SnapSettings {
    /// Rotation grid size in radians.
    pub rotate_increment: f32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            rotate_increment: 15.0_f32.to_radians(),
        }
    }
}

/// Appearance of the infinite ground grid.
#[derive(Resource)]
pub struct GridSettings {
    pub visible: bool,
    pub scale: f32,
    pub fadeout_distance: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            scale: 1.0,
            fadeout_distance: 100.0,
        }
    }
}

fn sync_grid_settings(
    grid: Res<GridSettings>,
    mut grids: Query<(&mut InfiniteGridSettings, &mut Visibility), With<InfiniteGrid>>,
) {
    if !grid.is_changed() {
        return;
    }
    for (mut settings, mut visibility) in &mut grids {
        settings.scale = grid.scale;
        settings.fadeout_distance = grid.fadeout_distance;
        *visibility = if grid.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}
