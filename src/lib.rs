pub mod feedback;
pub mod palette;
pub mod select;
pub mod selection;
pub mod snapping;
pub mod spawn_place;
pub mod trace;
pub mod viewport;

use bevy::prelude::*;

pub use shrike_placement::PlacementSettings;

/// Tag component for entities owned by the editor itself (camera, grid).
/// They are excluded from world traces and from viewport selection.
#[derive(Component, Default)]
pub struct EditorEntity;

pub struct ShrikeEditorPlugin;

impl Plugin for ShrikeEditorPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            viewport::ViewportPlugin,
            snapping::SnappingPlugin,
            selection::SelectionPlugin,
            palette::PalettePlugin,
            select::ViewportSelectPlugin,
            spawn_place::SpawnPlacePlugin,
            feedback::FeedbackPlugin,
        ))
        .init_resource::<PlacementSettings>();
    }
}
