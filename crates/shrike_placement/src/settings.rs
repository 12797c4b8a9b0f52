use bevy::prelude::*;

use crate::axis::{AxisType, Bool3};
use crate::random::RandomMinMaxVector;

/// User-editable settings driving the spawn-and-place tool. Treated as
/// immutable for the duration of one placement session, except for the cached
/// random values which the session rerolls explicitly.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct PlacementSettings {
    /// Local axis of the object to point along the traced surface normal.
    pub axis_to_align_with_normal: AxisType,
    /// Local axis of the object to point toward the projected cursor position.
    /// If this resolves to the same physical axis as the normal alignment the
    /// solver falls back to a default orientation instead of failing.
    pub axis_to_align_with_cursor: AxisType,
    /// Per-axis opt-in: snap the rotation euler angle to the editor grid.
    pub snap_rotation_to_grid: Bool3,
    pub apply_random_rotation: bool,
    /// Additive random rotation in degrees, rerolled on demand.
    pub random_rotation: RandomMinMaxVector,
    pub apply_random_scale: bool,
    /// Multiplicative random scale, rerolled on demand. Components may be
    /// configured to randomly negate (mirrored placement).
    pub random_scale: RandomMinMaxVector,
    /// Drive scale by cursor distance from the anchor, normalized against the
    /// object's bounding extent.
    pub scale_bounds_towards_cursor: bool,
    /// Floor for the scale magnitude per component. Must stay above zero to
    /// avoid degenerate transforms.
    pub minimal_scale: f32,
    /// Spawn location offset in the object's local space.
    pub relative_location_offset: Vec3,
    /// Multiply the relative offset by the computed scale.
    pub scale_relative_location_offset: bool,
    /// Spawn location offset in world space.
    pub world_location_offset: Vec3,
    /// Multiply the world offset by the computed scale.
    pub scale_world_location_offset: bool,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            axis_to_align_with_normal: AxisType::Up,
            axis_to_align_with_cursor: AxisType::Forward,
            snap_rotation_to_grid: Bool3::default(),
            apply_random_rotation: false,
            random_rotation: RandomMinMaxVector::splat(0.0, 0.0),
            apply_random_scale: false,
            random_scale: RandomMinMaxVector::splat(0.8, 1.2),
            scale_bounds_towards_cursor: true,
            minimal_scale: 0.1,
            relative_location_offset: Vec3::ZERO,
            scale_relative_location_offset: false,
            world_location_offset: Vec3::ZERO,
            scale_world_location_offset: false,
        }
    }
}

impl PlacementSettings {
    /// The cursor-alignment axis with its sign stripped, so Backward resolves
    /// to Forward's bounding extent, Down to Up's, and so on.
    pub fn positive_cursor_axis(&self) -> AxisType {
        self.axis_to_align_with_cursor.positive()
    }

    /// Reroll the cached random rotation and scale values.
    pub fn regenerate_random_values(&mut self) {
        self.random_rotation.regenerate();
        self.random_scale.regenerate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_minimal_scale_is_positive() {
        assert!(PlacementSettings::default().minimal_scale > 0.0);
    }

    #[test]
    fn positive_cursor_axis_resolves_sign() {
        let settings = PlacementSettings {
            axis_to_align_with_cursor: AxisType::Backward,
            ..default()
        };
        assert_eq!(settings.positive_cursor_axis(), AxisType::Forward);
    }
}
