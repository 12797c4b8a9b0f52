use bevy::prelude::*;
use shrike_placement::{AxisType, PlacementSettings};

use crate::snapping::GridSettings;
use crate::spawn_place::{PlacePhase, PlaceToolState};

/// Gizmo overlays for the spawn-and-place tool: an anchor marker while
/// previewing, and an anchor circle plus cursor guide line while dragging.
pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_place_overlays);
    }
}

const ANCHOR_COLOR: Color = Color::srgb(0.95, 0.75, 0.2);
const CROSS_SIZE: f32 = 0.25;

fn draw_place_overlays(
    state: Res<PlaceToolState>,
    settings: Res<PlacementSettings>,
    grid: Res<GridSettings>,
    transforms: Query<&Transform>,
    mut gizmos: Gizmos,
) {
    let Some(active) = state.active.as_ref() else {
        return;
    };

    let anchor = &active.anchor;
    let up = anchor.rotation * Vec3::Y;

    match active.phase {
        PlacePhase::Previewing => {
            draw_cross(&mut gizmos, anchor.translation, up, ANCHOR_COLOR);
        }
        PlacePhase::Placing => {
            // Circle radius tracks the dragged object's current footprint.
            let scale = active
                .object
                .and_then(|object| transforms.get(object).ok())
                .map(|t| t.scale.abs().max_element())
                .unwrap_or(1.0);
            let radius = active.reference_extent.max_element() * scale;
            let isometry = Isometry3d::new(
                anchor.translation,
                Quat::from_rotation_arc(Vec3::Z, up),
            );
            gizmos.circle(isometry, radius.max(0.05), ANCHOR_COLOR);

            gizmos.line(
                anchor.translation,
                active.cursor_plane_hit,
                cursor_axis_color(settings.positive_cursor_axis()),
            );
            draw_cross(&mut gizmos, active.cursor_plane_hit, up, ANCHOR_COLOR);
            draw_plane_dots(&mut gizmos, anchor, radius.max(1.0), grid.scale);
        }
    }
}

/// Dots on the anchor plane at the visual grid spacing, out to just past the
/// drag radius, so the dragged footprint reads against the grid.
fn draw_plane_dots(gizmos: &mut Gizmos, anchor: &Transform, radius: f32, spacing: f32) {
    let spacing = spacing.max(0.25);
    let steps = ((radius * 1.5 / spacing).ceil() as i32).min(8);
    let right = anchor.rotation * Vec3::X;
    let forward = anchor.rotation * Vec3::NEG_Z;
    let up = anchor.rotation * Vec3::Y;
    let dot = up * 0.015;
    let color = ANCHOR_COLOR.with_alpha(0.4);

    for i in -steps..=steps {
        for j in -steps..=steps {
            let offset = right * (i as f32 * spacing) + forward * (j as f32 * spacing);
            let point = anchor.translation + offset;
            gizmos.line(point - dot, point + dot, color);
        }
    }
}

/// Tint the guide line by the local axis being dragged toward the cursor,
/// matching the usual XYZ gizmo colors.
fn cursor_axis_color(axis: AxisType) -> Color {
    match axis {
        AxisType::Right => Color::srgb(0.9, 0.2, 0.2),
        AxisType::Up => Color::srgb(0.2, 0.9, 0.2),
        AxisType::Forward => Color::srgb(0.2, 0.4, 0.9),
        _ => Color::srgb(0.9, 0.9, 0.9),
    }
}

fn draw_cross(gizmos: &mut Gizmos, position: Vec3, up: Vec3, color: Color) {
    let tangent = if up.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let a = up.cross(tangent).normalize_or_zero() * CROSS_SIZE;
    let b = up.cross(a).normalize_or_zero() * CROSS_SIZE;
    gizmos.line(position - a, position + a, color);
    gizmos.line(position - b, position + b, color);
}
