//! Stateless placement transform solver.
//!
//! Given a world-trace hit, a previous anchor transform, and the placement
//! settings, these functions compute the location, rotation, and scale of the
//! object being placed. Degenerate numeric input never panics: every function
//! degrades to a safe default and reports the degradation through its return
//! value so the caller can log it. The only hard error is [`PlaceError::NoHit`].

use bevy::prelude::*;
use thiserror::Error;

use crate::axis::{AxisType, BasisSlot, Bool3};
use crate::settings::PlacementSettings;

/// Result of a world trace: where the cursor ray hit scene geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceHit {
    pub location: Vec3,
    pub normal: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("world trace hit nothing under the cursor")]
    NoHit,
}

/// Rotation produced by [`compute_oriented_rotation`]. `fallback` is set when
/// the axis configuration was contradictory and the solver had to fall back to
/// the uncorrected anchor basis; it is a diagnostic signal, not a failure.
#[derive(Clone, Copy, Debug)]
pub struct OrientedRotation {
    pub rotation: Quat,
    pub fallback: bool,
}

/// Scale produced by [`compute_scale`]. `recovered` is set when a non-finite
/// intermediate had to be replaced with a safe default.
#[derive(Clone, Copy, Debug)]
pub struct ComputedScale {
    pub value: Vec3,
    pub recovered: bool,
}

const PARALLEL_EPSILON: f32 = 1e-6;
const COINCIDENT_EPSILON: f32 = 1e-4;
const NEGLIGIBLE_SCALE: f32 = 1e-4;

/// Compute the anchor transform for a fresh trace hit.
///
/// The up-axis follows the surface normal when normal alignment is configured,
/// world up otherwise; the forward axis is a world-forward placeholder that
/// [`compute_oriented_rotation`] later refines from the cursor direction.
/// `grid_interval` is the editor's live rotation grid size in radians.
pub fn compute_anchor_transform(
    hit: Option<&TraceHit>,
    settings: &PlacementSettings,
    grid_interval: f32,
) -> Result<Transform, PlaceError> {
    let hit = hit.ok_or(PlaceError::NoHit)?;

    let up = if settings.axis_to_align_with_normal == AxisType::None {
        Vec3::Y
    } else {
        let normal = hit.normal.normalize_or_zero();
        if normal == Vec3::ZERO { Vec3::Y } else { normal }
    };

    let rotation = basis_from_up_forward(up, Vec3::NEG_Z);
    let rotation = snap_rotation(rotation, settings.snap_rotation_to_grid, grid_interval);

    Ok(Transform {
        translation: hit.location,
        rotation,
        scale: Vec3::ONE,
    })
}

/// Intersect the cursor ray with the anchor plane (anchor location, anchor up).
///
/// When the ray runs parallel to the plane the denominator vanishes; the
/// previous intersection point is returned unchanged so the caller never sees
/// a NaN.
pub fn compute_cursor_plane_intersection(
    anchor: &Transform,
    ray_origin: Vec3,
    ray_dir: Vec3,
    previous: Vec3,
) -> Vec3 {
    let normal = anchor.rotation * Vec3::Y;
    let denom = normal.dot(ray_dir);
    if denom.abs() < PARALLEL_EPSILON {
        return previous;
    }
    let t = normal.dot(anchor.translation - ray_origin) / denom;
    let point = ray_origin + ray_dir * t;
    if point.is_finite() { point } else { previous }
}

/// The core axis-alignment algorithm: orient the object so the configured
/// local axes point along the surface normal and toward the cursor.
pub fn compute_oriented_rotation(
    anchor: &Transform,
    cursor_hit: Vec3,
    settings: &PlacementSettings,
    grid_interval: f32,
) -> OrientedRotation {
    let anchor_forward = anchor.rotation * Vec3::NEG_Z;

    // At the moment of press-down the cursor has not moved off the anchor yet;
    // substitute the anchor's own forward so the direction is well defined.
    let mut direction = (cursor_hit - anchor.translation).normalize_or_zero();
    if direction == Vec3::ZERO {
        direction = anchor_forward;
    }

    let forward = if settings.axis_to_align_with_cursor == AxisType::None {
        anchor_forward
    } else {
        direction
    };

    // Re-orthogonalize the anchor's up against the cursor-driven forward.
    let mut up = anchor.rotation * Vec3::Y;
    if forward.dot(up).abs() > 1.0 - COINCIDENT_EPSILON {
        up = if forward.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    }
    let right = forward.cross(up).normalize_or_zero();
    let (right, up) = if right == Vec3::ZERO {
        // Forward still coincides with the substitute up; give up on the
        // anchor basis and use any orthonormal frame around forward.
        let fallback_up = if forward.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
        let right = forward.cross(fallback_up).normalize();
        (right, right.cross(forward))
    } else {
        (right, right.cross(forward))
    };

    // Fill the three local basis slots from the axis configuration. The
    // normal-alignment axis claims its slot first; the cursor axis does not
    // overwrite an already-claimed slot (the contradictory configuration).
    let mut slots = [Vec3::ZERO; 3];
    let mut contradiction = false;

    if let Some(slot) = settings.axis_to_align_with_normal.slot() {
        let sign = if settings.axis_to_align_with_normal.is_negative() {
            -1.0
        } else {
            1.0
        };
        slots[slot_index(slot)] = up * sign;
    }
    if let Some(slot) = settings.axis_to_align_with_cursor.slot() {
        let index = slot_index(slot);
        if slots[index] != Vec3::ZERO {
            contradiction = true;
        } else {
            let sign = if settings.axis_to_align_with_cursor.is_negative() {
                -1.0
            } else {
                1.0
            };
            slots[index] = forward * sign;
        }
    }

    let filled = slots.iter().filter(|v| **v != Vec3::ZERO).count();
    let both_configured = settings.axis_to_align_with_normal != AxisType::None
        && settings.axis_to_align_with_cursor != AxisType::None;

    let (mut rotation, fallback) = if filled == 2 {
        match basis_from_slots(&slots) {
            Some(rotation) => (rotation, false),
            // The two alignment vectors were parallel; the slot pair cannot
            // span a basis.
            None => (quat_from_axes(right, up, forward), true),
        }
    } else {
        // Fewer than two slots filled: with at most one axis configured this
        // is the designed default orientation, with both configured it is the
        // contradiction fallback.
        (
            quat_from_axes(right, up, forward),
            contradiction || both_configured,
        )
    };

    if settings.apply_random_rotation {
        // The random vector's Y, Z, X components feed pitch, yaw, roll — the
        // rotation offset is an additive euler offset per axis.
        let offset = settings.random_rotation.current();
        let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
        rotation = Quat::from_euler(
            EulerRot::YXZ,
            yaw + offset.z.to_radians(),
            pitch + offset.y.to_radians(),
            roll + offset.x.to_radians(),
        );
    }

    rotation = snap_rotation(rotation, settings.snap_rotation_to_grid, grid_interval);

    OrientedRotation { rotation, fallback }
}

/// Compute the object scale from cursor distance, bounding extent, and the
/// random scale settings. `reference_extent` is the object's local bounding
/// half-extent at unit scale.
pub fn compute_scale(
    cursor_hit: Vec3,
    anchor: &Transform,
    reference_extent: Vec3,
    settings: &PlacementSettings,
) -> ComputedScale {
    let distance = (cursor_hit - anchor.translation).length();

    let mut scale = if settings.apply_random_scale {
        settings.random_scale.current()
    } else {
        Vec3::ONE
    };

    if settings.scale_bounds_towards_cursor {
        // With random scale active the random value only contributes the
        // shape ratio; cursor distance dictates the magnitude.
        if settings.apply_random_scale {
            let max_component = scale.abs().max_element();
            if max_component > f32::EPSILON {
                scale /= max_component;
            }
        }
        let bounds_used = match settings.positive_cursor_axis() {
            AxisType::Right => reference_extent.x,
            AxisType::Up => reference_extent.y,
            AxisType::Forward => reference_extent.z,
            _ => reference_extent.x.max(reference_extent.z),
        };
        scale *= distance / bounds_used;
    }

    let mut recovered = false;
    if !scale.is_finite() {
        scale = if settings.scale_bounds_towards_cursor {
            Vec3::splat(settings.minimal_scale)
        } else {
            Vec3::ONE
        };
        recovered = true;
    }

    // Component-wise clamp of the magnitude, preserving sign.
    let minimal = settings.minimal_scale;
    let clamp = |component: f32| {
        if component < 0.0 {
            component.min(-minimal)
        } else {
            component.max(minimal)
        }
    };
    let value = Vec3::new(clamp(scale.x), clamp(scale.y), clamp(scale.z));

    ComputedScale { value, recovered }
}

/// Add the configured world-space and object-local location offsets, each
/// pre-multiplied by the computed scale when its flag is set.
pub fn apply_offsets(mut transform: Transform, settings: &PlacementSettings) -> Transform {
    let scale = transform.scale;

    let world = if settings.scale_world_location_offset {
        settings.world_location_offset * scale
    } else {
        settings.world_location_offset
    };
    let relative = if settings.scale_relative_location_offset {
        settings.relative_location_offset * scale
    } else {
        settings.relative_location_offset
    };

    transform.translation += world + transform.rotation * relative;
    transform
}

/// The release rule: a drag that accumulated no meaningful scale is treated
/// as a cancelled placement.
pub fn is_negligible_scale(scale: Vec3) -> bool {
    !scale.is_finite() || scale.length() < NEGLIGIBLE_SCALE
}

// ---------------------------------------------------------------------------
// Basis construction
// ---------------------------------------------------------------------------

fn slot_index(slot: BasisSlot) -> usize {
    match slot {
        BasisSlot::Forward => 0,
        BasisSlot::Right => 1,
        BasisSlot::Up => 2,
    }
}

/// Build a rotation from exactly two filled basis slots. The first vector of
/// each pair is kept exact; the other is re-orthogonalized against it.
/// Returns `None` when the pair is (anti)parallel and cannot span a basis.
fn basis_from_slots(slots: &[Vec3; 3]) -> Option<Quat> {
    let forward = slots[0];
    let right = slots[1];
    let up = slots[2];

    if forward != Vec3::ZERO && right != Vec3::ZERO {
        let up = right.cross(forward).normalize_or_zero();
        if up == Vec3::ZERO {
            return None;
        }
        let right = forward.cross(up);
        Some(quat_from_axes(right, up, forward))
    } else if forward != Vec3::ZERO && up != Vec3::ZERO {
        // Normal alignment owns the up slot; keep it exact and adjust forward.
        let right = forward.cross(up).normalize_or_zero();
        if right == Vec3::ZERO {
            return None;
        }
        let forward = up.cross(right);
        Some(quat_from_axes(right, up, forward))
    } else if right != Vec3::ZERO && up != Vec3::ZERO {
        let forward = up.cross(right).normalize_or_zero();
        if forward == Vec3::ZERO {
            return None;
        }
        let right = forward.cross(up);
        Some(quat_from_axes(right, up, forward))
    } else {
        None
    }
}

/// Quaternion from an orthonormal right/up/forward triple (forward = -Z).
fn quat_from_axes(right: Vec3, up: Vec3, forward: Vec3) -> Quat {
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

/// Build a rotation with an exact up axis and a forward hint.
fn basis_from_up_forward(up: Vec3, forward_hint: Vec3) -> Quat {
    let mut forward = forward_hint.normalize_or_zero();
    if forward == Vec3::ZERO || forward.dot(up).abs() > 1.0 - COINCIDENT_EPSILON {
        forward = if up.z.abs() > 0.99 { Vec3::X } else { Vec3::NEG_Z };
    }
    let right = forward.cross(up).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let forward = up.cross(right);
    quat_from_axes(right, up, forward)
}

/// Snap the rotation's euler angles to the grid interval, per enabled axis.
/// The x/y/z flags snap the rotation about the matching world axis.
fn snap_rotation(rotation: Quat, flags: Bool3, grid_interval: f32) -> Quat {
    if !flags.any() || grid_interval <= 0.0 {
        return rotation;
    }
    let snap = |angle: f32| (angle / grid_interval).round() * grid_interval;
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_euler(
        EulerRot::YXZ,
        if flags.y { snap(yaw) } else { yaw },
        if flags.x { snap(pitch) } else { pitch },
        if flags.z { snap(roll) } else { roll },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec3_near(a: Vec3, b: Vec3, tolerance: f32) {
        assert!(
            (a - b).length() < tolerance,
            "expected {b:?}, got {a:?} (tolerance {tolerance})"
        );
    }

    fn flat_hit() -> TraceHit {
        TraceHit {
            location: Vec3::ZERO,
            normal: Vec3::Y,
        }
    }

    fn plain_settings() -> PlacementSettings {
        PlacementSettings {
            axis_to_align_with_normal: AxisType::None,
            axis_to_align_with_cursor: AxisType::None,
            apply_random_rotation: false,
            apply_random_scale: false,
            scale_bounds_towards_cursor: false,
            ..Default::default()
        }
    }

    #[test]
    fn anchor_requires_a_hit() {
        let settings = plain_settings();
        assert_eq!(
            compute_anchor_transform(None, &settings, 0.0),
            Err(PlaceError::NoHit)
        );
    }

    #[test]
    fn anchor_is_idempotent_for_identical_traces() {
        let hit = TraceHit {
            location: Vec3::new(1.5, -2.0, 3.25),
            normal: Vec3::new(0.6, 0.8, 0.0),
        };
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            snap_rotation_to_grid: Bool3::new(false, true, false),
            ..plain_settings()
        };
        let first = compute_anchor_transform(Some(&hit), &settings, 0.25).unwrap();
        let second = compute_anchor_transform(Some(&hit), &settings, 0.25).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn simple_placement_yields_identity_rotation_and_unit_scale() {
        // All alignment off, no randomization, no cursor scaling; trace hits
        // the origin of a flat floor.
        let settings = plain_settings();
        let anchor = compute_anchor_transform(Some(&flat_hit()), &settings, 0.0).unwrap();

        assert_eq!(anchor.translation, Vec3::ZERO);
        assert_eq!(anchor.scale, Vec3::ONE);
        assert!(anchor.rotation.angle_between(Quat::IDENTITY) < 1e-5);

        // One placing tick with the cursor still on the anchor.
        let oriented = compute_oriented_rotation(&anchor, anchor.translation, &settings, 0.0);
        assert!(!oriented.fallback);
        assert!(oriented.rotation.angle_between(Quat::IDENTITY) < 1e-5);

        let scale = compute_scale(anchor.translation, &anchor, Vec3::splat(0.5), &settings);
        assert!(!scale.recovered);
        assert_vec3_near(scale.value, Vec3::ONE, 1e-6);
    }

    #[test]
    fn anchor_up_follows_surface_normal() {
        let hit = TraceHit {
            location: Vec3::new(4.0, 1.0, 0.0),
            normal: Vec3::new(1.0, 1.0, 0.0).normalize(),
        };
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            ..plain_settings()
        };
        let anchor = compute_anchor_transform(Some(&hit), &settings, 0.0).unwrap();
        assert_vec3_near(anchor.rotation * Vec3::Y, hit.normal, 1e-5);
    }

    #[test]
    fn anchor_survives_zero_normal() {
        let hit = TraceHit {
            location: Vec3::ZERO,
            normal: Vec3::ZERO,
        };
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            ..plain_settings()
        };
        let anchor = compute_anchor_transform(Some(&hit), &settings, 0.0).unwrap();
        assert!(anchor.rotation.is_finite());
        assert_vec3_near(anchor.rotation * Vec3::Y, Vec3::Y, 1e-5);
    }

    #[test]
    fn parallel_ray_returns_the_previous_point() {
        let anchor = Transform::IDENTITY;
        let previous = Vec3::new(7.0, 0.0, -3.0);
        // Ray direction lies in the anchor plane: the denominator vanishes.
        let result =
            compute_cursor_plane_intersection(&anchor, Vec3::new(0.0, 5.0, 0.0), Vec3::X, previous);
        assert_eq!(result, previous);
        assert!(result.is_finite());
    }

    #[test]
    fn ray_hits_the_anchor_plane() {
        let anchor = Transform::IDENTITY;
        let result = compute_cursor_plane_intersection(
            &anchor,
            Vec3::new(1.0, 10.0, 2.0),
            Vec3::NEG_Y,
            Vec3::ZERO,
        );
        assert_vec3_near(result, Vec3::new(1.0, 0.0, 2.0), 1e-5);
    }

    #[test]
    fn forward_axis_points_toward_cursor() {
        let anchor = Transform::IDENTITY;
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            axis_to_align_with_cursor: AxisType::Forward,
            ..plain_settings()
        };
        let oriented =
            compute_oriented_rotation(&anchor, Vec3::new(3.0, 0.0, 0.0), &settings, 0.0);
        assert!(!oriented.fallback);
        assert_vec3_near(oriented.rotation * Vec3::NEG_Z, Vec3::X, 1e-5);
        assert_vec3_near(oriented.rotation * Vec3::Y, Vec3::Y, 1e-5);
    }

    #[test]
    fn negated_cursor_axis_points_away_from_cursor() {
        let anchor = Transform::IDENTITY;
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            axis_to_align_with_cursor: AxisType::Backward,
            ..plain_settings()
        };
        let oriented =
            compute_oriented_rotation(&anchor, Vec3::new(3.0, 0.0, 0.0), &settings, 0.0);
        assert!(!oriented.fallback);
        // Local +Z (backward) points toward the cursor, so forward points away.
        assert_vec3_near(oriented.rotation * Vec3::NEG_Z, Vec3::NEG_X, 1e-5);
    }

    #[test]
    fn contradictory_axes_fall_back_to_a_valid_rotation() {
        let anchor = Transform::IDENTITY;
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            axis_to_align_with_cursor: AxisType::Down,
            ..plain_settings()
        };
        let oriented =
            compute_oriented_rotation(&anchor, Vec3::new(1.0, 0.0, 2.0), &settings, 0.0);
        assert!(oriented.fallback);
        assert!(oriented.rotation.is_finite());
        assert!((oriented.rotation.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn cursor_over_anchor_keeps_a_valid_rotation() {
        let anchor = Transform::IDENTITY;
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            axis_to_align_with_cursor: AxisType::Forward,
            ..plain_settings()
        };
        // Direction degenerates to the anchor forward at press-down.
        let oriented = compute_oriented_rotation(&anchor, anchor.translation, &settings, 0.0);
        assert!(oriented.rotation.is_finite());
        assert!(!oriented.fallback);
    }

    #[test]
    fn vertical_cursor_direction_survives_up_coincidence() {
        let anchor = Transform::IDENTITY;
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            axis_to_align_with_cursor: AxisType::Forward,
            ..plain_settings()
        };
        // Cursor straight above the anchor: forward and up coincide.
        let oriented =
            compute_oriented_rotation(&anchor, Vec3::new(0.0, 5.0, 0.0), &settings, 0.0);
        assert!(oriented.rotation.is_finite());
        assert!((oriented.rotation.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn random_rotation_offset_feeds_pitch_yaw_roll_from_y_z_x() {
        let anchor = Transform::IDENTITY;
        let mut settings = plain_settings();
        settings.apply_random_rotation = true;
        settings.random_rotation = crate::random::RandomMinMaxVector::new(
            crate::random::RandomMinMaxFloat::new(0.0, 0.0, false),
            crate::random::RandomMinMaxFloat::new(0.0, 0.0, false),
            crate::random::RandomMinMaxFloat::new(90.0, 90.0, false),
        );
        settings.regenerate_random_values();

        let oriented = compute_oriented_rotation(&anchor, Vec3::ZERO, &settings, 0.0);
        // The Z component drives yaw. The euler roundtrip inside the solver
        // costs a few 1e-4 rad of f32 error, hence the looser tolerance.
        let expected = Quat::from_rotation_y(FRAC_PI_2);
        assert!(oriented.rotation.angle_between(expected) < 1e-3);
    }

    #[test]
    fn rotation_snaps_to_the_grid_interval() {
        let anchor = Transform::IDENTITY;
        let mut settings = plain_settings();
        settings.snap_rotation_to_grid = Bool3::new(false, true, false);
        settings.apply_random_rotation = true;
        settings.random_rotation = crate::random::RandomMinMaxVector::new(
            crate::random::RandomMinMaxFloat::new(0.0, 0.0, false),
            crate::random::RandomMinMaxFloat::new(0.0, 0.0, false),
            crate::random::RandomMinMaxFloat::new(40.0, 40.0, false),
        );
        settings.regenerate_random_values();

        let interval = 15.0_f32.to_radians();
        let oriented = compute_oriented_rotation(&anchor, Vec3::ZERO, &settings, interval);
        let (yaw, _, _) = oriented.rotation.to_euler(EulerRot::YXZ);
        assert!((yaw - 45.0_f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn cursor_distance_drives_scale() {
        let anchor = Transform::IDENTITY;
        let settings = PlacementSettings {
            axis_to_align_with_normal: AxisType::Up,
            axis_to_align_with_cursor: AxisType::Forward,
            scale_bounds_towards_cursor: true,
            ..plain_settings()
        };
        // Half-extent 0.5 cube, cursor one unit along the forward direction.
        let scale = compute_scale(
            Vec3::new(0.0, 0.0, -1.0),
            &anchor,
            Vec3::splat(0.5),
            &settings,
        );
        assert!(!scale.recovered);
        assert!((scale.value.z - 2.0).abs() < 1e-4);
        assert_vec3_near(scale.value, Vec3::splat(2.0), 1e-4);
    }

    #[test]
    fn scale_never_drops_below_the_minimal_scale() {
        let mut settings = PlacementSettings {
            scale_bounds_towards_cursor: true,
            axis_to_align_with_cursor: AxisType::Forward,
            minimal_scale: 0.25,
            ..plain_settings()
        };
        let anchor = Transform::IDENTITY;

        // Zero drag distance collapses the raw scale to zero.
        let scale = compute_scale(Vec3::ZERO, &anchor, Vec3::splat(0.5), &settings);
        assert!(scale.value.is_finite());
        assert!(scale.value.abs().min_element() >= 0.25);

        // Zero extent would divide by zero; the solver must recover.
        let scale = compute_scale(Vec3::new(0.0, 0.0, -2.0), &anchor, Vec3::ZERO, &settings);
        assert!(scale.recovered);
        assert!(scale.value.is_finite());
        assert!(scale.value.abs().min_element() >= 0.25);

        // Without cursor scaling the recovery default is unit scale territory.
        settings.scale_bounds_towards_cursor = false;
        let scale = compute_scale(Vec3::ZERO, &anchor, Vec3::ZERO, &settings);
        assert!(scale.value.is_finite());
        assert!(scale.value.abs().min_element() >= 0.25);
    }

    #[test]
    fn random_scale_contributes_shape_not_magnitude_in_cursor_mode() {
        let mut settings = PlacementSettings {
            scale_bounds_towards_cursor: true,
            axis_to_align_with_cursor: AxisType::Forward,
            apply_random_scale: true,
            ..plain_settings()
        };
        settings.random_scale = crate::random::RandomMinMaxVector::new(
            crate::random::RandomMinMaxFloat::new(2.0, 2.0, false),
            crate::random::RandomMinMaxFloat::new(4.0, 4.0, false),
            crate::random::RandomMinMaxFloat::new(4.0, 4.0, false),
        );
        settings.regenerate_random_values();

        let anchor = Transform::IDENTITY;
        let scale = compute_scale(
            Vec3::new(0.0, 0.0, -1.0),
            &anchor,
            Vec3::splat(0.5),
            &settings,
        );
        // Base (2,4,4) normalizes to (0.5,1,1); distance/extent = 2.
        assert_vec3_near(scale.value, Vec3::new(1.0, 2.0, 2.0), 1e-4);
    }

    #[test]
    fn negative_random_scale_keeps_its_sign_through_the_clamp() {
        let mut settings = PlacementSettings {
            apply_random_scale: true,
            minimal_scale: 0.5,
            ..plain_settings()
        };
        settings.random_scale = crate::random::RandomMinMaxVector::new(
            crate::random::RandomMinMaxFloat::new(0.1, 0.1, false),
            crate::random::RandomMinMaxFloat::new(3.0, 3.0, false),
            crate::random::RandomMinMaxFloat::new(0.1, 0.1, false),
        );
        settings.regenerate_random_values();
        // Force a mirrored component by hand.
        settings.random_scale.x = crate::random::RandomMinMaxFloat::new(-0.1, -0.1, false);
        settings.random_scale.x.regenerate();

        let scale = compute_scale(Vec3::ZERO, &Transform::IDENTITY, Vec3::splat(0.5), &settings);
        assert!((scale.value.x - -0.5).abs() < 1e-5);
        assert!((scale.value.y - 3.0).abs() < 1e-5);
        assert!((scale.value.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn offsets_respect_space_and_scale_flags() {
        let settings = PlacementSettings {
            world_location_offset: Vec3::new(1.0, 0.0, 0.0),
            scale_world_location_offset: true,
            relative_location_offset: Vec3::new(0.0, 0.0, -1.0),
            scale_relative_location_offset: false,
            ..plain_settings()
        };
        // Rotated 90 degrees around Y: local -Z maps to world -X.
        let transform = Transform {
            translation: Vec3::ZERO,
            rotation: Quat::from_rotation_y(FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let result = apply_offsets(transform, &settings);
        assert_vec3_near(result.translation, Vec3::new(2.0 - 1.0, 0.0, 0.0), 1e-5);
    }

    #[test]
    fn negligible_scale_rule() {
        assert!(is_negligible_scale(Vec3::ZERO));
        assert!(is_negligible_scale(Vec3::splat(1e-6)));
        assert!(is_negligible_scale(Vec3::splat(f32::NAN)));
        assert!(!is_negligible_scale(Vec3::ONE));
        assert!(!is_negligible_scale(Vec3::splat(0.01)));
    }
}
