//! Pure placement math for the spawn-and-place tool: axis alignment types,
//! random min/max value generators, the user-facing placement settings, and
//! the stateless transform solver. No dependency on the editor's scene model
//! beyond Bevy math and a bounding half-extent.

pub mod axis;
pub mod random;
pub mod settings;
pub mod solver;

pub use axis::{AxisType, BasisSlot, Bool3};
pub use random::{RandomMinMaxFloat, RandomMinMaxVector};
pub use settings::PlacementSettings;
pub use solver::{
    ComputedScale, OrientedRotation, PlaceError, TraceHit, apply_offsets,
    compute_anchor_transform, compute_cursor_plane_intersection, compute_oriented_rotation,
    compute_scale, is_negligible_scale,
};
