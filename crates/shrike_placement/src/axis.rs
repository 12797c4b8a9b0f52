use bevy::prelude::*;

/// A signed local axis of the placed object, or `None` for "don't align".
///
/// Follows Bevy's convention: Forward is -Z, Right is +X, Up is +Y.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Reflect)]
pub enum AxisType {
    #[default]
    None,
    Forward,
    Backward,
    Right,
    Left,
    Up,
    Down,
}

/// One of the three local basis slots an alignment vector can be mapped into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BasisSlot {
    Forward,
    Right,
    Up,
}

impl AxisType {
    /// Strip the sign: Backward resolves to Forward, Down to Up, Left to Right.
    pub fn positive(self) -> AxisType {
        match self {
            AxisType::Backward => AxisType::Forward,
            AxisType::Left => AxisType::Right,
            AxisType::Down => AxisType::Up,
            other => other,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, AxisType::Backward | AxisType::Left | AxisType::Down)
    }

    /// The basis slot this axis names, if any.
    pub fn slot(self) -> Option<BasisSlot> {
        match self {
            AxisType::None => None,
            AxisType::Forward | AxisType::Backward => Some(BasisSlot::Forward),
            AxisType::Right | AxisType::Left => Some(BasisSlot::Right),
            AxisType::Up | AxisType::Down => Some(BasisSlot::Up),
        }
    }

    /// The world-space unit vector of this axis in an identity orientation.
    pub fn world_vector(self) -> Vec3 {
        match self {
            AxisType::None => Vec3::ZERO,
            AxisType::Forward => Vec3::NEG_Z,
            AxisType::Backward => Vec3::Z,
            AxisType::Right => Vec3::X,
            AxisType::Left => Vec3::NEG_X,
            AxisType::Up => Vec3::Y,
            AxisType::Down => Vec3::NEG_Y,
        }
    }
}

/// Per-axis boolean triple, used for opt-in rotation grid snapping.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Reflect)]
pub struct Bool3 {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Bool3 {
    pub fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    pub fn any(self) -> bool {
        self.x || self.y || self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_strips_sign() {
        assert_eq!(AxisType::Backward.positive(), AxisType::Forward);
        assert_eq!(AxisType::Left.positive(), AxisType::Right);
        assert_eq!(AxisType::Down.positive(), AxisType::Up);
        assert_eq!(AxisType::Up.positive(), AxisType::Up);
        assert_eq!(AxisType::None.positive(), AxisType::None);
    }

    #[test]
    fn opposed_axes_share_a_slot() {
        assert_eq!(AxisType::Up.slot(), AxisType::Down.slot());
        assert_eq!(AxisType::Forward.slot(), AxisType::Backward.slot());
        assert_ne!(AxisType::Up.slot(), AxisType::Right.slot());
        assert_eq!(AxisType::None.slot(), None);
    }

    #[test]
    fn world_vectors_are_unit_and_opposed() {
        for axis in [
            AxisType::Forward,
            AxisType::Backward,
            AxisType::Right,
            AxisType::Left,
            AxisType::Up,
            AxisType::Down,
        ] {
            assert!((axis.world_vector().length() - 1.0).abs() < 1e-6);
        }
        assert_eq!(
            AxisType::Forward.world_vector(),
            -AxisType::Backward.world_vector()
        );
    }
}
