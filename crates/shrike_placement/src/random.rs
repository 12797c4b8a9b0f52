use bevy::prelude::*;
use rand::Rng;

/// A uniform random float in `[min, max]`, optionally sign-flipped, with the
/// last drawn value cached so it can be read any number of times per frame
/// without redrawing.
#[derive(Clone, Copy, Debug, Reflect)]
pub struct RandomMinMaxFloat {
    pub min: f32,
    pub max: f32,
    /// When set, the generated value has a 50% chance of being negated.
    /// With min = max = 30 the outcome is either 30 or -30.
    pub randomly_negate: bool,
    value: f32,
}

impl RandomMinMaxFloat {
    pub fn new(min: f32, max: f32, randomly_negate: bool) -> Self {
        let mut this = Self {
            min,
            max,
            randomly_negate,
            value: min,
        };
        this.regenerate();
        this
    }

    /// The value from the last `regenerate` call. Never redraws.
    pub fn current(&self) -> f32 {
        self.value
    }

    /// Draw a fresh value and cache it.
    pub fn regenerate(&mut self) -> f32 {
        let mut rng = rand::thread_rng();
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let mut value = if lo < hi { rng.gen_range(lo..=hi) } else { lo };
        if self.randomly_negate && rng.gen_bool(0.5) {
            value = -value;
        }
        self.value = value;
        value
    }
}

impl Default for RandomMinMaxFloat {
    fn default() -> Self {
        Self::new(0.0, 1.0, false)
    }
}

/// Three independent `RandomMinMaxFloat` components read as a `Vec3`.
#[derive(Clone, Copy, Debug, Default, Reflect)]
pub struct RandomMinMaxVector {
    pub x: RandomMinMaxFloat,
    pub y: RandomMinMaxFloat,
    pub z: RandomMinMaxFloat,
}

impl RandomMinMaxVector {
    pub fn new(x: RandomMinMaxFloat, y: RandomMinMaxFloat, z: RandomMinMaxFloat) -> Self {
        Self { x, y, z }
    }

    /// Uniform ranges on all three components, no negation.
    pub fn splat(min: f32, max: f32) -> Self {
        Self {
            x: RandomMinMaxFloat::new(min, max, false),
            y: RandomMinMaxFloat::new(min, max, false),
            z: RandomMinMaxFloat::new(min, max, false),
        }
    }

    pub fn current(&self) -> Vec3 {
        Vec3::new(self.x.current(), self.y.current(), self.z.current())
    }

    pub fn regenerate(&mut self) -> Vec3 {
        Vec3::new(
            self.x.regenerate(),
            self.y.regenerate(),
            self.z.regenerate(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range_with_negation() {
        let mut range = RandomMinMaxFloat::new(2.0, 5.0, true);
        for _ in 0..10_000 {
            let v = range.regenerate();
            let mag = v.abs();
            assert!(
                (2.0..=5.0).contains(&mag),
                "sample {v} outside [-5,-2] U [2,5]"
            );
        }
    }

    #[test]
    fn current_is_stable_between_regenerations() {
        let mut range = RandomMinMaxFloat::new(-3.0, 7.0, false);
        let drawn = range.regenerate();
        for _ in 0..100 {
            assert_eq!(range.current(), drawn);
        }
    }

    #[test]
    fn degenerate_range_yields_the_single_value() {
        let mut range = RandomMinMaxFloat::new(4.0, 4.0, false);
        for _ in 0..10 {
            assert_eq!(range.regenerate(), 4.0);
        }
    }

    #[test]
    fn inverted_bounds_are_reordered() {
        let mut range = RandomMinMaxFloat::new(5.0, 2.0, false);
        for _ in 0..100 {
            let v = range.regenerate();
            assert!((2.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn vector_components_draw_independently() {
        let mut vector = RandomMinMaxVector::new(
            RandomMinMaxFloat::new(1.0, 1.0, false),
            RandomMinMaxFloat::new(2.0, 2.0, false),
            RandomMinMaxFloat::new(3.0, 3.0, false),
        );
        assert_eq!(vector.regenerate(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(vector.current(), Vec3::new(1.0, 2.0, 3.0));
    }
}
