use crate::bodies::Body;
use crate::collision::{apply_impulses, inverse_or_zero, k_scalar, relative_velocity};
use crate::constraints::{Joint, JointParams};
use crate::error::PhysicsError;
use crate::math::{self, Vector2};
use crate::Result;

/// Keeps the distance between two anchors within `[min, max]`, like a rope
/// with a minimum length
#[derive(Debug, Clone)]
pub struct SlideJoint {
    /// The anchor on the first body (in local space)
    anchor_a: Vector2,

    /// The anchor on the second body (in local space)
    anchor_b: Vector2,

    /// Minimum distance between the anchors
    min: f32,

    /// Maximum distance between the anchors
    max: f32,

    r1: Vector2,
    r2: Vector2,
    n: Vector2,
    n_mass: f32,
    jn_acc: f32,
    bias: f32,
    j_max: f32,
}

impl SlideJoint {
    /// Creates a new slide joint
    pub fn new(anchor_a: Vector2, anchor_b: Vector2, min: f32, max: f32) -> Self {
        Self {
            anchor_a,
            anchor_b,
            min,
            max,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            n: Vector2::zero(),
            n_mass: 0.0,
            jn_acc: 0.0,
            bias: 0.0,
            j_max: 0.0,
        }
    }

    /// Returns the minimum distance
    pub fn get_min(&self) -> f32 {
        self.min
    }

    /// Sets the minimum distance
    pub fn set_min(&mut self, min: f32) {
        self.min = min;
    }

    /// Returns the maximum distance
    pub fn get_max(&self) -> f32 {
        self.max
    }

    /// Sets the maximum distance
    pub fn set_max(&mut self, max: f32) {
        self.max = max;
    }
}

impl Joint for SlideJoint {
    fn name(&self) -> &str {
        "Slide"
    }

    fn validate(&self) -> Result<()> {
        if !(self.min >= 0.0 && self.min <= self.max) {
            return Err(PhysicsError::InvalidParameter(format!(
                "slide joint limits must satisfy 0 <= min <= max (min {}, max {})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        self.r1 = a.get_rotation().rotate_vector(self.anchor_a);
        self.r2 = b.get_rotation().rotate_vector(self.anchor_b);

        let delta = (b.get_position() + self.r2) - (a.get_position() + self.r1);
        let dist = delta.length();

        let mut pdist = 0.0;
        if dist > self.max {
            pdist = dist - self.max;
            self.n = delta.normalize();
        } else if dist < self.min {
            pdist = self.min - dist;
            self.n = -delta.normalize();
        } else {
            self.n = Vector2::zero();
            self.jn_acc = 0.0;
        }

        self.n_mass = inverse_or_zero(k_scalar(a, b, self.r1, self.r2, self.n));
        self.bias = params.bias(pdist);
        self.j_max = params.max_impulse();
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        let j = self.n * (self.jn_acc * dt_coef);
        apply_impulses(a, b, self.r1, self.r2, j);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        if self.n.is_zero() {
            return;
        }

        let vrn = relative_velocity(a, b, self.r1, self.r2).dot(&self.n);

        // The joint can only pull the anchors back inside the range
        let jn = (self.bias - vrn) * self.n_mass;
        let jn_old = self.jn_acc;
        self.jn_acc = math::clamp(jn_old + jn, -self.j_max, 0.0);

        apply_impulses(a, b, self.r1, self.r2, self.n * (self.jn_acc - jn_old));
    }

    fn impulse(&self) -> f32 {
        self.jn_acc.abs()
    }

    fn anchors(&self) -> Option<(Vector2, Vector2)> {
        Some((self.anchor_a, self.anchor_b))
    }
}
