use crate::bodies::Body;
use crate::collision::inverse_or_zero;
use crate::constraints::joint::apply_angular_impulses;
use crate::constraints::{Joint, JointParams};
use crate::error::PhysicsError;
use crate::math;
use crate::Result;

/// Keeps the relative angle of two bodies (second minus first) within `[min, max]`
#[derive(Debug, Clone)]
pub struct RotaryLimitJoint {
    /// Lower angle limit in radians
    min: f32,

    /// Upper angle limit in radians
    max: f32,

    i_sum: f32,
    bias: f32,
    j_acc: f32,
    j_max: f32,
}

impl RotaryLimitJoint {
    /// Creates a new rotary limit joint
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            i_sum: 0.0,
            bias: 0.0,
            j_acc: 0.0,
            j_max: 0.0,
        }
    }

    /// Returns the lower limit
    pub fn get_min(&self) -> f32 {
        self.min
    }

    /// Sets the lower limit
    pub fn set_min(&mut self, min: f32) {
        self.min = min;
    }

    /// Returns the upper limit
    pub fn get_max(&self) -> f32 {
        self.max
    }

    /// Sets the upper limit
    pub fn set_max(&mut self, max: f32) {
        self.max = max;
    }
}

impl Joint for RotaryLimitJoint {
    fn name(&self) -> &str {
        "RotaryLimit"
    }

    fn validate(&self) -> Result<()> {
        if !(self.min <= self.max) {
            return Err(PhysicsError::InvalidParameter(format!(
                "rotary limit requires min <= max (min {}, max {})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        let dist = b.get_angle() - a.get_angle();
        let pdist = if dist > self.max {
            self.max - dist
        } else if dist < self.min {
            self.min - dist
        } else {
            0.0
        };

        self.i_sum = inverse_or_zero(a.get_inverse_moment() + b.get_inverse_moment());
        self.bias = params.bias(pdist);
        self.j_max = params.max_impulse();

        if self.bias == 0.0 {
            self.j_acc = 0.0;
        }
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        apply_angular_impulses(a, b, self.j_acc * dt_coef);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        if self.bias == 0.0 {
            return;
        }

        let wr = b.get_angular_velocity() - a.get_angular_velocity();

        let j = -(self.bias + wr) * self.i_sum;
        let j_old = self.j_acc;
        self.j_acc = if self.bias < 0.0 {
            math::clamp(j_old + j, 0.0, self.j_max)
        } else {
            math::clamp(j_old + j, -self.j_max, 0.0)
        };

        apply_angular_impulses(a, b, self.j_acc - j_old);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.abs()
    }
}
