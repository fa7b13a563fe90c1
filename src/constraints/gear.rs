use crate::bodies::Body;
use crate::collision::inverse_or_zero;
use crate::constraints::{Joint, JointParams};
use crate::error::PhysicsError;
use crate::math;
use crate::Result;

/// Keeps the angular velocity ratio of two bodies constant
#[derive(Debug, Clone)]
pub struct GearJoint {
    /// Angular offset between the bodies
    phase: f32,

    /// Gear ratio (second body turns `1 / ratio` times as fast as the first)
    ratio: f32,

    ratio_inv: f32,
    i_sum: f32,
    bias: f32,
    j_acc: f32,
    j_max: f32,
}

impl GearJoint {
    /// Creates a new gear joint
    pub fn new(phase: f32, ratio: f32) -> Self {
        Self {
            phase,
            ratio,
            ratio_inv: 1.0 / ratio,
            i_sum: 0.0,
            bias: 0.0,
            j_acc: 0.0,
            j_max: 0.0,
        }
    }

    /// Returns the phase
    pub fn get_phase(&self) -> f32 {
        self.phase
    }

    /// Sets the phase
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase;
    }

    /// Returns the gear ratio
    pub fn get_ratio(&self) -> f32 {
        self.ratio
    }

    /// Sets the gear ratio
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio;
        self.ratio_inv = 1.0 / ratio;
    }

    fn apply(&self, a: &mut Body, b: &mut Body, j: f32) {
        a.apply_angular_impulse_raw(-j * self.ratio_inv);
        b.apply_angular_impulse_raw(j);
    }
}

impl Joint for GearJoint {
    fn name(&self) -> &str {
        "Gear"
    }

    fn validate(&self) -> Result<()> {
        if !(self.ratio != 0.0 && self.ratio.is_finite() && self.phase.is_finite()) {
            return Err(PhysicsError::InvalidParameter(
                "gear ratio must be finite and non-zero".to_string(),
            ));
        }
        Ok(())
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        self.i_sum = inverse_or_zero(
            a.get_inverse_moment() * self.ratio_inv + self.ratio * b.get_inverse_moment(),
        );

        let error = b.get_angle() * self.ratio - a.get_angle() - self.phase;
        self.bias = params.bias(error);
        self.j_max = params.max_impulse();
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        self.apply(a, b, self.j_acc * dt_coef);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let wr = b.get_angular_velocity() * self.ratio - a.get_angular_velocity();

        let j = (self.bias - wr) * self.i_sum;
        let j_old = self.j_acc;
        self.j_acc = math::clamp(j_old + j, -self.j_max, self.j_max);

        self.apply(a, b, self.j_acc - j_old);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.abs()
    }
}
