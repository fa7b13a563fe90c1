use crate::bodies::Body;
use crate::collision::inverse_or_zero;
use crate::constraints::joint::apply_angular_impulses;
use crate::constraints::{Joint, JointParams};
use crate::math;

/// Drives the relative angular velocity of two bodies.
///
/// The motor holds `a.w - b.w == rate`; limit its torque with the
/// constraint's max force.
#[derive(Debug, Clone)]
pub struct SimpleMotor {
    /// Target relative angular velocity
    rate: f32,

    i_sum: f32,
    j_acc: f32,
    j_max: f32,
}

impl SimpleMotor {
    /// Creates a new motor
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            i_sum: 0.0,
            j_acc: 0.0,
            j_max: 0.0,
        }
    }

    /// Returns the target rate
    pub fn get_rate(&self) -> f32 {
        self.rate
    }

    /// Sets the target rate
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }
}

impl Joint for SimpleMotor {
    fn name(&self) -> &str {
        "SimpleMotor"
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        self.i_sum = inverse_or_zero(a.get_inverse_moment() + b.get_inverse_moment());
        self.j_max = params.max_impulse();
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        apply_angular_impulses(a, b, self.j_acc * dt_coef);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let wr = b.get_angular_velocity() - a.get_angular_velocity() + self.rate;

        let j = -wr * self.i_sum;
        let j_old = self.j_acc;
        self.j_acc = math::clamp(j_old + j, -self.j_max, self.j_max);

        apply_angular_impulses(a, b, self.j_acc - j_old);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.abs()
    }
}
