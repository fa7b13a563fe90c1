use crate::bodies::Body;
use crate::collision::inverse_or_zero;
use crate::constraints::joint::apply_angular_impulses;
use crate::constraints::{Joint, JointParams};
use crate::error::PhysicsError;
use crate::Result;

/// A damped angular spring acting on the relative angle of two bodies
#[derive(Debug, Clone)]
pub struct DampedRotarySpring {
    /// Relative angle (first minus second) at which the spring exerts no torque
    rest_angle: f32,

    /// Spring constant (torque per radian)
    stiffness: f32,

    /// Damping coefficient (torque per radian per second)
    damping: f32,

    i_sum: f32,
    target_wrn: f32,
    w_coef: f32,
    j_acc: f32,
}

impl DampedRotarySpring {
    /// Creates a new damped rotary spring
    pub fn new(rest_angle: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            rest_angle,
            stiffness,
            damping,
            i_sum: 0.0,
            target_wrn: 0.0,
            w_coef: 0.0,
            j_acc: 0.0,
        }
    }

    /// Returns the rest angle
    pub fn get_rest_angle(&self) -> f32 {
        self.rest_angle
    }

    /// Sets the rest angle
    pub fn set_rest_angle(&mut self, rest_angle: f32) {
        self.rest_angle = rest_angle;
    }

    /// Returns the spring constant
    pub fn get_stiffness(&self) -> f32 {
        self.stiffness
    }

    /// Sets the spring constant
    pub fn set_stiffness(&mut self, stiffness: f32) {
        self.stiffness = stiffness.max(0.0);
    }

    /// Returns the damping coefficient
    pub fn get_damping(&self) -> f32 {
        self.damping
    }

    /// Sets the damping coefficient
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.max(0.0);
    }
}

impl Joint for DampedRotarySpring {
    fn name(&self) -> &str {
        "DampedRotarySpring"
    }

    fn validate(&self) -> Result<()> {
        if !(self.stiffness >= 0.0 && self.damping >= 0.0 && self.rest_angle.is_finite()) {
            return Err(PhysicsError::InvalidParameter(
                "rotary spring stiffness and damping must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        let moment = a.get_inverse_moment() + b.get_inverse_moment();
        self.i_sum = inverse_or_zero(moment);

        self.w_coef = 1.0 - (-self.damping * params.dt * moment).exp();
        self.target_wrn = 0.0;

        let relative_angle = a.get_angle() - b.get_angle();
        let j_spring = (relative_angle - self.rest_angle) * self.stiffness * params.dt;
        self.j_acc = j_spring;
        apply_angular_impulses(a, b, j_spring);
    }

    fn apply_cached_impulse(&mut self, _a: &mut Body, _b: &mut Body, _dt_coef: f32) {}

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let wrn = a.get_angular_velocity() - b.get_angular_velocity();

        let w_damp = (self.target_wrn - wrn) * self.w_coef;
        self.target_wrn = wrn + w_damp;

        let j_damp = w_damp * self.i_sum;
        self.j_acc += j_damp;
        apply_angular_impulses(a, b, -j_damp);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.abs()
    }
}
