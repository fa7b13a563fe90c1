use crate::bodies::Body;
use crate::collision::inverse_or_zero;
use crate::constraints::joint::apply_angular_impulses;
use crate::constraints::{Joint, JointParams};
use crate::error::PhysicsError;
use crate::math;
use crate::Result;

/// A rotary ratchet: the relative angle may only advance in the direction of
/// `ratchet`, catching at every multiple of it (offset by `phase`)
#[derive(Debug, Clone)]
pub struct RatchetJoint {
    /// Angular offset of the ratchet teeth
    phase: f32,

    /// Distance between teeth in radians; its sign gives the free direction
    ratchet: f32,

    /// The tooth currently engaged; captured from the bodies when the joint is added
    angle: Option<f32>,

    i_sum: f32,
    bias: f32,
    j_acc: f32,
    j_max: f32,
}

impl RatchetJoint {
    /// Creates a new ratchet joint
    pub fn new(phase: f32, ratchet: f32) -> Self {
        Self {
            phase,
            ratchet,
            angle: None,
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

    /// Returns the tooth spacing
    pub fn get_ratchet(&self) -> f32 {
        self.ratchet
    }

    /// Returns the currently engaged angle
    pub fn get_angle(&self) -> Option<f32> {
        self.angle
    }

    /// Sets the currently engaged angle
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = Some(angle);
    }
}

impl Joint for RatchetJoint {
    fn name(&self) -> &str {
        "Ratchet"
    }

    fn validate(&self) -> Result<()> {
        if !(self.ratchet != 0.0 && self.ratchet.is_finite() && self.phase.is_finite()) {
            return Err(PhysicsError::InvalidParameter(
                "ratchet spacing must be finite and non-zero".to_string(),
            ));
        }
        Ok(())
    }

    fn attach(&mut self, a: &Body, b: &Body) {
        if self.angle.is_none() {
            self.angle = Some(b.get_angle() - a.get_angle());
        }
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        let delta = b.get_angle() - a.get_angle();
        let mut angle = self.angle.unwrap_or(delta);

        let diff = angle - delta;
        let mut pdist = 0.0;
        if diff * self.ratchet > 0.0 {
            pdist = diff;
        } else {
            angle = ((delta - self.phase) / self.ratchet).floor() * self.ratchet + self.phase;
        }
        self.angle = Some(angle);

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
        let ratchet = self.ratchet;

        let j = -(self.bias + wr) * self.i_sum;
        let j_old = self.j_acc;
        self.j_acc = math::clamp((j_old + j) * ratchet, 0.0, self.j_max * ratchet.abs()) / ratchet;

        apply_angular_impulses(a, b, self.j_acc - j_old);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.abs()
    }
}
