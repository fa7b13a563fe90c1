use crate::bodies::Body;
use crate::math::{self, Vector2};
use crate::Result;

/// Per-step parameters shared by every joint
#[derive(Debug, Clone, Copy)]
pub struct JointParams {
    /// The step length
    pub dt: f32,

    /// Fraction of the joint error corrected this step
    pub bias_coef: f32,

    /// Largest force the joint may apply
    pub max_force: f32,

    /// Largest correction speed the joint may use
    pub max_bias: f32,
}

impl JointParams {
    /// Returns the largest impulse the joint may apply this step
    #[inline]
    pub fn max_impulse(&self) -> f32 {
        self.max_force * self.dt
    }

    /// Returns the clamped correction velocity for a positional error
    #[inline]
    pub fn bias(&self, error: f32) -> f32 {
        math::clamp(-self.bias_coef * error / self.dt, -self.max_bias, self.max_bias)
    }
}

/// Solver interface implemented by every joint variant
pub trait Joint {
    /// Returns the name of the joint type
    fn name(&self) -> &str;

    /// Checks the joint's parameters
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Captures state that depends on the bodies' pose when the joint is added
    fn attach(&mut self, _a: &Body, _b: &Body) {}

    /// Computes effective masses and bias velocities for this step
    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams);

    /// Re-applies the impulse accumulated in the previous step
    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32);

    /// Runs one solver iteration
    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body);

    /// Returns the magnitude of the impulse applied in the last step
    fn impulse(&self) -> f32;

    /// Returns the anchors in each body's local space, if the joint has any
    fn anchors(&self) -> Option<(Vector2, Vector2)> {
        None
    }
}

/// Applies an angular impulse pair: `-j` to `a` and `+j` to `b`
#[inline]
pub(crate) fn apply_angular_impulses(a: &mut Body, b: &mut Body, j: f32) {
    a.apply_angular_impulse_raw(-j);
    b.apply_angular_impulse_raw(j);
}
