use crate::bodies::Body;
use crate::collision::{apply_impulses, inverse_or_zero, k_scalar, relative_velocity};
use crate::constraints::{Joint, JointParams};
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;

/// A damped spring between two anchors.
///
/// The spring force is applied once per step; the damping is solved
/// implicitly so stiff springs stay stable.
#[derive(Debug, Clone)]
pub struct DampedSpring {
    /// The anchor on the first body (in local space)
    anchor_a: Vector2,

    /// The anchor on the second body (in local space)
    anchor_b: Vector2,

    /// Length at which the spring exerts no force
    rest_length: f32,

    /// Spring constant (force per unit of extension)
    stiffness: f32,

    /// Damping coefficient (force per unit of relative speed)
    damping: f32,

    r1: Vector2,
    r2: Vector2,
    n: Vector2,
    n_mass: f32,
    target_vrn: f32,
    v_coef: f32,
    j_acc: f32,
}

impl DampedSpring {
    /// Creates a new damped spring
    pub fn new(
        anchor_a: Vector2,
        anchor_b: Vector2,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    ) -> Self {
        Self {
            anchor_a,
            anchor_b,
            rest_length,
            stiffness,
            damping,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            n: Vector2::zero(),
            n_mass: 0.0,
            target_vrn: 0.0,
            v_coef: 0.0,
            j_acc: 0.0,
        }
    }

    /// Returns the rest length
    pub fn get_rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Sets the rest length
    pub fn set_rest_length(&mut self, rest_length: f32) {
        self.rest_length = rest_length.max(0.0);
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

impl Joint for DampedSpring {
    fn name(&self) -> &str {
        "DampedSpring"
    }

    fn validate(&self) -> Result<()> {
        if !(self.rest_length >= 0.0 && self.stiffness >= 0.0 && self.damping >= 0.0) {
            return Err(PhysicsError::InvalidParameter(
                "spring rest length, stiffness and damping must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        self.r1 = a.get_rotation().rotate_vector(self.anchor_a);
        self.r2 = b.get_rotation().rotate_vector(self.anchor_b);

        let delta = (b.get_position() + self.r2) - (a.get_position() + self.r1);
        let dist = delta.length();
        self.n = if dist > 0.0 { delta / dist } else { Vector2::zero() };

        let k = k_scalar(a, b, self.r1, self.r2, self.n);
        self.n_mass = inverse_or_zero(k);

        self.target_vrn = 0.0;
        self.v_coef = 1.0 - (-self.damping * params.dt * k).exp();

        let f_spring = (self.rest_length - dist) * self.stiffness;
        self.j_acc = f_spring * params.dt;
        apply_impulses(a, b, self.r1, self.r2, self.n * self.j_acc);
    }

    fn apply_cached_impulse(&mut self, _a: &mut Body, _b: &mut Body, _dt_coef: f32) {}

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let vrn = relative_velocity(a, b, self.r1, self.r2).dot(&self.n);

        // Damping drives the relative speed towards the target, which decays each iteration
        let v_damp = (self.target_vrn - vrn) * self.v_coef;
        self.target_vrn = vrn + v_damp;

        let j_damp = v_damp * self.n_mass;
        self.j_acc += j_damp;
        apply_impulses(a, b, self.r1, self.r2, self.n * j_damp);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.abs()
    }

    fn anchors(&self) -> Option<(Vector2, Vector2)> {
        Some((self.anchor_a, self.anchor_b))
    }
}
