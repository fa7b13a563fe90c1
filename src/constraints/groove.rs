use crate::bodies::Body;
use crate::collision::{apply_impulses, relative_velocity};
use crate::constraints::{Joint, JointParams};
use crate::error::PhysicsError;
use crate::math::{Matrix2, Vector2};
use crate::Result;

/// Keeps an anchor on the second body inside a groove on the first body,
/// like a pivot joint that can slide along a line segment
#[derive(Debug, Clone)]
pub struct GrooveJoint {
    /// Start of the groove on the first body (in local space)
    groove_a: Vector2,

    /// End of the groove on the first body (in local space)
    groove_b: Vector2,

    /// Normal of the groove (in the first body's local space)
    groove_normal: Vector2,

    /// The anchor on the second body (in local space)
    anchor_b: Vector2,

    /// World-space groove normal for this step
    world_normal: Vector2,

    /// Which end of the groove the anchor is pressed against (-1, 0 or 1)
    clamp: f32,

    r1: Vector2,
    r2: Vector2,
    k: Matrix2,
    j_acc: Vector2,
    bias: Vector2,
    j_max: f32,
}

impl GrooveJoint {
    /// Creates a new groove joint
    pub fn new(groove_a: Vector2, groove_b: Vector2, anchor_b: Vector2) -> Self {
        Self {
            groove_a,
            groove_b,
            groove_normal: (groove_b - groove_a).normalize().perp(),
            anchor_b,
            world_normal: Vector2::zero(),
            clamp: 0.0,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            k: Matrix2::zero(),
            j_acc: Vector2::zero(),
            bias: Vector2::zero(),
            j_max: 0.0,
        }
    }

    /// Returns the groove's endpoints (in the first body's local space)
    pub fn get_groove(&self) -> (Vector2, Vector2) {
        (self.groove_a, self.groove_b)
    }

    /// Sets the groove's endpoints (in the first body's local space)
    pub fn set_groove(&mut self, groove_a: Vector2, groove_b: Vector2) {
        self.groove_a = groove_a;
        self.groove_b = groove_b;
        self.groove_normal = (groove_b - groove_a).normalize().perp();
    }

    /// Returns the anchor on the second body (in local space)
    pub fn get_anchor_b(&self) -> Vector2 {
        self.anchor_b
    }

    /// Keeps the impulse on the open side of a groove end
    fn constrain(&self, j: Vector2) -> Vector2 {
        let n = self.world_normal;
        let clamped = if self.clamp * j.cross(&n) > 0.0 { j } else { j.project(&n) };
        clamped.clamp_length(self.j_max)
    }
}

impl Joint for GrooveJoint {
    fn name(&self) -> &str {
        "Groove"
    }

    fn validate(&self) -> Result<()> {
        if self.groove_a.near(&self.groove_b, crate::math::EPSILON) {
            return Err(PhysicsError::DegenerateGeometry(
                "groove endpoints coincide".to_string(),
            ));
        }
        Ok(())
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        let ta = a.local_to_world(self.groove_a);
        let tb = a.local_to_world(self.groove_b);

        let n = a.get_rotation().rotate_vector(self.groove_normal);
        let d = ta.dot(&n);

        self.world_normal = n;
        self.r2 = b.get_rotation().rotate_vector(self.anchor_b);

        // Project the anchor onto the groove and clamp it to the ends
        let td = (b.get_position() + self.r2).cross(&n);
        if td <= ta.cross(&n) {
            self.clamp = 1.0;
            self.r1 = ta - a.get_position();
        } else if td >= tb.cross(&n) {
            self.clamp = -1.0;
            self.r1 = tb - a.get_position();
        } else {
            self.clamp = 0.0;
            self.r1 = n.perp() * -td + n * d - a.get_position();
        }

        self.k = Matrix2::k_tensor(
            self.r1,
            self.r2,
            a.get_inverse_mass() + b.get_inverse_mass(),
            a.get_inverse_moment(),
            b.get_inverse_moment(),
        )
        .unwrap_or_else(Matrix2::zero);

        let delta = (b.get_position() + self.r2) - (a.get_position() + self.r1);
        self.bias = (delta * (-params.bias_coef / params.dt)).clamp_length(params.max_bias);
        self.j_max = params.max_impulse();
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        apply_impulses(a, b, self.r1, self.r2, self.j_acc * dt_coef);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let vr = relative_velocity(a, b, self.r1, self.r2);

        let j = self.k.transform(self.bias - vr);
        let j_old = self.j_acc;
        self.j_acc = self.constrain(j_old + j);

        apply_impulses(a, b, self.r1, self.r2, self.j_acc - j_old);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.length()
    }

    fn anchors(&self) -> Option<(Vector2, Vector2)> {
        Some((self.groove_a.lerp(&self.groove_b, 0.5), self.anchor_b))
    }
}
