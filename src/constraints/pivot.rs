use crate::bodies::Body;
use crate::collision::{apply_impulses, relative_velocity};
use crate::constraints::{Joint, JointParams};
use crate::math::{Matrix2, Vector2};

/// Pins a point on each body together, letting them rotate freely about it
#[derive(Debug, Clone)]
pub struct PivotJoint {
    /// The anchor on the first body (in local space)
    anchor_a: Vector2,

    /// The anchor on the second body (in local space)
    anchor_b: Vector2,

    r1: Vector2,
    r2: Vector2,
    k: Matrix2,
    j_acc: Vector2,
    bias: Vector2,
    j_max: f32,
}

impl PivotJoint {
    /// Creates a pivot joint from an anchor on each body
    pub fn new(anchor_a: Vector2, anchor_b: Vector2) -> Self {
        Self {
            anchor_a,
            anchor_b,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            k: Matrix2::zero(),
            j_acc: Vector2::zero(),
            bias: Vector2::zero(),
            j_max: 0.0,
        }
    }

    /// Creates a pivot joint around a world-space point, given both bodies' current pose
    pub fn from_world_pivot(a: &Body, b: &Body, pivot: Vector2) -> Self {
        Self::new(a.world_to_local(pivot), b.world_to_local(pivot))
    }

    /// Returns the first anchor (in local space)
    pub fn get_anchor_a(&self) -> Vector2 {
        self.anchor_a
    }

    /// Sets the first anchor (in local space)
    pub fn set_anchor_a(&mut self, anchor: Vector2) {
        self.anchor_a = anchor;
    }

    /// Returns the second anchor (in local space)
    pub fn get_anchor_b(&self) -> Vector2 {
        self.anchor_b
    }

    /// Sets the second anchor (in local space)
    pub fn set_anchor_b(&mut self, anchor: Vector2) {
        self.anchor_b = anchor;
    }
}

impl Joint for PivotJoint {
    fn name(&self) -> &str {
        "Pivot"
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        self.r1 = a.get_rotation().rotate_vector(self.anchor_a);
        self.r2 = b.get_rotation().rotate_vector(self.anchor_b);

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
        self.j_acc = (self.j_acc + j).clamp_length(self.j_max);

        apply_impulses(a, b, self.r1, self.r2, self.j_acc - j_old);
    }

    fn impulse(&self) -> f32 {
        self.j_acc.length()
    }

    fn anchors(&self) -> Option<(Vector2, Vector2)> {
        Some((self.anchor_a, self.anchor_b))
    }
}
