use crate::bodies::Body;
use crate::collision::{apply_impulses, inverse_or_zero, k_scalar, relative_velocity};
use crate::constraints::{Joint, JointParams};
use crate::math::{self, Vector2};

/// Keeps two anchor points at a fixed distance, like a massless rod
#[derive(Debug, Clone)]
pub struct PinJoint {
    /// The anchor on the first body (in local space)
    anchor_a: Vector2,

    /// The anchor on the second body (in local space)
    anchor_b: Vector2,

    /// The distance to maintain; measured from the bodies when the joint is added if unset
    distance: Option<f32>,

    r1: Vector2,
    r2: Vector2,
    n: Vector2,
    n_mass: f32,
    jn_acc: f32,
    bias: f32,
    j_max: f32,
}

impl PinJoint {
    /// Creates a pin joint that keeps the anchors at their current distance
    pub fn new(anchor_a: Vector2, anchor_b: Vector2) -> Self {
        Self {
            anchor_a,
            anchor_b,
            distance: None,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            n: Vector2::zero(),
            n_mass: 0.0,
            jn_acc: 0.0,
            bias: 0.0,
            j_max: 0.0,
        }
    }

    /// Returns the distance kept between the anchors
    pub fn get_distance(&self) -> Option<f32> {
        self.distance
    }

    /// Sets the distance kept between the anchors
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = Some(distance.max(0.0));
    }

    /// Returns the first anchor (in local space)
    pub fn get_anchor_a(&self) -> Vector2 {
        self.anchor_a
    }

    /// Returns the second anchor (in local space)
    pub fn get_anchor_b(&self) -> Vector2 {
        self.anchor_b
    }
}

impl Joint for PinJoint {
    fn name(&self) -> &str {
        "Pin"
    }

    fn attach(&mut self, a: &Body, b: &Body) {
        if self.distance.is_none() {
            let pa = a.local_to_world(self.anchor_a);
            let pb = b.local_to_world(self.anchor_b);
            self.distance = Some(pa.distance(&pb));
        }
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, params: &JointParams) {
        self.r1 = a.get_rotation().rotate_vector(self.anchor_a);
        self.r2 = b.get_rotation().rotate_vector(self.anchor_b);

        let delta = (b.get_position() + self.r2) - (a.get_position() + self.r1);
        let dist = delta.length();
        let rest = self.distance.unwrap_or(dist);
        self.n = if dist > 0.0 { delta / dist } else { Vector2::zero() };

        self.n_mass = inverse_or_zero(k_scalar(a, b, self.r1, self.r2, self.n));
        self.bias = params.bias(dist - rest);
        self.j_max = params.max_impulse();
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        let j = self.n * (self.jn_acc * dt_coef);
        apply_impulses(a, b, self.r1, self.r2, j);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let vrn = relative_velocity(a, b, self.r1, self.r2).dot(&self.n);

        let jn = (self.bias - vrn) * self.n_mass;
        let jn_old = self.jn_acc;
        self.jn_acc = math::clamp(jn_old + jn, -self.j_max, self.j_max);

        apply_impulses(a, b, self.r1, self.r2, self.n * (self.jn_acc - jn_old));
    }

    fn impulse(&self) -> f32 {
        self.jn_acc.abs()
    }

    fn anchors(&self) -> Option<(Vector2, Vector2)> {
        Some((self.anchor_a, self.anchor_b))
    }
}
