use crate::bodies::Body;
use crate::constraints::{
    DampedRotarySpring, DampedSpring, GearJoint, GrooveJoint, Joint, JointParams, PinJoint,
    PivotJoint, RatchetJoint, RotaryLimitJoint, SimpleMotor, SlideJoint,
};
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;

/// The joint variants a constraint can hold
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    Pin(PinJoint),
    Slide(SlideJoint),
    Pivot(PivotJoint),
    Groove(GrooveJoint),
    DampedSpring(DampedSpring),
    DampedRotarySpring(DampedRotarySpring),
    RotaryLimit(RotaryLimitJoint),
    Ratchet(RatchetJoint),
    Gear(GearJoint),
    SimpleMotor(SimpleMotor),
}

impl ConstraintKind {
    fn joint(&self) -> &dyn Joint {
        match self {
            ConstraintKind::Pin(joint) => joint,
            ConstraintKind::Slide(joint) => joint,
            ConstraintKind::Pivot(joint) => joint,
            ConstraintKind::Groove(joint) => joint,
            ConstraintKind::DampedSpring(joint) => joint,
            ConstraintKind::DampedRotarySpring(joint) => joint,
            ConstraintKind::RotaryLimit(joint) => joint,
            ConstraintKind::Ratchet(joint) => joint,
            ConstraintKind::Gear(joint) => joint,
            ConstraintKind::SimpleMotor(joint) => joint,
        }
    }

    fn joint_mut(&mut self) -> &mut dyn Joint {
        match self {
            ConstraintKind::Pin(joint) => joint,
            ConstraintKind::Slide(joint) => joint,
            ConstraintKind::Pivot(joint) => joint,
            ConstraintKind::Groove(joint) => joint,
            ConstraintKind::DampedSpring(joint) => joint,
            ConstraintKind::DampedRotarySpring(joint) => joint,
            ConstraintKind::RotaryLimit(joint) => joint,
            ConstraintKind::Ratchet(joint) => joint,
            ConstraintKind::Gear(joint) => joint,
            ConstraintKind::SimpleMotor(joint) => joint,
        }
    }
}

/// A joint between two bodies, solved alongside the contacts
#[derive(Debug, Clone)]
pub struct Constraint {
    /// The first body in the constraint
    body_a: BodyHandle,

    /// The second body in the constraint
    body_b: BodyHandle,

    /// Largest force the constraint may apply
    max_force: f32,

    /// Largest speed at which joint error is corrected
    max_bias: f32,

    /// Whether shapes on the two bodies still collide with each other
    collide_bodies: bool,

    /// The joint itself
    kind: ConstraintKind,
}

impl Constraint {
    /// Creates a constraint from any joint variant
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, kind: ConstraintKind) -> Self {
        Self {
            body_a,
            body_b,
            max_force: f32::INFINITY,
            max_bias: f32::INFINITY,
            collide_bodies: true,
            kind,
        }
    }

    /// Keeps two anchors at the distance they have when the constraint is added
    pub fn pin(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vector2, anchor_b: Vector2) -> Self {
        Self::new(body_a, body_b, ConstraintKind::Pin(PinJoint::new(anchor_a, anchor_b)))
    }

    /// Keeps the distance between two anchors within `[min, max]`
    pub fn slide(
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vector2,
        anchor_b: Vector2,
        min: f32,
        max: f32,
    ) -> Self {
        Self::new(
            body_a,
            body_b,
            ConstraintKind::Slide(SlideJoint::new(anchor_a, anchor_b, min, max)),
        )
    }

    /// Joins two anchors at a single point
    pub fn pivot(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vector2, anchor_b: Vector2) -> Self {
        Self::new(body_a, body_b, ConstraintKind::Pivot(PivotJoint::new(anchor_a, anchor_b)))
    }

    /// Keeps an anchor on the second body in a groove on the first
    pub fn groove(
        body_a: BodyHandle,
        body_b: BodyHandle,
        groove_a: Vector2,
        groove_b: Vector2,
        anchor_b: Vector2,
    ) -> Self {
        Self::new(
            body_a,
            body_b,
            ConstraintKind::Groove(GrooveJoint::new(groove_a, groove_b, anchor_b)),
        )
    }

    /// A damped spring between two anchors
    pub fn damped_spring(
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vector2,
        anchor_b: Vector2,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    ) -> Self {
        Self::new(
            body_a,
            body_b,
            ConstraintKind::DampedSpring(DampedSpring::new(
                anchor_a,
                anchor_b,
                rest_length,
                stiffness,
                damping,
            )),
        )
    }

    /// A damped angular spring
    pub fn damped_rotary_spring(
        body_a: BodyHandle,
        body_b: BodyHandle,
        rest_angle: f32,
        stiffness: f32,
        damping: f32,
    ) -> Self {
        Self::new(
            body_a,
            body_b,
            ConstraintKind::DampedRotarySpring(DampedRotarySpring::new(rest_angle, stiffness, damping)),
        )
    }

    /// Limits the relative angle to `[min, max]`
    pub fn rotary_limit(body_a: BodyHandle, body_b: BodyHandle, min: f32, max: f32) -> Self {
        Self::new(body_a, body_b, ConstraintKind::RotaryLimit(RotaryLimitJoint::new(min, max)))
    }

    /// A one-directional rotary ratchet
    pub fn ratchet(body_a: BodyHandle, body_b: BodyHandle, phase: f32, ratchet: f32) -> Self {
        Self::new(body_a, body_b, ConstraintKind::Ratchet(RatchetJoint::new(phase, ratchet)))
    }

    /// Keeps the angular velocity ratio constant
    pub fn gear(body_a: BodyHandle, body_b: BodyHandle, phase: f32, ratio: f32) -> Self {
        Self::new(body_a, body_b, ConstraintKind::Gear(GearJoint::new(phase, ratio)))
    }

    /// Drives the relative angular velocity
    pub fn simple_motor(body_a: BodyHandle, body_b: BodyHandle, rate: f32) -> Self {
        Self::new(body_a, body_b, ConstraintKind::SimpleMotor(SimpleMotor::new(rate)))
    }

    /// Sets the maximum force
    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    /// Sets the maximum correction speed
    pub fn with_max_bias(mut self, max_bias: f32) -> Self {
        self.max_bias = max_bias;
        self
    }

    /// Sets whether the connected bodies collide with each other
    pub fn with_collide_bodies(mut self, collide_bodies: bool) -> Self {
        self.collide_bodies = collide_bodies;
        self
    }

    /// Returns the type name of the joint
    pub fn name(&self) -> &str {
        self.kind.joint().name()
    }

    /// Returns the bodies involved in the constraint
    pub fn get_bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    /// Checks if the constraint involves a specific body
    pub fn involves_body(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Returns the joint variant
    pub fn get_kind(&self) -> &ConstraintKind {
        &self.kind
    }

    /// Returns the joint variant for modification
    pub fn get_kind_mut(&mut self) -> &mut ConstraintKind {
        &mut self.kind
    }

    /// Returns the maximum force
    pub fn get_max_force(&self) -> f32 {
        self.max_force
    }

    /// Sets the maximum force
    pub fn set_max_force(&mut self, max_force: f32) {
        self.max_force = max_force.max(0.0);
    }

    /// Returns the maximum correction speed
    pub fn get_max_bias(&self) -> f32 {
        self.max_bias
    }

    /// Sets the maximum correction speed
    pub fn set_max_bias(&mut self, max_bias: f32) {
        self.max_bias = max_bias.max(0.0);
    }

    /// Returns whether the connected bodies collide with each other
    pub fn get_collide_bodies(&self) -> bool {
        self.collide_bodies
    }

    /// Sets whether the connected bodies collide with each other
    pub fn set_collide_bodies(&mut self, collide_bodies: bool) {
        self.collide_bodies = collide_bodies;
    }

    /// Returns the magnitude of the impulse applied in the last step
    pub fn impulse(&self) -> f32 {
        self.kind.joint().impulse()
    }

    /// Returns the joint anchors in each body's local space, if it has any
    pub fn get_anchors(&self) -> Option<(Vector2, Vector2)> {
        self.kind.joint().anchors()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.body_a == self.body_b {
            return Err(PhysicsError::SameBody(self.body_a));
        }
        if !(self.max_force >= 0.0) || !(self.max_bias >= 0.0) {
            return Err(PhysicsError::InvalidParameter(
                "max force and max bias must be non-negative".to_string(),
            ));
        }
        self.kind.joint().validate()
    }

    pub(crate) fn attach(&mut self, a: &Body, b: &Body) {
        self.kind.joint_mut().attach(a, b);
    }

    pub(crate) fn pre_step(&mut self, a: &mut Body, b: &mut Body, dt: f32, bias_coef: f32) {
        let params = JointParams {
            dt,
            bias_coef,
            max_force: self.max_force,
            max_bias: self.max_bias,
        };
        self.kind.joint_mut().pre_step(a, b, &params);
    }

    pub(crate) fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        self.kind.joint_mut().apply_cached_impulse(a, b, dt_coef);
    }

    pub(crate) fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        self.kind.joint_mut().apply_impulse(a, b);
    }
}
