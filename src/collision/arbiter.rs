use crate::bodies::Body;
use crate::collision::narrow_phase::{ContactPoint, ContactSet};
use crate::collision::{CollisionType, PairKey};
use crate::core::{BodyHandle, ShapeHandle};
use crate::math::Vector2;
use crate::shapes::Shape;

/// Lifecycle state of an arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    /// The shapes started touching this step
    FirstCollision,

    /// The shapes have been touching for more than one step
    Normal,

    /// A begin callback rejected the pair; it is skipped until it separates
    Ignore,

    /// The pair is asleep and kept for when its bodies wake up
    Cached,
}

/// A contact point with its accumulated solver state
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// World-space position of the contact
    pub position: Vector2,

    /// Signed separation along the normal (negative when penetrating)
    pub distance: f32,

    /// Feature identifier used to match contacts between steps
    pub id: u32,

    pub(crate) r1: Vector2,
    pub(crate) r2: Vector2,
    pub(crate) n_mass: f32,
    pub(crate) t_mass: f32,
    pub(crate) bounce: f32,
    pub(crate) bias: f32,
    pub(crate) jn_acc: f32,
    pub(crate) jt_acc: f32,
    pub(crate) jbn_acc: f32,
}

impl Contact {
    fn new(point: &ContactPoint) -> Self {
        Self {
            position: point.position,
            distance: point.distance,
            id: point.id,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            n_mass: 0.0,
            t_mass: 0.0,
            bounce: 0.0,
            bias: 0.0,
            jn_acc: 0.0,
            jt_acc: 0.0,
            jbn_acc: 0.0,
        }
    }

    /// Accumulated normal impulse
    pub fn get_normal_impulse(&self) -> f32 {
        self.jn_acc
    }

    /// Accumulated tangent (friction) impulse
    pub fn get_tangent_impulse(&self) -> f32 {
        self.jt_acc
    }
}

/// Solver settings shared by every contact in a step
#[derive(Debug, Clone, Copy)]
pub struct SolverParams {
    /// The step length
    pub dt: f32,

    /// Penetration allowed before positional correction kicks in
    pub slop: f32,

    /// Fraction of the remaining error corrected this step
    pub bias_coef: f32,

    /// Approach speeds below this do not bounce
    pub restitution_threshold: f32,
}

/// Effective mass along a direction for impulses applied at `r1` and `r2`
#[inline]
pub(crate) fn k_scalar(a: &Body, b: &Body, r1: Vector2, r2: Vector2, n: Vector2) -> f32 {
    let rcn1 = r1.cross(&n);
    let rcn2 = r2.cross(&n);
    a.get_inverse_mass()
        + b.get_inverse_mass()
        + a.get_inverse_moment() * rcn1 * rcn1
        + b.get_inverse_moment() * rcn2 * rcn2
}

#[inline]
pub(crate) fn inverse_or_zero(value: f32) -> f32 {
    if value > 0.0 && value.is_finite() {
        1.0 / value
    } else {
        0.0
    }
}

#[inline]
pub(crate) fn relative_velocity(a: &Body, b: &Body, r1: Vector2, r2: Vector2) -> Vector2 {
    b.velocity_at_offset(r2) - a.velocity_at_offset(r1)
}

#[inline]
pub(crate) fn apply_impulses(a: &mut Body, b: &mut Body, r1: Vector2, r2: Vector2, j: Vector2) {
    a.apply_impulse_at_offset(-j, r1);
    b.apply_impulse_at_offset(j, r2);
}

#[inline]
fn apply_bias_impulses(a: &mut Body, b: &mut Body, r1: Vector2, r2: Vector2, j: Vector2) {
    a.apply_bias_impulse_at_offset(-j, r1);
    b.apply_bias_impulse_at_offset(j, r2);
}

/// Persistent contact state between two touching shapes.
///
/// The shape order matches the collision handler that processes the pair,
/// so callbacks registered for `(type_a, type_b)` always see the shape of
/// `type_a` first.
#[derive(Debug, Clone)]
pub struct Arbiter {
    shape_a: ShapeHandle,
    shape_b: ShapeHandle,
    body_a: BodyHandle,
    body_b: BodyHandle,

    /// Contact normal pointing from shape A to shape B
    normal: Vector2,

    contacts: Vec<Contact>,

    /// Combined friction, overridable from callbacks
    friction: f32,

    /// Combined elasticity, overridable from callbacks
    elasticity: f32,

    /// Relative surface velocity, tangential part only
    surface_velocity: Vector2,

    state: ArbiterState,

    /// Step stamp of the last narrow-phase hit
    pub(crate) stamp: u64,

    /// Either shape is a sensor
    sensor: bool,

    /// Handler key this arbiter was created with
    pub(crate) handler: Option<(CollisionType, CollisionType)>,

    /// Whether the solver processes this arbiter in the current step
    pub(crate) active: bool,
}

impl Arbiter {
    pub(crate) fn new(
        shape_a: ShapeHandle,
        a: &Shape,
        shape_b: ShapeHandle,
        b: &Shape,
        handler: Option<(CollisionType, CollisionType)>,
    ) -> Self {
        Self {
            shape_a,
            shape_b,
            body_a: a.get_body(),
            body_b: b.get_body(),
            normal: Vector2::zero(),
            contacts: Vec::with_capacity(2),
            friction: 0.0,
            elasticity: 0.0,
            surface_velocity: Vector2::zero(),
            state: ArbiterState::FirstCollision,
            stamp: 0,
            sensor: a.is_sensor() || b.is_sensor(),
            handler,
            active: false,
        }
    }

    /// Replaces the contacts with a fresh narrow-phase result, carrying
    /// accumulated impulses over to points with matching ids
    pub(crate) fn update(&mut self, set: &ContactSet, a: &Shape, b: &Shape, stamp: u64) {
        let contacts = set
            .points
            .iter()
            .map(|point| {
                let mut contact = Contact::new(point);
                if let Some(old) = self.contacts.iter().find(|old| old.id == point.id) {
                    contact.jn_acc = old.jn_acc;
                    contact.jt_acc = old.jt_acc;
                }
                contact
            })
            .collect();

        self.contacts = contacts;
        self.normal = set.normal;
        self.friction = a.get_friction() * b.get_friction();
        self.elasticity = a.get_elasticity() * b.get_elasticity();

        let surface_vr = b.get_surface_velocity() - a.get_surface_velocity();
        self.surface_velocity = surface_vr - set.normal * surface_vr.dot(&set.normal);
        self.sensor = a.is_sensor() || b.is_sensor();

        if self.state == ArbiterState::Cached {
            self.state = ArbiterState::Normal;
        }
        self.stamp = stamp;
    }

    /// Returns the key of the shape pair
    pub fn get_key(&self) -> PairKey {
        PairKey::new(self.shape_a, self.shape_b)
    }

    /// Returns the two shapes in handler order
    pub fn get_shapes(&self) -> (ShapeHandle, ShapeHandle) {
        (self.shape_a, self.shape_b)
    }

    /// Returns the two bodies in handler order
    pub fn get_bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    /// Returns the contact normal, pointing from the first shape to the second
    pub fn get_normal(&self) -> Vector2 {
        self.normal
    }

    /// Returns the contacts
    pub fn get_contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Returns the number of contacts
    pub fn count(&self) -> usize {
        self.contacts.len()
    }

    /// Returns the lifecycle state
    pub fn get_state(&self) -> ArbiterState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ArbiterState) {
        self.state = state;
    }

    /// Returns true during the first step the shapes touch
    pub fn is_first_contact(&self) -> bool {
        self.state == ArbiterState::FirstCollision
    }

    /// Returns true if either shape is a sensor
    pub fn is_sensor(&self) -> bool {
        self.sensor
    }

    /// Ignores the pair until the shapes separate
    pub fn ignore(&mut self) {
        self.state = ArbiterState::Ignore;
    }

    /// Returns the combined friction
    pub fn get_friction(&self) -> f32 {
        self.friction
    }

    /// Overrides the combined friction for this step
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    /// Returns the combined elasticity
    pub fn get_elasticity(&self) -> f32 {
        self.elasticity
    }

    /// Overrides the combined elasticity for this step
    pub fn set_elasticity(&mut self, elasticity: f32) {
        self.elasticity = elasticity;
    }

    /// Returns the relative surface velocity
    pub fn get_surface_velocity(&self) -> Vector2 {
        self.surface_velocity
    }

    /// Overrides the relative surface velocity for this step
    pub fn set_surface_velocity(&mut self, surface_velocity: Vector2) {
        self.surface_velocity = surface_velocity;
    }

    /// Total impulse applied by this arbiter in the last step
    pub fn total_impulse(&self) -> Vector2 {
        let n = self.normal;
        self.contacts.iter().fold(Vector2::zero(), |sum, c| {
            sum + n * c.jn_acc + n.perp() * c.jt_acc
        })
    }

    /// Energy lost to the collision in the last step, including static friction
    pub fn total_ke(&self) -> f32 {
        let e_coef = (1.0 - self.elasticity) / (1.0 + self.elasticity);
        self.contacts
            .iter()
            .map(|c| {
                let normal = if c.n_mass > 0.0 { e_coef * c.jn_acc * c.jn_acc / c.n_mass } else { 0.0 };
                let tangent = if c.t_mass > 0.0 { c.jt_acc * c.jt_acc / c.t_mass } else { 0.0 };
                normal + tangent
            })
            .sum()
    }

    /// Computes effective masses, bias and bounce velocities
    pub(crate) fn pre_step(&mut self, a: &Body, b: &Body, params: &SolverParams) {
        let n = self.normal;
        let tangent = n.perp();

        for c in &mut self.contacts {
            c.r1 = c.position - a.get_position();
            c.r2 = c.position - b.get_position();

            c.n_mass = inverse_or_zero(k_scalar(a, b, c.r1, c.r2, n));
            c.t_mass = inverse_or_zero(k_scalar(a, b, c.r1, c.r2, tangent));

            c.bias = -params.bias_coef * (c.distance + params.slop).min(0.0) / params.dt;
            c.jbn_acc = 0.0;

            let vrn = relative_velocity(a, b, c.r1, c.r2).dot(&n);
            c.bounce = if vrn.abs() > params.restitution_threshold {
                vrn * self.elasticity
            } else {
                0.0
            };
        }
    }

    /// Re-applies last step's impulses, scaled for a changed step length
    pub(crate) fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f32) {
        if self.state == ArbiterState::FirstCollision {
            return;
        }

        let n = self.normal;
        for c in &self.contacts {
            let j = (n * c.jn_acc + n.perp() * c.jt_acc) * dt_coef;
            apply_impulses(a, b, c.r1, c.r2, j);
        }
    }

    /// One sequential-impulse iteration over every contact
    pub(crate) fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let n = self.normal;
        let tangent = n.perp();
        let friction = self.friction;
        let surface_vr = self.surface_velocity;

        for c in &mut self.contacts {
            let (r1, r2) = (c.r1, c.r2);

            let vb1 = a.v_bias + r1.perp() * a.w_bias;
            let vb2 = b.v_bias + r2.perp() * b.w_bias;
            let vr = relative_velocity(a, b, r1, r2) + surface_vr;

            let vbn = (vb2 - vb1).dot(&n);
            let vrn = vr.dot(&n);
            let vrt = vr.dot(&tangent);

            let jbn = (c.bias - vbn) * c.n_mass;
            let jbn_old = c.jbn_acc;
            c.jbn_acc = (jbn_old + jbn).max(0.0);
            apply_bias_impulses(a, b, r1, r2, n * (c.jbn_acc - jbn_old));

            let jn = -(c.bounce + vrn) * c.n_mass;
            let jn_old = c.jn_acc;
            c.jn_acc = (jn_old + jn).max(0.0);

            let jt_max = friction * c.jn_acc;
            let jt = -vrt * c.t_mass;
            let jt_old = c.jt_acc;
            c.jt_acc = crate::math::clamp(jt_old + jt, -jt_max, jt_max);

            let j = n * (c.jn_acc - jn_old) + tangent * (c.jt_acc - jt_old);
            apply_impulses(a, b, r1, r2, j);
        }
    }
}
