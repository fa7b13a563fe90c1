use crate::bodies::BodyType;
use crate::core::ShapeHandle;
use crate::error::PhysicsError;
use crate::math::{Rotation, Transform, Vector2};
use crate::Result;

/// A rigid body for physics simulation
#[derive(Debug, Clone)]
pub struct Body {
    /// The body's type (dynamic, kinematic, or static)
    body_type: BodyType,

    /// Position of the centre of gravity in world space
    position: Vector2,

    /// Rotation angle in radians
    angle: f32,

    /// Cached rotation for `angle`
    rotation: Rotation,

    /// The body's linear velocity
    velocity: Vector2,

    /// The body's angular velocity (radians per second)
    angular_velocity: f32,

    /// Force accumulated for the next step
    force: Vector2,

    /// Torque accumulated for the next step
    torque: f32,

    /// The body's mass
    mass: f32,

    /// Inverse of the body's mass (for efficiency)
    inv_mass: f32,

    /// The body's moment of inertia
    moment: f32,

    /// Inverse of the moment of inertia
    inv_moment: f32,

    /// Per-body linear damping, added to the space's damping
    linear_damping: f32,

    /// Per-body angular damping, added to the space's damping
    angular_damping: f32,

    /// Whether gravity applies to this body
    affected_by_gravity: bool,

    /// Split-impulse velocity used for positional correction
    pub(crate) v_bias: Vector2,

    /// Split-impulse angular velocity used for positional correction
    pub(crate) w_bias: f32,

    /// How long the body has been below the sleep thresholds
    pub(crate) idle_time: f32,

    /// Whether the body is currently sleeping
    sleeping: bool,

    /// Set when the body was woken directly and its island has not been woken yet
    pub(crate) wake_requested: bool,

    /// The sleeping group this body belongs to, if any
    pub(crate) sleep_group: Option<u32>,

    /// Shapes attached to this body
    pub(crate) shapes: Vec<ShapeHandle>,

    /// The last known finite position and angle
    last_valid: (Vector2, f32),
}

impl Body {
    fn with_type(body_type: BodyType, mass: f32, moment: f32) -> Self {
        let mut body = Self {
            body_type,
            position: Vector2::zero(),
            angle: 0.0,
            rotation: Rotation::identity(),
            velocity: Vector2::zero(),
            angular_velocity: 0.0,
            force: Vector2::zero(),
            torque: 0.0,
            mass: f32::INFINITY,
            inv_mass: 0.0,
            moment: f32::INFINITY,
            inv_moment: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            affected_by_gravity: true,
            v_bias: Vector2::zero(),
            w_bias: 0.0,
            idle_time: 0.0,
            sleeping: false,
            wake_requested: false,
            sleep_group: None,
            shapes: Vec::new(),
            last_valid: (Vector2::zero(), 0.0),
        };

        if body_type == BodyType::Dynamic {
            body.mass = mass;
            body.inv_mass = if mass > 0.0 && mass.is_finite() { 1.0 / mass } else { 0.0 };
            body.moment = moment;
            body.inv_moment = if moment > 0.0 && moment.is_finite() { 1.0 / moment } else { 0.0 };
        }

        body
    }

    /// Creates a new dynamic body with the given mass and moment of inertia.
    ///
    /// The values are validated when the body is added to a space.
    pub fn new_dynamic(mass: f32, moment: f32) -> Self {
        Self::with_type(BodyType::Dynamic, mass, moment)
    }

    /// Creates a new kinematic body, moved only by its velocity
    pub fn new_kinematic() -> Self {
        Self::with_type(BodyType::Kinematic, f32::INFINITY, f32::INFINITY)
    }

    /// Creates a new static body
    pub fn new_static() -> Self {
        Self::with_type(BodyType::Static, f32::INFINITY, f32::INFINITY)
    }

    /// Builder-style position setter
    pub fn with_position(mut self, position: Vector2) -> Self {
        self.set_position(position);
        self
    }

    /// Builder-style angle setter
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.set_angle(angle);
        self
    }

    /// Builder-style velocity setter
    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder-style angular velocity setter
    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Checks that the mass properties are usable by the solver
    pub(crate) fn validate(&self) -> Result<()> {
        if self.body_type != BodyType::Dynamic {
            return Ok(());
        }
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "dynamic body mass must be positive and finite, got {}",
                self.mass
            )));
        }
        if !(self.moment > 0.0) || self.moment.is_nan() {
            return Err(PhysicsError::InvalidParameter(format!(
                "dynamic body moment must be positive, got {}",
                self.moment
            )));
        }
        if !self.position.is_finite() || !self.angle.is_finite() {
            return Err(PhysicsError::InvalidParameter(
                "body position and angle must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the body type
    pub fn get_body_type(&self) -> BodyType {
        self.body_type
    }

    /// Returns true for dynamic bodies
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Returns true for static bodies
    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Returns the body's position
    pub fn get_position(&self) -> Vector2 {
        self.position
    }

    /// Sets the body's position
    pub fn set_position(&mut self, position: Vector2) {
        debug_assert!(position.is_finite(), "body position must be finite");
        self.position = position;
        self.last_valid.0 = position;
        self.wake_up();
    }

    /// Returns the body's angle in radians
    pub fn get_angle(&self) -> f32 {
        self.angle
    }

    /// Sets the body's angle in radians
    pub fn set_angle(&mut self, angle: f32) {
        debug_assert!(angle.is_finite(), "body angle must be finite");
        self.angle = angle;
        self.rotation = Rotation::from_angle(angle);
        self.last_valid.1 = angle;
        self.wake_up();
    }

    /// Returns the cached rotation
    pub fn get_rotation(&self) -> Rotation {
        self.rotation
    }

    /// Returns the body-to-world transform
    pub fn get_transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.rotation)
    }

    /// Returns the body's linear velocity
    pub fn get_velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Sets the body's linear velocity
    pub fn set_velocity(&mut self, velocity: Vector2) {
        debug_assert!(velocity.is_finite(), "body velocity must be finite");
        self.velocity = velocity;
        self.wake_up();
    }

    /// Returns the body's angular velocity
    pub fn get_angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Sets the body's angular velocity
    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        debug_assert!(angular_velocity.is_finite(), "body angular velocity must be finite");
        self.angular_velocity = angular_velocity;
        self.wake_up();
    }

    /// Returns the force accumulated for the next step
    pub fn get_force(&self) -> Vector2 {
        self.force
    }

    /// Returns the torque accumulated for the next step
    pub fn get_torque(&self) -> f32 {
        self.torque
    }

    /// Returns the body's mass
    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    /// Sets the mass of a dynamic body
    pub fn set_mass(&mut self, mass: f32) -> Result<()> {
        if self.body_type != BodyType::Dynamic {
            return Err(PhysicsError::InvalidParameter(
                "only dynamic bodies have a finite mass".to_string(),
            ));
        }
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "mass must be positive and finite, got {mass}"
            )));
        }
        self.mass = mass;
        self.inv_mass = 1.0 / mass;
        self.wake_up();
        Ok(())
    }

    /// Returns the body's inverse mass
    pub fn get_inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Returns the body's moment of inertia
    pub fn get_moment(&self) -> f32 {
        self.moment
    }

    /// Sets the moment of inertia of a dynamic body.
    ///
    /// An infinite moment is allowed and prevents the body from rotating.
    pub fn set_moment(&mut self, moment: f32) -> Result<()> {
        if self.body_type != BodyType::Dynamic {
            return Err(PhysicsError::InvalidParameter(
                "only dynamic bodies have a finite moment".to_string(),
            ));
        }
        if !(moment > 0.0) || moment.is_nan() {
            return Err(PhysicsError::InvalidParameter(format!(
                "moment must be positive, got {moment}"
            )));
        }
        self.moment = moment;
        self.inv_moment = if moment.is_finite() { 1.0 / moment } else { 0.0 };
        self.wake_up();
        Ok(())
    }

    /// Returns the inverse moment of inertia
    pub fn get_inverse_moment(&self) -> f32 {
        self.inv_moment
    }

    /// Sets the body's linear damping
    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping.max(0.0);
    }

    /// Returns the body's linear damping
    pub fn get_linear_damping(&self) -> f32 {
        self.linear_damping
    }

    /// Sets the body's angular damping
    pub fn set_angular_damping(&mut self, damping: f32) {
        self.angular_damping = damping.max(0.0);
    }

    /// Returns the body's angular damping
    pub fn get_angular_damping(&self) -> f32 {
        self.angular_damping
    }

    /// Returns whether the body is affected by gravity
    pub fn is_affected_by_gravity(&self) -> bool {
        self.affected_by_gravity
    }

    /// Sets whether the body is affected by gravity
    pub fn set_affected_by_gravity(&mut self, affected: bool) {
        self.affected_by_gravity = affected;
    }

    /// Returns the shapes attached to this body
    pub fn get_shapes(&self) -> &[ShapeHandle] {
        &self.shapes
    }

    /// Returns whether the body is sleeping
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Returns how long the body has been idle
    pub fn get_idle_time(&self) -> f32 {
        self.idle_time
    }

    /// Wakes up the body.
    ///
    /// The rest of its sleeping group is woken at the start of the next
    /// step, or immediately through `Space::activate_body`.
    pub fn wake_up(&mut self) {
        self.idle_time = 0.0;
        if self.sleeping {
            self.wake_requested = true;
        }
    }

    pub(crate) fn set_sleeping(&mut self, group: Option<u32>) {
        match group {
            Some(id) => {
                self.sleeping = true;
                self.sleep_group = Some(id);
                self.velocity = Vector2::zero();
                self.angular_velocity = 0.0;
                self.force = Vector2::zero();
                self.torque = 0.0;
            }
            None => {
                self.sleeping = false;
                self.sleep_group = None;
                self.wake_requested = false;
                self.idle_time = 0.0;
            }
        }
    }

    /// Returns true if the body takes part in the solver this step
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.body_type != BodyType::Static && !self.sleeping
    }

    /// Converts a point from body space to world space
    pub fn local_to_world(&self, point: Vector2) -> Vector2 {
        self.position + self.rotation.rotate_vector(point)
    }

    /// Converts a point from world space to body space
    pub fn world_to_local(&self, point: Vector2) -> Vector2 {
        self.rotation.inverse_rotate_vector(point - self.position)
    }

    /// Returns the velocity of a point given relative to the centre of gravity
    #[inline]
    pub fn velocity_at_offset(&self, r: Vector2) -> Vector2 {
        self.velocity + r.perp() * self.angular_velocity
    }

    /// Returns the velocity of a point given in world space
    pub fn velocity_at_world_point(&self, point: Vector2) -> Vector2 {
        self.velocity_at_offset(point - self.position)
    }

    /// Returns the velocity of a point given in body space
    pub fn velocity_at_local_point(&self, point: Vector2) -> Vector2 {
        self.velocity_at_offset(self.rotation.rotate_vector(point))
    }

    /// Returns the body's kinetic energy
    pub fn kinetic_energy(&self) -> f32 {
        if self.body_type != BodyType::Dynamic {
            return 0.0;
        }
        let linear = self.mass * self.velocity.length_squared();
        let angular = if self.moment.is_finite() {
            self.moment * self.angular_velocity * self.angular_velocity
        } else {
            0.0
        };
        0.5 * (linear + angular)
    }

    /// Applies a force at the centre of gravity
    pub fn apply_force(&mut self, force: Vector2) {
        if self.body_type == BodyType::Dynamic {
            self.force += force;
            self.wake_up();
        }
    }

    /// Applies a force at a point given in world space
    pub fn apply_force_at_world_point(&mut self, force: Vector2, point: Vector2) {
        if self.body_type == BodyType::Dynamic {
            let r = point - self.position;
            self.force += force;
            self.torque += r.cross(&force);
            self.wake_up();
        }
    }

    /// Applies a force at a point given in body space
    pub fn apply_force_at_local_point(&mut self, force: Vector2, point: Vector2) {
        let world_point = self.local_to_world(point);
        self.apply_force_at_world_point(force, world_point);
    }

    /// Applies a torque to the body
    pub fn apply_torque(&mut self, torque: f32) {
        if self.body_type == BodyType::Dynamic {
            self.torque += torque;
            self.wake_up();
        }
    }

    /// Applies an impulse at the centre of gravity
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        if self.body_type == BodyType::Dynamic {
            self.velocity += impulse * self.inv_mass;
            self.wake_up();
        }
    }

    /// Applies an impulse at a point given in world space
    pub fn apply_impulse_at_world_point(&mut self, impulse: Vector2, point: Vector2) {
        if self.body_type == BodyType::Dynamic {
            self.apply_impulse_at_offset(impulse, point - self.position);
            self.wake_up();
        }
    }

    /// Applies an impulse at a point given in body space
    pub fn apply_impulse_at_local_point(&mut self, impulse: Vector2, point: Vector2) {
        let world_point = self.local_to_world(point);
        self.apply_impulse_at_world_point(impulse, world_point);
    }

    /// Applies an angular impulse
    pub fn apply_angular_impulse(&mut self, impulse: f32) {
        if self.body_type == BodyType::Dynamic {
            self.angular_velocity += impulse * self.inv_moment;
            self.wake_up();
        }
    }

    /// Solver entry point: applies an impulse at an offset from the centre of gravity
    #[inline]
    pub(crate) fn apply_impulse_at_offset(&mut self, impulse: Vector2, r: Vector2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_moment * r.cross(&impulse);
    }

    /// Solver entry point: applies a positional-correction impulse
    #[inline]
    pub(crate) fn apply_bias_impulse_at_offset(&mut self, impulse: Vector2, r: Vector2) {
        self.v_bias += impulse * self.inv_mass;
        self.w_bias += self.inv_moment * r.cross(&impulse);
    }

    /// Solver entry point: applies an angular impulse without waking
    #[inline]
    pub(crate) fn apply_angular_impulse_raw(&mut self, impulse: f32) {
        self.angular_velocity += impulse * self.inv_moment;
    }

    /// Integrates forces and gravity into velocities
    pub(crate) fn integrate_velocity(
        &mut self,
        gravity: Vector2,
        linear_damping: f32,
        angular_damping: f32,
        dt: f32,
    ) {
        if self.body_type != BodyType::Dynamic || self.sleeping {
            self.force = Vector2::zero();
            self.torque = 0.0;
            return;
        }

        let linear_factor = (1.0 - (linear_damping + self.linear_damping) * dt).clamp(0.0, 1.0);
        let angular_factor = (1.0 - (angular_damping + self.angular_damping) * dt).clamp(0.0, 1.0);
        let gravity = if self.affected_by_gravity { gravity } else { Vector2::zero() };

        self.velocity = self.velocity * linear_factor + (gravity + self.force * self.inv_mass) * dt;
        self.angular_velocity =
            self.angular_velocity * angular_factor + self.torque * self.inv_moment * dt;

        self.force = Vector2::zero();
        self.torque = 0.0;
    }

    /// Integrates velocities (including the bias velocities) into the pose
    pub(crate) fn integrate_position(&mut self, dt: f32) {
        if self.body_type == BodyType::Static || self.sleeping {
            return;
        }

        self.position += (self.velocity + self.v_bias) * dt;
        self.angle += (self.angular_velocity + self.w_bias) * dt;
        self.rotation = Rotation::from_angle(self.angle);

        self.v_bias = Vector2::zero();
        self.w_bias = 0.0;
    }

    /// Restores the last finite pose if integration produced NaN or infinity.
    ///
    /// Returns true if the body had to be reset.
    pub(crate) fn sanitize(&mut self) -> bool {
        let finite = self.position.is_finite()
            && self.angle.is_finite()
            && self.velocity.is_finite()
            && self.angular_velocity.is_finite();

        if finite {
            self.last_valid = (self.position, self.angle);
            return false;
        }

        let (position, angle) = self.last_valid;
        self.position = position;
        self.angle = angle;
        self.rotation = Rotation::from_angle(angle);
        self.velocity = Vector2::zero();
        self.angular_velocity = 0.0;
        self.v_bias = Vector2::zero();
        self.w_bias = 0.0;
        true
    }
}
