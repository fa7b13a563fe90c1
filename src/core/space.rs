use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument, trace, warn};

use crate::bodies::{Body, BodyType};
use crate::collision::{
    new_spatial_index, Arbiter, ArbiterState, CollisionHandler, CollisionType, ContactSolver,
    NarrowPhase, PairKey, SolverParams, SpatialIndex,
};
use crate::constraints::Constraint;
use crate::core::commands::Command;
use crate::core::{
    BodyEventType, BodyHandle, CollisionEvent, CollisionEventType, CommandQueue, ConstraintHandle,
    EventQueue, IslandBuilder, ShapeHandle, SpaceConfig, Storage,
};
use crate::error::PhysicsError;
use crate::integration::{Integrator, SymplecticEulerIntegrator};
use crate::math::Vector2;
use crate::shapes::Shape;
use crate::Result;

/// Key of a collision handler: the collision types of the two shapes
type HandlerKey = (CollisionType, CollisionType);

/// The simulation space: owns bodies, shapes and constraints and steps them
pub struct Space {
    /// All bodies in the space
    pub(super) bodies: Storage<Body, BodyHandle>,

    /// All shapes in the space
    pub(super) shapes: Storage<Shape, ShapeHandle>,

    /// All constraints in the space
    pub(super) constraints: Storage<Constraint, ConstraintHandle>,

    /// The implicit static body for fixed geometry
    static_body: BodyHandle,

    /// Configuration for the simulation
    pub(super) config: SpaceConfig,

    /// Index of shapes on non-static bodies
    pub(super) dynamic_index: Box<dyn SpatialIndex>,

    /// Index of shapes on static bodies
    pub(super) static_index: Box<dyn SpatialIndex>,

    /// Contact generation
    narrow_phase: NarrowPhase,

    /// Velocity and position integration
    integrator: Box<dyn Integrator>,

    /// Persistent contact state, keyed by shape pair
    pub(super) arbiters: BTreeMap<PairKey, Arbiter>,

    /// Collision handlers by collision type pair
    handlers: BTreeMap<HandlerKey, CollisionHandler>,

    /// Handler for pairs without a registered handler
    default_handler: CollisionHandler,

    /// Structural changes queued during the step
    commands: CommandQueue,

    /// Events recorded during the last step
    events: EventQueue,

    /// Whether a step is in progress
    locked: bool,

    /// Step counter used to detect stale arbiters
    stamp: u64,

    /// The total elapsed simulation time
    time: f32,

    /// Length of the previous step, for scaling warm-start impulses
    prev_dt: f32,

    /// Next id handed out to a sleeping group
    next_sleep_group: u32,
}

impl Space {
    /// Creates a new space with default settings
    pub fn new() -> Self {
        Self::with_config(SpaceConfig::default())
    }

    /// Creates a new space with the given configuration
    pub fn with_config(config: SpaceConfig) -> Self {
        let mut bodies = Storage::new();
        let static_body = bodies.add(Body::new_static());

        Self {
            bodies,
            shapes: Storage::new(),
            constraints: Storage::new(),
            static_body,
            dynamic_index: new_spatial_index(config.broad_phase, config.cell_size),
            static_index: new_spatial_index(config.broad_phase, config.cell_size),
            narrow_phase: NarrowPhase::new(config.contact_tolerance, config.seed),
            integrator: Box::new(SymplecticEulerIntegrator::new()),
            arbiters: BTreeMap::new(),
            handlers: BTreeMap::new(),
            default_handler: CollisionHandler::new(),
            commands: CommandQueue::new(),
            events: EventQueue::new(),
            locked: false,
            stamp: 0,
            time: 0.0,
            prev_dt: 0.0,
            next_sleep_group: 0,
            config,
        }
    }

    /// Returns the space's implicit static body
    pub fn static_body(&self) -> BodyHandle {
        self.static_body
    }

    /// Returns the current simulation time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Returns whether a step is in progress
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns the configuration
    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    /// Returns the configuration for modification.
    ///
    /// Changes to the broad phase kind or cell size only affect spaces
    /// created afterwards.
    pub fn config_mut(&mut self) -> &mut SpaceConfig {
        &mut self.config
    }

    /// Returns the gravity
    pub fn gravity(&self) -> Vector2 {
        self.config.gravity
    }

    /// Sets the gravity
    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.config.gravity = gravity;
    }

    /// Returns the integrator in use
    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    /// Replaces the integrator
    pub fn set_integrator(&mut self, integrator: Box<dyn Integrator>) {
        self.integrator = integrator;
    }

    /// Returns the events recorded during the last step
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Returns the events for draining
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Returns the handler for shapes of collision types `a` and `b`, creating it if needed.
    ///
    /// Arbiters processed by this handler present the shape of type `a` first.
    pub fn on_collision(&mut self, a: CollisionType, b: CollisionType) -> &mut CollisionHandler {
        self.handlers.entry((a, b)).or_default()
    }

    /// Returns the handler used for pairs without a registered handler
    pub fn default_collision_handler(&mut self) -> &mut CollisionHandler {
        &mut self.default_handler
    }

    /// Adds a body to the space
    pub fn add_body(&mut self, body: Body) -> Result<BodyHandle> {
        debug_assert!(!self.locked, "bodies must be added through the command queue while stepping");
        body.validate()?;

        let handle = self.bodies.add(body);
        self.events.add_body_event(BodyEventType::Added, handle);
        debug!(?handle, "added body");

        Ok(handle)
    }

    /// Removes a body and its shapes.
    ///
    /// Fails if constraints still reference the body; see
    /// [`remove_body_cascade`](Self::remove_body_cascade).
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<Body> {
        debug_assert!(!self.locked, "bodies must be removed through the command queue while stepping");
        if handle == self.static_body {
            return Err(PhysicsError::StaticBodyRemoval);
        }
        if !self.bodies.contains(handle) {
            return Err(PhysicsError::BodyNotFound(handle));
        }

        let referencing = self
            .constraints
            .iter()
            .filter(|(_, constraint)| constraint.involves_body(handle))
            .count();
        if referencing > 0 {
            return Err(PhysicsError::StillReferenced {
                body: handle,
                constraints: referencing,
            });
        }

        self.wake_group(handle);

        let shapes: Vec<ShapeHandle> = self
            .bodies
            .get(handle)
            .map(|body| body.get_shapes().to_vec())
            .unwrap_or_default();
        for shape in shapes {
            self.detach_shape(shape);
        }

        let body = self.bodies.remove(handle).ok_or(PhysicsError::BodyNotFound(handle))?;
        self.events.add_body_event(BodyEventType::Removed, handle);
        debug!(?handle, "removed body");

        Ok(body)
    }

    /// Removes a body together with its shapes and every constraint referencing it
    pub fn remove_body_cascade(&mut self, handle: BodyHandle) -> Result<Body> {
        if handle == self.static_body {
            return Err(PhysicsError::StaticBodyRemoval);
        }
        if !self.bodies.contains(handle) {
            return Err(PhysicsError::BodyNotFound(handle));
        }

        let constraints: Vec<ConstraintHandle> = self
            .constraints
            .iter()
            .filter(|(_, constraint)| constraint.involves_body(handle))
            .map(|(c_handle, _)| c_handle)
            .collect();
        for c_handle in constraints {
            self.remove_constraint(c_handle)?;
        }

        self.remove_body(handle)
    }

    /// Gets a reference to a body by its handle
    pub fn body(&self, handle: BodyHandle) -> Result<&Body> {
        self.bodies.get(handle).ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Gets a mutable reference to a body by its handle.
    ///
    /// Moving a static body requires [`reindex_static`](Self::reindex_static)
    /// afterwards.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body> {
        self.bodies.get_mut(handle).ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Returns every body, in handle order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    /// Returns the number of bodies, including the implicit static body
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Adds a shape to the body it was created for
    pub fn add_shape(&mut self, mut shape: Shape) -> Result<ShapeHandle> {
        debug_assert!(!self.locked, "shapes must be added through the command queue while stepping");
        let body_handle = shape.get_body();
        let body = self
            .bodies
            .get(body_handle)
            .ok_or(PhysicsError::BodyNotFound(body_handle))?;

        let is_static = body.is_static();
        let bb = shape.update(&body.get_transform()).grow(self.config.contact_tolerance);

        let handle = self.shapes.add(shape);
        if is_static {
            self.static_index.insert(handle, bb);
        } else {
            self.dynamic_index.insert(handle, bb);
        }

        if let Some(body) = self.bodies.get_mut(body_handle) {
            body.shapes.push(handle);
            body.wake_up();
        }
        debug!(?handle, body = ?body_handle, "added shape");

        Ok(handle)
    }

    /// Removes a shape, firing `separate` for every pair it was touching
    pub fn remove_shape(&mut self, handle: ShapeHandle) -> Result<Shape> {
        debug_assert!(!self.locked, "shapes must be removed through the command queue while stepping");
        let body = self
            .shapes
            .get(handle)
            .map(|shape| shape.get_body())
            .ok_or(PhysicsError::ShapeNotFound(handle))?;

        self.wake_group(body);
        if let Some(body) = self.bodies.get_mut(body) {
            body.shapes.retain(|shape| *shape != handle);
        }

        let shape = self.detach_shape(handle).ok_or(PhysicsError::ShapeNotFound(handle))?;
        debug!(?handle, "removed shape");

        Ok(shape)
    }

    /// Gets a reference to a shape by its handle
    pub fn shape(&self, handle: ShapeHandle) -> Result<&Shape> {
        self.shapes.get(handle).ok_or(PhysicsError::ShapeNotFound(handle))
    }

    /// Gets a mutable reference to a shape by its handle
    pub fn shape_mut(&mut self, handle: ShapeHandle) -> Result<&mut Shape> {
        self.shapes.get_mut(handle).ok_or(PhysicsError::ShapeNotFound(handle))
    }

    /// Returns every shape, in handle order
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeHandle, &Shape)> + '_ {
        self.shapes.iter()
    }

    /// Returns the number of shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Adds a constraint between two bodies in the space
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> Result<ConstraintHandle> {
        debug_assert!(!self.locked, "constraints must be added through the command queue while stepping");
        constraint.validate()?;

        let (ha, hb) = constraint.get_bodies();
        let a = self.bodies.get(ha).ok_or(PhysicsError::BodyNotFound(ha))?;
        let b = self.bodies.get(hb).ok_or(PhysicsError::BodyNotFound(hb))?;
        constraint.attach(a, b);

        self.wake_group(ha);
        self.wake_group(hb);

        let handle = self.constraints.add(constraint);
        debug!(?handle, body_a = ?ha, body_b = ?hb, "added constraint");

        Ok(handle)
    }

    /// Removes a constraint and wakes its bodies
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Result<Constraint> {
        debug_assert!(!self.locked, "constraints must be removed through the command queue while stepping");
        let constraint = self
            .constraints
            .remove(handle)
            .ok_or(PhysicsError::ConstraintNotFound(handle))?;

        let (ha, hb) = constraint.get_bodies();
        self.wake_group(ha);
        self.wake_group(hb);
        debug!(?handle, "removed constraint");

        Ok(constraint)
    }

    /// Gets a reference to a constraint by its handle
    pub fn constraint(&self, handle: ConstraintHandle) -> Result<&Constraint> {
        self.constraints.get(handle).ok_or(PhysicsError::ConstraintNotFound(handle))
    }

    /// Gets a mutable reference to a constraint by its handle
    pub fn constraint_mut(&mut self, handle: ConstraintHandle) -> Result<&mut Constraint> {
        self.constraints.get_mut(handle).ok_or(PhysicsError::ConstraintNotFound(handle))
    }

    /// Returns every constraint, in handle order
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintHandle, &Constraint)> + '_ {
        self.constraints.iter()
    }

    /// Returns the number of constraints
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Returns every arbiter, ordered by shape pair
    pub fn arbiters(&self) -> impl Iterator<Item = &Arbiter> + '_ {
        self.arbiters.values()
    }

    /// Recomputes a shape's geometry and bounding box from its body
    pub fn reindex_shape(&mut self, handle: ShapeHandle) -> Result<()> {
        let shape = self.shapes.get_mut(handle).ok_or(PhysicsError::ShapeNotFound(handle))?;
        let body_handle = shape.get_body();
        let body = self
            .bodies
            .get(body_handle)
            .ok_or(PhysicsError::BodyNotFound(body_handle))?;

        let bb = shape.update(&body.get_transform()).grow(self.config.contact_tolerance);
        if body.is_static() {
            self.static_index.update(handle, bb);
        } else {
            self.dynamic_index.update(handle, bb);
        }
        Ok(())
    }

    /// Recomputes the geometry of every shape on a static body
    pub fn reindex_static(&mut self) {
        let tolerance = self.config.contact_tolerance;
        for (handle, shape) in self.shapes.iter_mut() {
            if let Some(body) = self.bodies.get(shape.get_body()) {
                if body.is_static() {
                    let bb = shape.update(&body.get_transform()).grow(tolerance);
                    self.static_index.update(handle, bb);
                }
            }
        }
    }

    /// Wakes a body and every body sleeping in its group
    pub fn activate_body(&mut self, handle: BodyHandle) -> Result<()> {
        let body = self.bodies.get_mut(handle).ok_or(PhysicsError::BodyNotFound(handle))?;
        if body.is_sleeping() {
            self.wake_group(handle);
        } else {
            body.wake_up();
        }
        Ok(())
    }

    /// Puts a dynamic body to sleep together with everything it touches or is
    /// jointed to
    pub fn sleep_body(&mut self, handle: BodyHandle) -> Result<()> {
        let body = self.bodies.get(handle).ok_or(PhysicsError::BodyNotFound(handle))?;
        if !body.is_dynamic() {
            return Err(PhysicsError::InvalidParameter(format!(
                "only dynamic bodies can sleep, {handle:?} is {:?}",
                body.get_body_type()
            )));
        }
        if body.is_sleeping() {
            return Ok(());
        }

        let mut builder = self.awake_dynamic_islands(false);
        let Some(root) = builder.find(handle) else {
            return Ok(());
        };

        let island: Vec<BodyHandle> = builder
            .build()
            .into_iter()
            .find(|island| island.contains(&root))
            .unwrap_or_else(|| vec![handle]);
        self.sleep_island(&island);

        Ok(())
    }

    /// Removes every body, shape and constraint except the implicit static body
    pub fn clear(&mut self) {
        debug_assert!(!self.locked, "cannot clear a space while stepping");
        let static_body = self.bodies.remove(self.static_body);

        self.bodies.clear();
        self.shapes.clear();
        self.constraints.clear();
        self.arbiters.clear();
        self.dynamic_index.clear();
        self.static_index.clear();
        self.commands.clear();
        self.events.clear();

        let mut body = static_body.unwrap_or_else(Body::new_static);
        body.shapes.clear();
        self.static_body = self.bodies.add(body);
        debug!("cleared space");
    }

    /// Advances the simulation by `dt` seconds
    #[instrument(level = "trace", skip(self))]
    pub fn step(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            warn!(dt, "ignoring step with a non-positive or non-finite time step");
            return;
        }

        self.events.clear();
        self.stamp += 1;
        self.locked = true;
        self.narrow_phase.set_tolerance(self.config.contact_tolerance);

        self.wake_requested_groups();
        self.update_bounding_boxes();

        let pairs = self.find_candidate_pairs();
        let candidate_count = pairs.len();
        let no_collide = self.non_colliding_bodies();
        for (ha, hb) in pairs {
            if self.should_collide(ha, hb, &no_collide) {
                self.collide_pair(ha, hb);
            }
        }

        let woken = self.wake_touched_bodies();
        self.filter_arbiters(&woken);

        self.solve(dt);
        self.update_bounding_boxes();
        self.run_post_solve();

        if self.config.allow_sleeping {
            self.update_sleeping(dt);
        }

        self.locked = false;
        self.time += dt;
        self.prev_dt = dt;

        trace!(
            bodies = self.bodies.len(),
            arbiters = self.arbiters.len(),
            candidates = candidate_count,
            "step finished"
        );

        self.flush_commands();
    }

    /// Applies queued commands in order, including commands queued while flushing
    fn flush_commands(&mut self) {
        while let Some(command) = self.commands.pop() {
            let result = match command {
                Command::AddBody(body) => self.add_body(body).map(drop),
                Command::RemoveBody(handle) => self.remove_body(handle).map(drop),
                Command::RemoveBodyCascade(handle) => self.remove_body_cascade(handle).map(drop),
                Command::RemoveShape(handle) => self.remove_shape(handle).map(drop),
                Command::RemoveConstraint(handle) => self.remove_constraint(handle).map(drop),
                Command::AddShape(shape) => self.add_shape(shape).map(drop),
                Command::AddConstraint(constraint) => self.add_constraint(constraint).map(drop),
                Command::Wake(handle) => self.activate_body(handle),
                Command::PostStep(callback) => {
                    callback(self);
                    Ok(())
                }
            };

            if let Err(error) = result {
                warn!(%error, "deferred command failed");
            }
        }
    }

    /// Removes a shape from the indices and its arbiters, firing `separate`
    fn detach_shape(&mut self, handle: ShapeHandle) -> Option<Shape> {
        let shape = self.shapes.remove(handle)?;
        self.dynamic_index.remove(handle);
        self.static_index.remove(handle);

        let keys: Vec<PairKey> = self
            .arbiters
            .keys()
            .filter(|key| key.contains(handle))
            .copied()
            .collect();

        for key in keys {
            if let Some(mut arbiter) = self.arbiters.remove(&key) {
                let (ba, bb) = arbiter.get_bodies();
                self.wake_group(ba);
                self.wake_group(bb);
                self.separate(&mut arbiter);
            }
        }

        Some(shape)
    }

    fn handler_for<'a>(
        handlers: &'a mut BTreeMap<HandlerKey, CollisionHandler>,
        default_handler: &'a mut CollisionHandler,
        key: Option<HandlerKey>,
    ) -> &'a mut CollisionHandler {
        match key {
            Some(key) => handlers.get_mut(&key).unwrap_or(default_handler),
            None => default_handler,
        }
    }

    /// Fires the separate event and callback for an arbiter leaving the space
    fn separate(&mut self, arbiter: &mut Arbiter) {
        let (shape_a, shape_b) = arbiter.get_shapes();
        let (body_a, body_b) = arbiter.get_bodies();
        self.events.add_collision_event(CollisionEvent {
            event_type: CollisionEventType::Separate,
            shape_a,
            shape_b,
            body_a,
            body_b,
        });

        let handler = Self::handler_for(&mut self.handlers, &mut self.default_handler, arbiter.handler);
        handler.separate(arbiter, &mut self.commands);
    }

    /// Wakes the sleeping group of a body; returns the bodies that woke up
    fn wake_group(&mut self, handle: BodyHandle) -> Vec<BodyHandle> {
        let group = match self.bodies.get_mut(handle) {
            Some(body) if body.is_sleeping() => body.sleep_group,
            Some(body) => {
                body.wake_up();
                return Vec::new();
            }
            None => return Vec::new(),
        };

        let members: Vec<BodyHandle> = match group {
            Some(group) => self
                .bodies
                .iter()
                .filter(|(_, body)| body.is_sleeping() && body.sleep_group == Some(group))
                .map(|(member, _)| member)
                .collect(),
            None => vec![handle],
        };

        for &member in &members {
            if let Some(body) = self.bodies.get_mut(member) {
                body.set_sleeping(None);
            }
            self.events.add_body_event(BodyEventType::Awake, member);
        }
        debug!(body = ?handle, count = members.len(), "woke sleeping group");

        members
    }

    /// Wakes the groups of bodies that were woken directly since the last step
    fn wake_requested_groups(&mut self) {
        let requested: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.wake_requested && body.is_sleeping())
            .map(|(handle, _)| handle)
            .collect();

        for handle in requested {
            self.wake_group(handle);
        }
    }

    /// Refreshes the geometry of shapes on awake, non-static bodies
    fn update_bounding_boxes(&mut self) {
        let tolerance = self.config.contact_tolerance;
        for (handle, shape) in self.shapes.iter_mut() {
            if let Some(body) = self.bodies.get(shape.get_body()) {
                if body.is_active() {
                    let bb = shape.update(&body.get_transform()).grow(tolerance);
                    self.dynamic_index.update(handle, bb);
                }
            }
        }
    }

    /// Returns true if the shape's body is awake and not static
    fn is_shape_active(&self, handle: ShapeHandle) -> bool {
        self.shapes
            .get(handle)
            .and_then(|shape| self.bodies.get(shape.get_body()))
            .map_or(false, |body| body.is_active())
    }

    /// Collects the overlapping shape pairs involving at least one awake shape.
    ///
    /// Each pair is reported once.
    fn find_candidate_pairs(&self) -> Vec<(ShapeHandle, ShapeHandle)> {
        let mut pairs = Vec::new();

        for (ha, shape) in self.shapes.iter() {
            if !self.is_shape_active(ha) {
                continue;
            }
            let bb = self
                .dynamic_index
                .get_bb(ha)
                .unwrap_or_else(|| shape.get_bb().grow(self.config.contact_tolerance));

            for hb in self.dynamic_index.query(bb).chain(self.static_index.query(bb)) {
                if hb == ha || (hb < ha && self.is_shape_active(hb)) {
                    continue;
                }
                pairs.push((ha, hb));
            }
        }

        pairs
    }

    /// Body pairs joined by a constraint that disables collisions between them
    fn non_colliding_bodies(&self) -> BTreeSet<(BodyHandle, BodyHandle)> {
        self.constraints
            .iter()
            .filter(|(_, constraint)| !constraint.get_collide_bodies())
            .map(|(_, constraint)| {
                let (a, b) = constraint.get_bodies();
                (a.min(b), a.max(b))
            })
            .collect()
    }

    fn should_collide(
        &self,
        ha: ShapeHandle,
        hb: ShapeHandle,
        no_collide: &BTreeSet<(BodyHandle, BodyHandle)>,
    ) -> bool {
        let (Some(a), Some(b)) = (self.shapes.get(ha), self.shapes.get(hb)) else {
            return false;
        };
        let (body_a, body_b) = (a.get_body(), b.get_body());
        if body_a == body_b || a.get_filter().reject(&b.get_filter()) {
            return false;
        }

        let dynamic = |handle| self.bodies.get(handle).map_or(false, Body::is_dynamic);
        if !dynamic(body_a) && !dynamic(body_b) {
            return false;
        }

        !no_collide.contains(&(body_a.min(body_b), body_a.max(body_b)))
    }

    /// Orders a new pair so that a registered handler sees its first type first
    fn order_pair(
        &self,
        ha: ShapeHandle,
        hb: ShapeHandle,
    ) -> (ShapeHandle, ShapeHandle, Option<HandlerKey>) {
        let type_of = |handle| self.shapes.get(handle).map_or(0, Shape::get_collision_type);
        let (ta, tb) = (type_of(ha), type_of(hb));

        if self.handlers.contains_key(&(ta, tb)) {
            (ha, hb, Some((ta, tb)))
        } else if self.handlers.contains_key(&(tb, ta)) {
            (hb, ha, Some((tb, ta)))
        } else {
            let key = PairKey::new(ha, hb);
            (key.shape_a, key.shape_b, None)
        }
    }

    /// Runs the narrow phase on a pair and updates its arbiter and callbacks
    fn collide_pair(&mut self, ha: ShapeHandle, hb: ShapeHandle) {
        let key = PairKey::new(ha, hb);
        let (first, second, handler_key) = match self.arbiters.get(&key) {
            Some(arbiter) => {
                let (a, b) = arbiter.get_shapes();
                (a, b, arbiter.handler)
            }
            None => self.order_pair(ha, hb),
        };

        let (Some(a), Some(b)) = (self.shapes.get(first), self.shapes.get(second)) else {
            return;
        };
        let contacts = self.narrow_phase.collide(a, b);
        if contacts.is_empty() {
            return;
        }

        let stamp = self.stamp;
        let arbiter = self
            .arbiters
            .entry(key)
            .or_insert_with(|| Arbiter::new(first, a, second, b, handler_key));
        arbiter.update(&contacts, a, b, stamp);

        let handler = Self::handler_for(&mut self.handlers, &mut self.default_handler, arbiter.handler);

        if arbiter.get_state() == ArbiterState::FirstCollision {
            let (body_a, body_b) = arbiter.get_bodies();
            self.events.add_collision_event(CollisionEvent {
                event_type: CollisionEventType::Begin,
                shape_a: first,
                shape_b: second,
                body_a,
                body_b,
            });

            if !handler.begin(arbiter, &mut self.commands) {
                arbiter.ignore();
            }
        }

        arbiter.active = arbiter.get_state() != ArbiterState::Ignore
            && handler.pre_solve(arbiter, &mut self.commands)
            && !arbiter.is_sensor();
    }

    /// Wakes sleeping bodies touched by awake ones; returns the bodies woken
    fn wake_touched_bodies(&mut self) -> BTreeSet<BodyHandle> {
        let mut to_wake = BTreeSet::new();

        for arbiter in self.arbiters.values() {
            if arbiter.stamp != self.stamp || !arbiter.active {
                continue;
            }

            let (ha, hb) = arbiter.get_bodies();
            let (Some(a), Some(b)) = (self.bodies.get(ha), self.bodies.get(hb)) else {
                continue;
            };

            if a.is_sleeping() && wakes_others(b) {
                to_wake.insert(ha);
            }
            if b.is_sleeping() && wakes_others(a) {
                to_wake.insert(hb);
            }
        }

        let mut woken = BTreeSet::new();
        for handle in to_wake {
            woken.extend(self.wake_group(handle));
        }
        woken
    }

    /// Drops arbiters whose shapes stopped touching; pairs between sleeping
    /// or static bodies are cached instead
    fn filter_arbiters(&mut self, woken: &BTreeSet<BodyHandle>) {
        let stamp = self.stamp;
        let stale: Vec<PairKey> = self
            .arbiters
            .iter()
            .filter(|(_, arbiter)| arbiter.stamp != stamp)
            .map(|(key, _)| *key)
            .collect();

        for key in stale {
            let Some(arbiter) = self.arbiters.get_mut(&key) else {
                continue;
            };
            arbiter.active = false;

            let (ha, hb) = arbiter.get_bodies();
            let idle = |handle: BodyHandle| {
                woken.contains(&handle) || self.bodies.get(handle).map_or(true, |body| !body.is_active())
            };

            if idle(ha) && idle(hb) {
                if arbiter.get_state() != ArbiterState::Ignore {
                    arbiter.set_state(ArbiterState::Cached);
                }
                continue;
            }

            if let Some(mut arbiter) = self.arbiters.remove(&key) {
                self.separate(&mut arbiter);
            }
        }
    }

    /// Runs the velocity solver and integrates the bodies
    fn solve(&mut self, dt: f32) {
        let solver = ContactSolver::new(SolverParams {
            dt,
            slop: self.config.collision_slop,
            bias_coef: self.config.bias_coef(dt),
            restitution_threshold: self.config.restitution_velocity_threshold,
        });
        let bias_coef = self.config.bias_coef(dt);
        let dt_coef = if self.prev_dt > 0.0 { dt / self.prev_dt } else { 0.0 };

        let bodies = &mut self.bodies;
        let mut arbiters: Vec<&mut Arbiter> =
            self.arbiters.values_mut().filter(|arbiter| arbiter.active).collect();
        let mut constraints: Vec<&mut Constraint> = self
            .constraints
            .iter_mut()
            .map(|(_, constraint)| constraint)
            .filter(|constraint| {
                let (a, b) = constraint.get_bodies();
                let active = |handle| bodies.get(handle).map_or(false, Body::is_active);
                active(a) || active(b)
            })
            .collect();

        solver.pre_step(&mut arbiters, bodies);
        for constraint in constraints.iter_mut() {
            let (ha, hb) = constraint.get_bodies();
            if let Some((a, b)) = bodies.get2_mut(ha, hb) {
                constraint.pre_step(a, b, dt, bias_coef);
            }
        }

        let gravity = self.config.gravity;
        let (linear_damping, angular_damping) = (self.config.linear_damping, self.config.angular_damping);
        for (_, body) in bodies.iter_mut() {
            self.integrator
                .integrate_velocity(body, gravity, linear_damping, angular_damping, dt);
        }

        solver.warm_start(&mut arbiters, bodies, dt_coef);
        for constraint in constraints.iter_mut() {
            let (ha, hb) = constraint.get_bodies();
            if let Some((a, b)) = bodies.get2_mut(ha, hb) {
                constraint.apply_cached_impulse(a, b, dt_coef);
            }
        }

        for _ in 0..self.config.iterations {
            solver.solve(&mut arbiters, bodies);
            for constraint in constraints.iter_mut() {
                let (ha, hb) = constraint.get_bodies();
                if let Some((a, b)) = bodies.get2_mut(ha, hb) {
                    constraint.apply_impulse(a, b);
                }
            }
        }

        for (handle, body) in bodies.iter_mut() {
            self.integrator.integrate_position(body, dt);
            if body.sanitize() {
                warn!(?handle, "body state became non-finite; restored its last valid pose");
            }
        }
    }

    fn run_post_solve(&mut self) {
        let stamp = self.stamp;
        for arbiter in self.arbiters.values_mut() {
            if arbiter.stamp != stamp {
                continue;
            }

            if arbiter.active {
                let handler =
                    Self::handler_for(&mut self.handlers, &mut self.default_handler, arbiter.handler);
                handler.post_solve(arbiter, &mut self.commands);
            }

            if arbiter.get_state() == ArbiterState::FirstCollision {
                arbiter.set_state(ArbiterState::Normal);
            }
        }
    }

    /// Builds islands of awake dynamic bodies linked by contacts and constraints.
    ///
    /// With `current_only`, only contacts solved this step link bodies.
    fn awake_dynamic_islands(&self, current_only: bool) -> IslandBuilder {
        let mut builder = IslandBuilder::new();
        for (handle, body) in self.bodies.iter() {
            if body.is_dynamic() && !body.is_sleeping() {
                builder.add_body(handle);
            }
        }

        for arbiter in self.arbiters.values() {
            let linked = if current_only {
                arbiter.stamp == self.stamp && arbiter.active
            } else {
                !arbiter.is_sensor() && arbiter.get_state() != ArbiterState::Ignore
            };
            if linked {
                let (a, b) = arbiter.get_bodies();
                builder.add_connection(a, b);
            }
        }

        for (_, constraint) in self.constraints.iter() {
            let (a, b) = constraint.get_bodies();
            builder.add_connection(a, b);
        }

        builder
    }

    fn sleep_island(&mut self, island: &[BodyHandle]) {
        let group = self.next_sleep_group;
        self.next_sleep_group = self.next_sleep_group.wrapping_add(1);

        for &handle in island {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.set_sleeping(Some(group));
            }
            self.events.add_body_event(BodyEventType::Sleep, handle);
        }
        debug!(group, count = island.len(), "island fell asleep");
    }

    /// Accumulates idle time and puts idle islands to sleep
    fn update_sleeping(&mut self, dt: f32) {
        let linear_threshold = self.config.linear_sleep_threshold;
        let angular_threshold = self.config.angular_sleep_threshold;

        // Bodies pushed around by moving kinematic bodies never count as idle
        let mut disturbed = BTreeSet::new();
        let mut note_kinematic = |a: BodyHandle, b: BodyHandle, bodies: &Storage<Body, BodyHandle>| {
            if bodies.get(a).map_or(false, is_moving_kinematic) {
                disturbed.insert(b);
            }
            if bodies.get(b).map_or(false, is_moving_kinematic) {
                disturbed.insert(a);
            }
        };
        for arbiter in self.arbiters.values() {
            if arbiter.stamp == self.stamp && arbiter.active {
                let (a, b) = arbiter.get_bodies();
                note_kinematic(a, b, &self.bodies);
            }
        }
        for (_, constraint) in self.constraints.iter() {
            let (a, b) = constraint.get_bodies();
            note_kinematic(a, b, &self.bodies);
        }

        for (handle, body) in self.bodies.iter_mut() {
            if !body.is_dynamic() || body.is_sleeping() {
                continue;
            }

            let moving = body.get_velocity().length() > linear_threshold
                || body.get_angular_velocity().abs() > angular_threshold;
            if moving || disturbed.contains(&handle) {
                body.idle_time = 0.0;
            } else {
                body.idle_time += dt;
            }
        }

        let threshold = self.config.sleep_time_threshold;
        for island in self.awake_dynamic_islands(true).build() {
            let idle = island.iter().all(|handle| {
                self.bodies.get(*handle).map_or(false, |body| body.idle_time >= threshold)
            });
            if idle {
                self.sleep_island(&island);
            }
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if contact with this body wakes a sleeping body
fn wakes_others(body: &Body) -> bool {
    match body.get_body_type() {
        BodyType::Dynamic => !body.is_sleeping(),
        BodyType::Kinematic => is_moving_kinematic(body),
        BodyType::Static => false,
    }
}

fn is_moving_kinematic(body: &Body) -> bool {
    body.get_body_type() == BodyType::Kinematic
        && (!body.get_velocity().is_zero() || body.get_angular_velocity() != 0.0)
}
