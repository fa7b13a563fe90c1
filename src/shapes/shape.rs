use crate::collision::{CollisionType, ShapeFilter};
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::math::{BoundingBox, Transform, Vector2};
use crate::shapes::{mass, Circle, Material, Polygon, Segment};
use crate::Result;

/// Result of a nearest-point query against a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQueryInfo {
    /// The closest point on the shape's surface
    pub point: Vector2,

    /// Distance to the surface, negative if the point is inside
    pub distance: f32,

    /// Direction of increasing distance
    pub gradient: Vector2,
}

/// Result of a segment (ray) query against a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentQueryInfo {
    /// The point of impact
    pub point: Vector2,

    /// The surface normal at the point of impact
    pub normal: Vector2,

    /// Fraction along the query segment where the impact happens
    pub alpha: f32,
}

/// The geometry of a shape
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Circle(Circle),
    Segment(Segment),
    Polygon(Polygon),
}

impl ShapeKind {
    /// Returns the rounding radius of the geometry
    pub fn radius(&self) -> f32 {
        match self {
            ShapeKind::Circle(circle) => circle.get_radius(),
            ShapeKind::Segment(segment) => segment.get_radius(),
            ShapeKind::Polygon(polygon) => polygon.get_radius(),
        }
    }

    /// Returns the type name of the shape
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Circle(_) => "circle",
            ShapeKind::Segment(_) => "segment",
            ShapeKind::Polygon(_) => "polygon",
        }
    }

    /// Index used by the collision dispatch table
    #[inline]
    pub(crate) fn index(&self) -> usize {
        match self {
            ShapeKind::Circle(_) => 0,
            ShapeKind::Segment(_) => 1,
            ShapeKind::Polygon(_) => 2,
        }
    }
}

/// A collision shape attached to a body
#[derive(Debug, Clone)]
pub struct Shape {
    /// The body this shape is attached to
    body: BodyHandle,

    /// The shape's geometry
    kind: ShapeKind,

    /// Surface properties
    material: Material,

    /// Collision filter
    filter: ShapeFilter,

    /// Sensors report collisions but never produce a collision response
    sensor: bool,

    /// User-defined type used to select collision handlers
    collision_type: CollisionType,

    /// World-space bounding box as of the last update
    bb: BoundingBox,
}

impl Shape {
    fn from_kind(body: BodyHandle, kind: ShapeKind) -> Self {
        let mut shape = Self {
            body,
            kind,
            material: Material::default(),
            filter: ShapeFilter::ALL,
            sensor: false,
            collision_type: 0,
            bb: BoundingBox::new(0.0, 0.0, 0.0, 0.0),
        };
        shape.update(&Transform::identity());
        shape
    }

    /// Creates a circle shape
    pub fn circle(body: BodyHandle, radius: f32, offset: Vector2) -> Result<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "circle radius must be positive and finite, got {radius}"
            )));
        }
        if !offset.is_finite() {
            return Err(PhysicsError::InvalidParameter("circle offset must be finite".to_string()));
        }
        Ok(Self::from_kind(body, ShapeKind::Circle(Circle::new(radius, offset))))
    }

    /// Creates a segment shape between two body-space points
    pub fn segment(body: BodyHandle, a: Vector2, b: Vector2, radius: f32) -> Result<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(PhysicsError::InvalidParameter("segment endpoints must be finite".to_string()));
        }
        if a.near(&b, crate::math::EPSILON) {
            return Err(PhysicsError::DegenerateGeometry(
                "segment endpoints must be distinct".to_string(),
            ));
        }
        if !(radius >= 0.0) || !radius.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "segment radius must be finite and non-negative, got {radius}"
            )));
        }
        Ok(Self::from_kind(body, ShapeKind::Segment(Segment::new(a, b, radius))))
    }

    /// Creates a convex polygon shape from the convex hull of `points`
    pub fn polygon(body: BodyHandle, points: &[Vector2], radius: f32) -> Result<Self> {
        Ok(Self::from_kind(body, ShapeKind::Polygon(Polygon::new(points, radius)?)))
    }

    /// Creates a convex polygon shape, transforming the points first
    pub fn polygon_with_transform(
        body: BodyHandle,
        points: &[Vector2],
        transform: &Transform,
        radius: f32,
    ) -> Result<Self> {
        Ok(Self::from_kind(
            body,
            ShapeKind::Polygon(Polygon::with_transform(points, transform, radius)?),
        ))
    }

    /// Creates a box shape centred on the body
    pub fn box_shape(body: BodyHandle, width: f32, height: f32, radius: f32) -> Result<Self> {
        Ok(Self::from_kind(body, ShapeKind::Polygon(Polygon::new_box(width, height, radius)?)))
    }

    /// Creates a box shape covering a body-space bounding box
    pub fn box_with_bb(body: BodyHandle, bb: BoundingBox, radius: f32) -> Result<Self> {
        Ok(Self::from_kind(body, ShapeKind::Polygon(Polygon::new_box_from_bb(bb, radius)?)))
    }

    /// Builder-style material setter
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Builder-style friction setter
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.material.friction = friction;
        self
    }

    /// Builder-style elasticity setter
    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.material.elasticity = elasticity;
        self
    }

    /// Builder-style surface velocity setter
    pub fn with_surface_velocity(mut self, surface_velocity: Vector2) -> Self {
        self.material.surface_velocity = surface_velocity;
        self
    }

    /// Builder-style filter setter
    pub fn with_filter(mut self, filter: ShapeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builder-style sensor flag setter
    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    /// Builder-style collision type setter
    pub fn with_collision_type(mut self, collision_type: CollisionType) -> Self {
        self.collision_type = collision_type;
        self
    }

    /// Returns the body this shape is attached to
    pub fn get_body(&self) -> BodyHandle {
        self.body
    }

    /// Returns the shape's geometry
    pub fn get_kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Returns the world-space bounding box as of the last update
    pub fn get_bb(&self) -> BoundingBox {
        self.bb
    }

    /// Returns the shape's material
    pub fn get_material(&self) -> &Material {
        &self.material
    }

    /// Sets the shape's material
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// Returns the friction coefficient
    pub fn get_friction(&self) -> f32 {
        self.material.friction
    }

    /// Sets the friction coefficient
    pub fn set_friction(&mut self, friction: f32) {
        debug_assert!(friction >= 0.0, "friction must be non-negative");
        self.material.friction = friction;
    }

    /// Returns the elasticity
    pub fn get_elasticity(&self) -> f32 {
        self.material.elasticity
    }

    /// Sets the elasticity
    pub fn set_elasticity(&mut self, elasticity: f32) {
        debug_assert!(elasticity >= 0.0, "elasticity must be non-negative");
        self.material.elasticity = elasticity;
    }

    /// Returns the surface velocity
    pub fn get_surface_velocity(&self) -> Vector2 {
        self.material.surface_velocity
    }

    /// Sets the surface velocity
    pub fn set_surface_velocity(&mut self, surface_velocity: Vector2) {
        self.material.surface_velocity = surface_velocity;
    }

    /// Returns the collision filter
    pub fn get_filter(&self) -> ShapeFilter {
        self.filter
    }

    /// Sets the collision filter
    pub fn set_filter(&mut self, filter: ShapeFilter) {
        self.filter = filter;
    }

    /// Returns whether the shape is a sensor
    pub fn is_sensor(&self) -> bool {
        self.sensor
    }

    /// Sets whether the shape is a sensor
    pub fn set_sensor(&mut self, sensor: bool) {
        self.sensor = sensor;
    }

    /// Returns the collision type
    pub fn get_collision_type(&self) -> CollisionType {
        self.collision_type
    }

    /// Sets the collision type
    pub fn set_collision_type(&mut self, collision_type: CollisionType) {
        self.collision_type = collision_type;
    }

    /// Recomputes world-space geometry and the bounding box for a body transform
    pub fn update(&mut self, transform: &Transform) -> BoundingBox {
        self.bb = match &mut self.kind {
            ShapeKind::Circle(circle) => circle.update(transform),
            ShapeKind::Segment(segment) => segment.update(transform),
            ShapeKind::Polygon(polygon) => polygon.update(transform),
        };
        self.bb
    }

    /// Finds the closest point on the shape to `point`
    pub fn point_query(&self, point: Vector2) -> PointQueryInfo {
        match &self.kind {
            ShapeKind::Circle(circle) => circle.point_query(point),
            ShapeKind::Segment(segment) => segment.point_query(point),
            ShapeKind::Polygon(polygon) => polygon.point_query(point),
        }
    }

    /// Sweeps a circle of `radius` from `a` to `b` and reports the first impact
    pub fn segment_query(&self, a: Vector2, b: Vector2, radius: f32) -> Option<SegmentQueryInfo> {
        match &self.kind {
            ShapeKind::Circle(circle) => circle.segment_query(a, b, radius),
            ShapeKind::Segment(segment) => segment.segment_query(a, b, radius),
            ShapeKind::Polygon(polygon) => polygon.segment_query(a, b, radius),
        }
    }

    /// Returns the area of the shape's geometry
    pub fn area(&self) -> f32 {
        match &self.kind {
            ShapeKind::Circle(circle) => mass::area_for_circle(0.0, circle.get_radius()),
            ShapeKind::Segment(segment) => {
                let (a, b) = segment.get_endpoints();
                mass::area_for_segment(a, b, segment.get_radius())
            }
            ShapeKind::Polygon(polygon) => {
                mass::area_for_polygon(polygon.get_vertices(), polygon.get_radius())
            }
        }
    }

    /// Returns the moment of inertia this shape contributes for the given mass
    pub fn moment_for_mass(&self, mass_value: f32) -> f32 {
        match &self.kind {
            ShapeKind::Circle(circle) => {
                mass::moment_for_circle(mass_value, 0.0, circle.get_radius(), circle.get_offset())
            }
            ShapeKind::Segment(segment) => {
                let (a, b) = segment.get_endpoints();
                mass::moment_for_segment(mass_value, a, b, segment.get_radius())
            }
            ShapeKind::Polygon(polygon) => mass::moment_for_polygon(
                mass_value,
                polygon.get_vertices(),
                Vector2::zero(),
                polygon.get_radius(),
            ),
        }
    }
}
