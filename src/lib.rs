pub mod math;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;
pub mod constraints;
pub mod integration;
pub mod debug_draw;

/// Re-export common types for easier usage
pub use crate::core::{
    Space, SpaceConfig, BodyHandle, ShapeHandle, ConstraintHandle, CommandQueue,
};
pub use crate::bodies::{Body, BodyType};
pub use crate::shapes::{Shape, ShapeKind, Material};
pub use crate::collision::{Arbiter, CollisionHandler, CollisionType, ShapeFilter, Categories};
pub use crate::constraints::Constraint;
pub use crate::debug_draw::{DebugDraw, DebugDrawOptions, Color};
pub use crate::math::{Vector2, Transform, BoundingBox};

/// Error types for the physics engine
pub mod error {
    use crate::core::{BodyHandle, ConstraintHandle, ShapeHandle};
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Degenerate geometry: {0}")]
        DegenerateGeometry(String),

        #[error("Body with handle {0:?} not found")]
        BodyNotFound(BodyHandle),

        #[error("Shape with handle {0:?} not found")]
        ShapeNotFound(ShapeHandle),

        #[error("Constraint with handle {0:?} not found")]
        ConstraintNotFound(ConstraintHandle),

        #[error("The space's static body cannot be removed")]
        StaticBodyRemoval,

        #[error("Body {body:?} is still referenced by {constraints} constraint(s)")]
        StillReferenced {
            /// The body that was asked to be removed
            body: BodyHandle,

            /// How many live constraints still reference it
            constraints: usize,
        },

        #[error("A constraint cannot connect body {0:?} to itself")]
        SameBody(BodyHandle),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
