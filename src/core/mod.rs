mod space;
pub mod config;
pub mod storage;
pub mod events;
mod island;
mod commands;
mod query;

pub use self::space::Space;
pub use self::config::SpaceConfig;
pub use self::storage::{Handle, Storage};
pub use self::events::{BodyEvent, BodyEventType, CollisionEvent, CollisionEventType, EventQueue};
pub use self::commands::CommandQueue;
pub use self::query::{PointQueryResult, SegmentQueryResult, ShapeQueryResult};

pub(crate) use self::island::IslandBuilder;

/// A unique identifier for a body in a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl Handle for BodyHandle {
    fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

/// A unique identifier for a shape in a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeHandle {
    index: u32,
    generation: u32,
}

impl Handle for ShapeHandle {
    fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

/// A unique identifier for a constraint in a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintHandle {
    index: u32,
    generation: u32,
}

impl Handle for ConstraintHandle {
    fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}
