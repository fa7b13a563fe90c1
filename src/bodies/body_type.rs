#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Type of body, determining how it behaves in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BodyType {
    /// Dynamic bodies are fully simulated (affected by forces, collisions, etc.)
    Dynamic,

    /// Kinematic bodies are moved by their velocity only and push dynamic bodies
    Kinematic,

    /// Static bodies never move and are only collided against
    Static,
}

impl Default for BodyType {
    fn default() -> Self {
        Self::Dynamic
    }
}
