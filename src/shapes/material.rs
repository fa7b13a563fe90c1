use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Surface properties of a shape.
///
/// When two shapes touch, the contact uses the product of their friction
/// and elasticity values and the difference of their surface velocities.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Material {
    /// Coefficient of friction, usually 0-1
    pub friction: f32,

    /// Coefficient of restitution (bounciness), 0-1
    pub elasticity: f32,

    /// Velocity of the surface itself, as used for conveyor belts
    pub surface_velocity: Vector2,
}

impl Material {
    /// Creates a new material with the specified properties
    pub fn new(friction: f32, elasticity: f32) -> Self {
        Self {
            friction,
            elasticity,
            surface_velocity: Vector2::zero(),
        }
    }

    /// Builder-style surface velocity setter
    pub fn with_surface_velocity(mut self, surface_velocity: Vector2) -> Self {
        self.surface_velocity = surface_velocity;
        self
    }

    /// Creates a material for ice (low friction, some bounce)
    pub fn ice() -> Self {
        Self::new(0.05, 0.4)
    }

    /// Creates a material for rubber (high friction, bouncy)
    pub fn rubber() -> Self {
        Self::new(0.9, 0.7)
    }

    /// Creates a material for wood (medium friction, low restitution)
    pub fn wood() -> Self {
        Self::new(0.6, 0.2)
    }

    /// Creates a material for metal
    pub fn metal() -> Self {
        Self::new(0.4, 0.5)
    }

    /// Creates a perfectly elastic, frictionless material
    pub fn frictionless_elastic() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.7, 0.0)
    }
}
