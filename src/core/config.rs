use crate::collision::BroadPhaseKind;
use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Configuration parameters for a space
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SpaceConfig {
    /// Gravity applied to every dynamic body
    pub gravity: Vector2,

    /// The number of solver iterations per step
    pub iterations: u32,

    /// Fraction of positional error left uncorrected after one second
    pub error_bias: f32,

    /// Penetration allowed before positional correction kicks in
    pub collision_slop: f32,

    /// Distance at which shapes are considered touching
    pub contact_tolerance: f32,

    /// Approach speeds below this do not bounce
    pub restitution_velocity_threshold: f32,

    /// Space-wide linear damping (per second)
    pub linear_damping: f32,

    /// Space-wide angular damping (per second)
    pub angular_damping: f32,

    /// Whether to allow sleeping bodies
    pub allow_sleeping: bool,

    /// The linear speed below which bodies count as idle
    pub linear_sleep_threshold: f32,

    /// The angular speed below which bodies count as idle
    pub angular_sleep_threshold: f32,

    /// The time a group must be idle before sleeping
    pub sleep_time_threshold: f32,

    /// The spatial index used for broad-phase collision detection
    pub broad_phase: BroadPhaseKind,

    /// Cell size of the spatial hash
    pub cell_size: f32,

    /// Seed for the space's random number generator
    pub seed: u64,
}

impl SpaceConfig {
    /// Returns the fraction of error corrected by a step of length `dt`
    pub fn bias_coef(&self, dt: f32) -> f32 {
        1.0 - self.error_bias.powf(dt)
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            gravity: Vector2::new(0.0, -9.81),
            iterations: 10,
            error_bias: (1.0f32 - 0.1).powf(60.0),
            collision_slop: 0.005,
            contact_tolerance: 0.001,
            restitution_velocity_threshold: 0.5,
            linear_damping: 0.0,
            angular_damping: 0.0,
            allow_sleeping: true,
            linear_sleep_threshold: 0.01,
            angular_sleep_threshold: 0.01,
            sleep_time_threshold: 1.0,
            broad_phase: BroadPhaseKind::SpatialHash,
            cell_size: 2.0,
            seed: 0x5eed,
        }
    }
}
