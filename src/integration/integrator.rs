use crate::bodies::Body;
use crate::math::Vector2;

/// Trait for numerical integration algorithms
pub trait Integrator: Send + Sync {
    /// Integrates gravity, accumulated forces and damping into the body's velocity
    fn integrate_velocity(
        &mut self,
        body: &mut Body,
        gravity: Vector2,
        linear_damping: f32,
        angular_damping: f32,
        dt: f32,
    );

    /// Integrates the body's velocity into its position and angle
    fn integrate_position(&mut self, body: &mut Body, dt: f32);

    /// Returns the name of the integrator
    fn name(&self) -> &str;
}
