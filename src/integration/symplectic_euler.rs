use crate::bodies::Body;
use crate::integration::Integrator;
use crate::math::Vector2;

/// Symplectic Euler integrator (semi-implicit Euler).
///
/// Velocities are updated first and the new velocities move the body, which
/// keeps resting contacts stable. Positional-correction velocities from the
/// solver are consumed during the position update.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymplecticEulerIntegrator;

impl SymplecticEulerIntegrator {
    /// Creates a new Symplectic Euler integrator
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for SymplecticEulerIntegrator {
    fn integrate_velocity(
        &mut self,
        body: &mut Body,
        gravity: Vector2,
        linear_damping: f32,
        angular_damping: f32,
        dt: f32,
    ) {
        body.integrate_velocity(gravity, linear_damping, angular_damping, dt);
    }

    fn integrate_position(&mut self, body: &mut Body, dt: f32) {
        body.integrate_position(dt);
    }

    fn name(&self) -> &str {
        "SymplecticEuler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn free_fall_uses_updated_velocity() {
        let mut integrator = SymplecticEulerIntegrator::new();
        let mut body = Body::new_dynamic(1.0, 1.0);
        let gravity = Vector2::new(0.0, -10.0);

        integrator.integrate_velocity(&mut body, gravity, 0.0, 0.0, 0.1);
        integrator.integrate_position(&mut body, 0.1);

        assert_relative_eq!(body.get_velocity(), Vector2::new(0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(body.get_position(), Vector2::new(0.0, -0.1), epsilon = 1e-6);
    }

    #[test]
    fn static_bodies_do_not_move() {
        let mut integrator = SymplecticEulerIntegrator::new();
        let mut body = Body::new_static().with_position(Vector2::new(1.0, 2.0));

        integrator.integrate_velocity(&mut body, Vector2::new(0.0, -10.0), 0.0, 0.0, 0.1);
        integrator.integrate_position(&mut body, 0.1);

        assert_eq!(body.get_position(), Vector2::new(1.0, 2.0));
    }
}
