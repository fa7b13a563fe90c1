use crate::bodies::Body;
use crate::collision::arbiter::{Arbiter, SolverParams};
use crate::core::{BodyHandle, Storage};

/// Sequential-impulse contact solver with split-impulse position correction
#[derive(Debug, Clone, Copy)]
pub struct ContactSolver {
    params: SolverParams,
}

impl ContactSolver {
    /// Creates a new solver for one step
    pub fn new(params: SolverParams) -> Self {
        Self { params }
    }

    /// Returns the step parameters
    pub fn get_params(&self) -> &SolverParams {
        &self.params
    }

    /// Prepares every arbiter for solving
    pub fn pre_step(&self, arbiters: &mut [&mut Arbiter], bodies: &Storage<Body, BodyHandle>) {
        for arbiter in arbiters.iter_mut() {
            let (ha, hb) = arbiter.get_bodies();
            if let (Some(a), Some(b)) = (bodies.get(ha), bodies.get(hb)) {
                arbiter.pre_step(a, b, &self.params);
            }
        }
    }

    /// Applies the impulses accumulated in the previous step
    pub fn warm_start(
        &self,
        arbiters: &mut [&mut Arbiter],
        bodies: &mut Storage<Body, BodyHandle>,
        dt_coef: f32,
    ) {
        for arbiter in arbiters.iter_mut() {
            let (ha, hb) = arbiter.get_bodies();
            if let Some((a, b)) = bodies.get2_mut(ha, hb) {
                arbiter.apply_cached_impulse(a, b, dt_coef);
            }
        }
    }

    /// Runs one solver iteration
    pub fn solve(&self, arbiters: &mut [&mut Arbiter], bodies: &mut Storage<Body, BodyHandle>) {
        for arbiter in arbiters.iter_mut() {
            let (ha, hb) = arbiter.get_bodies();
            if let Some((a, b)) = bodies.get2_mut(ha, hb) {
                arbiter.apply_impulse(a, b);
            }
        }
    }
}
