use std::fmt;

use crate::collision::Arbiter;
use crate::core::CommandQueue;

/// User-defined shape type used to select collision handlers
pub type CollisionType = u32;

/// Callback deciding whether a pair should be processed; returning `false` vetoes it
pub type FilterCallback = Box<dyn FnMut(&mut Arbiter, &mut CommandQueue) -> bool>;

/// Callback notified about a pair
pub type NotifyCallback = Box<dyn FnMut(&mut Arbiter, &mut CommandQueue)>;

/// Set of callbacks invoked for pairs of collision types.
///
/// Structural changes to the space must go through the [`CommandQueue`];
/// they are applied once the step completes.
#[derive(Default)]
pub struct CollisionHandler {
    begin: Option<FilterCallback>,
    pre_solve: Option<FilterCallback>,
    post_solve: Option<NotifyCallback>,
    separate: Option<NotifyCallback>,
}

impl CollisionHandler {
    /// Creates a handler that accepts every pair and does nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Called the first step two shapes touch. Returning `false` ignores the
    /// pair until it separates.
    pub fn on_begin<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&mut Arbiter, &mut CommandQueue) -> bool + 'static,
    {
        self.begin = Some(Box::new(callback));
        self
    }

    /// Called every step before solving. Returning `false` skips solving the
    /// pair for this step only.
    pub fn on_pre_solve<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&mut Arbiter, &mut CommandQueue) -> bool + 'static,
    {
        self.pre_solve = Some(Box::new(callback));
        self
    }

    /// Called every step after solving, with the impulses available
    pub fn on_post_solve<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&mut Arbiter, &mut CommandQueue) + 'static,
    {
        self.post_solve = Some(Box::new(callback));
        self
    }

    /// Called when the shapes stop touching, or one of them is removed
    pub fn on_separate<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&mut Arbiter, &mut CommandQueue) + 'static,
    {
        self.separate = Some(Box::new(callback));
        self
    }

    pub(crate) fn begin(&mut self, arbiter: &mut Arbiter, queue: &mut CommandQueue) -> bool {
        self.begin.as_mut().map_or(true, |callback| callback(arbiter, queue))
    }

    pub(crate) fn pre_solve(&mut self, arbiter: &mut Arbiter, queue: &mut CommandQueue) -> bool {
        self.pre_solve.as_mut().map_or(true, |callback| callback(arbiter, queue))
    }

    pub(crate) fn post_solve(&mut self, arbiter: &mut Arbiter, queue: &mut CommandQueue) {
        if let Some(callback) = self.post_solve.as_mut() {
            callback(arbiter, queue);
        }
    }

    pub(crate) fn separate(&mut self, arbiter: &mut Arbiter, queue: &mut CommandQueue) {
        if let Some(callback) = self.separate.as_mut() {
            callback(arbiter, queue);
        }
    }
}

impl fmt::Debug for CollisionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionHandler")
            .field("begin", &self.begin.is_some())
            .field("pre_solve", &self.pre_solve.is_some())
            .field("post_solve", &self.post_solve.is_some())
            .field("separate", &self.separate.is_some())
            .finish()
    }
}
