use std::collections::VecDeque;
use std::fmt;

use crate::bodies::Body;
use crate::constraints::Constraint;
use crate::core::{BodyHandle, ConstraintHandle, ShapeHandle, Space};
use crate::shapes::Shape;

/// A structural change requested while the space is stepping
pub(crate) enum Command {
    AddBody(Body),
    RemoveBody(BodyHandle),
    RemoveBodyCascade(BodyHandle),
    RemoveShape(ShapeHandle),
    RemoveConstraint(ConstraintHandle),
    AddShape(Shape),
    AddConstraint(Constraint),
    Wake(BodyHandle),
    PostStep(Box<dyn FnOnce(&mut Space)>),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::AddBody(body) => f.debug_tuple("AddBody").field(body).finish(),
            Command::RemoveBody(handle) => f.debug_tuple("RemoveBody").field(handle).finish(),
            Command::RemoveBodyCascade(handle) => {
                f.debug_tuple("RemoveBodyCascade").field(handle).finish()
            }
            Command::RemoveShape(handle) => f.debug_tuple("RemoveShape").field(handle).finish(),
            Command::RemoveConstraint(handle) => {
                f.debug_tuple("RemoveConstraint").field(handle).finish()
            }
            Command::AddShape(shape) => f.debug_tuple("AddShape").field(shape).finish(),
            Command::AddConstraint(constraint) => {
                f.debug_tuple("AddConstraint").field(constraint).finish()
            }
            Command::Wake(handle) => f.debug_tuple("Wake").field(handle).finish(),
            Command::PostStep(_) => f.write_str("PostStep"),
        }
    }
}

/// Structural changes requested from collision callbacks.
///
/// Commands are applied in the order they were queued, right after the step
/// that queued them. Failures (for example removing a body twice) are logged
/// and skipped.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: VecDeque<Command>,
}

impl CommandQueue {
    /// Creates a new empty command queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a body and its shapes after the step
    pub fn remove_body(&mut self, body: BodyHandle) {
        self.commands.push_back(Command::RemoveBody(body));
    }

    /// Removes a body, its shapes and its constraints after the step
    pub fn remove_body_cascade(&mut self, body: BodyHandle) {
        self.commands.push_back(Command::RemoveBodyCascade(body));
    }

    /// Removes a shape after the step
    pub fn remove_shape(&mut self, shape: ShapeHandle) {
        self.commands.push_back(Command::RemoveShape(shape));
    }

    /// Removes a constraint after the step
    pub fn remove_constraint(&mut self, constraint: ConstraintHandle) {
        self.commands.push_back(Command::RemoveConstraint(constraint));
    }

    /// Adds a body after the step.
    ///
    /// The new handle is not known when queuing; use `post_step` when the
    /// caller needs it to attach shapes.
    pub fn add_body(&mut self, body: Body) {
        self.commands.push_back(Command::AddBody(body));
    }

    /// Adds a shape after the step
    pub fn add_shape(&mut self, shape: Shape) {
        self.commands.push_back(Command::AddShape(shape));
    }

    /// Adds a constraint after the step
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.commands.push_back(Command::AddConstraint(constraint));
    }

    /// Wakes a body and its sleeping group after the step
    pub fn wake(&mut self, body: BodyHandle) {
        self.commands.push_back(Command::Wake(body));
    }

    /// Runs a closure with full access to the space after the step
    pub fn post_step<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Space) + 'static,
    {
        self.commands.push_back(Command::PostStep(Box::new(callback)));
    }

    /// Returns the number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub(crate) fn clear(&mut self) {
        self.commands.clear();
    }
}
