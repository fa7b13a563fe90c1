mod collision_pair;
mod collision_filter;
mod collision_handler;
mod broad_phase;
mod narrow_phase;
mod arbiter;
mod contact_solver;

pub use self::collision_pair::PairKey;
pub use self::collision_filter::{Categories, Group, ShapeFilter};
pub use self::collision_handler::{CollisionHandler, CollisionType, FilterCallback, NotifyCallback};
pub use self::broad_phase::{new_spatial_index, BroadPhaseKind, BruteForceIndex, SpatialHash, SpatialIndex};
pub use self::narrow_phase::{ContactPoint, ContactSet, NarrowPhase};
pub use self::arbiter::{Arbiter, ArbiterState, Contact, SolverParams};
pub use self::contact_solver::ContactSolver;

pub(crate) use self::arbiter::{apply_impulses, inverse_or_zero, k_scalar, relative_velocity};
