mod constraint;
mod joint;
mod pin;
mod slide;
mod pivot;
mod groove;
mod damped_spring;
mod damped_rotary_spring;
mod rotary_limit;
mod ratchet;
mod gear;
mod simple_motor;

pub use self::constraint::{Constraint, ConstraintKind};
pub use self::joint::{Joint, JointParams};
pub use self::pin::PinJoint;
pub use self::slide::SlideJoint;
pub use self::pivot::PivotJoint;
pub use self::groove::GrooveJoint;
pub use self::damped_spring::DampedSpring;
pub use self::damped_rotary_spring::DampedRotarySpring;
pub use self::rotary_limit::RotaryLimitJoint;
pub use self::ratchet::RatchetJoint;
pub use self::gear::GearJoint;
pub use self::simple_motor::SimpleMotor;
