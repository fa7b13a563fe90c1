mod body;
mod body_type;

pub use self::body::Body;
pub use self::body_type::BodyType;
