mod shape;
mod circle;
mod segment;
mod polygon;
mod material;
pub mod convex_hull;
pub mod mass;

pub use self::shape::{Shape, ShapeKind, PointQueryInfo, SegmentQueryInfo};
pub use self::circle::Circle;
pub use self::segment::Segment;
pub use self::polygon::Polygon;
pub use self::material::Material;
pub use self::convex_hull::convex_hull;
