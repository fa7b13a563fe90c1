use bitflags::bitflags;

use crate::core::Space;
use crate::math::{BoundingBox, Vector2};
use crate::shapes::ShapeKind;

/// An RGBA colour with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Shapes on static bodies
    pub const STATIC: Color = Color::new(0.5, 0.5, 0.5, 1.0);

    /// Shapes on sleeping bodies
    pub const SLEEPING: Color = Color::new(0.35, 0.35, 0.8, 1.0);

    /// Sensor shapes
    pub const SENSOR: Color = Color::new(1.0, 1.0, 1.0, 0.25);

    /// Shapes on awake bodies
    pub const AWAKE: Color = Color::new(0.9, 0.75, 0.2, 1.0);

    pub const CONSTRAINT: Color = Color::new(0.5, 1.0, 0.5, 1.0);
    pub const CONTACT: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const BOUNDING_BOX: Color = Color::new(0.3, 0.5, 0.3, 1.0);

    /// Creates a new colour
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

bitflags! {
    /// Selects what [`Space::debug_draw`] renders
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    pub struct DebugDrawOptions: u32 {
        const SHAPES           = 0b0001;
        const CONSTRAINTS      = 0b0010;
        const BOUNDING_BOXES   = 0b0100;
        const COLLISION_POINTS = 0b1000;
    }
}

impl Default for DebugDrawOptions {
    fn default() -> Self {
        Self::SHAPES | Self::CONSTRAINTS | Self::COLLISION_POINTS
    }
}

/// Receiver of debug geometry, all in world coordinates
pub trait DebugDraw {
    /// Draws a circle; `angle` orients a radius line showing rotation
    fn draw_circle(&mut self, center: Vector2, angle: f32, radius: f32, color: Color);

    fn draw_segment(&mut self, a: Vector2, b: Vector2, color: Color);

    /// Draws a segment with rounded caps of the given radius
    fn draw_fat_segment(&mut self, a: Vector2, b: Vector2, radius: f32, color: Color);

    /// Draws a convex polygon given in counter-clockwise order
    fn draw_polygon(&mut self, vertices: &[Vector2], radius: f32, color: Color);

    fn draw_bounding_box(&mut self, bb: BoundingBox, color: Color) {
        let corners = [
            Vector2::new(bb.left, bb.bottom),
            Vector2::new(bb.right, bb.bottom),
            Vector2::new(bb.right, bb.top),
            Vector2::new(bb.left, bb.top),
        ];
        for i in 0..corners.len() {
            self.draw_segment(corners[i], corners[(i + 1) % corners.len()], color);
        }
    }

    /// Draws a constraint between two world-space anchor points
    fn draw_constraint(&mut self, a: Vector2, b: Vector2, color: Color) {
        self.draw_segment(a, b, color);
    }

    /// Draws a contact point with its normal
    fn draw_contact(&mut self, point: Vector2, normal: Vector2, color: Color);
}

impl Space {
    /// Renders the space through `drawer`
    pub fn debug_draw(&self, drawer: &mut dyn DebugDraw, options: DebugDrawOptions) {
        if options.contains(DebugDrawOptions::SHAPES) {
            for (_, shape) in self.shapes() {
                let Ok(body) = self.body(shape.get_body()) else {
                    continue;
                };

                let color = if shape.is_sensor() {
                    Color::SENSOR
                } else if body.is_static() {
                    Color::STATIC
                } else if body.is_sleeping() {
                    Color::SLEEPING
                } else {
                    Color::AWAKE
                };

                match shape.get_kind() {
                    ShapeKind::Circle(circle) => {
                        drawer.draw_circle(circle.get_center(), body.get_angle(), circle.get_radius(), color)
                    }
                    ShapeKind::Segment(segment) => {
                        let (a, b) = segment.get_world_endpoints();
                        drawer.draw_fat_segment(a, b, segment.get_radius(), color);
                    }
                    ShapeKind::Polygon(polygon) => {
                        drawer.draw_polygon(polygon.get_world_vertices(), polygon.get_radius(), color)
                    }
                }
            }
        }

        if options.contains(DebugDrawOptions::BOUNDING_BOXES) {
            for (_, shape) in self.shapes() {
                drawer.draw_bounding_box(shape.get_bb(), Color::BOUNDING_BOX);
            }
        }

        if options.contains(DebugDrawOptions::CONSTRAINTS) {
            for (_, constraint) in self.constraints() {
                let (ha, hb) = constraint.get_bodies();
                let (Ok(a), Ok(b)) = (self.body(ha), self.body(hb)) else {
                    continue;
                };

                let (anchor_a, anchor_b) = constraint
                    .get_anchors()
                    .map(|(anchor_a, anchor_b)| (a.local_to_world(anchor_a), b.local_to_world(anchor_b)))
                    .unwrap_or((a.get_position(), b.get_position()));
                drawer.draw_constraint(anchor_a, anchor_b, Color::CONSTRAINT);
            }
        }

        if options.contains(DebugDrawOptions::COLLISION_POINTS) {
            for arbiter in self.arbiters() {
                let normal = arbiter.get_normal();
                for contact in arbiter.get_contacts() {
                    drawer.draw_contact(contact.position, normal, Color::CONTACT);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Body;
    use crate::shapes::Shape;

    #[derive(Default)]
    struct Recorder {
        circles: Vec<Color>,
        polygons: usize,
        segments: usize,
        constraints: usize,
        contacts: usize,
    }

    impl DebugDraw for Recorder {
        fn draw_circle(&mut self, _center: Vector2, _angle: f32, _radius: f32, color: Color) {
            self.circles.push(color);
        }

        fn draw_segment(&mut self, _a: Vector2, _b: Vector2, _color: Color) {
            self.segments += 1;
        }

        fn draw_fat_segment(&mut self, _a: Vector2, _b: Vector2, _radius: f32, _color: Color) {
            self.segments += 1;
        }

        fn draw_polygon(&mut self, _vertices: &[Vector2], _radius: f32, _color: Color) {
            self.polygons += 1;
        }

        fn draw_constraint(&mut self, _a: Vector2, _b: Vector2, _color: Color) {
            self.constraints += 1;
        }

        fn draw_contact(&mut self, _point: Vector2, _normal: Vector2, _color: Color) {
            self.contacts += 1;
        }
    }

    #[test]
    fn shapes_are_coloured_by_body_state() {
        let mut space = Space::new();
        let ground = space.static_body();
        space.add_shape(Shape::circle(ground, 1.0, Vector2::zero()).unwrap()).unwrap();

        let body = space.add_body(Body::new_dynamic(1.0, 1.0)).unwrap();
        space.add_shape(Shape::circle(body, 1.0, Vector2::zero()).unwrap().with_sensor(true)).unwrap();
        space.add_shape(Shape::box_shape(body, 1.0, 1.0, 0.0).unwrap()).unwrap();

        let mut recorder = Recorder::default();
        space.debug_draw(&mut recorder, DebugDrawOptions::SHAPES);

        assert_eq!(recorder.circles, vec![Color::STATIC, Color::SENSOR]);
        assert_eq!(recorder.polygons, 1);
        assert_eq!(recorder.contacts, 0);
    }

    #[test]
    fn bounding_boxes_draw_four_edges() {
        let mut space = Space::new();
        let ground = space.static_body();
        space
            .add_shape(Shape::segment(ground, Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0), 0.0).unwrap())
            .unwrap();

        let mut recorder = Recorder::default();
        space.debug_draw(&mut recorder, DebugDrawOptions::BOUNDING_BOXES);

        assert_eq!(recorder.segments, 4);
    }
}
