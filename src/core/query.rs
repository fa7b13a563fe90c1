use crate::collision::{ContactSet, NarrowPhase, ShapeFilter};
use crate::core::{ShapeHandle, Space};
use crate::math::{BoundingBox, Transform, Vector2};
use crate::shapes::Shape;

/// A shape found by a point query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQueryResult {
    /// The shape that was found
    pub shape: ShapeHandle,

    /// The closest point on the shape's surface
    pub point: Vector2,

    /// Distance to the surface, negative if the query point is inside
    pub distance: f32,

    /// Direction of increasing distance at the query point
    pub gradient: Vector2,
}

/// A shape hit by a segment query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentQueryResult {
    /// The shape that was hit
    pub shape: ShapeHandle,

    /// The point of impact
    pub point: Vector2,

    /// The surface normal at the point of impact
    pub normal: Vector2,

    /// Fraction along the segment where the impact happens
    pub alpha: f32,
}

/// A shape overlapping the probe of a shape query
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeQueryResult {
    /// The overlapping shape
    pub shape: ShapeHandle,

    /// Contacts between the probe and the shape; the normal points from the probe
    pub contacts: ContactSet,
}

/// Spatial queries.
///
/// Every query collects its hits into an owned, sorted `Vec`. Results do not
/// borrow the space, so they stay usable while the space is mutated, and
/// running the same query again on an unchanged space gives equal results.
impl Space {
    /// Collects the shapes from both indices whose stored bounding box overlaps `bb`
    fn query_candidates(&self, bb: BoundingBox) -> Vec<ShapeHandle> {
        let mut candidates: Vec<ShapeHandle> = self
            .dynamic_index
            .query(bb)
            .chain(self.static_index.query(bb))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    /// Finds every shape within `max_distance` of `point`.
    ///
    /// Shapes containing the point report a negative distance. Results are
    /// ordered by shape handle. Shape geometry is as of the last step or
    /// reindex.
    pub fn point_query(
        &self,
        point: Vector2,
        max_distance: f32,
        filter: ShapeFilter,
    ) -> Vec<PointQueryResult> {
        let bb = BoundingBox::for_circle(point, max_distance.max(0.0));

        self.query_candidates(bb)
            .into_iter()
            .filter_map(|handle| {
                let shape = self.shapes.get(handle)?;
                if filter.reject(&shape.get_filter()) {
                    return None;
                }

                let info = shape.point_query(point);
                (info.distance <= max_distance).then_some(PointQueryResult {
                    shape: handle,
                    point: info.point,
                    distance: info.distance,
                    gradient: info.gradient,
                })
            })
            .collect()
    }

    /// Finds the shape nearest to `point` within `max_distance`
    pub fn point_query_nearest(
        &self,
        point: Vector2,
        max_distance: f32,
        filter: ShapeFilter,
    ) -> Option<PointQueryResult> {
        self.point_query(point, max_distance, filter)
            .into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance).then(a.shape.cmp(&b.shape)))
    }

    /// Sweeps a circle of `radius` from `a` to `b` and reports every shape it
    /// hits, nearest first
    pub fn segment_query(
        &self,
        a: Vector2,
        b: Vector2,
        radius: f32,
        filter: ShapeFilter,
    ) -> Vec<SegmentQueryResult> {
        let mut candidates: Vec<ShapeHandle> = self
            .dynamic_index
            .query_segment(a, b, radius)
            .chain(self.static_index.query_segment(a, b, radius))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut hits: Vec<SegmentQueryResult> = candidates
            .into_iter()
            .filter_map(|handle| {
                let shape = self.shapes.get(handle)?;
                if filter.reject(&shape.get_filter()) {
                    return None;
                }

                shape.segment_query(a, b, radius).map(|info| SegmentQueryResult {
                    shape: handle,
                    point: info.point,
                    normal: info.normal,
                    alpha: info.alpha,
                })
            })
            .collect();

        hits.sort_by(|x, y| x.alpha.total_cmp(&y.alpha).then(x.shape.cmp(&y.shape)));
        hits
    }

    /// Returns the first shape hit by a swept circle, if any
    pub fn segment_query_first(
        &self,
        a: Vector2,
        b: Vector2,
        radius: f32,
        filter: ShapeFilter,
    ) -> Option<SegmentQueryResult> {
        self.segment_query(a, b, radius, filter).into_iter().next()
    }

    /// Returns every shape whose bounding box overlaps `bb`, ordered by handle
    pub fn bb_query(&self, bb: BoundingBox, filter: ShapeFilter) -> Vec<ShapeHandle> {
        self.query_candidates(bb)
            .into_iter()
            .filter(|handle| {
                self.shapes.get(*handle).map_or(false, |shape| {
                    !filter.reject(&shape.get_filter()) && shape.get_bb().intersects(&bb)
                })
            })
            .collect()
    }

    /// Finds the shapes overlapping `shape` placed at `transform`.
    ///
    /// The probe is not added to the space. Shapes attached to the probe's
    /// body are skipped.
    pub fn shape_query(&self, shape: &Shape, transform: &Transform) -> Vec<ShapeQueryResult> {
        let mut probe = shape.clone();
        let bb = probe.update(transform);
        let mut narrow_phase = NarrowPhase::new(self.config.contact_tolerance, self.config.seed);

        self.query_candidates(bb.grow(self.config.contact_tolerance))
            .into_iter()
            .filter_map(|handle| {
                let other = self.shapes.get(handle)?;
                if other.get_body() == probe.get_body()
                    || probe.get_filter().reject(&other.get_filter())
                {
                    return None;
                }

                let contacts = narrow_phase.collide(&probe, other);
                (!contacts.is_empty()).then_some(ShapeQueryResult {
                    shape: handle,
                    contacts,
                })
            })
            .collect()
    }
}
