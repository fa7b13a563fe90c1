use bitflags::bitflags;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

bitflags! {
    /// A bit mask of collision categories
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct Categories: u32 {
        /// Default category
        const DEFAULT    = 0x00000001;

        /// Static world geometry
        const STATIC     = 0x00000002;

        /// Dynamic objects
        const DYNAMIC    = 0x00000004;

        /// Kinematic objects
        const KINEMATIC  = 0x00000008;

        /// Player or NPC objects
        const CHARACTER  = 0x00000010;

        /// Projectile objects
        const PROJECTILE = 0x00000020;

        /// Sensor objects
        const SENSOR     = 0x00000040;

        /// Debris objects
        const DEBRIS     = 0x00000080;

        /// Every category
        const ALL        = 0xFFFFFFFF;
    }
}

impl Default for Categories {
    fn default() -> Self {
        Categories::ALL
    }
}

/// Collision group identifier. Shapes sharing a non-zero group never collide.
pub type Group = u32;

/// Decides which pairs of shapes may collide.
///
/// Two shapes are rejected when they share a non-zero group, or when either
/// shape's categories are missing from the other shape's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ShapeFilter {
    /// Shapes in the same non-zero group don't collide
    pub group: Group,

    /// Categories this shape belongs to
    pub categories: Categories,

    /// Categories this shape collides with
    pub mask: Categories,
}

impl ShapeFilter {
    /// A filter that collides with everything
    pub const ALL: Self = Self {
        group: 0,
        categories: Categories::ALL,
        mask: Categories::ALL,
    };

    /// A filter that collides with nothing
    pub const NONE: Self = Self {
        group: 0,
        categories: Categories::empty(),
        mask: Categories::empty(),
    };

    /// Creates a new filter
    pub fn new(group: Group, categories: Categories, mask: Categories) -> Self {
        Self { group, categories, mask }
    }

    /// Returns true if shapes with these two filters must not collide
    #[inline]
    pub fn reject(&self, other: &Self) -> bool {
        (self.group != 0 && self.group == other.group)
            || !self.categories.intersects(other.mask)
            || !other.categories.intersects(self.mask)
    }
}

impl Default for ShapeFilter {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_group_rejects() {
        let a = ShapeFilter::new(7, Categories::ALL, Categories::ALL);
        assert!(a.reject(&a));
        assert!(!ShapeFilter::ALL.reject(&ShapeFilter::ALL));
    }

    #[test]
    fn masks_must_agree_both_ways() {
        let player = ShapeFilter::new(0, Categories::CHARACTER, Categories::STATIC);
        let wall = ShapeFilter::new(0, Categories::STATIC, Categories::ALL);
        let debris = ShapeFilter::new(0, Categories::DEBRIS, Categories::ALL);

        assert!(!player.reject(&wall));
        assert!(player.reject(&debris));
        assert!(debris.reject(&player));
    }
}
