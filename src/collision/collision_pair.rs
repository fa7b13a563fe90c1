use crate::core::{Handle, ShapeHandle};

/// An unordered pair of shapes, stored with the smaller handle first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    /// The smaller shape handle
    pub shape_a: ShapeHandle,

    /// The larger shape handle
    pub shape_b: ShapeHandle,
}

impl PairKey {
    /// Creates a new pair key; argument order does not matter
    pub fn new(a: ShapeHandle, b: ShapeHandle) -> Self {
        if a <= b {
            Self { shape_a: a, shape_b: b }
        } else {
            Self { shape_a: b, shape_b: a }
        }
    }

    /// Checks if this pair contains the specified shape
    pub fn contains(&self, shape: ShapeHandle) -> bool {
        self.shape_a == shape || self.shape_b == shape
    }

    /// Returns the other shape in the pair
    pub fn other(&self, shape: ShapeHandle) -> Option<ShapeHandle> {
        if self.shape_a == shape {
            Some(self.shape_b)
        } else if self.shape_b == shape {
            Some(self.shape_a)
        } else {
            None
        }
    }

    /// Order-independent hash of the pair
    pub fn id(&self) -> u64 {
        const MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;
        let bits = |h: ShapeHandle| ((h.generation() as u64) << 32) | h.index() as u64;
        bits(self.shape_a).wrapping_mul(MULTIPLIER) ^ bits(self.shape_b).wrapping_mul(MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = ShapeHandle::from_raw_parts(3, 0);
        let b = ShapeHandle::from_raw_parts(1, 2);

        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(PairKey::new(a, b).id(), PairKey::new(b, a).id());
        assert_eq!(PairKey::new(a, b).other(a), Some(b));
    }
}
