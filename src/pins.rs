//! Anchored points excluded from physics.

/// Set of pinned point indices.
///
/// Backed by a dense mask for constant-time lookups from the inner physics
/// loops. Pinned points receive no force, are skipped by the integrator, and
/// never have their velocity touched by the Provot pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSet {
    mask: Vec<bool>,
    indices: Vec<usize>,
}

impl PinSet {
    /// No pinned points.
    pub fn empty(point_count: usize) -> Self {
        Self {
            mask: vec![false; point_count],
            indices: Vec::new(),
        }
    }

    /// The four corners of a `cols x rows` cell grid.
    ///
    /// For the 20x20 reference grid these are points 0, 20, 420 and 440.
    pub fn corners(cols: usize, rows: usize) -> Self {
        let u = cols + 1;
        let count = u * (rows + 1);
        Self::from_indices(count, [0, cols, rows * u, count - 1])
    }

    /// Pin an explicit list of indices. Duplicates are ignored.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range.
    pub fn from_indices(point_count: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::empty(point_count);
        for i in indices {
            set.insert(i);
        }
        set
    }

    /// Pin every point for which `predicate(index)` holds.
    pub fn from_predicate(point_count: usize, predicate: impl Fn(usize) -> bool) -> Self {
        Self::from_indices(point_count, (0..point_count).filter(|&i| predicate(i)))
    }

    pub fn insert(&mut self, index: usize) {
        assert!(
            index < self.mask.len(),
            "pin index {} out of bounds ({} points)",
            index,
            self.mask.len()
        );
        if !self.mask[index] {
            self.mask[index] = true;
            self.indices.push(index);
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.mask[index]
    }

    /// Pinned indices in insertion order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of points this set was built for.
    pub fn point_count(&self) -> usize {
        self.mask.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_corners() {
        let pins = PinSet::corners(20, 20);
        assert_eq!(pins.indices(), &[0, 20, 420, 440]);
        assert!(pins.contains(420));
        assert!(!pins.contains(1));
    }

    #[test]
    fn test_non_square_corners() {
        // 4 cols x 2 rows -> 5 x 3 points
        let pins = PinSet::corners(4, 2);
        assert_eq!(pins.indices(), &[0, 4, 10, 14]);
    }

    #[test]
    fn test_duplicates_ignored() {
        let pins = PinSet::from_indices(9, [0, 0, 3]);
        assert_eq!(pins.len(), 2);
    }

    #[test]
    fn test_predicate() {
        let pins = PinSet::from_predicate(9, |i| i < 3);
        assert_eq!(pins.indices(), &[0, 1, 2]);
    }
}
