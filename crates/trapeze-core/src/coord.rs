//! The [`Coord`] type alias and small coordinate helpers.

use smallvec::SmallVec;

/// A spatial coordinate.
///
/// Uses `SmallVec<[i64; 4]>` to avoid heap allocation for arrays of up
/// to 4 dimensions. Higher-rank arrays spill to the heap transparently.
/// Coordinates are signed so that stencil offsets can step outside the
/// array before the boundary policy maps them back in.
pub type Coord = SmallVec<[i64; 4]>;

/// Build a [`Coord`] by adding `offset` to `base` component-wise.
///
/// Both slices must have the same length; extra components of the longer
/// slice are ignored.
pub fn offset_coord(base: &[i64], offset: &[i64]) -> Coord {
    base.iter().zip(offset).map(|(b, o)| b + o).collect()
}

/// Row-major flat index of `coord` inside an array of extents `sizes`.
///
/// Returns `None` if the rank differs or any component is out of range.
pub fn flat_index(coord: &[i64], sizes: &[usize]) -> Option<usize> {
    if coord.len() != sizes.len() {
        return None;
    }
    let mut index = 0usize;
    for (&c, &n) in coord.iter().zip(sizes) {
        if c < 0 || c as u64 >= n as u64 {
            return None;
        }
        index = index * n + c as usize;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn offset_adds_componentwise() {
        let c: Coord = smallvec![3, -2];
        assert_eq!(offset_coord(&c, &[-1, 5]).as_slice(), &[2, 3]);
    }

    #[test]
    fn flat_index_row_major() {
        assert_eq!(flat_index(&[0, 0], &[4, 5]), Some(0));
        assert_eq!(flat_index(&[1, 2], &[4, 5]), Some(7));
        assert_eq!(flat_index(&[3, 4], &[4, 5]), Some(19));
    }

    #[test]
    fn flat_index_rejects_out_of_range_and_rank() {
        assert_eq!(flat_index(&[-1, 0], &[4, 5]), None);
        assert_eq!(flat_index(&[4, 0], &[4, 5]), None);
        assert_eq!(flat_index(&[0], &[4, 5]), None);
    }
}
