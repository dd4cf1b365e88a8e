use super::flatten::FlatLeaf;

/// Rounds up to an even slot (8-byte alignment).
#[inline]
pub const fn pad2(n: usize) -> usize {
    n + (n % 2)
}

/// Rounds up to a multiple of four slots (16-byte alignment).
#[inline]
pub const fn pad4(n: usize) -> usize {
    n + ((4 - (n % 4)) % 4)
}

/// Slot offsets of each leaf and the padded total, in 4-byte elements.
///
/// Rules:
/// - scalars pack tightly
/// - vec2 starts on an even slot
/// - vec3/vec4/quaternion/array start on a multiple of four and occupy a
///   multiple of four slots
/// - the total is rounded up to whole 16-byte blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    offsets: Vec<usize>,
    count: usize,
}

impl Layout {
    pub fn plan(leaves: &[FlatLeaf]) -> Self {
        Self::from_sizes(leaves.iter().map(|l| (l.elements, l.trailing_padding)))
    }

    /// Plans from `(elements, trailing_padding)` pairs in declaration order.
    pub fn from_sizes(sizes: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut offsets = Vec::new();
        let mut offset = 0;

        for (elements, trailing_padding) in sizes {
            if elements == 1 {
                offsets.push(offset);
                offset += 1;
            } else {
                let pad = if elements <= 2 { pad2 } else { pad4 };
                offsets.push(pad(offset));
                offset = pad(offset) + pad(elements);
            }
            offset += trailing_padding;
        }

        Self {
            offsets,
            count: pad4(offset),
        }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Total element count; always a multiple of four.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn byte_size(&self) -> u64 {
        (self.count * std::mem::size_of::<f32>()) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(sizes: &[(usize, usize)]) -> Layout {
        Layout::from_sizes(sizes.iter().copied())
    }

    // ── pad helpers ───────────────────────────────────────────────────────

    #[test]
    fn pad_helpers() {
        assert_eq!([0, 1, 2, 3].map(pad2), [0, 2, 2, 4]);
        assert_eq!([0, 1, 2, 3, 4, 5].map(pad4), [0, 4, 4, 4, 4, 8]);
    }

    // ── planning ──────────────────────────────────────────────────────────

    #[test]
    fn empty_plans_to_zero() {
        let l = plan(&[]);
        assert!(l.is_empty());
        assert!(l.offsets().is_empty());
    }

    #[test]
    fn single_scalar_rounds_to_one_block() {
        let l = plan(&[(1, 0)]);
        assert_eq!(l.offsets(), [0]);
        assert_eq!(l.count(), 4);
        assert_eq!(l.byte_size(), 16);
    }

    #[test]
    fn vec2_aligns_to_even_slot() {
        let l = plan(&[(1, 0), (2, 0)]);
        assert_eq!(l.offsets(), [0, 2]);
        assert_eq!(l.count(), 4);
    }

    #[test]
    fn vec4_after_scalar_moves_to_next_block() {
        let l = plan(&[(1, 0), (4, 0)]);
        assert_eq!(l.offsets(), [0, 4]);
        assert_eq!(l.count(), 8);
    }

    #[test]
    fn odd_array_occupies_whole_block() {
        let l = plan(&[(3, 0), (1, 0)]);
        assert_eq!(l.offsets(), [0, 4]);
        assert_eq!(l.count(), 8);
    }

    #[test]
    fn trailing_padding_shifts_next_leaf() {
        let l = plan(&[(4, 0), (1, 3), (1, 0)]);
        assert_eq!(l.offsets(), [0, 4, 8]);
        assert_eq!(l.count(), 12);
    }

    // ── invariants over every small tree shape ────────────────────────────

    #[test]
    fn invariants_hold_for_all_short_sequences() {
        // (elements, needs vec4 alignment)
        const KINDS: [(usize, bool); 6] =
            [(1, false), (2, false), (3, true), (4, true), (5, true), (8, true)];
        const PADS: [usize; 2] = [0, 3];

        let mut stack: Vec<Vec<(usize, bool, usize)>> = vec![Vec::new()];
        while let Some(seq) = stack.pop() {
            let l = Layout::from_sizes(seq.iter().map(|&(n, _, p)| (n, p)));
            assert_eq!(l.count() % 4, 0, "{seq:?}");

            for (i, &(n, aligned4, pad)) in seq.iter().enumerate() {
                let off = l.offsets()[i];
                if n == 2 {
                    assert_eq!(off % 2, 0, "{seq:?}");
                }
                if aligned4 {
                    assert_eq!(off % 4, 0, "{seq:?}");
                }
                let end = off + n + pad;
                match l.offsets().get(i + 1) {
                    Some(&next) => assert!(end <= next, "{seq:?}"),
                    None => assert!(end <= l.count(), "{seq:?}"),
                }
            }

            if seq.len() < 4 {
                for &(n, a) in &KINDS {
                    for &p in &PADS {
                        let mut next = seq.clone();
                        next.push((n, a, p));
                        stack.push(next);
                    }
                }
            }
        }
    }
}
