//! Brightest-first enumeration of 4-star combinations.
//!
//! Stars are flux-sorted, so a lower rank means a brighter star. Combinations
//! are yielded in order of increasing rank sum, which puts groups of the
//! brightest stars first: if only the first few quads of a window are ever
//! looked at, they are the most reliable ones.
//!
//! Implementation: min-heap keyed by rank sum, with a HashSet of combinations
//! already queued.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use super::QUAD_SIZE;

/// Iterator over all 4-combinations of the ranks `0..n`, each strictly
/// increasing, in order of increasing rank sum (ties in lexicographic order).
pub struct BrightestFirstQuads {
    n: usize,
    heap: BinaryHeap<Reverse<(usize, [usize; QUAD_SIZE])>>,
    queued: HashSet<[usize; QUAD_SIZE]>,
}

impl BrightestFirstQuads {
    /// Enumerate combinations of the ranks `0..n`. Yields nothing for `n < 4`.
    pub fn new(n: usize) -> Self {
        let mut it = Self {
            n,
            heap: BinaryHeap::new(),
            queued: HashSet::new(),
        };
        if n >= QUAD_SIZE {
            it.push([0, 1, 2, 3]);
        }
        it
    }

    fn push(&mut self, combo: [usize; QUAD_SIZE]) {
        if self.queued.insert(combo) {
            self.heap.push(Reverse((combo.iter().sum(), combo)));
        }
    }
}

impl Iterator for BrightestFirstQuads {
    type Item = [usize; QUAD_SIZE];

    fn next(&mut self) -> Option<[usize; QUAD_SIZE]> {
        let Reverse((_, combo)) = self.heap.pop()?;

        // Successors bump one rank by 1 while staying strictly increasing:
        // [a, b, c, d] -> [a+1, b, c, d] if a+1 < b, ..., [a, b, c, d+1] if d+1 < n.
        for i in 0..QUAD_SIZE {
            let upper = if i + 1 < QUAD_SIZE { combo[i + 1] } else { self.n };
            if combo[i] + 1 < upper {
                let mut next = combo;
                next[i] += 1;
                self.push(next);
            }
        }

        Some(combo)
    }
}

/// Number of 4-combinations of `n` items.
pub fn num_quads(n: usize) -> usize {
    if n < QUAD_SIZE {
        return 0;
    }
    n * (n - 1) * (n - 2) * (n - 3) / 24
}
