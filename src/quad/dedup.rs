//! Identity-based quad deduplication and the append-only quad set.
//!
//! Two quads are duplicates when they are built from the same 4 stars,
//! whatever their labelling. Geometrically similar quads from different
//! stars are kept: telling those apart is the matcher's job.

use std::collections::HashSet;

use super::{Quad, QuadKey};

/// Candidates whose 4 stars are neither in `existing` nor repeated earlier in
/// the batch. Order is preserved and the first occurrence wins.
///
/// Runs in O(existing + candidates) with hashing; `existing` is not modified,
/// so calling this twice with the same inputs gives the same result.
pub fn dedupe<I>(existing: &HashSet<QuadKey>, candidates: I) -> Vec<Quad>
where
    I: IntoIterator<Item = Quad>,
{
    let mut batch_keys = HashSet::new();
    candidates
        .into_iter()
        .filter(|q| {
            let key = q.key();
            !existing.contains(&key) && batch_keys.insert(key)
        })
        .collect()
}

/// Ordered collection of quads with unique star sets.
///
/// Quads can only be appended, through [`QuadSet::extend_unique`]; insertion
/// order is kept so that output is reproducible.
#[derive(Debug, Clone, Default)]
pub struct QuadSet {
    quads: Vec<Quad>,
    keys: HashSet<QuadKey>,
}

impl QuadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the candidates not already present. Returns how many were added.
    pub fn extend_unique<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = Quad>,
    {
        let fresh = dedupe(&self.keys, candidates);
        self.keys.extend(fresh.iter().map(Quad::key));
        self.quads.extend_from_slice(&fresh);
        fresh.len()
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn as_slice(&self) -> &[Quad] {
        &self.quads
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quad> {
        self.quads.iter()
    }

    pub fn contains(&self, key: &QuadKey) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> &HashSet<QuadKey> {
        &self.keys
    }
}

impl<'a> IntoIterator for &'a QuadSet {
    type Item = &'a Quad;
    type IntoIter = std::slice::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}
