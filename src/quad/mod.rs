//! Quad descriptors: 4-star geometric features and their hashes.
//!
//! A quad's two most distant stars, A and B, define a reference frame in
//! which A sits at (0, 0) and B at (1, 1). The remaining stars C and D are
//! expressed in that frame and their coordinates `[xc, yc, xd, yd]` form the
//! hash. The hash is invariant to translation, rotation and scale of the
//! image, so the same 4 stars seen on two differently oriented exposures give
//! (nearly) the same hash.
//!
//! Two labelling ambiguities remain and are removed by canonicalization:
//!
//! 1. A and B can be swapped. We pick the labelling with `xc + xd <= 1`.
//! 2. C and D can be swapped. We pick the labelling with `xc <= xd`.

pub mod combinations;
pub mod dedup;
pub mod generation;

use thiserror::Error;

use crate::{Star, Vector2};

/// Number of stars in a quad.
pub const QUAD_SIZE: usize = 4;
/// Number of pairwise distances in a quad: C(4,2) = 6.
pub const NUM_EDGES: usize = 6;
/// Quads whose C and D both lie closer than this to line AB, relative to the
/// length of AB, are rejected as collinear.
pub const COLLINEAR_TOLERANCE: f64 = 0.01;

/// Geometric hash `[xc, yc, xd, yd]`.
pub type QuadHash = [f64; 4];

/// Identity of a quad: the ids of its 4 stars, sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadKey([u64; QUAD_SIZE]);

impl QuadKey {
    pub fn new(mut ids: [u64; QUAD_SIZE]) -> Self {
        ids.sort_unstable();
        QuadKey(ids)
    }

    pub fn ids(&self) -> &[u64; QUAD_SIZE] {
        &self.0
    }
}

/// Why 4 stars cannot form a quad.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateQuad {
    /// All 4 positions coincide (or are not finite).
    #[error("quad stars coincide")]
    Coincident,
    /// The 4 positions lie nearly on one line.
    #[error("quad stars are nearly collinear")]
    Collinear,
}

/// A 4-star geometric feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    star_ids: [u64; QUAD_SIZE],
    hash: QuadHash,
    largest_distance: f64,
}

impl Quad {
    /// Compute the canonical quad for 4 stars.
    ///
    /// The input order does not matter. Fails for coincident or nearly
    /// collinear stars, whose hash would be meaningless.
    pub fn describe(stars: [&Star; QUAD_SIZE]) -> Result<Self, DegenerateQuad> {
        let (mut a, mut b, largest) = most_distant_pair(&stars);
        if !(largest.is_finite() && largest > 0.0) {
            return Err(DegenerateQuad::Coincident);
        }
        let [mut c, mut d] = remaining_pair(a, b);

        // Similarity transform taking A to (0, 0) and B to (1, 1):
        // in complex notation, z -> (z - A) * (1 + i) / (B - A).
        let origin = stars[a].pos();
        let ab = stars[b].pos() - origin;
        let inv = 1.0 / ab.norm_squared();
        let wr = (ab.x + ab.y) * inv;
        let wi = (ab.x - ab.y) * inv;
        let to_frame = |s: &Star| {
            let q = s.pos() - origin;
            Vector2::new(q.x * wr - q.y * wi, q.x * wi + q.y * wr)
        };
        let mut pc = to_frame(stars[c]);
        let mut pd = to_frame(stars[d]);

        // Distance to line AB (y = x in this frame) relative to |AB| is |y - x| / 2.
        let offset = (pc.y - pc.x).abs().max((pd.y - pd.x).abs()) / 2.0;
        if offset < COLLINEAR_TOLERANCE {
            return Err(DegenerateQuad::Collinear);
        }

        if pc.x + pd.x > 1.0 {
            std::mem::swap(&mut a, &mut b);
            let one = Vector2::new(1.0, 1.0);
            pc = one - pc;
            pd = one - pd;
        }
        if pc.x > pd.x {
            std::mem::swap(&mut c, &mut d);
            std::mem::swap(&mut pc, &mut pd);
        }

        Ok(Quad {
            star_ids: [stars[a].id, stars[b].id, stars[c].id, stars[d].id],
            hash: [pc.x, pc.y, pd.x, pd.y],
            largest_distance: largest,
        })
    }

    /// Star ids in canonical order `[A, B, C, D]`.
    pub fn star_ids(&self) -> &[u64; QUAD_SIZE] {
        &self.star_ids
    }

    pub fn hash(&self) -> &QuadHash {
        &self.hash
    }

    /// Distance between A and B, in pixels.
    pub fn largest_distance(&self) -> f64 {
        self.largest_distance
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> QuadKey {
        QuadKey::new(self.star_ids)
    }
}

/// Indices of the two most distant stars and their distance.
fn most_distant_pair(stars: &[&Star; QUAD_SIZE]) -> (usize, usize, f64) {
    let mut best = (0, 1, f64::NEG_INFINITY);
    for i in 0..QUAD_SIZE {
        for j in (i + 1)..QUAD_SIZE {
            let dist = stars[i].distance(stars[j]);
            if dist > best.2 {
                best = (i, j, dist);
            }
        }
    }
    best
}

/// The two indices of a quad other than `a` and `b`, in increasing order.
fn remaining_pair(a: usize, b: usize) -> [usize; 2] {
    let mut pair = [0; 2];
    let mut k = 0;
    for i in 0..QUAD_SIZE {
        if i != a && i != b && k < 2 {
            pair[k] = i;
            k += 1;
        }
    }
    pair
}
