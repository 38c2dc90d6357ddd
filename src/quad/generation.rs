//! Quad generation: which 4-star combinations to try at each quad level.
//!
//! The search starts with the few brightest stars of the whole field: bright,
//! widely spread quads are the most likely to appear on both images. If those
//! fail to match, later levels tile the field with a grid of overlapping
//! sub-areas and combine the brightest stars of each, reaching fainter and
//! more local configurations. The grid gets finer from level to level.
//!
//! The sequence of strategies is an explicit [`QuadPolicy`] table. Asking for
//! a level past the end of the table yields [`Generation::Exhausted`].

use tracing::debug;

use super::combinations::{num_quads, BrightestFirstQuads};
use super::{Quad, QUAD_SIZE};
use crate::star::min_pairwise_distance;
use crate::{Star, StarList, Vector2};

/// How to propose quads at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadStrategy {
    /// All combinations of the `n` brightest stars after skipping the `skip`
    /// brightest.
    Brightest { n: usize, skip: usize },
    /// Split the field into a `fanout × fanout` grid of overlapping circular
    /// sub-areas of radius `2 * max(xspan, yspan) / fanout`, and combine the
    /// `n` brightest stars of each (after skipping the `skip` brightest).
    Subareas { fanout: usize, n: usize, skip: usize },
}

/// Ordered table of strategies, one per quad level.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadPolicy {
    pub levels: Vec<QuadStrategy>,
}

impl Default for QuadPolicy {
    fn default() -> Self {
        use QuadStrategy::*;
        Self {
            levels: vec![
                Brightest { n: 7, skip: 0 },
                Subareas { fanout: 3, n: 5, skip: 0 },
                Subareas { fanout: 6, n: 5, skip: 0 },
                Subareas { fanout: 12, n: 5, skip: 0 },
                Subareas { fanout: 10, n: 6, skip: 3 },
            ],
        }
    }
}

impl QuadPolicy {
    pub fn new(levels: Vec<QuadStrategy>) -> Self {
        Self { levels }
    }

    /// Strategy for `level`, or `None` past the end of the table.
    pub fn strategy(&self, level: usize) -> Option<&QuadStrategy> {
        self.levels.get(level)
    }

    /// Number of levels in the table.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Outcome of asking the policy for one level's quads.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    /// Proposed quads, not yet deduplicated against earlier levels.
    /// May be empty.
    Batch(Vec<Quad>),
    /// The policy has no strategy for this level.
    Exhausted,
}

/// Propose the quads of `level` for a star list.
///
/// Combinations with two stars closer than `mindist`, or with degenerate
/// geometry, are silently skipped.
pub fn generate(
    policy: &QuadPolicy,
    level: usize,
    starlist: &StarList,
    mindist: f64,
) -> Generation {
    match policy.strategy(level) {
        Some(strategy) => Generation::Batch(strategy.generate(starlist, mindist)),
        None => Generation::Exhausted,
    }
}

/// Rejection counts, for logging.
#[derive(Debug, Default)]
struct FilterStats {
    tried: usize,
    too_close: usize,
    degenerate: usize,
}

impl QuadStrategy {
    /// Propose quads from `starlist` with this strategy.
    pub fn generate(&self, starlist: &StarList, mindist: f64) -> Vec<Quad> {
        let mut stats = FilterStats::default();
        let mut quads = Vec::new();

        match *self {
            QuadStrategy::Brightest { n, skip } => {
                let window: Vec<&Star> = starlist.stars.iter().skip(skip).take(n).collect();
                quads_from_window(&window, mindist, &mut quads, &mut stats);
            }
            QuadStrategy::Subareas { fanout, n, skip } => {
                let radius = subarea_radius(starlist, fanout);
                for center in subarea_centers(starlist, fanout) {
                    // The star list is flux-sorted, so filtering keeps brightest first.
                    let window: Vec<&Star> = starlist
                        .stars
                        .iter()
                        .filter(|s| s.distance_to(&center) <= radius)
                        .skip(skip)
                        .take(n)
                        .collect();
                    quads_from_window(&window, mindist, &mut quads, &mut stats);
                }
            }
        }

        debug!(
            "{:?}: {} quads from {} combinations ({} too close, {} degenerate, mindist {:.1})",
            self,
            quads.len(),
            stats.tried,
            stats.too_close,
            stats.degenerate,
            mindist
        );
        quads
    }
}

/// Centers of the `fanout × fanout` sub-areas: the interior points of an
/// evenly spaced `fanout + 2` grid over the bounding box on each axis.
fn subarea_centers(starlist: &StarList, fanout: usize) -> Vec<Vector2> {
    let bbox = &starlist.bbox;
    let steps = (fanout + 1) as f64;
    let mut centers = Vec::with_capacity(fanout * fanout);
    for i in 1..=fanout {
        let xc = bbox.xmin + bbox.xspan() * i as f64 / steps;
        for j in 1..=fanout {
            let yc = bbox.ymin + bbox.yspan() * j as f64 / steps;
            centers.push(Vector2::new(xc, yc));
        }
    }
    centers
}

fn subarea_radius(starlist: &StarList, fanout: usize) -> f64 {
    2.0 * starlist.bbox.xspan().max(starlist.bbox.yspan()) / fanout as f64
}

/// Append every valid quad formed by 4 stars of `window` to `out`.
fn quads_from_window(
    window: &[&Star],
    mindist: f64,
    out: &mut Vec<Quad>,
    stats: &mut FilterStats,
) {
    out.reserve(num_quads(window.len()));
    for ranks in BrightestFirstQuads::new(window.len()) {
        stats.tried += 1;
        let four: [&Star; QUAD_SIZE] = ranks.map(|r| window[r]);
        if min_pairwise_distance(&four) < mindist {
            stats.too_close += 1;
            continue;
        }
        match Quad::describe(four) {
            Ok(quad) => out.push(quad),
            Err(_) => stats.degenerate += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_star_list, Detection, StarListConfig};
    use std::collections::HashSet;

    /// Stars on a jittered grid, flux decreasing with id.
    fn grid_starlist(nx: usize, ny: usize, spacing: f64) -> StarList {
        let mut dets = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                let id = (j * nx + i) as u64;
                dets.push(Detection {
                    id,
                    x: i as f64 * spacing + ((id * 7) % 5) as f64,
                    y: j as f64 * spacing + ((id * 3) % 7) as f64,
                    flux: 10_000.0 - id as f64,
                    fwhm: 2.0,
                    flag: 0,
                    elongation: 1.0,
                });
            }
        }
        build_star_list(&dets, &StarListConfig::default()).unwrap()
    }

    #[test]
    fn test_default_policy_table() {
        let policy = QuadPolicy::default();
        assert_eq!(policy.len(), 5);
        assert_eq!(
            policy.strategy(0),
            Some(&QuadStrategy::Brightest { n: 7, skip: 0 })
        );
        assert_eq!(
            policy.strategy(4),
            Some(&QuadStrategy::Subareas {
                fanout: 10,
                n: 6,
                skip: 3
            })
        );
        assert_eq!(policy.strategy(5), None);
    }

    #[test]
    fn test_exhausted_past_table() {
        let list = grid_starlist(4, 4, 100.0);
        let policy = QuadPolicy::default();
        assert_eq!(generate(&policy, 5, &list, 10.0), Generation::Exhausted);
        assert_eq!(generate(&policy, 100, &list, 10.0), Generation::Exhausted);
        let empty = QuadPolicy::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(generate(&empty, 0, &list, 10.0), Generation::Exhausted);
    }

    #[test]
    fn test_brightest_uses_window_only() {
        let list = grid_starlist(5, 5, 100.0);
        let strategy = QuadStrategy::Brightest { n: 7, skip: 0 };
        let quads = strategy.generate(&list, 10.0);
        assert!(!quads.is_empty());
        assert!(quads.len() <= num_quads(7));
        let brightest: HashSet<u64> = list.stars[..7].iter().map(|s| s.id).collect();
        for q in &quads {
            assert!(q.star_ids().iter().all(|id| brightest.contains(id)));
        }
    }

    #[test]
    fn test_brightest_skip() {
        let list = grid_starlist(5, 5, 100.0);
        let quads = QuadStrategy::Brightest { n: 4, skip: 2 }.generate(&list, 10.0);
        let expected: HashSet<u64> = list.stars[2..6].iter().map(|s| s.id).collect();
        for q in &quads {
            assert!(q.star_ids().iter().all(|id| expected.contains(id)));
        }
    }

    #[test]
    fn test_too_few_stars() {
        let list = grid_starlist(3, 1, 100.0);
        assert!(QuadStrategy::Brightest { n: 7, skip: 0 }
            .generate(&list, 1.0)
            .is_empty());
        assert!(QuadStrategy::Subareas {
            fanout: 3,
            n: 5,
            skip: 0
        }
        .generate(&list, 1.0)
        .is_empty());
    }

    #[test]
    fn test_mindist_filter() {
        let list = grid_starlist(6, 6, 50.0);
        for strategy in QuadPolicy::default().levels {
            for q in strategy.generate(&list, 45.0) {
                let stars: Vec<&Star> = q
                    .star_ids()
                    .iter()
                    .map(|id| list.stars.iter().find(|s| s.id == *id).unwrap())
                    .collect();
                assert!(min_pairwise_distance(&stars) >= 45.0);
            }
        }
        // Nothing survives a separation larger than the whole field.
        let quads = QuadStrategy::Brightest { n: 7, skip: 0 }.generate(&list, 1e6);
        assert!(quads.is_empty());
    }

    #[test]
    fn test_subarea_centers() {
        let list = grid_starlist(4, 4, 100.0);
        let centers = subarea_centers(&list, 3);
        assert_eq!(centers.len(), 9);
        let bb = list.bbox;
        for c in &centers {
            assert!(c.x > bb.xmin && c.x < bb.xmax);
            assert!(c.y > bb.ymin && c.y < bb.ymax);
        }
        assert!((centers[0].x - (bb.xmin + bb.xspan() / 4.0)).abs() < 1e-9);
        assert!((centers[4] - bb.center()).norm() < 1e-9);
        assert!(subarea_centers(&list, 0).is_empty());
    }

    #[test]
    fn test_subareas_are_local() {
        let list = grid_starlist(10, 10, 100.0);
        let fanout = 12;
        let radius = subarea_radius(&list, fanout);
        let quads = QuadStrategy::Subareas {
            fanout,
            n: 5,
            skip: 0,
        }
        .generate(&list, 10.0);
        assert!(!quads.is_empty());
        // Every member lies in one sub-area, so no pair is further apart than its diameter.
        for q in &quads {
            assert!(q.largest_distance() <= 2.0 * radius + 1e-9);
        }
    }
}
