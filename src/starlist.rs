//! Star-list building: turn raw detections into the flux-ranked, size-limited
//! list of stars used for quads, plus the field bounding box.

use tracing::debug;

use crate::{Detection, Star, Vector2};

/// Highest flag value kept when saturated sources are skipped.
pub const MAX_FLAG_SKIP_SATURATED: u32 = 3;
/// Highest flag value kept otherwise (blended, saturated and truncated allowed).
pub const MAX_FLAG_DEFAULT: u32 = 7;

/// Parameters controlling star-list construction.
#[derive(Debug, Clone)]
pub struct StarListConfig {
    /// Drop saturated sources (flag > 3) instead of only badly flagged ones
    /// (flag > 7).
    /// Default: false
    pub skip_saturated: bool,

    /// Maximum number of stars kept, brightest first.
    /// Default: 200
    pub max_stars: usize,

    /// Padding added around the stars' extent, as a fraction of the span on
    /// each axis.
    /// Default: 0.01
    pub border: f64,
}

impl Default for StarListConfig {
    fn default() -> Self {
        Self {
            skip_saturated: false,
            max_stars: 200,
            border: 0.01,
        }
    }
}

impl StarListConfig {
    /// Highest detector flag value accepted under this configuration.
    pub fn max_flag(&self) -> u32 {
        if self.skip_saturated {
            MAX_FLAG_SKIP_SATURATED
        } else {
            MAX_FLAG_DEFAULT
        }
    }
}

/// Axis-aligned extent of a star field, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Extent of `stars`, padded by `border * span` on every side.
    ///
    /// A single star gets a unit box centered on it; no stars give the unit
    /// box at the origin.
    pub fn from_stars(stars: &[Star], border: f64) -> Self {
        match stars {
            [] => BoundingBox {
                xmin: 0.0,
                xmax: 1.0,
                ymin: 0.0,
                ymax: 1.0,
            },
            [s] => BoundingBox {
                xmin: s.x - 0.5,
                xmax: s.x + 0.5,
                ymin: s.y - 0.5,
                ymax: s.y + 0.5,
            },
            _ => {
                let (mut xmin, mut xmax) = (f64::INFINITY, f64::NEG_INFINITY);
                let (mut ymin, mut ymax) = (f64::INFINITY, f64::NEG_INFINITY);
                for s in stars {
                    xmin = xmin.min(s.x);
                    xmax = xmax.max(s.x);
                    ymin = ymin.min(s.y);
                    ymax = ymax.max(s.y);
                }
                let xpad = border * (xmax - xmin);
                let ypad = border * (ymax - ymin);
                BoundingBox {
                    xmin: xmin - xpad,
                    xmax: xmax + xpad,
                    ymin: ymin - ypad,
                    ymax: ymax + ypad,
                }
            }
        }
    }

    pub fn xspan(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn yspan(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(
            0.5 * (self.xmin + self.xmax),
            0.5 * (self.ymin + self.ymax),
        )
    }

    /// Default minimum separation between stars of one quad:
    /// `min(min(xspan, yspan) * fraction, cap)`.
    pub fn min_distance(&self, fraction: f64, cap: f64) -> f64 {
        (self.xspan().min(self.yspan()) * fraction).min(cap)
    }
}

/// Flux-ranked stars of one image together with their field extent.
#[derive(Debug, Clone)]
pub struct StarList {
    /// Stars sorted by flux, brightest first.
    pub stars: Vec<Star>,
    pub bbox: BoundingBox,
}

impl StarList {
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// Build the star list from raw detections.
///
/// Keeps detections whose flag does not exceed [`StarListConfig::max_flag`]
/// and whose position and flux are finite, sorts them by flux (brightest
/// first, ties in detection order), truncates to `max_stars` and computes the
/// padded bounding box.
///
/// Returns `None` if no star is left, including when `max_stars` is 0.
pub fn build_star_list(detections: &[Detection], config: &StarListConfig) -> Option<StarList> {
    let max_flag = config.max_flag();
    let mut stars: Vec<Star> = detections
        .iter()
        .filter(|d| d.flag <= max_flag)
        .filter(|d| d.x.is_finite() && d.y.is_finite() && d.flux.is_finite())
        .map(Star::from)
        .collect();

    debug!(
        "Kept {} of {} detections with flag <= {}",
        stars.len(),
        detections.len(),
        max_flag
    );

    // Stable sort: equal fluxes keep detector order.
    stars.sort_by(|a, b| b.flux.total_cmp(&a.flux));
    stars.truncate(config.max_stars);

    if stars.is_empty() {
        return None;
    }

    let bbox = BoundingBox::from_stars(&stars, config.border);
    Some(StarList { stars, bbox })
}
