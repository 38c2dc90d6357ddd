//! # quadcat
//!
//! Incremental **quad construction** for astronomical image registration.
//!
//! Given the point sources detected on an image, `quadcat` builds sets of
//! 4-star geometric features ("quads") whose hashes are invariant to
//! translation, rotation and scale. A downstream matcher compares the quads of
//! two images to find the transform between them.
//!
//! Building every C(n, 4) combination up front explodes quickly, so quads are
//! built in escalating passes. Each call to [`ImageCatalog::advance`] runs the
//! next entry of a policy table: first compact groups of the brightest stars,
//! then progressively finer grids of sub-areas over the field. Passes never
//! redo explored combinations and never add the same 4 stars twice.
//!
//! ## Example
//!
//! ```
//! use quadcat::{Detection, ImageCatalog};
//!
//! let detections: Vec<Detection> = (0..10)
//!     .map(|i| Detection {
//!         id: i,
//!         x: 100.0 * i as f64 + 13.0,
//!         y: 1000.0 - 80.0 * i as f64 - ((i * i) % 7) as f64 * 40.0,
//!         flux: 1000.0 - 50.0 * i as f64,
//!         fwhm: 2.5,
//!         flag: 0,
//!         elongation: 1.1,
//!     })
//!     .collect();
//!
//! let mut cat = ImageCatalog::with_detections("night1/img_0042.fits", detections);
//! cat.make_star_list().unwrap();
//!
//! // Escalate until the policy is exhausted (a real driver would attempt a
//! // match against another image after each pass).
//! while cat.advance().unwrap() {
//!     println!("{cat}");
//! }
//! assert_eq!(cat.quad_level(), 5);
//! ```
//!
//! ## Pipeline
//!
//! 1. **Detection** — an external [`Detector`] turns an image into [`Detection`]s
//! 2. **Star list** — [`build_star_list`] filters by flag, sorts by flux and
//!    computes the field [`BoundingBox`]
//! 3. **Generation** — the [`QuadPolicy`] entry for the current level proposes
//!    quads, skipping combinations closer than `mindist` or degenerate
//! 4. **Dedup** — identity-based filtering into an append-only [`QuadSet`]
//!

pub mod detection;
pub mod error;
pub mod image_catalog;
pub mod quad;
pub mod star;
pub mod starlist;

pub use detection::{Detection, Detector, DetectorConfig};
pub use error::CatalogError;
pub use image_catalog::{ImageCatalog, ImageCatalogConfig};
pub use quad::dedup::{dedupe, QuadSet};
pub use quad::generation::{generate, Generation, QuadPolicy, QuadStrategy};
pub use quad::{DegenerateQuad, Quad, QuadHash, QuadKey};
pub use star::*;
pub use starlist::{build_star_list, BoundingBox, StarList, StarListConfig};

// Pixel-plane coordinates are kept in 64-bit floats; detector positions are
// sub-pixel and the quad hash divides by squared baselines.
pub type Vector2 = nalgebra::Vector2<f64>;
