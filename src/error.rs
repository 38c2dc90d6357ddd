//! Errors reported by the image catalog controller.
//!
//! All of these are local to one image: a batch driver logs them and moves on
//! to the next image.

use thiserror::Error;

/// Recoverable failures of an [`ImageCatalog`](crate::ImageCatalog).
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No detection catalog has been loaded or produced for this image.
    #[error("no source catalog available")]
    NoCatalog,

    /// The catalog exists but no detection survived flag filtering.
    #[error("none of the {total} detections are usable stars")]
    NoUsableStars {
        /// Number of detections in the catalog before filtering.
        total: usize,
    },

    /// Quads were requested before a star list was built.
    #[error("no star list; build one before making quads")]
    NoStarList,

    /// The source detector failed.
    #[error("source detection failed: {0}")]
    Detector(anyhow::Error),
}
