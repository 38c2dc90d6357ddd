//! Per-image catalog controller.
//!
//! An [`ImageCatalog`] owns everything `quadcat` knows about one image: the
//! detection catalog, the star list built from it, and the quads accumulated
//! so far. Quads are added in escalating passes by [`ImageCatalog::advance`],
//! which an external driver calls repeatedly (usually with a match attempt in
//! between) until a match is found or the policy runs out.
//!
//! Each catalog is independent and holds no shared state, so separate images
//! can be processed on separate threads.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::quad::generation::{generate, Generation, QuadPolicy};
use crate::{
    build_star_list, BoundingBox, CatalogError, Detection, Detector, DetectorConfig, Quad,
    QuadSet, Star, StarList, StarListConfig,
};

/// Parameters for one image's catalog and quad search.
#[derive(Debug, Clone)]
pub struct ImageCatalogConfig {
    /// Star-list construction parameters.
    pub star_list: StarListConfig,
    /// Strategy per quad level.
    pub policy: QuadPolicy,
    /// `mindist` is this fraction of the shorter field span...
    /// Default: 0.1
    pub mindist_fraction: f64,
    /// ...but never more than this many pixels.
    /// Default: 30.0
    pub mindist_cap: f64,
}

impl Default for ImageCatalogConfig {
    fn default() -> Self {
        Self {
            star_list: StarListConfig::default(),
            policy: QuadPolicy::default(),
            mindist_fraction: 0.1,
            mindist_cap: 30.0,
        }
    }
}

/// One image, its catalog, star list and quads.
#[derive(Debug, Clone)]
pub struct ImageCatalog {
    filepath: PathBuf,
    name: String,
    config: ImageCatalogConfig,
    detections: Option<Vec<Detection>>,
    starlist: Option<StarList>,
    mindist: f64,
    quads: QuadSet,
    quad_level: usize,
}

impl ImageCatalog {
    /// Catalog for the image at `filepath`, with default configuration.
    ///
    /// `filepath` only needs to identify the image; it is read by the
    /// detector in [`make_catalog`](Self::make_catalog), never by this crate.
    pub fn new(filepath: impl AsRef<Path>) -> Self {
        Self::with_config(filepath, ImageCatalogConfig::default())
    }

    pub fn with_config(filepath: impl AsRef<Path>, config: ImageCatalogConfig) -> Self {
        let filepath = filepath.as_ref().to_path_buf();
        let name = filepath
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filepath,
            name,
            config,
            detections: None,
            starlist: None,
            mindist: 0.0,
            quads: QuadSet::new(),
            quad_level: 0,
        }
    }

    /// Catalog for an image whose detections are already available.
    pub fn with_detections(filepath: impl AsRef<Path>, detections: Vec<Detection>) -> Self {
        let mut cat = Self::new(filepath);
        cat.set_detections(detections);
        cat
    }

    /// Replace the detection catalog. The star list is not rebuilt until
    /// [`make_star_list`](Self::make_star_list) is called.
    pub fn set_detections(&mut self, detections: Vec<Detection>) {
        self.detections = Some(detections);
    }

    /// Run `detector` on this image and keep its detections as the catalog.
    ///
    /// On failure the previous catalog, if any, is kept.
    pub fn make_catalog<D>(
        &mut self,
        detector: &D,
        config: &DetectorConfig,
    ) -> Result<usize, CatalogError>
    where
        D: Detector + ?Sized,
    {
        let detections = detector
            .detect(&self.filepath, config)
            .map_err(CatalogError::Detector)?;
        info!("{}: detector found {} sources", self.name, detections.len());
        let n = detections.len();
        self.detections = Some(detections);
        Ok(n)
    }

    /// Build the star list, bounding box and `mindist` from the catalog.
    ///
    /// Returns the number of stars kept. Quads already made are kept as well:
    /// they refer to detection ids, which do not change.
    pub fn make_star_list(&mut self) -> Result<usize, CatalogError> {
        let detections = self.detections.as_ref().ok_or(CatalogError::NoCatalog)?;
        let Some(starlist) = build_star_list(detections, &self.config.star_list) else {
            warn!(
                "{}: no usable stars among {} detections",
                self.name,
                detections.len()
            );
            return Err(CatalogError::NoUsableStars {
                total: detections.len(),
            });
        };

        self.mindist = starlist
            .bbox
            .min_distance(self.config.mindist_fraction, self.config.mindist_cap);
        debug!(
            "{}: {} stars, field {:.0} x {:.0}, mindist {:.1}",
            self.name,
            starlist.len(),
            starlist.bbox.xspan(),
            starlist.bbox.yspan(),
            self.mindist
        );
        let n = starlist.len();
        self.starlist = Some(starlist);
        Ok(n)
    }

    /// Add the quads of the current level and move to the next one.
    ///
    /// Returns `Ok(true)` when a pass ran, even if it added nothing new, and
    /// `Ok(false)` once the policy is exhausted; an exhausted catalog stays
    /// exhausted and unchanged. Fails with [`CatalogError::NoStarList`] if no
    /// star list was built.
    pub fn advance(&mut self) -> Result<bool, CatalogError> {
        let starlist = self.starlist.as_ref().ok_or(CatalogError::NoStarList)?;

        info!("{}: making more quads, from quadlevel {}", self.name, self.quad_level);
        let batch = match generate(&self.config.policy, self.quad_level, starlist, self.mindist) {
            Generation::Batch(batch) => batch,
            Generation::Exhausted => {
                debug!("{}: no strategy for quadlevel {}", self.name, self.quad_level);
                return Ok(false);
            }
        };

        let proposed = batch.len();
        let added = self.quads.extend_unique(batch);
        self.quad_level += 1;
        info!(
            "{}: added {} new quads ({} proposed), {} in total, quadlevel now {}",
            self.name,
            added,
            proposed,
            self.quads.len(),
            self.quad_level
        );
        Ok(true)
    }

    /// Base file name without directory and extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn config(&self) -> &ImageCatalogConfig {
        &self.config
    }

    pub fn has_catalog(&self) -> bool {
        self.detections.is_some()
    }

    pub fn detections(&self) -> Option<&[Detection]> {
        self.detections.as_deref()
    }

    pub fn has_star_list(&self) -> bool {
        self.starlist.is_some()
    }

    /// Stars, brightest first. Empty until the star list is built.
    pub fn stars(&self) -> &[Star] {
        self.starlist
            .as_ref()
            .map(|s| s.stars.as_slice())
            .unwrap_or(&[])
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.starlist.as_ref().map(|s| &s.bbox)
    }

    /// Minimum separation of stars within one quad, in pixels.
    pub fn mindist(&self) -> f64 {
        self.mindist
    }

    /// Quads accumulated so far, in the order they were added.
    pub fn quads(&self) -> &[Quad] {
        self.quads.as_slice()
    }

    pub fn quad_set(&self) -> &QuadSet {
        &self.quads
    }

    /// Number of generation passes run so far.
    pub fn quad_level(&self) -> usize {
        self.quad_level
    }
}

impl fmt::Display for ImageCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (xspan, yspan) = self
            .bounding_box()
            .map_or((0.0, 0.0), |b| (b.xspan(), b.yspan()));
        write!(
            f,
            "{:>20}: approx {:4} x {:4}, {:4} stars, {:4} quads, quadlevel {}",
            self.name,
            xspan as i64,
            yspan as i64,
            self.stars().len(),
            self.quads.len(),
            self.quad_level
        )
    }
}
