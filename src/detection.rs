//! Source detections: the output of an external source extractor and the
//! input to the star-list builder.
//!
//! `quadcat` does not detect sources itself. A [`Detector`] wraps whatever
//! extractor is available (a SExtractor run, an in-process blob finder, a
//! cached table) and hands back plain [`Detection`] records.

use std::path::Path;

/// One source reported by the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Detector-assigned source number, unique within one image.
    pub id: u64,
    /// Position along columns, in pixels.
    pub x: f64,
    /// Position along rows, in pixels.
    pub y: f64,
    /// Integrated flux (any consistent unit; only the ordering matters).
    pub flux: f64,
    /// Full width at half maximum, in pixels.
    pub fwhm: f64,
    /// Detector quality flags. Bit 2 (value 4) marks saturated sources.
    pub flag: u32,
    /// Ratio of major to minor axis.
    pub elongation: f64,
}

/// Options passed to the detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Detection threshold, in units of background sigma.
    /// Default: 3.0
    pub detect_thresh: f64,

    /// Threshold used for measuring the detected sources, in units of
    /// background sigma.
    /// Default: 3.0
    pub analysis_thresh: f64,

    /// Minimum number of connected pixels above threshold.
    /// Default: 10
    pub detect_minarea: u32,

    /// Pixel scale in arcseconds per pixel.
    /// Default: 1.0
    pub pixel_scale: f64,

    /// Expected seeing FWHM, in arcseconds.
    /// Default: 2.0
    pub seeing_fwhm: f64,

    /// Whether to smooth the image with a detection filter first.
    /// Default: true
    pub filter: bool,

    /// Whether the detector should report its progress.
    /// Default: true
    pub verbose: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            detect_thresh: 3.0,
            analysis_thresh: 3.0,
            detect_minarea: 10,
            pixel_scale: 1.0,
            seeing_fwhm: 2.0,
            filter: true,
            verbose: true,
        }
    }
}

/// Source extractor turning an image into detections.
pub trait Detector {
    fn detect(&self, image_path: &Path, config: &DetectorConfig) -> anyhow::Result<Vec<Detection>>;
}

impl<F> Detector for F
where
    F: Fn(&Path, &DetectorConfig) -> anyhow::Result<Vec<Detection>>,
{
    fn detect(&self, image_path: &Path, config: &DetectorConfig) -> anyhow::Result<Vec<Detection>> {
        self(image_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.detect_thresh, 3.0);
        assert_eq!(config.analysis_thresh, 3.0);
        assert_eq!(config.detect_minarea, 10);
        assert_eq!(config.seeing_fwhm, 2.0);
        assert!(config.filter);
    }

    #[test]
    fn test_closure_detector() {
        let detector = |path: &Path, config: &DetectorConfig| -> anyhow::Result<Vec<Detection>> {
            anyhow::ensure!(config.detect_minarea > 0, "bad area");
            Ok(vec![Detection {
                id: 1,
                x: path.to_string_lossy().len() as f64,
                y: 0.0,
                flux: 1.0,
                fwhm: 2.0,
                flag: 0,
                elongation: 1.0,
            }])
        };
        let dets = detector
            .detect(Path::new("abc.fits"), &DetectorConfig::default())
            .unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].x, 8.0);
    }
}
