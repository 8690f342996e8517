//! Error-level-analysis style tamper detection
//!
//! Re-encodes a region through an in-memory JPEG round-trip and measures
//! the mean absolute pixel difference against the original. Regions that
//! were digitally pasted or edited tend to carry different recompression
//! artifacts than regions native to the original capture, so a higher
//! residual difference maps to a higher manipulation-likelihood score.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::{debug, warn};

use crate::config::TamperConfig;

/// Compute a 0-100 manipulation-likelihood score for a pixel region.
///
/// The region is recompressed as JPEG at `config.jpeg_quality` into a
/// transient in-memory buffer, decoded back, and the mean absolute
/// per-channel difference is scaled by `config.difference_scale` and
/// clamped to 100. A zero-area region scores 0. Encoding failures are
/// treated as a clean region rather than aborting the verification call.
pub fn tamper_score(region: &RgbImage, config: &TamperConfig) -> f64 {
    if region.width() == 0 || region.height() == 0 {
        return 0.0;
    }

    let mut recompressed = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut recompressed, config.jpeg_quality);
    if let Err(e) = encoder.encode_image(region) {
        warn!("JPEG recompression failed, scoring region as clean: {e}");
        return 0.0;
    }

    let restored = match image::load_from_memory(&recompressed) {
        Ok(img) => img.to_rgb8(),
        Err(e) => {
            warn!("Decoding recompressed region failed, scoring as clean: {e}");
            return 0.0;
        }
    };

    let original = region.as_raw();
    let roundtrip = restored.as_raw();
    if original.len() != roundtrip.len() {
        warn!(
            "Recompressed region has mismatched size ({} vs {} bytes), scoring as clean",
            roundtrip.len(),
            original.len()
        );
        return 0.0;
    }

    let total_diff: u64 = original
        .iter()
        .zip(roundtrip.iter())
        .map(|(a, b)| u64::from(a.abs_diff(*b)))
        .sum();
    let mean_diff = total_diff as f64 / original.len() as f64;

    let score = (mean_diff * config.difference_scale).min(100.0);
    debug!(
        "ELA over {}x{} region: mean diff {:.3}, score {:.1}",
        region.width(),
        region.height(),
        mean_diff,
        score
    );

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_zero_area_region_scores_zero() {
        let config = TamperConfig::default();
        let empty = RgbImage::new(0, 0);
        assert_eq!(tamper_score(&empty, &config), 0.0);
    }

    #[test]
    fn test_score_within_bounds() {
        let config = TamperConfig::default();

        // High-frequency checkerboard maximizes recompression residue
        let noisy = RgbImage::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });

        let score = tamper_score(&noisy, &config);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_uniform_region_scores_low() {
        let config = TamperConfig::default();
        let flat = RgbImage::from_pixel(64, 64, Rgb([180, 180, 180]));

        // A flat region survives recompression nearly unchanged
        let score = tamper_score(&flat, &config);
        assert!(score < 10.0, "uniform region scored {score}");
    }

    #[test]
    fn test_high_frequency_scores_above_uniform() {
        let config = TamperConfig::default();

        let flat = RgbImage::from_pixel(64, 64, Rgb([180, 180, 180]));
        let noisy = RgbImage::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });

        assert!(tamper_score(&noisy, &config) >= tamper_score(&flat, &config));
    }

    #[test]
    fn test_deterministic() {
        let config = TamperConfig::default();
        let region = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));

        assert_eq!(
            tamper_score(&region, &config),
            tamper_score(&region, &config)
        );
    }
}
