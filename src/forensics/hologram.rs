//! Hologram presence heuristic
//!
//! Foil and holographic patches exhibit noticeably higher average color
//! saturation than plain printed card stock under typical lighting. The
//! check converts the security region to hue-saturation-value space and
//! thresholds the mean saturation. A weak proxy signal only; it cannot
//! distinguish real diffraction foil from any other saturated print.

use image::RgbImage;
use tracing::debug;

use crate::config::HologramConfig;

/// Mean saturation of a region on the 0-255 scale.
///
/// Uses the HSV definition `S = (max - min) / max * 255` with `S = 0` for
/// black pixels, matching the common byte-scaled convention.
pub fn mean_saturation(region: &RgbImage) -> f64 {
    let pixel_count = (region.width() * region.height()) as f64;
    if pixel_count == 0.0 {
        return 0.0;
    }

    let total: f64 = region
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            if max == 0 {
                0.0
            } else {
                f64::from(max - min) * 255.0 / f64::from(max)
            }
        })
        .sum();

    total / pixel_count
}

/// Flag a security region as carrying a hologram when its mean saturation
/// exceeds the configured threshold. Empty regions are never flagged.
pub fn hologram_present(region: &RgbImage, config: &HologramConfig) -> bool {
    let saturation = mean_saturation(region);
    debug!(
        "Hologram check over {}x{} region: mean saturation {:.1} (threshold {:.1})",
        region.width(),
        region.height(),
        saturation,
        config.saturation_threshold
    );
    saturation > config.saturation_threshold
}
