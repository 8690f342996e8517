//! Image forensics heuristics
//!
//! Pixel-level signals used by the fraud scorer: recompression-difference
//! tamper detection and the hologram saturation check. Both are weak,
//! explainable proxies rather than calibrated detectors.

pub mod ela;
pub mod hologram;

pub use ela::tamper_score;
pub use hologram::hologram_present;
