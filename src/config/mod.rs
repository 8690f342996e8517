//! Verifier Configuration
//!
//! Every tunable of the verification pipeline lives here so penalties and
//! thresholds can be adjusted per deployment without touching the decision
//! logic. Stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level verifier settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Tamper-detection settings
    pub tamper: TamperConfig,
    /// Hologram-detection settings
    pub hologram: HologramConfig,
    /// OCR collaborator settings
    pub ocr: OcrConfig,
    /// Fraud scoring penalties and thresholds
    pub scoring: ScoringConfig,
}

/// Settings for the recompression-difference tamper detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamperConfig {
    /// JPEG quality used for the in-memory recompression round-trip
    pub jpeg_quality: u8,
    /// Multiplier mapping mean recompression difference to a 0-100 score
    pub difference_scale: f64,
}

impl Default for TamperConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            difference_scale: 0.5,
        }
    }
}

/// Settings for the hologram saturation heuristic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HologramConfig {
    /// Mean saturation (0-255) above which foil is considered present
    pub saturation_threshold: f64,
}

impl Default for HologramConfig {
    fn default() -> Self {
        Self {
            saturation_threshold: 80.0,
        }
    }
}

/// Settings for the external OCR collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Recognition language code passed to the OCR engine
    pub language: String,
    /// Upper bound on a single recognition call, in seconds
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Penalty weights and thresholds for the fraud scorer
///
/// Per document type the penalties sum to exactly 100, which caps the score
/// by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Penalty when an Aadhaar image is not landscape
    pub aadhaar_structure_penalty: u32,
    /// Penalty when the Aadhaar photo region looks recompressed
    pub aadhaar_tamper_penalty: u32,
    /// Penalty when the Aadhaar number fails its grammar
    pub aadhaar_format_penalty: u32,
    /// Tamper score at or above which the Aadhaar photo is flagged
    pub aadhaar_tamper_threshold: f64,

    /// Penalty when the full PAN image looks recompressed
    pub pan_tamper_penalty: u32,
    /// Penalty when no hologram is detected on a PAN card
    pub pan_hologram_penalty: u32,
    /// Penalty when the PAN number fails its grammar
    pub pan_format_penalty: u32,
    /// Tamper score at or above which the PAN image is flagged
    pub pan_tamper_threshold: f64,

    /// Fraud scores strictly above this are HIGH risk
    pub high_risk_above: u32,
    /// Fraud scores strictly above this (and not HIGH) are MEDIUM risk
    pub medium_risk_above: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            aadhaar_structure_penalty: 40,
            aadhaar_tamper_penalty: 30,
            aadhaar_format_penalty: 30,
            aadhaar_tamper_threshold: 30.0,
            pan_tamper_penalty: 40,
            pan_hologram_penalty: 30,
            pan_format_penalty: 30,
            pan_tamper_threshold: 25.0,
            high_risk_above: 70,
            medium_risk_above: 40,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<VerifierConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: VerifierConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &VerifierConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Get the per-user configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "idcheck", "idcheck")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}
