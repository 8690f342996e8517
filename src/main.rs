//! idcheck - Fraud screening for Aadhaar and PAN card images
//!
//! Thin presentation shell around the verification engine: decode an image
//! file, run one verification call, and render the result as a
//! human-readable report or JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use idcheck::config::{self, VerifierConfig};
use idcheck::ocr::OcrEngine;
use idcheck::verifier::{DocumentChecks, DocumentType, VerificationResult, Verifier};
use idcheck::RiskTier;

/// idcheck - heuristic fraud screening for identity-document images
#[derive(Parser, Debug)]
#[command(name = "idcheck")]
#[command(about = "Screen Aadhaar and PAN card images for fraud signals")]
struct Args {
    /// Path to the document image (JPEG or PNG)
    #[arg(required_unless_present = "dump_config")]
    image: Option<PathBuf>,

    /// Which document class the image contains
    #[arg(short, long, value_enum, required_unless_present = "dump_config")]
    document_type: Option<DocumentType>,

    /// Emit the result as JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Path to a TOML configuration file (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.dump_config {
        print!("{}", toml::to_string_pretty(&VerifierConfig::default())?);
        return Ok(());
    }

    let (Some(image_path), Some(document_type)) = (args.image, args.document_type) else {
        anyhow::bail!("an image path and --document-type are required");
    };

    let config = load_or_default_config(args.config.as_deref())?;

    let image = image::open(&image_path)
        .with_context(|| format!("Failed to decode image {image_path:?}"))?
        .to_rgb8();

    let verifier = Verifier::new(config, default_engine());
    let result = verifier.verify(&image, document_type)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result, verifier.config());
    }

    Ok(())
}

/// Load configuration from an explicit path, the user config dir, or defaults
fn load_or_default_config(explicit: Option<&std::path::Path>) -> Result<VerifierConfig> {
    if let Some(path) = explicit {
        return config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {path:?}"));
    }

    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(loaded) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return Ok(loaded);
            }
        }
    }

    info!("Using default configuration");
    Ok(VerifierConfig::default())
}

#[cfg(feature = "ocr")]
fn default_engine() -> Arc<dyn OcrEngine> {
    Arc::new(idcheck::ocr::tesseract::TesseractOcr::new(None))
}

#[cfg(not(feature = "ocr"))]
fn default_engine() -> Arc<dyn OcrEngine> {
    tracing::warn!("Built without the 'ocr' feature; text fields will read as empty");
    Arc::new(idcheck::ocr::DisabledOcr)
}

/// Render the verification result as a human-readable report
fn print_report(result: &VerificationResult, config: &VerifierConfig) {
    println!("Verification Report");
    println!("===================");

    match result.checks {
        DocumentChecks::Aadhaar {
            structure_valid,
            text_valid,
        } => {
            println!("Document type:   Aadhaar");
            println!(
                "Structure:       {}",
                if structure_valid { "VALID" } else { "INVALID (format issue)" }
            );
            println!(
                "Photo integrity: {} ({:.1}%)",
                if result.tamper_score < config.scoring.aadhaar_tamper_threshold {
                    "CLEAN"
                } else {
                    "TAMPERED"
                },
                result.tamper_score
            );
            println!(
                "Text validation: {}",
                if text_valid { "VALID" } else { "INVALID (OCR issue)" }
            );
        }
        DocumentChecks::Pan {
            hologram_detected,
            pan_valid,
        } => {
            println!("Document type:   PAN");
            println!(
                "Tampering:       {} ({:.1}%)",
                if result.tamper_score < config.scoring.pan_tamper_threshold {
                    "CLEAN"
                } else {
                    "TAMPERED"
                },
                result.tamper_score
            );
            println!(
                "Hologram:        {}",
                if hologram_detected { "PRESENT" } else { "ABSENT (suspicious)" }
            );
            println!(
                "PAN format:      {}",
                if pan_valid { "VALID" } else { "INVALID (format issue)" }
            );
        }
    }

    println!();
    println!("Fraud probability: {}%", result.fraud_score);
    match result.risk_tier {
        RiskTier::High => println!("HIGH FRAUD RISK: multiple security issues detected"),
        RiskTier::Medium => println!("MEDIUM RISK: potential document issues found"),
        RiskTier::Low => println!("LOW RISK: document appears authentic"),
    }

    if !result.extracted_text.is_empty() {
        println!();
        println!("Extracted information:");
        for (field, text) in &result.extracted_text {
            println!("  {field}: {}", if text.is_empty() { "(unreadable)" } else { text });
        }
    }
}
