//! idcheck - Heuristic fraud screening for Indian identity documents
//!
//! Inspects a decoded image of an Aadhaar or PAN card and produces a
//! structured fraud assessment: template geometry, photo/security-region
//! tamper likelihood (ELA-style recompression difference), OCR text
//! extraction, and canonical format validation, aggregated into a single
//! weighted fraud score and risk tier.
//!
//! This is a demo-grade signal generator, not legal proof of authenticity:
//! no biometrics, no liveness, no registry cross-checks.

pub mod config;
pub mod error;
pub mod forensics;
pub mod ocr;
pub mod regions;
pub mod scoring;
pub mod validate;
pub mod verifier;

pub use config::VerifierConfig;
pub use error::VerifyError;
pub use ocr::OcrEngine;
pub use scoring::RiskTier;
pub use verifier::{DocumentType, VerificationResult, Verifier};
