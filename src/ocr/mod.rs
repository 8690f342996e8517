//! Text extraction layer
//!
//! The OCR engine itself is an external collaborator behind the
//! [`OcrEngine`] trait; this module owns everything around it: region
//! preprocessing, the bounded-timeout call boundary, and normalization of
//! the raw recognized text. A Tesseract-backed engine is available behind
//! the `ocr` cargo feature.

pub mod preprocess;
#[cfg(feature = "ocr")]
pub mod tesseract;

use image::{GrayImage, RgbImage};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Errors from the OCR collaborator boundary
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine reported a recognition failure
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// The engine did not answer within the configured bound
    #[error("recognition timed out after {0:?}")]
    Timeout(Duration),

    /// The recognition worker terminated without producing a result
    #[error("recognition worker terminated unexpectedly")]
    WorkerDied,
}

/// Black-box text recognition service.
///
/// Implementations receive a binarized single-channel image and a
/// recognition language code, and may return an empty string when nothing
/// is legible.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, OcrError>;
}

/// Stand-in engine used when no OCR backend is compiled in.
///
/// Always returns empty text, which downstream treats as unreadable fields.
pub struct DisabledOcr;

impl OcrEngine for DisabledOcr {
    fn recognize(&self, _image: &GrayImage, _language: &str) -> Result<String, OcrError> {
        Ok(String::new())
    }
}

/// Imposes a hard timeout on the synchronous OCR collaborator call.
///
/// The engine contract treats recognition as atomic request/response; the
/// wrapper runs each call on a worker thread and abandons it if the bound
/// elapses, so a wedged engine cannot stall a verification call forever.
pub struct BoundedOcr {
    engine: Arc<dyn OcrEngine>,
    timeout: Duration,
}

impl BoundedOcr {
    pub fn new(engine: Arc<dyn OcrEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// Recognize text in a binarized image, bounded by the timeout.
    pub fn recognize(&self, image: GrayImage, language: &str) -> Result<String, OcrError> {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let engine = Arc::clone(&self.engine);
        let language = language.to_string();

        std::thread::spawn(move || {
            let _ = sender.send(engine.recognize(&image, &language));
        });

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(OcrError::Timeout(self.timeout)),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(OcrError::WorkerDied),
        }
    }
}

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z]+").expect("static pattern compiles"));

/// Normalize raw recognized text: collapse every run of non-alphanumeric
/// characters to a single space and trim the ends.
pub fn normalize_text(raw: &str) -> String {
    NON_ALPHANUMERIC.replace_all(raw, " ").trim().to_string()
}

/// Extract normalized text from one pixel region.
///
/// Empty regions skip the collaborator entirely. Recognition failures and
/// timeouts degrade to empty text; they are never fatal to the caller.
pub fn extract_text(region: &RgbImage, ocr: &BoundedOcr, language: &str) -> String {
    if region.width() == 0 || region.height() == 0 {
        return String::new();
    }

    let binarized = preprocess::prepare_for_recognition(region);
    match ocr.recognize(binarized, language) {
        Ok(raw) => normalize_text(&raw),
        Err(e) => {
            warn!("OCR failed, treating field as empty: {e}");
            String::new()
        }
    }
}
