//! Tesseract OCR backend
//!
//! `leptess`-based engine, compiled only with the `ocr` cargo feature since
//! it needs libtesseract and libleptonica at build time.

use image::GrayImage;
use std::io::Cursor;
use std::path::PathBuf;

use super::{OcrEngine, OcrError};

/// Tesseract-backed recognition engine
pub struct TesseractOcr {
    /// Override for the tessdata directory (None uses the system default)
    tessdata_path: Option<PathBuf>,
}

impl TesseractOcr {
    pub fn new(tessdata_path: Option<PathBuf>) -> Self {
        Self { tessdata_path }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(String::new());
        }

        let tessdata = self
            .tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());

        let mut engine = leptess::LepTess::new(tessdata.as_deref(), language)
            .map_err(|e| OcrError::Recognition(format!("init failed: {e}")))?;

        // Leptonica reads encoded bytes, so round the buffer through PNG
        let mut encoded = Vec::new();
        image::DynamicImage::ImageLuma8(image.clone())
            .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("image encoding failed: {e}")))?;

        engine
            .set_image_from_mem(&encoded)
            .map_err(|e| OcrError::Recognition(format!("image setup failed: {e}")))?;
        engine.set_source_resolution(300);

        engine
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(format!("{e}")))
    }
}
