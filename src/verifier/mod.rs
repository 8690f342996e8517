//! Document verification orchestration
//!
//! One verifier drives the whole pipeline for a single call: resolve the
//! document's region template, score the photo/security region for
//! tampering, extract and normalize text per field, validate the structured
//! number, and aggregate everything into a fraud score. Calls are stateless
//! and independent; nothing is shared or cached between them.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::VerifierConfig;
use crate::error::VerifyError;
use crate::forensics;
use crate::ocr::{self, BoundedOcr, OcrEngine};
use crate::regions::{self, NormalizedRect, RegionTemplate, ResolvedRegion};
use crate::scoring::{self, FraudSignals, RiskTier};
use crate::validate;

/// Supported document classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Aadhaar,
    Pan,
}

/// Which pixels feed the tamper detector
#[derive(Debug, Clone, Copy)]
pub enum TamperTarget {
    /// A single named template region
    Region(&'static str),
    /// The entire input image
    FullImage,
}

/// Per-type verification strategy: the region template, the fields that go
/// through OCR, and where tamper detection looks.
///
/// Built fresh at call time from static data; injected template constants,
/// not ambient globals.
pub struct DocumentProfile {
    pub document_type: DocumentType,
    pub template: RegionTemplate,
    pub text_fields: &'static [&'static str],
    pub tamper_target: TamperTarget,
}

impl DocumentProfile {
    pub fn for_type(document_type: DocumentType) -> Self {
        match document_type {
            DocumentType::Aadhaar => Self {
                document_type,
                template: RegionTemplate::new(vec![
                    ("name", NormalizedRect::new(0.35, 0.25, 0.85, 0.32)),
                    ("aadhaar_no", NormalizedRect::new(0.35, 0.32, 0.85, 0.38)),
                    ("dob", NormalizedRect::new(0.35, 0.38, 0.85, 0.44)),
                    ("gender", NormalizedRect::new(0.35, 0.44, 0.85, 0.50)),
                    ("photo", NormalizedRect::new(0.10, 0.25, 0.30, 0.50)),
                ]),
                text_fields: &["name", "aadhaar_no", "dob", "gender"],
                tamper_target: TamperTarget::Region("photo"),
            },
            DocumentType::Pan => Self {
                document_type,
                template: RegionTemplate::new(vec![
                    ("name", NormalizedRect::new(0.20, 0.20, 0.80, 0.28)),
                    ("pan_no", NormalizedRect::new(0.20, 0.28, 0.80, 0.36)),
                    ("father_name", NormalizedRect::new(0.20, 0.36, 0.80, 0.44)),
                    ("dob", NormalizedRect::new(0.20, 0.44, 0.80, 0.52)),
                    ("hologram", NormalizedRect::new(0.65, 0.10, 0.90, 0.25)),
                ]),
                text_fields: &["name", "pan_no", "father_name", "dob"],
                tamper_target: TamperTarget::FullImage,
            },
        }
    }
}

/// One OCR'd field after normalization.
///
/// `present` is false when the region was unavailable or recognition left
/// nothing after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    pub field_name: &'static str,
    pub normalized_text: String,
    pub present: bool,
}

/// Per-type pass/fail checks, serialized flat alongside the shared fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentChecks {
    Aadhaar {
        structure_valid: bool,
        text_valid: bool,
    },
    Pan {
        hologram_detected: bool,
        pan_valid: bool,
    },
}

/// Complete output of one verification call.
///
/// Created fresh per call and immutable once returned; serializes to the
/// flat key-value report the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub document_type: DocumentType,
    /// 0-100 manipulation likelihood from the recompression difference
    pub tamper_score: f64,
    #[serde(flatten)]
    pub checks: DocumentChecks,
    /// Normalized OCR output per available template field
    pub extracted_text: BTreeMap<String, String>,
    /// 0-100 weighted sum of failed-signal penalties
    pub fraud_score: u32,
    pub risk_tier: RiskTier,
}

/// Document verification engine.
///
/// Holds the configuration and the bounded OCR collaborator; owns no
/// per-call state, so one verifier can serve concurrent calls from
/// separate threads.
pub struct Verifier {
    config: VerifierConfig,
    ocr: BoundedOcr,
}

impl Verifier {
    /// Build a verifier around an OCR collaborator.
    pub fn new(config: VerifierConfig, engine: Arc<dyn OcrEngine>) -> Self {
        let timeout = Duration::from_secs(config.ocr.timeout_secs);
        Self {
            ocr: BoundedOcr::new(engine, timeout),
            config,
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Run one verification call.
    ///
    /// Fails only on input errors (zero-sized buffer); unavailable regions,
    /// OCR failures, and format mismatches degrade into the fraud score.
    pub fn verify(
        &self,
        image: &RgbImage,
        document_type: DocumentType,
    ) -> Result<VerificationResult, VerifyError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(VerifyError::EmptyImage);
        }

        info!("Verifying {document_type:?} document ({width}x{height})");

        let profile = DocumentProfile::for_type(document_type);
        let resolved = regions::resolve(&profile.template, width, height);

        let tamper_score = match profile.tamper_target {
            TamperTarget::Region(name) => match resolved.get(name).copied().flatten() {
                Some(region) => {
                    forensics::tamper_score(&regions::crop(image, region), &self.config.tamper)
                }
                None => {
                    debug!("Tamper region '{name}' unavailable, scoring 0");
                    0.0
                }
            },
            TamperTarget::FullImage => forensics::tamper_score(image, &self.config.tamper),
        };

        let (fields, extracted_text) = self.extract_fields(image, &profile, &resolved);

        let readable = fields
            .iter()
            .filter(|f| f.normalized_text.len() > 2)
            .count();
        debug!("{readable}/{} text fields produced readable output", fields.len());

        let number_valid = validate::validate_number(document_type, &extracted_text);

        let checks = match document_type {
            DocumentType::Aadhaar => DocumentChecks::Aadhaar {
                // Aadhaar cards are landscape; a portrait capture is a
                // structural mismatch with the template
                structure_valid: width > height,
                text_valid: number_valid,
            },
            DocumentType::Pan => {
                let hologram_detected = match resolved.get("hologram").copied().flatten() {
                    Some(region) => forensics::hologram_present(
                        &regions::crop(image, region),
                        &self.config.hologram,
                    ),
                    None => false,
                };
                DocumentChecks::Pan {
                    hologram_detected,
                    pan_valid: number_valid,
                }
            }
        };

        let signals = match checks {
            DocumentChecks::Aadhaar {
                structure_valid,
                text_valid,
            } => FraudSignals::Aadhaar {
                structure_valid,
                tamper_score,
                number_valid: text_valid,
            },
            DocumentChecks::Pan {
                hologram_detected,
                pan_valid,
            } => FraudSignals::Pan {
                tamper_score,
                hologram_detected,
                number_valid: pan_valid,
            },
        };

        let (fraud_score, risk_tier) = scoring::score(signals, &self.config.scoring);
        info!("{document_type:?} verification complete: fraud score {fraud_score}, {risk_tier:?} risk");

        Ok(VerificationResult {
            document_type,
            tamper_score,
            checks,
            extracted_text,
            fraud_score,
            risk_tier,
        })
    }

    /// OCR every text field of the profile.
    ///
    /// The returned map holds one entry per *available* region (possibly
    /// with empty text); unavailable regions contribute no entry.
    fn extract_fields(
        &self,
        image: &RgbImage,
        profile: &DocumentProfile,
        resolved: &BTreeMap<&'static str, Option<ResolvedRegion>>,
    ) -> (Vec<ExtractedField>, BTreeMap<String, String>) {
        let mut fields = Vec::with_capacity(profile.text_fields.len());
        let mut extracted_text = BTreeMap::new();

        for &field in profile.text_fields {
            match resolved.get(field).copied().flatten() {
                Some(region) => {
                    let crop = regions::crop(image, region);
                    let text = ocr::extract_text(&crop, &self.ocr, &self.config.ocr.language);
                    extracted_text.insert(field.to_string(), text.clone());
                    fields.push(ExtractedField {
                        field_name: field,
                        present: !text.is_empty(),
                        normalized_text: text,
                    });
                }
                None => {
                    debug!("Region for field '{field}' unavailable");
                    fields.push(ExtractedField {
                        field_name: field,
                        normalized_text: String::new(),
                        present: false,
                    });
                }
            }
        }

        (fields, extracted_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrError;
    use image::{GrayImage, Rgb};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns scripted responses in call order, cycling so that repeated
    /// verification calls see the same per-field mapping.
    struct ScriptedOcr {
        responses: Vec<&'static str>,
        cursor: AtomicUsize,
    }

    impl ScriptedOcr {
        fn new(responses: Vec<&'static str>) -> Self {
            Self {
                responses,
                cursor: AtomicUsize::new(0),
            }
        }
    }

    impl OcrEngine for ScriptedOcr {
        fn recognize(&self, _image: &GrayImage, _language: &str) -> Result<String, OcrError> {
            let i = self.cursor.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses[i % self.responses.len()].to_string())
        }
    }

    struct EmptyOcr;

    impl OcrEngine for EmptyOcr {
        fn recognize(&self, _image: &GrayImage, _language: &str) -> Result<String, OcrError> {
            Ok(String::new())
        }
    }

    fn verifier_with(engine: Arc<dyn OcrEngine>) -> Verifier {
        Verifier::new(VerifierConfig::default(), engine)
    }

    fn plain_card(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([235, 235, 235]))
    }

    /// PAN card blank with a saturated patch over the hologram region.
    fn pan_card_with_foil(width: u32, height: u32) -> RgbImage {
        let mut card = plain_card(width, height);
        let x0 = (width as f64 * 0.65) as u32;
        let x1 = (width as f64 * 0.90) as u32;
        let y0 = (height as f64 * 0.10) as u32;
        let y1 = (height as f64 * 0.25) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                card.put_pixel(x, y, Rgb([40, 200, 170]));
            }
        }
        card
    }

    #[test]
    fn test_empty_image_is_an_input_error() {
        let verifier = verifier_with(Arc::new(EmptyOcr));
        let empty = RgbImage::new(0, 0);

        assert!(matches!(
            verifier.verify(&empty, DocumentType::Aadhaar),
            Err(VerifyError::EmptyImage)
        ));
    }

    #[test]
    fn test_profiles_expose_expected_regions() {
        let aadhaar = DocumentProfile::for_type(DocumentType::Aadhaar);
        for field in ["name", "aadhaar_no", "dob", "gender", "photo"] {
            assert!(aadhaar.template.get(field).is_some(), "missing {field}");
        }
        assert_eq!(aadhaar.text_fields, &["name", "aadhaar_no", "dob", "gender"]);
        assert!(matches!(aadhaar.tamper_target, TamperTarget::Region("photo")));

        let pan = DocumentProfile::for_type(DocumentType::Pan);
        for field in ["name", "pan_no", "father_name", "dob", "hologram"] {
            assert!(pan.template.get(field).is_some(), "missing {field}");
        }
        assert_eq!(pan.text_fields, &["name", "pan_no", "father_name", "dob"]);
        assert!(matches!(pan.tamper_target, TamperTarget::FullImage));
    }

    #[test]
    fn test_clean_landscape_aadhaar_is_low_risk() {
        // Scenario: landscape capture, clean photo region, readable number
        let engine = ScriptedOcr::new(vec![
            "John Doe",       // name
            "1234 5678 9012", // aadhaar_no
            "01 01 1990",     // dob
            "MALE",           // gender
        ]);
        let verifier = verifier_with(Arc::new(engine));

        let result = verifier
            .verify(&plain_card(1000, 600), DocumentType::Aadhaar)
            .unwrap();

        assert_eq!(
            result.checks,
            DocumentChecks::Aadhaar {
                structure_valid: true,
                text_valid: true,
            }
        );
        assert!(result.tamper_score < 30.0);
        assert_eq!(result.fraud_score, 0);
        assert_eq!(result.risk_tier, RiskTier::Low);
        assert_eq!(
            result.extracted_text.get("aadhaar_no").map(String::as_str),
            Some("1234 5678 9012")
        );
    }

    #[test]
    fn test_portrait_aadhaar_with_unreadable_number_is_medium_risk() {
        // Scenario: portrait orientation (+40) and no readable number (+30)
        // lands exactly on the MEDIUM/HIGH boundary score of 70
        let verifier = verifier_with(Arc::new(EmptyOcr));

        let result = verifier
            .verify(&plain_card(600, 1000), DocumentType::Aadhaar)
            .unwrap();

        assert_eq!(
            result.checks,
            DocumentChecks::Aadhaar {
                structure_valid: false,
                text_valid: false,
            }
        );
        assert_eq!(result.fraud_score, 70);
        assert_eq!(result.risk_tier, RiskTier::Medium);
    }

    #[test]
    fn test_pan_without_foil_and_bad_number_is_medium_risk() {
        // Scenario: dull hologram region (+30) and malformed number (+30)
        let engine = ScriptedOcr::new(vec![
            "JOHN DOE",    // name
            "INVALID123",  // pan_no
            "RICHARD DOE", // father_name
            "01 01 1990",  // dob
        ]);
        let verifier = verifier_with(Arc::new(engine));

        let result = verifier
            .verify(&plain_card(1000, 600), DocumentType::Pan)
            .unwrap();

        assert_eq!(
            result.checks,
            DocumentChecks::Pan {
                hologram_detected: false,
                pan_valid: false,
            }
        );
        assert!(result.tamper_score < 25.0);
        assert_eq!(result.fraud_score, 60);
        assert_eq!(result.risk_tier, RiskTier::Medium);
    }

    #[test]
    fn test_pan_with_foil_and_valid_number_is_low_risk() {
        let engine = ScriptedOcr::new(vec![
            "JOHN DOE",
            "ABCDE1234F",
            "RICHARD DOE",
            "01 01 1990",
        ]);
        let verifier = verifier_with(Arc::new(engine));

        let result = verifier
            .verify(&pan_card_with_foil(1000, 600), DocumentType::Pan)
            .unwrap();

        assert_eq!(
            result.checks,
            DocumentChecks::Pan {
                hologram_detected: true,
                pan_valid: true,
            }
        );
        assert_eq!(result.fraud_score, 0);
        assert_eq!(result.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_verification_is_deterministic() {
        let engine = ScriptedOcr::new(vec![
            "JOHN DOE",
            "ABCDE1234F",
            "RICHARD DOE",
            "01 01 1990",
        ]);
        let verifier = verifier_with(Arc::new(engine));
        let card = pan_card_with_foil(1000, 600);

        let first = verifier.verify(&card, DocumentType::Pan).unwrap();
        let second = verifier.verify(&card, DocumentType::Pan).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_tiny_image_marks_fields_absent_instead_of_failing() {
        // Regions collapse to empty rectangles on a 4x2 image; the call
        // still completes with the affected fields missing from the output
        let verifier = verifier_with(Arc::new(EmptyOcr));

        let result = verifier
            .verify(&plain_card(4, 2), DocumentType::Aadhaar)
            .unwrap();

        assert!(!result.extracted_text.contains_key("aadhaar_no"));
        assert_eq!(
            result.checks,
            DocumentChecks::Aadhaar {
                structure_valid: true,
                text_valid: false,
            }
        );
        assert_eq!(result.fraud_score, 30);
    }

    #[test]
    fn test_result_serializes_to_flat_report() {
        let verifier = verifier_with(Arc::new(EmptyOcr));
        let result = verifier
            .verify(&plain_card(1000, 600), DocumentType::Aadhaar)
            .unwrap();

        let json = serde_json::to_value(&result).unwrap();
        let object = json.as_object().unwrap();

        // Per-type checks flatten into the top-level record
        assert!(object.contains_key("structure_valid"));
        assert!(object.contains_key("text_valid"));
        assert!(!object.contains_key("checks"));
        assert_eq!(object["document_type"], "aadhaar");
        assert_eq!(object["risk_tier"], "LOW");
    }
}
