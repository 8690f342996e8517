//! Format grammars for structured identity fields
//!
//! Each document number has a canonical printed format; validation is an
//! exact match of the full normalized string against a compiled grammar.
//! Grammars are process-wide constants, compiled once.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::verifier::DocumentType;

/// A compiled format grammar for one structured field.
pub struct FieldGrammar {
    pattern: Regex,
}

impl FieldGrammar {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("static grammar pattern compiles"),
        }
    }

    /// Exact match against the full normalized string. Total: malformed
    /// input returns false, never errors.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Aadhaar number: 12 digits in three groups of 4, the groups separated by
/// zero or one whitespace character.
pub static AADHAAR_NUMBER: Lazy<FieldGrammar> =
    Lazy::new(|| FieldGrammar::new(r"^\d{4}\s?\d{4}\s?\d{4}$"));

/// PAN number: 5 uppercase letters, 4 digits, 1 uppercase letter.
pub static PAN_NUMBER: Lazy<FieldGrammar> =
    Lazy::new(|| FieldGrammar::new(r"^[A-Z]{5}\d{4}[A-Z]$"));

/// Validate the structured number field for a document type.
///
/// A field absent from `fields` is treated as an empty string and therefore
/// always fails.
pub fn validate_number(document_type: DocumentType, fields: &BTreeMap<String, String>) -> bool {
    let (field, grammar) = match document_type {
        DocumentType::Aadhaar => ("aadhaar_no", &*AADHAAR_NUMBER),
        DocumentType::Pan => ("pan_no", &*PAN_NUMBER),
    };

    let text = fields.get(field).map(String::as_str).unwrap_or("");
    grammar.matches(text)
}
