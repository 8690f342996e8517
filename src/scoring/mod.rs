//! Fraud scoring
//!
//! A deterministic rule-weighted sum rather than a learned model: each
//! failed signal contributes a fixed penalty from configuration. Per
//! document type the penalties sum to exactly 100, which caps the score by
//! construction.

use serde::Serialize;
use tracing::debug;

use crate::config::ScoringConfig;

/// Discrete risk bucket derived from the fraud score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Signals feeding the weighted penalty sum, per document type.
#[derive(Debug, Clone, Copy)]
pub enum FraudSignals {
    Aadhaar {
        structure_valid: bool,
        tamper_score: f64,
        number_valid: bool,
    },
    Pan {
        tamper_score: f64,
        hologram_detected: bool,
        number_valid: bool,
    },
}

/// Aggregate the per-signal checks into a fraud score and risk tier.
pub fn score(signals: FraudSignals, config: &ScoringConfig) -> (u32, RiskTier) {
    let mut fraud_score = 0;

    match signals {
        FraudSignals::Aadhaar {
            structure_valid,
            tamper_score,
            number_valid,
        } => {
            if !structure_valid {
                fraud_score += config.aadhaar_structure_penalty;
            }
            if tamper_score >= config.aadhaar_tamper_threshold {
                fraud_score += config.aadhaar_tamper_penalty;
            }
            if !number_valid {
                fraud_score += config.aadhaar_format_penalty;
            }
        }
        FraudSignals::Pan {
            tamper_score,
            hologram_detected,
            number_valid,
        } => {
            if tamper_score >= config.pan_tamper_threshold {
                fraud_score += config.pan_tamper_penalty;
            }
            if !hologram_detected {
                fraud_score += config.pan_hologram_penalty;
            }
            if !number_valid {
                fraud_score += config.pan_format_penalty;
            }
        }
    }

    let tier = risk_tier(fraud_score, config);
    debug!("Fraud score {fraud_score} -> {tier:?}");
    (fraud_score, tier)
}

/// Map a fraud score to its discrete risk bucket.
pub fn risk_tier(fraud_score: u32, config: &ScoringConfig) -> RiskTier {
    if fraud_score > config.high_risk_above {
        RiskTier::High
    } else if fraud_score > config.medium_risk_above {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aadhaar(structure_valid: bool, tampered: bool, number_valid: bool) -> FraudSignals {
        FraudSignals::Aadhaar {
            structure_valid,
            tamper_score: if tampered { 35.0 } else { 5.0 },
            number_valid,
        }
    }

    fn pan(tampered: bool, hologram_detected: bool, number_valid: bool) -> FraudSignals {
        FraudSignals::Pan {
            tamper_score: if tampered { 30.0 } else { 5.0 },
            hologram_detected,
            number_valid,
        }
    }

    #[test]
    fn test_aadhaar_all_signal_combinations() {
        let config = ScoringConfig::default();

        // (structure_valid, tampered, number_valid) -> expected penalty sum
        let cases = [
            (true, false, true, 0),
            (false, false, true, 40),
            (true, true, true, 30),
            (true, false, false, 30),
            (false, true, true, 70),
            (false, false, false, 70),
            (true, true, false, 60),
            (false, true, false, 100),
        ];

        for (structure_valid, tampered, number_valid, expected) in cases {
            let (fraud_score, _) = score(aadhaar(structure_valid, tampered, number_valid), &config);
            assert_eq!(
                fraud_score, expected,
                "structure_valid={structure_valid} tampered={tampered} number_valid={number_valid}"
            );
            assert!(fraud_score <= 100);
        }
    }

    #[test]
    fn test_pan_all_signal_combinations() {
        let config = ScoringConfig::default();

        // (tampered, hologram_detected, number_valid) -> expected penalty sum
        let cases = [
            (false, true, true, 0),
            (true, true, true, 40),
            (false, false, true, 30),
            (false, true, false, 30),
            (true, false, true, 70),
            (true, true, false, 70),
            (false, false, false, 60),
            (true, false, false, 100),
        ];

        for (tampered, hologram_detected, number_valid, expected) in cases {
            let (fraud_score, _) = score(pan(tampered, hologram_detected, number_valid), &config);
            assert_eq!(
                fraud_score, expected,
                "tampered={tampered} hologram={hologram_detected} number_valid={number_valid}"
            );
            assert!(fraud_score <= 100);
        }
    }

    #[test]
    fn test_tamper_threshold_is_inclusive() {
        let config = ScoringConfig::default();

        let (at_threshold, _) = score(
            FraudSignals::Aadhaar {
                structure_valid: true,
                tamper_score: 30.0,
                number_valid: true,
            },
            &config,
        );
        assert_eq!(at_threshold, 30);

        let (below_threshold, _) = score(
            FraudSignals::Aadhaar {
                structure_valid: true,
                tamper_score: 29.9,
                number_valid: true,
            },
            &config,
        );
        assert_eq!(below_threshold, 0);
    }

    #[test]
    fn test_risk_tier_boundaries() {
        let config = ScoringConfig::default();

        assert_eq!(risk_tier(0, &config), RiskTier::Low);
        assert_eq!(risk_tier(40, &config), RiskTier::Low);
        assert_eq!(risk_tier(41, &config), RiskTier::Medium);
        assert_eq!(risk_tier(70, &config), RiskTier::Medium);
        assert_eq!(risk_tier(71, &config), RiskTier::High);
        assert_eq!(risk_tier(100, &config), RiskTier::High);
    }

    #[test]
    fn test_risk_tier_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskTier::Low).unwrap(), "\"LOW\"");
        assert_eq!(serde_json::to_string(&RiskTier::High).unwrap(), "\"HIGH\"");
    }
}
