//! Verdict and outcome models.

use serde::{Deserialize, Serialize};

/// Risk attached to an address by the offline checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Nothing suspicious.
    #[default]
    Low,
    /// Looks like a typo of a well-known provider.
    Medium,
    /// Known bad.
    High,
}

impl RiskLevel {
    /// Returns the lowercase name used in exports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offline judgment of how well-formed an address is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxVerdict {
    /// Normalized address.
    pub address: String,
    /// Passed the basic structural checks.
    pub format_valid: bool,
    /// Also matched the stricter alphanumeric-bounded pattern with no typo flagged.
    pub strict_valid: bool,
    /// First failing rule, a typo hint, or a format-valid note.
    pub reason: String,
    /// Risk level.
    pub risk_level: RiskLevel,
}

impl SyntaxVerdict {
    /// Creates a rejected verdict.
    #[must_use]
    pub fn rejected(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            format_valid: false,
            strict_valid: false,
            reason: reason.into(),
            risk_level: RiskLevel::Low,
        }
    }
}

/// Judgment returned by the deliverability service for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierVerdict {
    /// Address the verdict answers.
    #[serde(rename = "email")]
    pub address: String,
    /// Mail sent to the address is expected to arrive.
    #[serde(default)]
    pub deliverable: bool,
    /// The service considers the address valid.
    #[serde(default)]
    pub valid: bool,
    /// Service-provided explanation.
    #[serde(default)]
    pub reason: String,
}

impl VerifierVerdict {
    /// Creates a failing verdict for an address the service did not answer.
    #[must_use]
    pub fn failed(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            deliverable: false,
            valid: false,
            reason: reason.into(),
        }
    }
}

/// Coarse status of an outcome, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    /// Valid and deliverable.
    Deliverable,
    /// Valid but not known to be deliverable.
    Valid,
    /// Not valid.
    Invalid,
}

/// Merged, user-facing validation result for one address.
///
/// `deliverable` is never true unless `valid` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Normalized address.
    #[serde(rename = "email")]
    pub address: String,
    /// Valid according to the service, or to the format checks when the
    /// address never reached the service.
    pub valid: bool,
    /// Deliverable according to the service.
    pub deliverable: bool,
    /// Human-readable explanation.
    pub reason: String,
    /// Risk level from the offline checks.
    #[serde(rename = "risk", default)]
    pub risk_level: RiskLevel,
}

impl Outcome {
    /// Returns the status with deliverable taking precedence over valid.
    #[must_use]
    pub const fn status(&self) -> OutcomeStatus {
        if self.deliverable {
            OutcomeStatus::Deliverable
        } else if self.valid {
            OutcomeStatus::Valid
        } else {
            OutcomeStatus::Invalid
        }
    }
}

impl From<SyntaxVerdict> for Outcome {
    fn from(verdict: SyntaxVerdict) -> Self {
        Self {
            address: verdict.address,
            valid: verdict.format_valid,
            deliverable: false,
            reason: verdict.reason,
            risk_level: verdict.risk_level,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_precedence() {
        let mut outcome = Outcome {
            address: "a@b.com".into(),
            valid: true,
            deliverable: true,
            reason: "Deliverable".into(),
            risk_level: RiskLevel::Low,
        };
        assert_eq!(outcome.status(), OutcomeStatus::Deliverable);
        outcome.deliverable = false;
        assert_eq!(outcome.status(), OutcomeStatus::Valid);
        outcome.valid = false;
        assert_eq!(outcome.status(), OutcomeStatus::Invalid);
    }

    #[test]
    fn test_verifier_verdict_wire_format() {
        let json = r#"{"email":"a@b.com","valid":true,"deliverable":false,"reason":"SMTP unreachable"}"#;
        let verdict: VerifierVerdict = serde_json::from_str(json).unwrap();
        assert_eq!(verdict.address, "a@b.com");
        assert!(verdict.valid);
        assert!(!verdict.deliverable);
    }

    #[test]
    fn test_verifier_verdict_missing_fields_default() {
        let verdict: VerifierVerdict = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert!(!verdict.valid);
        assert!(verdict.reason.is_empty());
    }

    #[test]
    fn test_outcome_from_syntax_verdict() {
        let outcome = Outcome::from(SyntaxVerdict::rejected("bad", "Invalid format"));
        assert!(!outcome.valid);
        assert!(!outcome.deliverable);
        assert_eq!(outcome.reason, "Invalid format");
    }
}
