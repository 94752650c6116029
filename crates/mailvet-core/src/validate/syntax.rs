//! Offline syntax classification with typo-domain hints.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{RiskLevel, SyntaxVerdict};

/// Maximum total address length.
pub const MAX_ADDRESS_LEN: usize = 254;

/// Maximum local part length.
pub const MAX_LOCAL_LEN: usize = 64;

/// Maximum domain length.
pub const MAX_DOMAIN_LEN: usize = 253;

#[allow(clippy::expect_used)] // Pattern is a literal
static BASIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("basic pattern")
});

#[allow(clippy::expect_used)] // Pattern is a literal
static STRICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9._-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z]{2,})+$",
    )
    .expect("strict pattern")
});

/// Near-miss domains of large providers and their intended spelling.
const DOMAIN_CORRECTIONS: &[(&str, &str)] = &[
    ("gmail.co", "gmail.com"),
    ("gmail.cm", "gmail.com"),
    ("gmai.com", "gmail.com"),
    ("gmial.com", "gmail.com"),
    ("yahoo.co", "yahoo.com"),
    ("yahoo.cm", "yahoo.com"),
    ("hotmail.co", "hotmail.com"),
    ("hotmail.cm", "hotmail.com"),
    ("outlook.co", "outlook.com"),
    ("outlook.cm", "outlook.com"),
];

/// Reason for a fully valid address.
pub const REASON_FORMAT_VALID: &str = "Format valid";

/// Reason for an address that only passed the basic checks.
pub const REASON_BASIC_VALID: &str = "Basic format valid";

/// Why an address was rejected offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// Does not look like `local@domain.tld`.
    InvalidFormat,
    /// Longer than [`MAX_ADDRESS_LEN`].
    TooLong,
    /// Local part longer than [`MAX_LOCAL_LEN`].
    LocalTooLong,
    /// Leading, trailing or doubled dots in the local part.
    InvalidLocal,
    /// Domain longer than [`MAX_DOMAIN_LEN`].
    DomainTooLong,
    /// Domain starts or ends with a hyphen.
    InvalidDomain,
}

impl SyntaxError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "Invalid format",
            Self::TooLong => "Email too long",
            Self::LocalTooLong => "Local part too long",
            Self::InvalidLocal => "Invalid local part",
            Self::DomainTooLong => "Domain too long",
            Self::InvalidDomain => "Invalid domain",
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SyntaxError {}

/// Returns the intended domain when `domain` is a known misspelling.
#[must_use]
pub fn suggest_domain(domain: &str) -> Option<&'static str> {
    DOMAIN_CORRECTIONS
        .iter()
        .find(|(typo, _)| *typo == domain)
        .map(|(_, corrected)| *corrected)
}

/// Classifies an address without any I/O.
///
/// Checks run in a fixed order and the first failure decides the reason.
/// A typo hit raises the risk to medium but does not reject the address.
#[must_use]
pub fn classify(address: &str) -> SyntaxVerdict {
    let domain = match check_structure(address) {
        Ok((_, domain)) => domain,
        Err(error) => return SyntaxVerdict::rejected(address, error.message()),
    };

    if let Some(corrected) = suggest_domain(domain) {
        return SyntaxVerdict {
            address: address.to_string(),
            format_valid: true,
            strict_valid: false,
            reason: format!("Did you mean @{corrected}?"),
            risk_level: RiskLevel::Medium,
        };
    }

    let strict_valid = STRICT_RE.is_match(address);
    SyntaxVerdict {
        address: address.to_string(),
        format_valid: true,
        strict_valid,
        reason: if strict_valid {
            REASON_FORMAT_VALID
        } else {
            REASON_BASIC_VALID
        }
        .to_string(),
        risk_level: RiskLevel::Low,
    }
}

/// Runs the rejecting checks and returns the local part and domain.
fn check_structure(address: &str) -> Result<(&str, &str), SyntaxError> {
    if !BASIC_RE.is_match(address) {
        return Err(SyntaxError::InvalidFormat);
    }
    if address.len() > MAX_ADDRESS_LEN {
        return Err(SyntaxError::TooLong);
    }

    let (local, domain) = address
        .split_once('@')
        .ok_or(SyntaxError::InvalidFormat)?;

    if local.len() > MAX_LOCAL_LEN {
        return Err(SyntaxError::LocalTooLong);
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(SyntaxError::InvalidLocal);
    }

    if domain.len() > MAX_DOMAIN_LEN {
        return Err(SyntaxError::DomainTooLong);
    }
    if domain.starts_with('-') || domain.ends_with('-') {
        return Err(SyntaxError::InvalidDomain);
    }

    Ok((local, domain))
}
