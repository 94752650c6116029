//! Candidate address extraction from free text.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)] // Pattern is a literal
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("address pattern")
});

/// How candidates are pulled out of pasted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Only substrings that look like addresses.
    #[default]
    Scan,
    /// Every comma, semicolon or whitespace separated token, so entries that
    /// are not addresses at all still get a verdict.
    Tokens,
}

impl FromStr for ExtractMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scan" => Ok(Self::Scan),
            "tokens" => Ok(Self::Tokens),
            other => Err(format!("unknown extraction mode: {other}")),
        }
    }
}

/// Extracts unique, normalized candidate addresses in first-seen order.
///
/// Returns an empty vector for blank input.
#[must_use]
pub fn extract(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    unique(ADDRESS_RE.find_iter(text).map(|m| m.as_str()))
}

/// Extracts unique, normalized tokens in first-seen order.
#[must_use]
pub fn extract_tokens(text: &str) -> Vec<String> {
    unique(
        text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|token| !token.is_empty()),
    )
}

/// Extracts candidates using the given mode.
#[must_use]
pub fn extract_with(text: &str, mode: ExtractMode) -> Vec<String> {
    match mode {
        ExtractMode::Scan => extract(text),
        ExtractMode::Tokens => extract_tokens(text),
    }
}

/// Number of candidates the text would yield.
#[must_use]
pub fn count(text: &str, mode: ExtractMode) -> usize {
    extract_with(text, mode).len()
}

/// Lower-cases and trims a raw candidate.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes candidates and drops repeats and blanks, keeping first-seen order.
#[must_use]
pub fn unique<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for candidate in candidates {
        let normalized = normalize(candidate);
        if !normalized.is_empty() && seen.insert(normalized.clone()) {
            kept.push(normalized);
        }
    }
    kept
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_dedups_case_insensitively() {
        let found = extract("A@B.com, a@b.COM and c.d+tag@example.org");
        assert_eq!(found, vec!["a@b.com", "c.d+tag@example.org"]);
    }

    #[test]
    fn test_extract_blank_input() {
        assert!(extract("").is_empty());
        assert!(extract("   \n\t ").is_empty());
    }

    #[test]
    fn test_extract_ignores_non_addresses() {
        assert!(extract("bad-email, no at sign, user@localhost").is_empty());
    }

    #[test]
    fn test_extract_from_surrounding_text() {
        let found = extract("<john@example.com>; \"Jane\" (jane@sub.example.co.uk)");
        assert_eq!(found, vec!["john@example.com", "jane@sub.example.co.uk"]);
    }

    #[test]
    fn test_extract_tokens_keeps_garbage() {
        let found = extract_tokens("A@B.com, A@b.com\nbad-email\nuser@gmail.co");
        assert_eq!(found, vec!["a@b.com", "bad-email", "user@gmail.co"]);
    }

    #[test]
    fn test_count_by_mode() {
        let text = "x@y.com junk";
        assert_eq!(count(text, ExtractMode::Scan), 1);
        assert_eq!(count(text, ExtractMode::Tokens), 2);
    }

    #[test]
    fn test_unique_normalizes_and_drops_repeats() {
        let found = unique([" Bob@Example.com", "a@b.com", "", "A@B.COM", "bob@example.com"]);
        assert_eq!(found, vec!["bob@example.com", "a@b.com"]);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Tokens".parse::<ExtractMode>().unwrap(), ExtractMode::Tokens);
        assert_eq!("scan".parse::<ExtractMode>().unwrap(), ExtractMode::Scan);
        assert!("fuzzy".parse::<ExtractMode>().is_err());
    }

    proptest! {
        #[test]
        fn prop_extract_returns_distinct_lowercase(
            locals in proptest::collection::vec("[a-z][a-z0-9]{0,8}", 1..20),
            upper in any::<bool>(),
        ) {
            let addresses: Vec<String> =
                locals.iter().map(|l| format!("{l}@example.com")).collect();
            let mut text = addresses.join(" ");
            text.push('\n');
            let dup = if upper { addresses.join(",").to_uppercase() } else { addresses.join(",") };
            text.push_str(&dup);

            let mut expected = Vec::new();
            for address in &addresses {
                if !expected.contains(address) {
                    expected.push(address.clone());
                }
            }
            prop_assert_eq!(extract(&text), expected);
        }
    }
}
