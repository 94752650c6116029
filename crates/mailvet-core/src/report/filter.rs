//! Filtering, searching and summarizing outcomes.

use std::str::FromStr;

use crate::validate::{Outcome, OutcomeStatus};

/// Which outcomes to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFilter {
    /// Everything.
    #[default]
    All,
    /// Valid but not deliverable.
    Valid,
    /// Deliverable.
    Deliverable,
    /// Invalid.
    Invalid,
}

impl ResultFilter {
    /// Returns true if the outcome passes the filter.
    #[must_use]
    pub const fn matches(self, outcome: &Outcome) -> bool {
        matches!(
            (self, outcome.status()),
            (Self::All, _)
                | (Self::Valid, OutcomeStatus::Valid)
                | (Self::Deliverable, OutcomeStatus::Deliverable)
                | (Self::Invalid, OutcomeStatus::Invalid)
        )
    }
}

impl FromStr for ResultFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "valid" => Ok(Self::Valid),
            "deliverable" => Ok(Self::Deliverable),
            "invalid" => Ok(Self::Invalid),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// Outcomes passing `filter`, in their original order.
#[must_use]
pub fn filter<'a>(
    outcomes: impl IntoIterator<Item = &'a Outcome>,
    filter: ResultFilter,
) -> Vec<&'a Outcome> {
    outcomes.into_iter().filter(|o| filter.matches(o)).collect()
}

/// Outcomes whose address contains `query`, ignoring case.
///
/// An empty query matches everything.
#[must_use]
pub fn search<'a>(
    outcomes: impl IntoIterator<Item = &'a Outcome>,
    query: &str,
) -> Vec<&'a Outcome> {
    let query = query.trim().to_lowercase();
    outcomes
        .into_iter()
        .filter(|o| o.address.to_lowercase().contains(&query))
        .collect()
}

/// Counts over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Number of outcomes.
    pub total: usize,
    /// Valid outcomes, deliverable ones included.
    pub valid: usize,
    /// Invalid outcomes.
    pub invalid: usize,
    /// Deliverable outcomes.
    pub deliverable: usize,
}

impl Summary {
    /// Counts the given outcomes.
    #[must_use]
    pub fn of(outcomes: &[Outcome]) -> Self {
        let valid = outcomes.iter().filter(|o| o.valid).count();
        Self {
            total: outcomes.len(),
            valid,
            invalid: outcomes.len() - valid,
            deliverable: outcomes.iter().filter(|o| o.deliverable).count(),
        }
    }

    /// Share of valid outcomes, rounded to the nearest percent.
    #[must_use]
    pub fn valid_percent(&self) -> u32 {
        percent(self.valid, self.total)
    }

    /// Share of invalid outcomes, rounded to the nearest percent.
    #[must_use]
    pub fn invalid_percent(&self) -> u32 {
        percent(self.invalid, self.total)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
