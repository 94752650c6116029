//! Terminal rendering of results.

use std::fmt::Write;

use mailvet_core::{Outcome, OutcomeStatus, Summary};

const fn label(status: OutcomeStatus) -> &'static str {
    match status {
        OutcomeStatus::Deliverable => "DELIVERABLE",
        OutcomeStatus::Valid => "VALID",
        OutcomeStatus::Invalid => "INVALID",
    }
}

/// One line per outcome: status, address, risk and reason.
pub fn render_outcomes(outcomes: &[&Outcome]) -> String {
    let width = outcomes
        .iter()
        .map(|o| o.address.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for outcome in outcomes {
        let _ = writeln!(
            out,
            "{:<11}  {:<width$}  {:<6}  {}",
            label(outcome.status()),
            outcome.address,
            outcome.risk_level.as_str(),
            outcome.reason,
        );
    }
    out
}

/// Statistics line for the whole result set.
pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Total: {}  Valid: {} ({}%)  Invalid: {} ({}%)  Deliverable: {}",
        summary.total,
        summary.valid,
        summary.valid_percent(),
        summary.invalid,
        summary.invalid_percent(),
        summary.deliverable
    )
}
