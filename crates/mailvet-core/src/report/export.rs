//! CSV export of outcomes.

use std::str::FromStr;

use crate::validate::Outcome;

/// Column headers of the export.
pub const CSV_HEADERS: [&str; 4] = ["Email", "Valid", "Deliverable", "Reason"];

/// Which outcomes an export contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Every outcome.
    #[default]
    All,
    /// Valid outcomes only, deliverable ones included.
    Valid,
}

impl ExportScope {
    /// Name used in export file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Valid => "valid",
        }
    }

    /// Outcomes in scope, in their original order.
    #[must_use]
    pub fn select(self, outcomes: &[Outcome]) -> Vec<&Outcome> {
        outcomes
            .iter()
            .filter(|o| self == Self::All || o.valid)
            .collect()
    }
}

impl FromStr for ExportScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "valid" => Ok(Self::Valid),
            other => Err(format!("unknown export scope: {other}")),
        }
    }
}

/// Renders outcomes as CSV.
///
/// Every field is quoted and embedded quotes are doubled. Rows are joined
/// with `\n` and there is no trailing newline.
#[must_use]
pub fn to_csv<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> String {
    let mut lines = vec![csv_row(CSV_HEADERS)];
    lines.extend(outcomes.into_iter().map(|o| {
        csv_row([
            o.address.as_str(),
            yes_no(o.valid),
            yes_no(o.deliverable),
            o.reason.as_str(),
        ])
    }));
    lines.join("\n")
}

/// Default export file name, e.g. `emails-valid-1700000000000.csv`.
#[must_use]
pub fn export_file_name(scope: ExportScope, timestamp_millis: i64) -> String {
    format!("emails-{}-{timestamp_millis}.csv", scope.as_str())
}

const fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn csv_row<const N: usize>(fields: [&str; N]) -> String {
    fields
        .iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}
