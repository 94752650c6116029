//! Views over a result set: filtering, search, statistics and export.

mod export;
mod filter;

pub use export::{CSV_HEADERS, ExportScope, export_file_name, to_csv};
pub use filter::{ResultFilter, Summary, filter, search};
