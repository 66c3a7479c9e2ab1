//! CLI presentation: text and JSON formatters for command results.

mod report;
mod resolution;

pub use report::{format_report_json, format_report_text};
pub use resolution::{format_derived_json, format_derived_text, format_validation_ok};
