//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::FactsError(inner) => format!(
            "{}\nHint: pin the address with [facts] loopback_address in the settings file.",
            inner
        ),
        other => other.to_string(),
    }
}
