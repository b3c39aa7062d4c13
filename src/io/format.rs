//! JSON envelope for command output.
//!
//! Every JSON response has the same shape whether it carries data or an
//! error, so callers can branch on `status` and `code` alone.

use crate::diagnostics::Diagnostic;
use crate::error::SpathError;
use crate::io::exit_code::ExitCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for tool integration
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Check if format is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Standard JSON response format.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "NOT_FOUND", "PARSE_ERROR")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Actual data payload (only for success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details and suggestions (only for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Warnings collected while answering the request
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,

    /// Exit code for shell scripts
    pub exit_code: u8,

    /// Metadata (execution time, version, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

/// Error details for JSON responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Recovery suggestions
    pub suggestions: Vec<String>,
    /// Addresses close to the one that failed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub did_you_mean: Vec<String>,
    /// Longest prefix of the address that resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

/// Response metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Version of the tool
    pub version: String,
    /// Timestamp of the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Execution time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ResponseMeta {
    pub fn now(execution_time_ms: Option<u64>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Some(format_utc_timestamp()),
            execution_time_ms,
        }
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "Operation completed successfully".to_string(),
            data: Some(data),
            error: None,
            diagnostics: Vec::new(),
            exit_code: ExitCode::Success as u8,
            meta: None,
        }
    }

    /// A response that carries data but reports a non-zero code, such as an
    /// empty match set.
    pub fn with_code(mut self, code: ExitCode, message: &str) -> Self {
        if !code.is_success() {
            self.code = code.description().to_uppercase().replace([' ', '/'], "_");
        }
        self.message = message.to_string();
        self.exit_code = code as u8;
        self
    }

    /// Add metadata to the response.
    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl JsonResponse<serde_json::Value> {
    /// Create an error response from a [`SpathError`].
    pub fn from_error(error: &SpathError, did_you_mean: Vec<String>) -> Self {
        let resolved = match error {
            SpathError::Resolve(e) => e.partial().map(str::to_string),
            _ => None,
        };
        Self {
            status: "error".to_string(),
            code: error.status_code(),
            message: error.to_string(),
            data: None,
            error: Some(ErrorDetails {
                suggestions: error
                    .recovery_suggestions()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                did_you_mean,
                resolved,
            }),
            diagnostics: Vec::new(),
            exit_code: ExitCode::from_error(error) as u8,
            meta: None,
        }
    }
}

/// Format current time as UTC timestamp string.
///
/// Returns a string in the format "YYYY-MM-DD HH:MM:SS UTC".
pub fn format_utc_timestamp() -> String {
    let now = Utc::now();
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    #[test]
    fn test_output_format_from_flag() {
        assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Text);
    }

    #[test]
    fn test_json_response_success() {
        let response = JsonResponse::success(vec!["pkg.Symbol"]);
        assert_eq!(response.status, "success");
        assert_eq!(response.code, "OK");
        assert_eq!(response.exit_code, 0);
        assert!(response.error.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"][0], "pkg.Symbol");
        assert!(json.get("diagnostics").is_none());
    }

    #[test]
    fn test_with_code_marks_empty_results() {
        let response =
            JsonResponse::success(Vec::<String>::new()).with_code(ExitCode::NotFound, "no matches");
        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.exit_code, 3);
        assert_eq!(response.message, "no matches");
    }

    #[test]
    fn test_error_response_carries_partial_path() {
        let error = SpathError::from(ResolveError::ChildNotFound {
            resolved: "pkg.Config".to_string(),
            category: "fields".to_string(),
            selector: "Nme".to_string(),
        });
        let response = JsonResponse::from_error(&error, vec!["pkg.Config/fields[Name]".into()]);
        assert_eq!(response.status, "error");
        assert_eq!(response.code, "RESOLUTION_ERROR");
        assert_eq!(response.exit_code, 3);

        let details = response.error.unwrap();
        assert_eq!(details.resolved.as_deref(), Some("pkg.Config"));
        assert_eq!(details.did_you_mean, vec!["pkg.Config/fields[Name]"]);
    }

    #[test]
    fn test_timestamp_format() {
        let timestamp = format_utc_timestamp();
        assert!(timestamp.ends_with(" UTC"));
        assert_eq!(timestamp.len(), "2025-01-01 00:00:00 UTC".len());
    }
}
