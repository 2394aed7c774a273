use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Fallback text used whenever the server gives no structured detail.
pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";

/// Top-level error type for the `umami-api` crate.
///
/// Covers every failure mode of the wire layer: credential rejection,
/// field-level validation, transport faults, and malformed payloads.
/// `umami-core` maps these into user-facing variants.
#[derive(Debug, Error)]
pub enum Error {
    /// Credential rejected or missing (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// 4xx with field-level detail, surfaced verbatim.
    ///
    /// `fields` maps each field name to the server's message list.
    /// `detail` carries a non-field message (`detail`, `error`, or
    /// `message` in the body) when the server sent one.
    #[error("Validation failed: {}", .detail.as_deref().unwrap_or(GENERIC_ERROR))]
    Validation {
        fields: IndexMap<String, Vec<String>>,
        detail: Option<String>,
    },

    /// Any other non-success HTTP response.
    #[error("API error (HTTP {status}): {message}")]
    Api { message: String, status: u16 },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// A single human-readable line suitable for user notification.
    ///
    /// Prefers server-provided detail; falls back to the first field
    /// message for validation errors, then to [`GENERIC_ERROR`].
    pub fn detail_message(&self) -> String {
        match self {
            Self::Authentication { message } | Self::Api { message, .. } if !message.is_empty() => {
                message.clone()
            }
            Self::Validation { fields, detail } => {
                if let Some(detail) = detail {
                    return detail.clone();
                }
                fields
                    .iter()
                    .find_map(|(field, msgs)| {
                        msgs.first().map(|m| format!("{field}: {m}"))
                    })
                    .unwrap_or_else(|| GENERIC_ERROR.to_owned())
            }
            _ => GENERIC_ERROR.to_owned(),
        }
    }

    /// Returns `true` if this error means the stored credential is no
    /// longer valid and the session should be torn down.
    pub fn is_auth_invalid(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

/// Interpret a non-success response body.
///
/// The backend is inconsistent about error shapes: plain strings,
/// `{detail}`, `{error}`, `{message}`, bare arrays, and DRF-style
/// `{field: [messages]}` maps all occur. Everything is folded into the
/// [`Error`] taxonomy here so callers never touch raw bodies.
pub(crate) fn parse_error_body(status: u16, body: &str) -> Error {
    if status == 401 {
        return Error::Authentication {
            message: extract_detail(body).unwrap_or_else(|| "invalid or expired credential".into()),
        };
    }

    if (400..500).contains(&status) {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            let (fields, detail) = split_validation(&value);
            if !fields.is_empty() || detail.is_some() {
                return Error::Validation { fields, detail };
            }
        }
    }

    Error::Api {
        message: extract_detail(body).unwrap_or_else(|| GENERIC_ERROR.to_owned()),
        status,
    }
}

/// Pull a human-readable message out of an arbitrary error body.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    detail_from_value(&value)
}

fn detail_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.first().and_then(detail_from_value),
        Value::Object(map) => ["detail", "error", "message", "non_field_errors"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(detail_from_value),
        _ => None,
    }
}

/// Separate a 4xx body into field-level messages and a non-field detail.
fn split_validation(value: &Value) -> (IndexMap<String, Vec<String>>, Option<String>) {
    let mut fields = IndexMap::new();
    let mut detail = None;

    if let Value::Object(map) = value {
        for (key, val) in map {
            match key.as_str() {
                "detail" | "error" | "message" | "non_field_errors" => {
                    if detail.is_none() {
                        detail = detail_from_value(val);
                    }
                }
                _ => {
                    let msgs: Vec<String> = match val {
                        Value::String(s) => vec![s.clone()],
                        Value::Array(items) => items
                            .iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect(),
                        _ => Vec::new(),
                    };
                    if !msgs.is_empty() {
                        fields.insert(key.clone(), msgs);
                    }
                }
            }
        }
    } else if detail.is_none() {
        detail = detail_from_value(value);
    }

    (fields, detail)
}
