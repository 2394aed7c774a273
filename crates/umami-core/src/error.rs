// ── Core error types ──
//
// User-facing errors from umami-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<umami_api::Error>`
// impl translates wire-layer errors into domain-appropriate variants.
//
// Propagation policy: read-path failures degrade to empty collections
// and zero counts inside the feature controllers and never surface
// here. Mutation-path failures always reach the caller, after the
// rollback has been applied.

use indexmap::IndexMap;
use thiserror::Error;

use crate::mutation::Feature;

/// Fallback notification text when nothing better is available.
pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Mutation attempted while anonymous. Blocked client-side; the
    /// request never reaches the network.
    #[error("Authentication required")]
    AuthRequired,

    /// A mutation for the same (feature, target) pair is already in
    /// flight. Blocked client-side; the caller retries after it settles.
    #[error("{feature} update already pending for target {target}")]
    MutationPending { feature: Feature, target: i64 },

    /// The stored credential was rejected during identity resolution.
    /// The session has already been torn down by the time this is seen.
    #[error("Session is no longer valid")]
    SessionInvalid,

    /// Login/registration/federated exchange rejected.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Server-side field validation, surfaced verbatim.
    #[error("Validation failed: {message}")]
    Validation {
        fields: IndexMap<String, Vec<String>>,
        message: String,
    },

    /// Network failure or 5xx.
    #[error("Network error: {message}")]
    Transport { message: String },

    /// Any other API rejection.
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Client-side fault (malformed payload, bad base URL).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// A single line suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in first.".into(),
            Self::MutationPending { .. } => "Hold on -- still saving your last change.".into(),
            Self::SessionInvalid => "Your session has expired. Please sign in again.".into(),
            Self::AuthenticationFailed { message }
            | Self::Validation { message, .. }
            | Self::Api { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            Self::Transport { .. } => "Could not reach the server. Please try again.".into(),
            _ => GENERIC_FAILURE.into(),
        }
    }

    /// `true` for the two client-side precondition rejections.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::MutationPending { .. })
    }
}

// ── Conversion from wire-layer errors ────────────────────────────────

impl From<umami_api::Error> for CoreError {
    fn from(err: umami_api::Error) -> Self {
        match err {
            umami_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            umami_api::Error::Validation { fields, detail } => {
                let message = detail.clone().unwrap_or_else(|| {
                    fields
                        .iter()
                        .find_map(|(field, msgs)| msgs.first().map(|m| format!("{field}: {m}")))
                        .unwrap_or_else(|| GENERIC_FAILURE.into())
                });
                CoreError::Validation { fields, message }
            }
            umami_api::Error::Api { message, status } if status >= 500 => {
                CoreError::Transport { message }
            }
            umami_api::Error::Api { message, status } => CoreError::Api {
                message,
                status: Some(status),
            },
            umami_api::Error::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            umami_api::Error::InvalidUrl(e) => CoreError::Internal(format!("invalid URL: {e}")),
            umami_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
