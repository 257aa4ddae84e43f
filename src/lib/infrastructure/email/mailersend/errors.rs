//! MailerSend API errors

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::domain::communication::mailer::MailerError;

/// Errors returned by the MailerSend API
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API token is missing, invalid or lacks permission
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The request was rejected with field-level detail
    #[error("validation failed: {message}")]
    Validation {
        /// Summary message
        message: String,

        /// Field path to error messages
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Too many requests
    #[error("rate limited")]
    RateLimited {
        /// Value of the `Retry-After` header, in seconds
        retry_after: Option<u64>,
    },

    /// Any other non-success response
    #[error("API responded with {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,

        /// Error message or raw response body
        message: String,
    },

    /// The request could not be completed
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl From<ProviderError> for MailerError {
    fn from(err: ProviderError) -> Self {
        debug!("ProviderError -> MailerError");

        match err {
            ProviderError::Authentication(message) => MailerError::Authentication(message),
            ProviderError::Validation { message, errors } => {
                MailerError::Validation { message, errors }
            }
            ProviderError::RateLimited { retry_after } => MailerError::RateLimited { retry_after },
            ProviderError::Api { status, message } => {
                MailerError::SendError(format!("{} {}", status, message))
            }
            ProviderError::Transport(e) => MailerError::Transport(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_keeps_field_detail() {
        let errors = BTreeMap::from([(
            "to.0.email".to_string(),
            vec!["The to.0.email must be a valid email address.".to_string()],
        )]);

        let err = MailerError::from(ProviderError::Validation {
            message: "The given data was invalid.".to_string(),
            errors: errors.clone(),
        });

        match err {
            MailerError::Validation {
                message,
                errors: mapped,
            } => {
                assert_eq!(message, "The given data was invalid.");
                assert_eq!(mapped, errors);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_becomes_send_error() {
        let err = MailerError::from(ProviderError::Api {
            status: 500,
            message: "Server Error".to_string(),
        });

        assert!(matches!(err, MailerError::SendError(ref m) if m == "500 Server Error"));
    }

    #[test]
    fn test_rate_limit_keeps_retry_after() {
        let err = MailerError::from(ProviderError::RateLimited {
            retry_after: Some(30),
        });

        assert!(matches!(
            err,
            MailerError::RateLimited {
                retry_after: Some(30)
            }
        ));
    }

    #[test]
    fn test_transport_error_message_includes_the_cause() {
        let err = MailerError::Transport(anyhow::anyhow!("connection refused"));

        assert_eq!(err.to_string(), "transport error: connection refused");
    }
}
