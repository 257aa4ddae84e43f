//! Mailer errors

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::communication::email_addresses::EmailAddressError;

/// Errors raised while sending messages through a [`Mailer`](super::Mailer)
#[derive(Debug, Error)]
pub enum MailerError {
    /// The message could not be built
    #[error(transparent)]
    InvalidMessage(#[from] MessageError),

    /// The message has cc/bcc recipients but nobody in `to`
    #[error("message has no `to` recipients")]
    MissingRecipients,

    /// The message uses a feature the backend cannot deliver
    #[error("{0} not supported")]
    UnsupportedFeature(String),

    /// The provider rejected the API credentials
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The provider rejected the message contents
    #[error("validation failed: {message}")]
    Validation {
        /// Summary returned by the provider
        message: String,

        /// Field path to error messages, e.g. `to.0.email`
        errors: BTreeMap<String, Vec<String>>,
    },

    /// The provider is throttling requests
    #[error("rate limited by provider")]
    RateLimited {
        /// Seconds to wait before retrying, when the provider says
        retry_after: Option<u64>,
    },

    /// The provider refused the message for another reason
    #[error("an error occurred while sending the email: {0}")]
    SendError(String),

    /// The request never got a response
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),
}

/// Errors raised while building a [`Message`](super::message::Message)
#[derive(Debug, Error)]
pub enum MessageError {
    /// No sender address was given
    #[error("message has no sender")]
    MissingSender,

    /// An address failed to parse
    #[error("invalid `{field}` address {raw:?}")]
    InvalidAddress {
        /// The message field the address belongs to
        field: &'static str,

        /// The address as given
        raw: String,

        /// Why it was rejected
        #[source]
        source: EmailAddressError,
    },
}
