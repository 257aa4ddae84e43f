//! Email Address

use std::fmt;

use lettre::message::Mailbox;
use thiserror::Error;

use EmailAddressError::*;

/// An error that can occur when creating an email address
#[derive(Debug, Error)]
pub enum EmailAddressError {
    /// The email address is empty
    #[error("email is empty")]
    EmptyEmailAddress,

    /// The email address is invalid
    #[error("email is invalid")]
    InvalidEmailAddress,
}

/// An email address, optionally carrying a display name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAddress(Mailbox);

impl EmailAddress {
    /// Create a new email address from either `user@example.com` or
    /// `Display Name <user@example.com>`
    pub fn new(raw: &str) -> Result<Self, EmailAddressError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(EmptyEmailAddress);
        }

        let mailbox: Mailbox = trimmed.parse().map_err(|_| InvalidEmailAddress)?;
        let name = mailbox.name.filter(|name| !name.trim().is_empty());

        Ok(Self(Mailbox::new(name, mailbox.email)))
    }

    /// The bare address, e.g. `user@example.com`
    pub fn email(&self) -> &str {
        self.0.email.as_ref()
    }

    /// The display name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }
}

/// Formats as a mailbox, quoting the display name where needed
impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.to_string()
    }
}
