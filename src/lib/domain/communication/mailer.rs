//! Email service module

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

mod errors;
pub mod message;

pub use errors::{MailerError, MessageError};
pub use message::{Attachment, ContentSubtype, Message, MessageBuilder};

/// Email backend
#[async_trait]
pub trait Mailer: Clone + Send + Sync + 'static {
    /// Send a batch of messages
    ///
    /// # Arguments
    /// * `messages` - The [`Message`]s to send, in order.
    ///
    /// # Returns
    /// - [`Ok`] with the number of messages the provider accepted.
    /// - [`Err`] containing a [`MailerError`] for the first failure, unless the
    ///   backend is configured to fail silently.
    async fn send_messages(&self, messages: &[Message]) -> Result<usize, MailerError>;

    /// Send a single message, returning whether it was accepted
    async fn send_message(&self, message: &Message) -> Result<bool, MailerError> {
        Ok(self.send_messages(std::slice::from_ref(message)).await? == 1)
    }
}

/// Sends a plain text email to `to`, returning the number of messages sent.
pub async fn send_mail<M: Mailer>(
    mailer: &M,
    subject: &str,
    body: &str,
    from: &str,
    to: &[&str],
) -> Result<usize, MailerError> {
    let message = to
        .iter()
        .fold(Message::builder(), |builder, recipient| builder.to(*recipient))
        .from(from)
        .subject(subject)
        .body(body)
        .build()?;

    mailer.send_messages(&[message]).await
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Clone for Mailer {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Mailer for Mailer {
        async fn send_messages(&self, messages: &[Message]) -> Result<usize, MailerError>;
        async fn send_message(&self, message: &Message) -> Result<bool, MailerError>;
    }
}
