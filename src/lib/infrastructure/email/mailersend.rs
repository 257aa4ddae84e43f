//! MailerSend email backend implementation

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use clap::Parser;
use tracing::{debug, info, warn};

use crate::domain::communication::mailer::{Mailer, MailerError, Message};

mod client;
mod errors;
mod request;

pub use client::{EmailApi, MailerSendClient};
pub use errors::ProviderError;
pub use request::{Disposition, Recipient, RequestAttachment, SendEmailRequest, SendEmailResponse};

/// The production API root
pub const DEFAULT_API_URL: &str = "https://api.mailersend.com/v1";

/// MailerSend configuration
#[derive(Clone, Parser)]
pub struct MailerSendConfig {
    /// The MailerSend API token
    #[clap(long, env = "MAILERSEND_API_TOKEN")]
    pub api_token: String,

    /// The API root, without the trailing `/email`
    #[clap(long, env = "MAILERSEND_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Skip messages that fail instead of returning the error
    #[clap(long, env = "MAILERSEND_FAIL_SILENTLY")]
    pub fail_silently: bool,
}

impl MailerSendConfig {
    /// Create a configuration for the production API
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            fail_silently: false,
        }
    }

    /// Point the client at another API root
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl fmt::Debug for MailerSendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerSendConfig")
            .field("api_token", &"[redacted]")
            .field("api_url", &self.api_url)
            .field("fail_silently", &self.fail_silently)
            .finish()
    }
}

/// Mailer delivering through the MailerSend API
#[derive(Debug, Clone)]
pub struct MailerSendBackend<C: EmailApi = MailerSendClient> {
    client: Arc<C>,
    fail_silently: bool,
}

impl MailerSendBackend<MailerSendClient> {
    /// Create a backend with its own HTTP client
    pub fn from_config(config: &MailerSendConfig) -> Result<Self, MailerError> {
        let client = MailerSendClient::new(config)?;

        Ok(Self::new(Arc::new(client)).with_fail_silently(config.fail_silently))
    }
}

impl<C: EmailApi> MailerSendBackend<C> {
    /// Create a backend around a shared client
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            fail_silently: false,
        }
    }

    /// Skip messages that fail instead of returning the error
    pub fn with_fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    /// Whether failures are swallowed
    pub fn fail_silently(&self) -> bool {
        self.fail_silently
    }

    /// Sends one message, returning `false` when it has nobody to go to
    async fn send_one(&self, message: &Message) -> Result<bool, MailerError> {
        if !message.has_recipients() {
            debug!("skipping message {:?} without recipients", message.subject);
            return Ok(false);
        }

        let request = SendEmailRequest::try_from(message)?;
        let response = self.client.send_email(&request).await?;

        debug!(
            message_id = ?response.message_id,
            recipients = message.recipients().count(),
            "message accepted"
        );

        Ok(true)
    }
}

#[async_trait]
impl<C: EmailApi> Mailer for MailerSendBackend<C> {
    async fn send_messages(&self, messages: &[Message]) -> Result<usize, MailerError> {
        if messages.is_empty() {
            return Ok(0);
        }

        let mut sent = 0;

        for message in messages {
            match self.send_one(message).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) if self.fail_silently => {
                    warn!("failed to send message {:?}: {}", message.subject, e);
                }
                Err(e) => return Err(e),
            }
        }

        info!("sent {} of {} messages", sent, messages.len());

        Ok(sent)
    }
}
