//! Request bodies for the MailerSend `email` endpoint

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::domain::communication::{
    email_addresses::EmailAddress,
    mailer::{Attachment, ContentSubtype, Message, MailerError},
};

/// A sender or recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// The bare address
    pub email: String,

    /// The display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&EmailAddress> for Recipient {
    fn from(address: &EmailAddress) -> Self {
        Self {
            email: address.email().to_string(),
            name: address.name().map(str::to_string),
        }
    }
}

/// How an attachment is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Shown as a downloadable file
    Attachment,

    /// Embedded in the HTML body
    Inline,
}

/// An attachment with base64 encoded content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestAttachment {
    /// Base64 encoded file contents
    pub content: String,

    /// The file name
    pub filename: String,

    /// Attachment or inline
    pub disposition: Disposition,

    /// Content-ID of inline attachments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// MIME type; the API infers it from `filename`
    #[serde(skip)]
    pub content_type: String,
}

impl From<&Attachment> for RequestAttachment {
    fn from(attachment: &Attachment) -> Self {
        Self {
            content: STANDARD.encode(&attachment.content),
            filename: attachment.filename.clone(),
            disposition: if attachment.is_inline() {
                Disposition::Inline
            } else {
                Disposition::Attachment
            },
            id: attachment.content_id.clone(),
            content_type: attachment.content_type.clone(),
        }
    }
}

/// Body of `POST /email`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendEmailRequest {
    /// The sender
    pub from: Recipient,

    /// Primary recipients
    pub to: Vec<Recipient>,

    /// Carbon copy recipients
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Recipient>,

    /// Blind carbon copy recipients
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Recipient>,

    /// Where replies go
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Recipient>,

    /// The subject line
    pub subject: String,

    /// Plain text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// HTML content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Attached files, in message order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<RequestAttachment>,
}

impl TryFrom<&Message> for SendEmailRequest {
    type Error = MailerError;

    fn try_from(message: &Message) -> Result<Self, Self::Error> {
        if message.to.is_empty() {
            return Err(MailerError::MissingRecipients);
        }

        // The v1 endpoint takes a single reply_to object
        if message.reply_to.len() > 1 {
            return Err(MailerError::UnsupportedFeature(
                "multiple reply-to addresses".to_string(),
            ));
        }

        if !message.headers.is_empty() {
            return Err(MailerError::UnsupportedFeature("extra headers".to_string()));
        }

        let (text, html) = match message.content_subtype {
            ContentSubtype::Plain => (Some(message.body.clone()), message.html_body.clone()),
            ContentSubtype::Html if message.html_body.is_some() => {
                return Err(MailerError::UnsupportedFeature(
                    "HTML alternative on an HTML message".to_string(),
                ));
            }
            ContentSubtype::Html => (None, Some(message.body.clone())),
        };

        Ok(Self {
            from: Recipient::from(&message.from),
            to: message.to.iter().map(Recipient::from).collect(),
            cc: message.cc.iter().map(Recipient::from).collect(),
            bcc: message.bcc.iter().map(Recipient::from).collect(),
            reply_to: message.reply_to.first().map(Recipient::from),
            subject: message.subject.clone(),
            text,
            html,
            attachments: message.attachments.iter().map(RequestAttachment::from).collect(),
        })
    }
}

/// Result of an accepted send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendEmailResponse {
    /// The id MailerSend assigned to the message
    pub message_id: Option<String>,
}
