//! Email message

use std::collections::BTreeMap;

use crate::domain::communication::email_addresses::EmailAddress;

use super::errors::MessageError;

/// How the message body should be interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentSubtype {
    /// The body is plain text; an HTML alternative may accompany it
    #[default]
    Plain,

    /// The body is HTML and there is no text part
    Html,
}

/// A file attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The file name shown to the recipient
    pub filename: String,

    /// The raw file contents
    pub content: Vec<u8>,

    /// The MIME type of the contents
    pub content_type: String,

    /// Content-ID for attachments embedded in the HTML body
    pub content_id: Option<String>,
}

impl Attachment {
    /// Create an attachment, guessing the content type from the file extension
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();

        Self {
            filename,
            content: content.into(),
            content_type,
            content_id: None,
        }
    }

    /// Create an attachment referenced from the HTML body as `cid:<content_id>`
    pub fn inline(
        filename: impl Into<String>,
        content: impl Into<Vec<u8>>,
        content_id: impl Into<String>,
    ) -> Self {
        Self {
            content_id: Some(content_id.into()),
            ..Self::new(filename, content)
        }
    }

    /// Override the guessed content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Whether the attachment is displayed inline
    pub fn is_inline(&self) -> bool {
        self.content_id.is_some()
    }
}

/// Email message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The subject of the email
    pub subject: String,

    /// The body of the email, plain text unless `content_subtype` is HTML
    pub body: String,

    /// How `body` is interpreted
    pub content_subtype: ContentSubtype,

    /// The HTML alternative of a plain text body
    pub html_body: Option<String>,

    /// The sender of the email
    pub from: EmailAddress,

    /// The primary recipients
    pub to: Vec<EmailAddress>,

    /// Carbon copy recipients
    pub cc: Vec<EmailAddress>,

    /// Blind carbon copy recipients
    pub bcc: Vec<EmailAddress>,

    /// Addresses replies should go to
    pub reply_to: Vec<EmailAddress>,

    /// Attached files, in order
    pub attachments: Vec<Attachment>,

    /// Extra headers
    pub headers: BTreeMap<String, String>,
}

impl Message {
    /// Start building a message
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// Every address the message will be delivered to: `to`, then `cc`, then `bcc`
    pub fn recipients(&self) -> impl Iterator<Item = &EmailAddress> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }

    /// Whether the message would reach anybody at all
    pub fn has_recipients(&self) -> bool {
        self.recipients().next().is_some()
    }
}

/// Builds a [`Message`] from raw address strings
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    subject: String,
    body: String,
    content_subtype: ContentSubtype,
    html_body: Option<String>,
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    reply_to: Vec<String>,
    attachments: Vec<Attachment>,
    headers: BTreeMap<String, String>,
}

impl MessageBuilder {
    /// Set the subject
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the plain text body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set an HTML alternative to the plain text body
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    /// Set how the body is interpreted
    pub fn content_subtype(mut self, content_subtype: ContentSubtype) -> Self {
        self.content_subtype = content_subtype;
        self
    }

    /// Set the sender
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Add a primary recipient
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Add a carbon copy recipient
    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    /// Add a blind carbon copy recipient
    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    /// Add a reply-to address
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to.push(reply_to.into());
        self
    }

    /// Attach a file
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Add an extra header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Validate every address and produce the message
    pub fn build(self) -> Result<Message, MessageError> {
        let from = self.from.ok_or(MessageError::MissingSender)?;

        Ok(Message {
            subject: self.subject,
            body: self.body,
            content_subtype: self.content_subtype,
            html_body: self.html_body,
            from: parse_address("from", &from)?,
            to: parse_addresses("to", &self.to)?,
            cc: parse_addresses("cc", &self.cc)?,
            bcc: parse_addresses("bcc", &self.bcc)?,
            reply_to: parse_addresses("reply_to", &self.reply_to)?,
            attachments: self.attachments,
            headers: self.headers,
        })
    }
}

fn parse_address(field: &'static str, raw: &str) -> Result<EmailAddress, MessageError> {
    EmailAddress::new(raw).map_err(|source| MessageError::InvalidAddress {
        field,
        raw: raw.to_string(),
        source,
    })
}

fn parse_addresses(
    field: &'static str,
    raw: &[String],
) -> Result<Vec<EmailAddress>, MessageError> {
    raw.iter().map(|r| parse_address(field, r)).collect()
}
