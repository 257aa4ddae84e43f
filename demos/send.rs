use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mailersend_backend::{
    domain::communication::mailer::{Attachment, Mailer, Message},
    infrastructure::email::mailersend::{MailerSendBackend, MailerSendConfig},
};

#[derive(Debug, Parser)]
pub struct Args {
    #[clap(flatten)]
    pub mailersend: MailerSendConfig,

    #[arg(long)]
    pub from: String,

    #[arg(long, required = true)]
    pub to: Vec<String>,

    #[arg(long, default_value = "")]
    pub subject: String,

    #[arg(long, default_value = "")]
    pub body: String,

    #[arg(long)]
    pub html: Option<String>,

    #[arg(long)]
    pub attach: Vec<PathBuf>,
}

#[mutants::skip]
#[tokio::main]
pub async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut builder = args
        .to
        .iter()
        .fold(Message::builder(), |builder, to| builder.to(to.as_str()))
        .from(args.from.as_str())
        .subject(args.subject.as_str())
        .body(args.body.as_str());

    if let Some(html) = &args.html {
        builder = builder.html(html.as_str());
    }

    for path in &args.attach {
        let content =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("attachment");

        builder = builder.attachment(Attachment::new(filename, content));
    }

    let backend = MailerSendBackend::from_config(&args.mailersend)?;

    let sent = backend.send_messages(&[builder.build()?]).await?;

    println!("Sent {} message(s)", sent);

    Ok(())
}
