use std::fmt;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use super::{LeadNotifier, NotifyError, OutboundEmail};
use crate::config::MailConfig;

/// SMTP relay transport authenticated with the configured account.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|err| NotifyError::Transport(err.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            host: config.host.clone(),
        })
    }

    /// Probe the relay once and log the result.
    pub async fn verify_connection(&self) {
        match self.transport.test_connection().await {
            Ok(true) => info!(host = %self.host, "mail server ready to send messages"),
            Ok(false) => warn!(host = %self.host, "mail server refused the connection probe"),
            Err(err) => warn!(host = %self.host, error = %err, "mail configuration error"),
        }
    }

    fn build_message(&self, email: OutboundEmail) -> Result<Message, NotifyError> {
        let to = parse_mailbox(&email.to)?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|err| NotifyError::Message(err.to_string()))
    }
}

impl LeadNotifier for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotifyError> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| NotifyError::Transport(err.to_string()))
    }
}

/// Notifier selected at startup: SMTP when credentials are configured, otherwise disabled.
#[derive(Debug)]
pub enum Mailer {
    Smtp(SmtpMailer),
    Disabled,
}

impl Mailer {
    pub fn from_config(config: Option<&MailConfig>) -> Result<Self, NotifyError> {
        match config {
            Some(config) => SmtpMailer::from_config(config).map(Mailer::Smtp),
            None => Ok(Mailer::Disabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Mailer::Smtp(_))
    }
}

impl LeadNotifier for Mailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotifyError> {
        match self {
            Mailer::Smtp(mailer) => mailer.send(email).await,
            Mailer::Disabled => Err(NotifyError::Disabled),
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|err| NotifyError::Address {
        address: address.to_string(),
        reason: err.to_string(),
    })
}
