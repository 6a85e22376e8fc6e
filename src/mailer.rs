//! Outbound mail transport.
//!
//! `MailTransport` is the seam between the report workflow and the actual
//! SMTP client: production uses [`SmtpMailer`] (lettre), tests substitute
//! a recording mock, and a deployment without SMTP configuration gets
//! [`DisabledMailer`] so everything except report delivery keeps working.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport is not configured (set SMTP_HOST)")]
    NotConfigured,

    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Rendered email ready for dispatch.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

pub trait MailTransport: Send + Sync {
    fn send(&self, mail: &OutgoingEmail) -> Result<(), MailError>;
}

/// STARTTLS SMTP relay on the configured port (the usual port-587 setup).
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let mut builder = SmtpTransport::starttls_relay(&config.host)?.port(config.port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: config.from_address.clone(),
        })
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, mail: &OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(mail.to.parse()?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body.clone())?;
        self.transport.send(&message)?;
        tracing::info!(to = %mail.to, subject = %mail.subject, "Report email sent");
        Ok(())
    }
}

/// Stand-in when no SMTP host is configured: report endpoints fail with a
/// delivery error, everything else is unaffected.
pub struct DisabledMailer;

impl MailTransport for DisabledMailer {
    fn send(&self, _mail: &OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}
