// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::{Credentials, Mechanism},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{debug, info};
use thiserror::Error;

use crate::imap::types::MailboxCredentials;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Email building error: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("Email sending error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Outbound mail over an authenticated, encrypted SMTP session.
#[derive(Debug, Clone)]
pub struct SmtpService {
    starttls: bool,
}

impl SmtpService {
    /// `starttls` selects STARTTLS on a plain port instead of implicit TLS.
    pub fn new(starttls: bool) -> Self {
        Self { starttls }
    }

    /// Sends one plain-text message from the SMTP account to `recipients`.
    /// No retry is attempted.
    pub async fn send_mail(
        &self,
        credentials: &MailboxCredentials,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), SendError> {
        let email = build_message(&credentials.username, recipients, subject, body)?;

        let creds = Credentials::new(credentials.username.clone(), credentials.secret.clone());
        let builder = if self.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&credentials.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&credentials.host)?
        };
        let mailer = builder
            .port(credentials.port)
            .credentials(creds)
            .authentication(vec![Mechanism::Plain, Mechanism::Login])
            .build();

        debug!(
            "Submitting message to {} via {} (starttls: {})",
            recipients.join(", "),
            credentials.address(),
            self.starttls
        );
        mailer.send(email).await?;
        info!("Sent message to {} recipient(s)", recipients.len());
        Ok(())
    }
}

/// Builds the outgoing message: From, To, Subject, UTF-8 plain-text body.
pub fn build_message(from: &str, recipients: &[String], subject: &str, body: &str) -> Result<Message, SendError> {
    if recipients.is_empty() {
        return Err(SendError::InvalidAddress("no recipients".to_string()));
    }

    let from_mailbox = parse_mailbox(from)?;
    let mut builder = Message::builder().from(from_mailbox).subject(subject);
    for recipient in recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    Ok(builder.header(ContentType::TEXT_PLAIN).body(body.to_string())?)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SendError> {
    address
        .trim()
        .parse()
        .map_err(|e| SendError::InvalidAddress(format!("{}: {}", address, e)))
}
