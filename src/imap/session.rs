// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use async_imap::types::{Fetch, Name, NameAttribute};
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use log::debug;
use tokio::net::TcpStream as TokioTcpStream;
use tokio_rustls::client::TlsStream as TokioTlsStreamClient;
use tokio_util::compat::Compat;

use crate::imap::error::ImapError;
use crate::imap::types::{MailboxStatus, RawAddress, RawEnvelope, RawMessage, SequenceRange};
use crate::models::folder::MailboxSummary;

// Concrete stream stack: TCP -> rustls -> futures-io compat for async_imap.
pub type TlsCompatibleStream = Compat<TokioTlsStreamClient<TokioTcpStream>>;
pub type TlsImapSession = async_imap::Session<TlsCompatibleStream>;

/// Items of a LIST or FETCH response, in server order.
pub type RecordStream<'a, T> = BoxStream<'a, Result<T, ImapError>>;

/// Mailbox pattern matching every mailbox at any depth.
pub const LIST_ALL_PATTERN: &str = "*";

/// Data items requested for each message. PEEK keeps `\Seen` untouched.
pub const FETCH_QUERY: &str = "(UID ENVELOPE BODY.PEEK[])";

/// Operations the fetch path needs from an authenticated session.
///
/// Streams borrow the session, so a stream has to be drained or dropped
/// before the next command is issued.
#[async_trait]
pub trait ImapSession: Send {
    /// LIST "" "*".
    async fn list_mailboxes<'a>(&'a mut self) -> Result<RecordStream<'a, MailboxSummary>, ImapError>;

    /// Read-only select.
    async fn examine(&mut self, mailbox: &str) -> Result<MailboxStatus, ImapError>;

    /// FETCH by sequence numbers.
    async fn fetch<'a>(&'a mut self, range: SequenceRange) -> Result<RecordStream<'a, RawMessage>, ImapError>;

    async fn logout(&mut self) -> Result<(), ImapError>;
}

/// [`ImapSession`] backed by an `async_imap` session over TLS.
pub struct AsyncImapSessionWrapper {
    session: TlsImapSession,
}

impl AsyncImapSessionWrapper {
    pub fn new(session: TlsImapSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ImapSession for AsyncImapSessionWrapper {
    async fn list_mailboxes<'a>(&'a mut self) -> Result<RecordStream<'a, MailboxSummary>, ImapError> {
        debug!("LIST \"\" \"{}\"", LIST_ALL_PATTERN);
        let names = self.session.list(Some(""), Some(LIST_ALL_PATTERN)).await?;
        Ok(names
            .map(|item| item.map(|name| mailbox_summary(&name)).map_err(ImapError::from))
            .boxed())
    }

    async fn examine(&mut self, mailbox: &str) -> Result<MailboxStatus, ImapError> {
        debug!("EXAMINE {}", mailbox);
        let status = self.session.examine(mailbox).await?;
        Ok(MailboxStatus { exists: status.exists })
    }

    async fn fetch<'a>(&'a mut self, range: SequenceRange) -> Result<RecordStream<'a, RawMessage>, ImapError> {
        debug!("FETCH {} {}", range, FETCH_QUERY);
        let fetches = self.session.fetch(range.to_string(), FETCH_QUERY).await?;
        Ok(fetches
            .map(|item| item.map(|fetch| raw_message(&fetch)).map_err(ImapError::from))
            .boxed())
    }

    async fn logout(&mut self) -> Result<(), ImapError> {
        self.session.logout().await.map_err(ImapError::from)
    }
}

fn mailbox_summary(name: &Name) -> MailboxSummary {
    MailboxSummary {
        name: name.name().to_string(),
        attributes: name.attributes().iter().map(attribute_label).collect(),
    }
}

fn attribute_label(attribute: &NameAttribute<'_>) -> String {
    match attribute {
        NameAttribute::NoInferiors => "\\Noinferiors".to_string(),
        NameAttribute::NoSelect => "\\Noselect".to_string(),
        NameAttribute::Marked => "\\Marked".to_string(),
        NameAttribute::Unmarked => "\\Unmarked".to_string(),
        NameAttribute::Extension(label) => label.to_string(),
        other => format!("\\{:?}", other),
    }
}

fn lossy(bytes: Option<&[u8]>) -> Option<String> {
    bytes.map(|b| String::from_utf8_lossy(b).into_owned())
}

fn raw_message(fetch: &Fetch) -> RawMessage {
    let envelope = fetch.envelope().map(|env| RawEnvelope {
        subject: lossy(env.subject.as_deref()),
        date: lossy(env.date.as_deref()),
        from: env
            .from
            .as_ref()
            .map(|addresses| {
                addresses
                    .iter()
                    .map(|addr| RawAddress {
                        mailbox: lossy(addr.mailbox.as_deref()),
                        host: lossy(addr.host.as_deref()),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    });

    RawMessage {
        sequence: fetch.message,
        uid: fetch.uid,
        envelope,
        body: fetch.body().map(<[u8]>::to_vec),
    }
}
