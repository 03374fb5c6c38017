// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Test helpers: a scripted IMAP session and record builders.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use crate::imap::client::{ImapConnector, MockImapConnector};
use crate::imap::error::ImapError;
use crate::imap::session::{ImapSession, RecordStream};
use crate::imap::types::{MailboxStatus, RawAddress, RawEnvelope, RawMessage, SequenceRange};
use crate::models::folder::MailboxSummary;

/// Session that replays scripted responses and records every command.
#[derive(Clone)]
pub struct FakeSession {
    pub mailboxes: Vec<Result<MailboxSummary, ImapError>>,
    pub examine: Result<u32, ImapError>,
    pub records: Vec<Result<RawMessage, ImapError>>,
    pub logout: Result<(), ImapError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSession {
    pub fn new(exists: u32) -> Self {
        Self {
            mailboxes: vec![Ok(MailboxSummary::new("INBOX")), Ok(MailboxSummary::new("Sent"))],
            examine: Ok(exists),
            records: Vec::new(),
            logout: Ok(()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_records(mut self, records: Vec<Result<RawMessage, ImapError>>) -> Self {
        self.records = records;
        self
    }

    /// Commands issued so far, across every clone of this session.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ImapSession for FakeSession {
    async fn list_mailboxes<'a>(&'a mut self) -> Result<RecordStream<'a, MailboxSummary>, ImapError> {
        self.log("LIST".into());
        Ok(stream::iter(self.mailboxes.clone()).boxed())
    }

    async fn examine(&mut self, mailbox: &str) -> Result<MailboxStatus, ImapError> {
        self.log(format!("EXAMINE {mailbox}"));
        self.examine.clone().map(|exists| MailboxStatus { exists })
    }

    async fn fetch<'a>(&'a mut self, range: SequenceRange) -> Result<RecordStream<'a, RawMessage>, ImapError> {
        self.log(format!("FETCH {range}"));
        Ok(stream::iter(self.records.clone()).boxed())
    }

    async fn logout(&mut self) -> Result<(), ImapError> {
        self.log("LOGOUT".into());
        self.logout.clone()
    }
}

/// Connector handing out clones of `session`, expected to be called once.
pub fn connector_for(session: FakeSession) -> Arc<dyn ImapConnector> {
    let mut connector = MockImapConnector::new();
    connector
        .expect_connect()
        .times(1)
        .returning(move |_| Ok(Box::new(session.clone()) as Box<dyn ImapSession>));
    Arc::new(connector)
}

pub fn failing_connector(err: ImapError) -> Arc<dyn ImapConnector> {
    let mut connector = MockImapConnector::new();
    connector.expect_connect().returning(move |_| Err(err.clone()));
    Arc::new(connector)
}

/// A well-formed record whose UID is `1000 + sequence`.
pub fn record(sequence: u32) -> RawMessage {
    RawMessage {
        sequence,
        uid: Some(1000 + sequence),
        envelope: Some(RawEnvelope {
            subject: Some(format!("Message {sequence}")),
            from: vec![RawAddress {
                mailbox: Some("bob".into()),
                host: Some("example.org".into()),
            }],
            date: Some("Mon, 3 Mar 2025 09:15:00 +0000".into()),
        }),
        body: Some(format!("Subject: Message {sequence}\r\n\r\nbody {sequence}\r\n").into_bytes()),
    }
}

pub fn records(sequences: impl IntoIterator<Item = u32>) -> Vec<Result<RawMessage, ImapError>> {
    sequences.into_iter().map(|s| Ok(record(s))).collect()
}
