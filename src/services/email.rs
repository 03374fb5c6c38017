// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::imap::client::ImapConnector;
use crate::imap::error::ImapError;
use crate::imap::handoff::{drain, STREAM_BUFFER};
use crate::imap::session::ImapSession;
use crate::imap::types::{MailboxCredentials, SequenceRange};
use crate::models::email::{FetchResult, Message};
use crate::services::normalizer::normalize;

/// Number of newest messages returned by a fetch.
pub const FETCH_WINDOW: u32 = 10;

pub const INBOX: &str = "INBOX";

/// Fetches the newest inbox messages over a fresh connection per call.
#[derive(Clone)]
pub struct EmailService {
    connector: Arc<dyn ImapConnector>,
}

impl EmailService {
    pub fn new(connector: Arc<dyn ImapConnector>) -> Self {
        Self { connector }
    }

    /// Connects, lists every mailbox, and returns up to [`FETCH_WINDOW`]
    /// newest inbox messages, newest first.
    ///
    /// Records that cannot be identified or whose body is missing or
    /// unreadable are skipped with a warning. Any stream failure aborts the
    /// whole call. Once the session is open it is logged out on every path.
    pub async fn fetch_inbox(&self, credentials: &MailboxCredentials) -> Result<FetchResult, ImapError> {
        let mut session = self.connector.connect(credentials).await?;

        let result = fetch_with_session(&mut *session).await;

        if let Err(e) = session.logout().await {
            warn!("IMAP logout failed for {}: {}", credentials.username, e);
        }

        match &result {
            Ok(fetched) => info!(
                "Fetched {} messages and {} mailboxes for {}",
                fetched.messages.len(),
                fetched.mailboxes.len(),
                credentials.username
            ),
            Err(e) => warn!("Inbox fetch for {} failed ({}): {}", credentials.username, e.kind(), e),
        }
        result
    }
}

async fn fetch_with_session(session: &mut dyn ImapSession) -> Result<FetchResult, ImapError> {
    let listing = session.list_mailboxes().await.map_err(|e| e.during("LIST"))?;
    let mailboxes = drain(listing, STREAM_BUFFER, Some)
        .await
        .map_err(|e| e.during("LIST"))?;
    debug!("LIST returned {} mailboxes", mailboxes.len());

    let status = session.examine(INBOX).await.map_err(|e| e.during("EXAMINE INBOX"))?;

    let Some(range) = SequenceRange::newest(status.exists, FETCH_WINDOW) else {
        debug!("{} is empty", INBOX);
        return Ok(FetchResult {
            messages: Vec::new(),
            mailboxes,
        });
    };

    let records = session.fetch(range).await.map_err(|e| e.during("FETCH"))?;
    let mut numbered = drain(records, STREAM_BUFFER, |raw| {
        let sequence = raw.sequence;
        match normalize(raw) {
            Ok(message) => Some((sequence, message)),
            Err(reason) => {
                warn!("Skipping message {}: {}", sequence, reason);
                None
            }
        }
    })
    .await
    .map_err(|e| e.during("FETCH"))?;

    numbered.sort_by(|a, b| b.0.cmp(&a.0));
    let messages: Vec<Message> = numbered.into_iter().map(|(_, message)| message).collect();

    Ok(FetchResult { messages, mailboxes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{connector_for, failing_connector, record, records, FakeSession};
    use crate::models::folder::MailboxSummary;

    fn service_for(session: FakeSession) -> EmailService {
        EmailService::new(connector_for(session))
    }

    fn creds() -> MailboxCredentials {
        MailboxCredentials::new("imap.example.org", 993, "bob", "pw")
    }

    #[tokio::test]
    async fn empty_inbox_returns_mailboxes_and_no_messages() {
        let session = FakeSession::new(0);
        let result = service_for(session.clone()).fetch_inbox(&creds()).await.unwrap();

        assert!(result.messages.is_empty());
        assert_eq!(result.mailboxes, vec![MailboxSummary::new("INBOX"), MailboxSummary::new("Sent")]);
        assert_eq!(session.calls(), vec!["LIST", "EXAMINE INBOX", "LOGOUT"]);
    }

    #[tokio::test]
    async fn three_messages_come_back_newest_first() {
        let session = FakeSession::new(3).with_records(records([1, 2, 3]));
        let result = service_for(session.clone()).fetch_inbox(&creds()).await.unwrap();

        let ids: Vec<u32> = result.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1003, 1002, 1001]);
        assert!(session.calls().contains(&"FETCH 1:3".to_string()));
    }

    #[tokio::test]
    async fn large_inbox_fetches_trailing_window_in_descending_order() {
        // Arrival order deliberately scrambled.
        let session = FakeSession::new(25).with_records(records([20, 16, 25, 17, 18, 24, 19, 21, 23, 22]));
        let result = service_for(session.clone()).fetch_inbox(&creds()).await.unwrap();

        let ids: Vec<u32> = result.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, (16..=25).rev().map(|s| 1000 + s).collect::<Vec<_>>());
        assert!(session.calls().contains(&"FETCH 16:25".to_string()));
        assert_eq!(result.messages[0].subject, "Message 25");
        assert_eq!(result.messages[0].sender, "bob@example.org");
    }

    #[tokio::test]
    async fn bad_records_are_skipped_without_aborting() {
        let mut no_body = record(2);
        no_body.body = None;
        let mut no_uid = record(3);
        no_uid.uid = None;
        let mut no_sender = record(4);
        no_sender.envelope.as_mut().unwrap().from.clear();
        let mut unreadable = record(5);
        unreadable.body = Some(Vec::new());

        let session = FakeSession::new(6).with_records(vec![
            Ok(record(1)),
            Ok(no_body),
            Ok(no_uid),
            Ok(no_sender),
            Ok(unreadable),
            Ok(record(6)),
        ]);
        let result = service_for(session).fetch_inbox(&creds()).await.unwrap();

        let ids: Vec<u32> = result.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1006, 1004, 1001]);
        assert_eq!(result.messages[1].sender, "");
    }

    #[tokio::test]
    async fn rejected_login_fails_before_listing() {
        let service = EmailService::new(failing_connector(ImapError::Auth("AUTHENTICATIONFAILED".into())));

        let err = service.fetch_inbox(&creds()).await.unwrap_err();
        assert!(matches!(err, ImapError::Auth(_)));
    }

    #[tokio::test]
    async fn examine_failure_is_a_protocol_error_and_logs_out() {
        let mut session = FakeSession::new(0);
        session.examine = Err(ImapError::Connection("reset by peer".into()));
        let err = service_for(session.clone()).fetch_inbox(&creds()).await.unwrap_err();

        assert_eq!(err, ImapError::Protocol("EXAMINE INBOX: reset by peer".into()));
        assert_eq!(session.calls(), vec!["LIST", "EXAMINE INBOX", "LOGOUT"]);
    }

    #[tokio::test]
    async fn listing_failure_is_a_protocol_error() {
        let mut session = FakeSession::new(3);
        session.mailboxes = vec![Ok(MailboxSummary::new("INBOX")), Err(ImapError::Protocol("BAD LIST".into()))];
        let err = service_for(session.clone()).fetch_inbox(&creds()).await.unwrap_err();

        assert!(matches!(err, ImapError::Protocol(_)));
        assert_eq!(session.calls(), vec!["LIST", "LOGOUT"]);
    }

    #[tokio::test]
    async fn fetch_stream_error_discards_partial_results_and_logs_out_once() {
        let mut script = records([8, 9]);
        script.push(Err(ImapError::Connection("connection closed".into())));
        script.push(Ok(record(10)));
        let session = FakeSession::new(10).with_records(script);

        let err = service_for(session.clone()).fetch_inbox(&creds()).await.unwrap_err();

        assert!(matches!(err, ImapError::Protocol(_)));
        let logouts = session.calls().iter().filter(|c| *c == "LOGOUT").count();
        assert_eq!(logouts, 1);
    }

    #[tokio::test]
    async fn logout_failure_does_not_mask_success() {
        let mut session = FakeSession::new(1).with_records(records([1]));
        session.logout = Err(ImapError::Connection("already closed".into()));
        let result = service_for(session).fetch_inbox(&creds()).await.unwrap();
        assert_eq!(result.messages.len(), 1);
    }
}
