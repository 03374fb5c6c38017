// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::folder::MailboxSummary;

/// A normalized message, ready for display.
///
/// `id` is the server UID. `sender` is `mailbox@host` of the first From
/// address, or empty when the envelope carries none. `timestamp` is `None`
/// when the Date header is absent or unparseable.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Outcome of one inbox fetch: up to ten newest messages, newest first,
/// plus every mailbox the account exposes.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    pub messages: Vec<Message>,
    pub mailboxes: Vec<MailboxSummary>,
}
