// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

/// Host, port and login for one mail server.
///
/// Built once from configuration and shared read-only. The same shape is
/// used for the inbound (IMAP) and outbound (SMTP) sides.
#[derive(Clone, PartialEq, Eq)]
pub struct MailboxCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub secret: String,
}

impl MailboxCredentials {
    pub fn new(host: impl Into<String>, port: u16, username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for MailboxCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Result of EXAMINE on a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxStatus {
    pub exists: u32,
}

/// Inclusive range of message sequence numbers, `first <= last`, both >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRange {
    pub first: u32,
    pub last: u32,
}

impl SequenceRange {
    /// The trailing `window` messages of a mailbox holding `total` messages.
    /// `None` for an empty mailbox or a zero window.
    pub fn newest(total: u32, window: u32) -> Option<Self> {
        if total == 0 || window == 0 {
            return None;
        }
        let first = total.saturating_sub(window - 1).max(1);
        Some(Self { first, last: total })
    }

    pub fn count(&self) -> u32 {
        self.last - self.first + 1
    }
}

impl fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAddress {
    pub mailbox: Option<String>,
    pub host: Option<String>,
}

/// Envelope fields as the server sent them (subject may still be RFC 2047 encoded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEnvelope {
    pub subject: Option<String>,
    pub from: Vec<RawAddress>,
    pub date: Option<String>,
}

/// One FETCH response, detached from the protocol library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    pub sequence: u32,
    pub uid: Option<u32>,
    pub envelope: Option<RawEnvelope>,
    pub body: Option<Vec<u8>>,
}
