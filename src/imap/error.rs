// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Failures of an inbound mailbox session.
///
/// The three variants are the whole taxonomy the fetch path reports: the
/// presentation layer decides how each one is shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImapError {
    /// Dial, TLS handshake, or socket failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected the credentials.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A command or response stream failed after the session was established.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl ImapError {
    /// Reclassifies a failure raised by `operation` on an authenticated session.
    ///
    /// Once logged in, a broken socket during SELECT or FETCH is reported the
    /// same way as a server-side NO/BAD: the operation failed.
    pub fn during(self, operation: &str) -> Self {
        let detail = match self {
            ImapError::Connection(msg) | ImapError::Auth(msg) | ImapError::Protocol(msg) => msg,
        };
        ImapError::Protocol(format!("{operation}: {detail}"))
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ImapError::Connection(_) => "connection",
            ImapError::Auth(_) => "auth",
            ImapError::Protocol(_) => "protocol",
        }
    }
}

impl From<async_imap::error::Error> for ImapError {
    fn from(err: async_imap::error::Error) -> Self {
        match err {
            async_imap::error::Error::Io(e) => ImapError::Connection(e.to_string()),
            async_imap::error::Error::No(msg) => ImapError::Protocol(format!("NO {msg}")),
            async_imap::error::Error::Bad(msg) => ImapError::Protocol(format!("BAD {msg}")),
            other => ImapError::Protocol(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ImapError {
    fn from(err: std::io::Error) -> Self {
        ImapError::Connection(err.to_string())
    }
}
