// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! IMAP transport: connection, session commands and response streaming.

pub mod client;
pub mod error;
pub mod handoff;
pub mod session;
pub mod types;

pub use client::{ImapConnector, TlsImapConnector};
pub use error::ImapError;
pub use session::ImapSession;
pub use types::{MailboxCredentials, MailboxStatus, RawAddress, RawEnvelope, RawMessage, SequenceRange};
