// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Library core for Mailpane: a small server-rendered mail client.
//!
//! The fetch path is [`services::EmailService::fetch_inbox`], built on the
//! [`imap`] transport. [`api`] is the HTTP glue around it.

pub mod api;
pub mod config;
pub mod imap;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_helpers;

pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::imap::{ImapConnector, ImapError, MailboxCredentials, TlsImapConnector};
    pub use crate::models::{FetchResult, MailboxSummary, Message};
    pub use crate::services::{EmailService, SendError, SmtpService};
}
