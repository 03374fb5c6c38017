// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns protocol records into display-ready [`Message`]s.

use chrono::{DateTime, Utc};
use mail_parser::Message as ParsedMessage;
use thiserror::Error;

use crate::imap::types::{RawAddress, RawMessage};
use crate::models::email::Message;
use crate::utils::mime_decoder::decode_mime_header;

/// Why a record was left out of the result. Never fatal to the fetch.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[error("record carries no UID")]
    MissingUid,
    #[error("record carries no body section")]
    MissingBody,
    #[error("body section is not a readable message")]
    UnreadableBody,
}

pub fn normalize(raw: RawMessage) -> Result<Message, SkipReason> {
    let id = raw.uid.ok_or(SkipReason::MissingUid)?;
    let bytes = raw.body.as_deref().ok_or(SkipReason::MissingBody)?;
    let body = body_text(bytes)?;

    let envelope = raw.envelope.unwrap_or_default();
    Ok(Message {
        id,
        subject: envelope
            .subject
            .map(|s| decode_mime_header(&s).trim().to_string())
            .unwrap_or_default(),
        sender: envelope.from.first().map(format_sender).unwrap_or_default(),
        body,
        timestamp: envelope.date.as_deref().and_then(parse_date),
    })
}

fn body_text(bytes: &[u8]) -> Result<String, SkipReason> {
    let parsed = ParsedMessage::parse(bytes).ok_or(SkipReason::UnreadableBody)?;
    // body_text falls back to the HTML part rendered as text. Without any
    // text part the raw section is shown as-is.
    let text = parsed
        .body_text(0)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).trim().to_string());
    Ok(text)
}

fn format_sender(address: &RawAddress) -> String {
    match (address.mailbox.as_deref(), address.host.as_deref()) {
        (Some(mailbox), Some(host)) => format!("{mailbox}@{host}"),
        (Some(mailbox), None) => mailbox.to_string(),
        _ => String::new(),
    }
}

/// RFC 2822 date, with or without a trailing `(comment)` such as `(UTC)`.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    let without_comment = match trimmed.rfind('(') {
        Some(idx) if trimmed.ends_with(')') => trimmed[..idx].trim_end(),
        _ => trimmed,
    };
    DateTime::parse_from_rfc2822(without_comment)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
