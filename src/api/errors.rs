// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mapping of service failures onto HTTP responses.
//!
//! Bodies are short plain-text messages; details go to the log, not the
//! client.

use actix_web::{error::ResponseError, http::header::ContentType, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::imap::error::ImapError;
use crate::services::smtp::SendError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection or protocol failure while fetching.
    #[error("Failed to fetch emails")]
    Fetch(#[source] ImapError),

    /// The mail server rejected the configured account.
    #[error("Mail server rejected the configured account")]
    Auth(#[source] ImapError),

    #[error("Timed out fetching emails")]
    Timeout,

    #[error("Failed to send email")]
    Send(#[from] SendError),

    #[error("Missing required fields")]
    MissingFields,

    #[error("Internal Server Error")]
    Template(#[from] minijinja::Error),
}

impl From<ImapError> for ApiError {
    fn from(err: ImapError) -> Self {
        match err {
            ImapError::Auth(_) => ApiError::Auth(err),
            other => ApiError::Fetch(other),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Fetch(_) | ApiError::Send(_) | ApiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::MissingFields => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}
