// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use actix_web::{http::header, web, HttpResponse};
use chrono::{DateTime, Datelike, Local, Utc};
use log::{error, info};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::api::errors::ApiError;
use crate::api::rest::AppState;
use crate::api::templates::{INBOX_PARTIAL, INDEX_PAGE, MAILS_PAGE, TIME_PARTIAL};
use crate::imap::error::ImapError;
use crate::models::email::Message;
use crate::models::folder::MailboxSummary;

/// DD/MM/YYYY HH:MM:SS
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
pub const CLOCK_FORMAT: &str = "%H:%M:%S %Z";

/// One message row of the inbox partial.
#[derive(Debug, Serialize)]
struct MailView<'a> {
    id: u32,
    subject: &'a str,
    sender: &'a str,
    body: &'a str,
    date: String,
}

impl<'a> From<&'a Message> for MailView<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            id: message.id,
            subject: &message.subject,
            sender: &message.sender,
            body: &message.body,
            date: message.timestamp.map(display_date).unwrap_or_default(),
        }
    }
}

/// One mailbox entry of the inbox partial.
#[derive(Debug, Serialize)]
struct MailboxView<'a> {
    name: &'a str,
    selectable: bool,
}

impl<'a> From<&'a MailboxSummary> for MailboxView<'a> {
    fn from(mailbox: &'a MailboxSummary) -> Self {
        Self {
            name: &mailbox.name,
            selectable: mailbox.is_selectable(),
        }
    }
}

fn display_date(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format(DISPLAY_DATE_FORMAT).to_string()
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

fn render_page(state: &AppState, template: &str, path: &str) -> Result<HttpResponse, ApiError> {
    let page = state.templates.render(
        template,
        context! { title => &state.title, year => Local::now().year(), path => path },
    )?;
    Ok(html(page))
}

pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    render_page(&state, INDEX_PAGE, "index")
}

pub async fn mails(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    render_page(&state, MAILS_PAGE, "mails")
}

/// Fetches the inbox under the configured deadline and renders the partial.
pub async fn inbox(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let account = &state.imap_credentials;
    let fetched = match timeout(state.fetch_timeout, state.email.fetch_inbox(account)).await {
        Ok(Ok(fetched)) => fetched,
        Ok(Err(err @ ImapError::Auth(_))) => {
            error!("IMAP authentication failed for account {} at {}: {}", account.username, account.address(), err);
            return Err(err.into());
        }
        Ok(Err(err)) => {
            error!("Error fetching mails: {}", err);
            return Err(err.into());
        }
        Err(_) => {
            error!("Fetching mails from {} exceeded {:?}", account.address(), state.fetch_timeout);
            return Err(ApiError::Timeout);
        }
    };

    let mailboxes: Vec<MailboxView<'_>> = fetched.mailboxes.iter().map(MailboxView::from).collect();
    let mails: Vec<MailView<'_>> = fetched.messages.iter().map(MailView::from).collect();
    let body = state
        .templates
        .render(INBOX_PARTIAL, context! { mailboxes => mailboxes, mails => mails })?;
    Ok(html(body))
}

#[derive(Debug, Deserialize)]
pub struct SendForm {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

/// Splits a comma-separated recipient field.
pub fn parse_recipients(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn send(state: web::Data<AppState>, form: web::Form<SendForm>) -> Result<HttpResponse, ApiError> {
    let (Some(to), Some(subject), Some(body)) = (required(&form.to), required(&form.subject), required(&form.body))
    else {
        return Err(ApiError::MissingFields);
    };

    let recipients = parse_recipients(to);
    if let Err(err) = state
        .smtp
        .send_mail(&state.smtp_credentials, &recipients, subject.trim(), body)
        .await
    {
        error!("Error sending email: {}", err);
        return Err(err.into());
    }

    info!("Email sent to {}", recipients.join(", "));
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/inbox"))
        .finish())
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().body("Method not allowed")
}

pub async fn get_time(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let now = Local::now().format(CLOCK_FORMAT).to_string();
    Ok(html(state.templates.render(TIME_PARTIAL, context! { time => now })?))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
