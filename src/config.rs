// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::env;
use std::time::Duration;

use config::{Environment, File};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::imap::types::MailboxCredentials;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// STARTTLS on a plain port instead of implicit TLS.
    pub starttls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub imap: ImapConfig,
    pub smtp: SmtpConfig,
    pub log: LogConfig,
    pub static_dir: String,
    /// Deadline for one inbox fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load or parse configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Values like `imap.password` must never end up in logs.
impl std::fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("starttls", &self.starttls)
            .finish_non_exhaustive()
    }
}

enum OverrideKind {
    Text,
    Port,
    Flag,
    Seconds,
}

// e.g. `IMAP_HOST=...` overrides `imap.host`
const DIRECT_OVERRIDES: &[(&str, &str, OverrideKind)] = &[
    ("IMAP_HOST", "imap.host", OverrideKind::Text),
    ("IMAP_PORT", "imap.port", OverrideKind::Port),
    ("IMAP_USER", "imap.username", OverrideKind::Text),
    ("IMAP_PASS", "imap.password", OverrideKind::Text),
    ("SMTP_HOST", "smtp.host", OverrideKind::Text),
    ("SMTP_PORT", "smtp.port", OverrideKind::Port),
    ("SMTP_USER", "smtp.username", OverrideKind::Text),
    ("SMTP_PASS", "smtp.password", OverrideKind::Text),
    ("SMTP_STARTTLS", "smtp.starttls", OverrideKind::Flag),
    ("SERVER_HOST", "server.host", OverrideKind::Text),
    ("SERVER_PORT", "server.port", OverrideKind::Port),
    ("STATIC_DIR", "static_dir", OverrideKind::Text),
    ("FETCH_TIMEOUT_SECS", "fetch_timeout_secs", OverrideKind::Seconds),
];

impl Settings {
    /// Layers, lowest precedence first: built-in defaults, the optional
    /// config file, `MAILPANE_`-prefixed variables (`MAILPANE_SMTP__PORT`),
    /// then the direct variables in `DIRECT_OVERRIDES`.
    pub fn new(config_path: Option<&str>) -> Result<Self, SettingsError> {
        let mut config_builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("imap.host", "localhost")?
            .set_default("imap.port", 993)?
            .set_default("imap.username", "")?
            .set_default("imap.password", "")?
            .set_default("smtp.host", "localhost")?
            .set_default("smtp.port", 465)?
            .set_default("smtp.username", "")?
            .set_default("smtp.password", "")?
            .set_default("smtp.starttls", false)?
            .set_default("log.level", "info")?
            .set_default("static_dir", "static")?
            .set_default("fetch_timeout_secs", 60)?;

        if let Some(path) = config_path {
            config_builder = config_builder.add_source(File::with_name(path));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("MAILPANE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .ignore_empty(true),
        );

        for (env_var, key, kind) in DIRECT_OVERRIDES {
            let Ok(value) = env::var(env_var) else { continue };
            config_builder = match kind {
                OverrideKind::Text => config_builder.set_override(*key, value)?,
                OverrideKind::Port => match value.parse::<u16>() {
                    Ok(port) => config_builder.set_override(*key, port)?,
                    Err(_) => {
                        warn!("Invalid port value in {}: {}", env_var, value);
                        config_builder
                    }
                },
                OverrideKind::Flag => match value.parse::<bool>() {
                    Ok(flag) => config_builder.set_override(*key, flag)?,
                    Err(_) => {
                        warn!("Invalid boolean value in {}: {}", env_var, value);
                        config_builder
                    }
                },
                OverrideKind::Seconds => match value.parse::<u64>() {
                    Ok(secs) => config_builder.set_override(*key, secs)?,
                    Err(_) => {
                        warn!("Invalid number of seconds in {}: {}", env_var, value);
                        config_builder
                    }
                },
            };
        }

        let settings: Settings = config_builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.fetch_timeout_secs == 0 {
            return Err(SettingsError::Invalid("fetch_timeout_secs must be positive".into()));
        }
        if self.imap.host.trim().is_empty() {
            return Err(SettingsError::Invalid("imap.host is empty".into()));
        }
        if self.smtp.host.trim().is_empty() {
            return Err(SettingsError::Invalid("smtp.host is empty".into()));
        }
        Ok(())
    }

    pub fn imap_credentials(&self) -> MailboxCredentials {
        MailboxCredentials::new(
            self.imap.host.clone(),
            self.imap.port,
            self.imap.username.clone(),
            self.imap.password.clone(),
        )
    }

    pub fn smtp_credentials(&self) -> MailboxCredentials {
        MailboxCredentials::new(
            self.smtp.host.clone(),
            self.smtp.port,
            self.smtp.username.clone(),
            self.smtp.password.clone(),
        )
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
