// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use mailpane::api::rest::run_server;
use mailpane::config::Settings;
use mailpane::imap::client::TlsImapConnector;

#[derive(Parser, Debug)]
#[command(name = "mailpane-server", version, about = "Web front-end for one IMAP/SMTP account")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, env = "MAILPANE_CONFIG")]
    config: Option<String>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env has to be loaded before clap reads MAILPANE_CONFIG.
    let dotenv_result = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match Settings::new(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            exit(1);
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log.level.as_str())).init();

    match dotenv_result {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
    if settings.imap.username.is_empty() {
        warn!("IMAP_USER is not set; inbox requests will fail to authenticate");
    }
    info!("IMAP account {} at {}:{}", settings.imap.username, settings.imap.host, settings.imap.port);

    let result = run_server(settings, Arc::new(TlsImapConnector::default())).await;
    if let Err(e) = &result {
        error!("Web server failed: {}", e);
    }
    result
}
