// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use std::time::Duration;

use actix_files::Files;
use actix_web::{middleware::Logger, web, web::Data, App, HttpServer};
use log::info;

use crate::api::handlers;
use crate::api::templates::Templates;
use crate::config::Settings;
use crate::imap::client::ImapConnector;
use crate::imap::types::MailboxCredentials;
use crate::services::{EmailService, SmtpService};

pub const APP_TITLE: &str = "Mailpane";

/// Shared, read-only handler state.
pub struct AppState {
    pub templates: Arc<Templates>,
    pub email: EmailService,
    pub smtp: SmtpService,
    pub imap_credentials: MailboxCredentials,
    pub smtp_credentials: MailboxCredentials,
    pub fetch_timeout: Duration,
    pub title: String,
}

impl AppState {
    pub fn new(settings: &Settings, connector: Arc<dyn ImapConnector>) -> Result<Self, minijinja::Error> {
        Ok(Self {
            templates: Arc::new(Templates::new()?),
            email: EmailService::new(connector),
            smtp: SmtpService::new(settings.smtp.starttls),
            imap_credentials: settings.imap_credentials(),
            smtp_credentials: settings.smtp_credentials(),
            fetch_timeout: settings.fetch_timeout(),
            title: APP_TITLE.to_string(),
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: &str) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/mails", web::get().to(handlers::mails))
        .route("/inbox", web::get().to(handlers::inbox))
        .service(
            web::resource("/send")
                .route(web::post().to(handlers::send))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .route("/get-time", web::get().to(handlers::get_time))
        .route("/health", web::get().to(handlers::health))
        .service(Files::new("/static", static_dir));
}

pub async fn run_server(settings: Settings, connector: Arc<dyn ImapConnector>) -> std::io::Result<()> {
    let (host, port) = settings.bind_address();
    let static_dir = settings.static_dir.clone();
    let app_state = Data::new(
        AppState::new(&settings, connector).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?,
    );
    info!("Starting web server at http://{}:{}", host, port);
    info!("Serving static files from {}", static_dir);

    HttpServer::new(move || {
        let static_dir = static_dir.clone();
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(move |cfg| configure_routes(cfg, &static_dir))
    })
    .bind((host, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imap::client::ImapConnector;
    use crate::imap::error::ImapError;
    use crate::imap::session::ImapSession;
    use crate::test_helpers::{connector_for, failing_connector, records, FakeSession};
    use actix_web::{http::StatusCode, test};
    use async_trait::async_trait;
    use serial_test::serial;

    fn test_settings() -> Settings {
        for var in ["IMAP_HOST", "IMAP_PORT", "IMAP_USER", "IMAP_PASS", "SMTP_USER", "FETCH_TIMEOUT_SECS"] {
            std::env::remove_var(var);
        }
        let mut settings = Settings::new(None).unwrap();
        settings.imap.username = "bob@example.org".into();
        settings.smtp.username = "bob@example.org".into();
        settings
    }

    fn state(connector: Arc<dyn ImapConnector>) -> Data<AppState> {
        Data::new(AppState::new(&test_settings(), connector).unwrap())
    }

    async fn body_of(resp: actix_web::dev::ServiceResponse) -> String {
        String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
    }

    macro_rules! app {
        ($state:expr, $dir:expr) => {
            test::init_service(
                App::new()
                    .app_data($state)
                    .configure(|cfg| configure_routes(cfg, $dir)),
            )
            .await
        };
    }

    struct StalledConnector;

    #[async_trait]
    impl ImapConnector for StalledConnector {
        async fn connect(&self, _: &MailboxCredentials) -> Result<Box<dyn ImapSession>, ImapError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(ImapError::Connection("unreachable".into()))
        }
    }

    #[actix_web::test]
    #[serial]
    async fn index_and_mails_pages_render() {
        let app = app!(state(failing_connector(ImapError::Connection("unused".into()))), "static");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_of(resp).await.contains("<title>Mailpane</title>"));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/mails").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_of(resp).await.contains("hx-get=\"/inbox\""));
    }

    #[actix_web::test]
    #[serial]
    async fn inbox_renders_newest_first() {
        let session = FakeSession::new(3).with_records(records([1, 2, 3]));
        let app = app!(state(connector_for(session)), "static");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/inbox").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_of(resp).await;
        let third = body.find("Message 3").unwrap();
        let first = body.find("Message 1").unwrap();
        assert!(third < first);
        assert!(body.contains("Sent"));
        assert!(body.contains("bob@example.org"));
    }

    #[actix_web::test]
    #[serial]
    async fn inbox_error_statuses() {
        let app = app!(state(failing_connector(ImapError::Connection("refused".into()))), "static");
        let resp = test::call_service(&app, test::TestRequest::get().uri("/inbox").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(resp).await, "Failed to fetch emails");

        let app = app!(state(failing_connector(ImapError::Auth("bad password".into()))), "static");
        let resp = test::call_service(&app, test::TestRequest::get().uri("/inbox").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    #[serial]
    async fn inbox_times_out() {
        let mut app_state = AppState::new(&test_settings(), Arc::new(StalledConnector)).unwrap();
        app_state.fetch_timeout = Duration::from_millis(50);
        let app = app!(Data::new(app_state), "static");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/inbox").to_request()).await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[actix_web::test]
    #[serial]
    async fn send_validates_form_and_method() {
        let app = app!(state(failing_connector(ImapError::Connection("unused".into()))), "static");

        let req = test::TestRequest::post()
            .uri("/send")
            .set_form([("to", "alice@example.com"), ("subject", "hi")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/send").to_request()).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let req = test::TestRequest::post()
            .uri("/send")
            .set_form([("to", "not an address"), ("subject", "hi"), ("body", "there")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(resp).await, "Failed to send email");
    }

    #[actix_web::test]
    #[serial]
    async fn time_health_and_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
        let static_dir = dir.path().to_string_lossy().to_string();
        let app = app!(state(failing_connector(ImapError::Connection("unused".into()))), &static_dir);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/get-time").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_of(resp).await.contains("class=\"time\""));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/static/style.css").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, "body {}");
    }
}
