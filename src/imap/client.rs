// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use std::time::Duration;

use async_imap::Client as AsyncImapClient;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use rustls_pki_types::ServerName as PkiServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream as TokioTcpStream;
use tokio::time::timeout;
use tokio_rustls::{client::TlsStream as TokioTlsStreamClient, TlsConnector};
use tokio_util::compat::TokioAsyncReadCompatExt;

#[cfg(test)]
use mockall::automock;

use crate::imap::error::ImapError;
use crate::imap::session::{AsyncImapSessionWrapper, ImapSession, TlsCompatibleStream, TlsImapSession};
use crate::imap::types::MailboxCredentials;

/// Upper bound on the LOGIN exchange.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens authenticated sessions.
///
/// Fails with [`ImapError::Connection`] when the server cannot be reached or
/// the TLS handshake fails, and with [`ImapError::Auth`] when the credentials
/// are rejected. A connection whose login fails is closed before returning.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImapConnector: Send + Sync {
    async fn connect(&self, credentials: &MailboxCredentials) -> Result<Box<dyn ImapSession>, ImapError>;
}

/// Connector for IMAP over implicit TLS, verified against the platform roots.
#[derive(Debug, Clone)]
pub struct TlsImapConnector {
    login_timeout: Duration,
}

impl TlsImapConnector {
    pub fn new(login_timeout: Duration) -> Self {
        Self { login_timeout }
    }
}

impl Default for TlsImapConnector {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_TIMEOUT)
    }
}

#[async_trait]
impl ImapConnector for TlsImapConnector {
    async fn connect(&self, credentials: &MailboxCredentials) -> Result<Box<dyn ImapSession>, ImapError> {
        info!("Connecting to IMAP server {}", credentials.address());
        let session = connect_and_login_internal(credentials, self.login_timeout).await?;
        Ok(Box::new(AsyncImapSessionWrapper::new(session)))
    }
}

// --- Internal Connection Logic ---

fn build_tls_connector() -> Result<TlsConnector, ImapError> {
    let mut root_cert_store = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs()?;
    let (added, ignored) = root_cert_store.add_parsable_certificates(certs);
    debug!("Loaded {} native certs, ignored {}.", added, ignored);
    if root_cert_store.is_empty() {
        warn!("Root certificate store is empty after loading native certs.");
    }

    let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| ImapError::Connection(format!("TLS configuration failed: {}", e)))?
        .with_root_certificates(root_cert_store)
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Establishes TCP connection and performs the TLS handshake.
async fn setup_tls_stream(
    host: &str,
    port: u16,
    tls_connector: TlsConnector,
    server_name: PkiServerName<'static>,
) -> Result<TokioTlsStreamClient<TokioTcpStream>, ImapError> {
    debug!("Attempting TCP connection to {}:{}...", host, port);
    let tcp_stream = TokioTcpStream::connect((host, port)).await?;
    debug!("TCP connected. Performing TLS handshake...");

    let tls_stream = tls_connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| ImapError::Connection(format!("TLS handshake with {} failed: {}", host, e)))?;
    debug!("TLS handshake successful.");
    Ok(tls_stream)
}

/// Performs IMAP LOGIN. On rejection the unauthenticated client is dropped,
/// which closes the socket.
async fn perform_imap_login(
    compat_stream: TlsCompatibleStream,
    username: &str,
    secret: &str,
    timeout_duration: Duration,
) -> Result<TlsImapSession, ImapError> {
    let client = AsyncImapClient::new(compat_stream);
    debug!("IMAP client created. Attempting login for user '{}'...", username);

    match timeout(timeout_duration, client.login(username, secret)).await {
        Ok(Ok(session)) => {
            info!("IMAP login successful for user: {}", username);
            Ok(session)
        }
        Ok(Err((async_imap::error::Error::Io(e), _client))) => {
            error!("IMAP connection dropped during login for user {}: {}", username, e);
            Err(ImapError::Connection(e.to_string()))
        }
        Ok(Err((e, _client))) => {
            error!("IMAP login rejected for user {}: {}", username, e);
            Err(ImapError::Auth(e.to_string()))
        }
        Err(_elapsed) => {
            error!("IMAP login timed out for user {} after {:?}", username, timeout_duration);
            Err(ImapError::Connection("Login timed out".to_string()))
        }
    }
}

async fn connect_and_login_internal(
    credentials: &MailboxCredentials,
    timeout_duration: Duration,
) -> Result<TlsImapSession, ImapError> {
    let server_name = PkiServerName::try_from(credentials.host.clone())
        .map_err(|_| ImapError::Connection(format!("Invalid server name format: {}", credentials.host)))?;

    let tls_connector = build_tls_connector()?;
    let tls_stream = setup_tls_stream(&credentials.host, credentials.port, tls_connector, server_name).await?;

    perform_imap_login(tls_stream.compat(), &credentials.username, &credentials.secret, timeout_duration).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_host_name_is_a_connection_error() {
        let connector = TlsImapConnector::default();
        let creds = MailboxCredentials::new("not a host name", 993, "user", "secret");
        let err = connector.connect(&creds).await.err().unwrap();
        assert_eq!(err.kind(), "connection");
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        // Bind and drop a listener to get a local port nobody is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connector = TlsImapConnector::new(Duration::from_secs(2));
        let creds = MailboxCredentials::new("localhost", port, "user", "secret");
        let err = connector.connect(&creds).await.err().unwrap();
        assert!(matches!(err, ImapError::Connection(_)), "unexpected error: {err}");
    }
}
