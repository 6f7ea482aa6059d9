//! High-level client: open and authenticate in one call.

use crate::config::ConnectionConfig;
use crate::error::{ObsError, Result};
use crate::protocol::{authenticate_with, AuthOutcome, AuthenticatedSession, Confirmation};
use crate::transport::{Session, WebSocketTransport};

/// Authenticated connection to an obs-websocket server.
#[derive(Debug)]
pub struct Client {
    inner: AuthenticatedSession<WebSocketTransport>,
    url: String,
}

impl Client {
    /// Connect to the configured peer and run the handshake.
    ///
    /// When `timeout_secs` is set the whole open + handshake is bounded by
    /// it; otherwise nothing here times out.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let url = config.url();
        let confirmation = if config.confirm_auth {
            Confirmation::AwaitResponse
        } else {
            Confirmation::None
        };

        let connect = async {
            let session = Session::open(&config.host, config.port).await?;
            let inner = authenticate_with(session, &config.password, confirmation).await?;
            Ok::<_, ObsError>(inner)
        };

        let inner = match config.timeout() {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| ObsError::Timeout(limit))??,
            None => connect.await?,
        };

        Ok(Self { inner, url })
    }

    /// URL of the peer
    pub fn url(&self) -> &str {
        &self.url
    }

    /// How authentication concluded
    pub fn outcome(&self) -> AuthOutcome {
        self.inner.outcome()
    }

    /// Borrow the authenticated session for further requests
    pub fn session_mut(&mut self) -> &mut Session<WebSocketTransport> {
        self.inner.session_mut()
    }

    /// Close the connection. Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        self.inner.close().await?;
        Ok(())
    }
}
