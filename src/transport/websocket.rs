//! WebSocket transport using tokio-tungstenite.
//!
//! Plain `ws://` only. Messages go out as text frames holding one JSON
//! document; text and binary frames are accepted inbound. Control frames
//! are handled by tungstenite and never surface to the caller.

use futures::future::BoxFuture;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{connection_url, MessageTransport};
use crate::error::{BoxError, TransportError};

/// WebSocket client connection.
pub struct WebSocketTransport {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    /// Dial `ws://host:port` and complete the WebSocket upgrade.
    pub async fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        let url = connection_url(host, port);
        tracing::info!("connecting to {}", url);

        let (stream, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::Connection {
                    url: url.clone(),
                    source: Box::new(e),
                })?;

        Ok(Self { url, stream })
    }

    /// URL this transport is connected to
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl MessageTransport for WebSocketTransport {
    fn send(&mut self, message: &Value) -> BoxFuture<'_, Result<(), TransportError>> {
        let text = message.to_string();

        Box::pin(async move {
            self.stream
                .send(WsMessage::Text(text))
                .await
                .map_err(|e| classify(e, TransportError::Send))
        })
    }

    fn receive(&mut self) -> BoxFuture<'_, Result<Value, TransportError>> {
        Box::pin(async move {
            loop {
                let frame = match self.stream.next().await {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => return Err(classify(e, TransportError::Receive)),
                    None => return Err(TransportError::Closed),
                };

                match frame {
                    WsMessage::Text(text) => {
                        return serde_json::from_str(&text).map_err(TransportError::Decode)
                    },
                    WsMessage::Binary(bytes) => {
                        return serde_json::from_slice(&bytes).map_err(TransportError::Decode)
                    },
                    WsMessage::Close(frame) => {
                        tracing::debug!(?frame, "peer closed connection");
                        return Err(TransportError::Closed);
                    },
                    WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {},
                }
            }
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), TransportError>> {
        Box::pin(async move {
            match self.stream.close(None).await {
                Ok(())
                | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    Ok(())
                },
                Err(e) => Err(TransportError::Close(Box::new(e))),
            }
        })
    }
}

/// Map a tungstenite error, folding closed-connection variants into
/// [`TransportError::Closed`].
fn classify(err: tungstenite::Error, wrap: fn(BoxError) -> TransportError) -> TransportError {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed
        },
        other => wrap(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = WebSocketTransport::connect("127.0.0.1", port)
            .await
            .unwrap_err();
        match err {
            TransportError::Connection { url, .. } => {
                assert_eq!(url, format!("ws://127.0.0.1:{}", port));
            },
            other => panic!("expected connection error, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_closed() {
        let err = classify(tungstenite::Error::ConnectionClosed, TransportError::Send);
        assert!(matches!(err, TransportError::Closed));

        let err = classify(tungstenite::Error::Utf8, TransportError::Receive);
        assert!(matches!(err, TransportError::Receive(_)));
    }
}
