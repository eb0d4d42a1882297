// Synapse Host - Connection Manager
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Owns the websocket for the whole process lifetime:
//   acquire session -> connect -> handshake -> listen -> (drop) -> reconnect
// Broker failure is fatal. Transport failure reconnects, unbounded.
// Cancellation wins over everything, at every suspension point.
// Frames are handled strictly one at a time, results in call order.

use crate::config::AgentConfig;
use crate::gate::Operator;
use crate::protocol::OutboundFrame;
use crate::router::Router;
use crate::session::{SessionBroker, SessionError};
use crate::ui;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Shutdown requested")]
    Shutdown,
}

impl From<tungstenite::Error> for ClientError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// Run `fut` unless the token fires first
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, ClientError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Shutdown),
        out = fut => Ok(out),
    }
}

/// Isolated fault: keep the connection, pause briefly
async fn frame_fault(
    fault: &(dyn std::fmt::Display + Sync),
    pause: Duration,
    cancel: &CancellationToken,
) -> Result<(), ClientError> {
    log::error!("Failed to process frame: {}", fault);
    until_cancelled(cancel, tokio::time::sleep(pause)).await
}

/// Host side of the session: connection lifecycle around a Router
pub struct HostClient<B, O> {
    config: AgentConfig,
    broker: B,
    router: Router<O>,
    requested_session: Option<String>,
}

impl<B: SessionBroker, O: Operator> HostClient<B, O> {
    pub fn new(config: AgentConfig, broker: B, router: Router<O>) -> Self {
        Self { config, broker, router, requested_session: None }
    }

    /// Ask the broker to rejoin an existing session
    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.requested_session = session_id;
        self
    }

    pub fn router(&self) -> &Router<O> {
        &self.router
    }

    /// Drive the client until cancelled. Only a failed session
    /// acquisition ends it with an error.
    pub async fn start(&mut self, cancel: &CancellationToken) -> Result<(), ClientError> {
        let acquired = until_cancelled(cancel, self.broker.acquire(self.requested_session.as_deref())).await;
        let session = match acquired {
            Ok(session) => session?,
            Err(_) => return Ok(()),
        };
        ui::session_ready(&session);
        ui::connecting(&session.socket_address);

        loop {
            let connected = match until_cancelled(cancel, connect_async(session.socket_address.as_str())).await {
                Ok(connected) => connected,
                Err(_) => break,
            };
            let stream = match connected {
                Ok((stream, _response)) => stream,
                Err(e) => {
                    log::warn!("Connection to {} failed: {}", session.socket_address, e);
                    if until_cancelled(cancel, tokio::time::sleep(self.config.connect_retry_pause)).await.is_err() {
                        break;
                    }
                    continue;
                }
            };
            log::info!("Connected to {}", session.socket_address);

            match self.serve(stream, cancel).await {
                Err(ClientError::Shutdown) => break,
                Ok(()) => {
                    log::warn!("Connection closed by server");
                    ui::connection_lost("closed by server");
                }
                Err(e) => {
                    log::warn!("Connection lost: {}", e);
                    ui::connection_lost(&e.to_string());
                }
            }
        }

        ui::shutting_down();
        Ok(())
    }

    /// Handshake, then process frames until the connection ends.
    /// Ok(()) means the peer closed cleanly.
    async fn serve(&mut self, stream: WsStream, cancel: &CancellationToken) -> Result<(), ClientError> {
        let (mut writer, mut reader) = stream.split();

        let handshake = OutboundFrame::handshake().encode()?;
        until_cancelled(cancel, writer.send(Message::Text(handshake))).await??;
        log::info!("Handshake sent (role: host)");
        ui::handshake_sent();

        loop {
            let text = match until_cancelled(cancel, reader.next()).await? {
                None => return Ok(()),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(frame))) => {
                    log::info!("Close frame received: {:?}", frame);
                    return Ok(());
                }
                // Pings are answered by tungstenite; binary is not part of the protocol
                Some(Ok(_)) => continue,
            };

            let reply = match until_cancelled(cancel, self.router.handle_text(&text)).await? {
                Ok(Some(reply)) => reply,
                Ok(None) => continue,
                Err(e) => {
                    frame_fault(&e, self.config.frame_error_pause, cancel).await?;
                    continue;
                }
            };
            match reply.encode() {
                Ok(json) => until_cancelled(cancel, writer.send(Message::Text(json))).await??,
                Err(e) => frame_fault(&e, self.config.frame_error_pause, cancel).await?,
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
