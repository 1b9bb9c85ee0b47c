//! Per-connection location stream handler.
//!
//! The loop owns framing and heartbeats; each location frame goes to the
//! ingestion port. Frames are handled one at a time
//! in arrival order; the port returns as soon as the frame's side effects are
//! dispatched, so slow storage never holds up the next frame.
//!
//! The public contract pings every 5s and considers a connection idle after
//! 10s without client traffic. Tests shorten these intervals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::ErrorCode;
use crate::domain::ports::LocationIngestion;
use crate::inbound::ws::messages::{AckFrame, LocationFrame};

/// Ping cadence.
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Silence after which the driver is disconnected.
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    ingestion: Arc<dyn LocationIngestion>,
    session: Session,
    stream: MessageStream,
) {
    debug!("location stream opened");
    WsSession::new(ingestion).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

impl SessionError {
    fn is_graceful(&self) -> bool {
        match self {
            Self::ClientClosed(None) | Self::StreamClosed => true,
            Self::ClientClosed(Some(reason)) => {
                matches!(reason.code, CloseCode::Normal | CloseCode::Away)
            }
            Self::HeartbeatTimeout | Self::Protocol(_) | Self::Network(_) => false,
        }
    }
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    ingestion: Arc<dyn LocationIngestion>,
    accepted: u64,
    skipped: u64,
}

impl WsSession {
    fn new(ingestion: Arc<dyn LocationIngestion>) -> Self {
        Self {
            ingestion,
            accepted: 0,
            skipped: 0,
        }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = Self::close_action_for(&error);
                Self::close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_frame(session, text.to_string()).await
            }
            Message::Binary(bytes) => {
                *last_heartbeat = Instant::now();
                match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => self.handle_frame(session, text).await,
                    Err(error) => {
                        self.skip_frame(&error.to_string());
                        Ok(())
                    }
                }
            }
            Message::Pong(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_frame(
        &mut self,
        session: &mut Session,
        payload: String,
    ) -> Result<(), SessionError> {
        let frame = match serde_json::from_str::<LocationFrame>(&payload) {
            Ok(frame) => frame,
            Err(error) => {
                self.skip_frame(&error.to_string());
                return Ok(());
            }
        };

        match self.ingestion.ingest(frame.into(), payload).await {
            Ok(receipt) => {
                self.accepted += 1;
                Self::send_json(session, &AckFrame::from(receipt))
                    .await
                    .map_err(SessionError::Network)
            }
            Err(error) if error.code() == ErrorCode::InvalidRequest => {
                self.skip_frame(error.message());
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "location frame not ingested");
                self.skipped += 1;
                Ok(())
            }
        }
    }

    fn skip_frame(&mut self, reason: &str) {
        self.skipped += 1;
        warn!(%reason, "skipping malformed location frame");
    }

    async fn send_json<T: serde::Serialize>(
        session: &mut Session,
        payload: &T,
    ) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize WebSocket payload");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        let (accepted, skipped) = (self.accepted, self.skipped);
        if error.is_graceful() {
            info!(accepted, skipped, "location stream closed");
            return;
        }
        match error {
            SessionError::HeartbeatTimeout => {
                warn!(accepted, skipped, "WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, accepted, skipped, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, accepted, skipped, "WebSocket send failed; closing connection");
            }
            SessionError::ClientClosed(reason) => {
                warn!(?reason, accepted, skipped, "location stream closed unexpectedly");
            }
            SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
