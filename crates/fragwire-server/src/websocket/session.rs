//! WebSocket session lifecycle — one connected client from upgrade through
//! disconnect.
//!
//! A session is open while reads and writes succeed: read one message,
//! dispatch it, write exactly one reply of the same message type, repeat. The
//! first read or write failure closes it; there is no graceful command.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use metrics::{counter, gauge, histogram};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dispatch::{Dispatch, Dispatcher, ElementCounter};
use crate::metrics::{
    WS_MESSAGES_TOTAL, WS_SESSION_DURATION_SECONDS, WS_SESSIONS_ACTIVE, WS_SESSIONS_TOTAL,
};

/// Unique client identifier, used for log correlation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(format!("client_{}", Uuid::now_v7()))
    }

    /// Borrow the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a session closed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The connection failed to produce the next message.
    #[error("read failed: {0}")]
    Read(String),
    /// The peer closed the connection or the stream ended.
    #[error("connection closed")]
    Closed,
    /// The reply could not be sent.
    #[error("write failed: {0}")]
    Write(String),
}

/// State of one connection: its dispatcher and its private counter.
pub struct Session<'a> {
    dispatcher: &'a Dispatcher,
    counter: ElementCounter,
}

impl<'a> Session<'a> {
    /// Open a session with its counter at 0.
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self {
            dispatcher,
            counter: ElementCounter::default(),
        }
    }

    /// Counter value the next render will use.
    pub fn counter(&self) -> u64 {
        self.counter.current()
    }

    /// Compute the reply for one data message, keeping its message type.
    ///
    /// Control frames get no reply.
    pub fn reply(&mut self, message: Message) -> Option<Message> {
        match message {
            Message::Text(text) => {
                let outcome = self.dispatcher.dispatch(text.as_str(), &mut self.counter);
                Some(match outcome {
                    Dispatch::Rendered(markup) | Dispatch::Literal(markup) => Message::Text(markup.into()),
                    Dispatch::Echo => Message::Text(text),
                })
            }
            Message::Binary(data) => {
                let outcome = self.dispatcher.dispatch_bytes(&data, &mut self.counter);
                Some(match outcome {
                    Dispatch::Rendered(markup) | Dispatch::Literal(markup) => {
                        Message::Binary(Bytes::from(markup))
                    }
                    Dispatch::Echo => Message::Binary(data),
                })
            }
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
        }
    }

    /// Run one read → dispatch → write cycle.
    pub async fn step<R, W, E>(&mut self, inbound: &mut R, outbound: &mut W) -> Result<(), SessionError>
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
        W: Sink<Message> + Unpin,
        W::Error: fmt::Display,
    {
        let message = match inbound.next().await {
            Some(Ok(Message::Close(_))) | None => return Err(SessionError::Closed),
            Some(Ok(message)) => message,
            Some(Err(e)) => return Err(SessionError::Read(e.to_string())),
        };
        counter!(WS_MESSAGES_TOTAL).increment(1);

        let Some(reply) = self.reply(message) else {
            return Ok(());
        };
        outbound
            .send(reply)
            .await
            .map_err(|e| SessionError::Write(e.to_string()))
    }

    /// Loop until the connection fails, returning the reason.
    pub async fn run<R, W, E>(mut self, mut inbound: R, mut outbound: W) -> SessionError
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
        W: Sink<Message> + Unpin,
        W::Error: fmt::Display,
    {
        loop {
            if let Err(end) = self.step(&mut inbound, &mut outbound).await {
                return end;
            }
        }
    }
}

/// Run a WebSocket session for a connected client.
#[instrument(skip_all, fields(client_id = %client_id))]
pub async fn run_ws_session(ws: WebSocket, client_id: ClientId, dispatcher: Arc<Dispatcher>) {
    let started = Instant::now();
    info!("client connected");
    counter!(WS_SESSIONS_TOTAL).increment(1);
    gauge!(WS_SESSIONS_ACTIVE).increment(1.0);

    let (outbound, inbound) = ws.split();
    let session = Session::new(&dispatcher);
    match session.run(inbound, outbound).await {
        SessionError::Closed => info!("client disconnected"),
        end => warn!(reason = %end, "session ended"),
    }

    gauge!(WS_SESSIONS_ACTIVE).decrement(1.0);
    histogram!(WS_SESSION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
}
