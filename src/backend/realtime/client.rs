/**
 * Connection Pumps
 *
 * Each WebSocket connection is served by two pumps:
 *
 * - the **read pump** forwards every data frame the client sends to the hub
 *   as a broadcast
 * - the **write pump** drains the connection's outbound queue onto the socket
 *
 * The read pump owns the connection's `Registration`, so the connection
 * leaves the hub on every exit path, including when the pump future is
 * dropped mid-read. Leaving the hub closes the outbound queue, which in turn
 * ends the write pump and closes the socket.
 *
 * Transport failures end the one affected connection and are never
 * reported to the hub or to other connections.
 */

use std::fmt;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::backend::realtime::hub::{
    Connection, ConnectionId, HubError, HubHandle, Payload, Registration,
};

/// Per-connection errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Reading from or writing to the socket failed
    #[error("transport failure: {0}")]
    Transport(String),

    #[error(transparent)]
    Hub(#[from] HubError),
}

/// Forward inbound data frames to the hub until the client goes away.
///
/// Ping and pong frames are handled by the transport and skipped here. A
/// close frame, the end of the stream or a read error ends the pump.
///
/// # Errors
///
/// * `ConnectionError::Transport` - the stream yielded an error
/// * `ConnectionError::Hub` - the hub stopped
pub async fn read_pump<S, E>(
    mut stream: S,
    hub: HubHandle,
    registration: Registration,
) -> Result<(), ConnectionError>
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let id = registration.id();

    let result = loop {
        let message = match stream.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => break Err(ConnectionError::Transport(e.to_string())),
            None => break Ok(()),
        };

        if let Message::Close(_) = message {
            tracing::debug!("Connection {} sent close frame", id);
            break Ok(());
        }

        if let Some(payload) = Payload::from_message(message) {
            if let Err(e) = hub.broadcast(payload).await {
                break Err(e.into());
            }
        }
    };

    // Leave the hub before the transport goes away.
    drop(registration);
    drop(stream);

    result
}

/// Write queued payloads to the socket until the queue closes.
///
/// The sink is closed on exit whether the queue closed or a write failed.
///
/// # Errors
///
/// * `ConnectionError::Transport` - a write failed
pub async fn write_pump<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<Payload>,
    id: ConnectionId,
) -> Result<(), ConnectionError>
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    let mut result = Ok(());

    while let Some(payload) = outbound.recv().await {
        if let Err(e) = sink.send(Message::from(payload)).await {
            result = Err(ConnectionError::Transport(e.to_string()));
            break;
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!("Connection {} close failed: {}", id, e);
    }

    result
}

/// Serve one upgraded connection until either pump finishes.
///
/// Registers with the hub, runs the write pump on its own task and the read
/// pump on this one. Whichever side ends first brings the other down.
pub async fn serve_connection<T, E>(transport: T, hub: HubHandle, outbound_capacity: usize)
where
    T: Stream<Item = Result<Message, E>> + Sink<Message, Error = E> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let (connection, outbound) = Connection::new(outbound_capacity);
    let id = connection.id();

    let registration = match hub.register(connection).await {
        Ok(registration) => registration,
        Err(e) => {
            tracing::warn!("Connection {} could not join the hub: {}", id, e);
            return;
        }
    };

    let (sink, stream) = transport.split();
    let mut writer = tokio::spawn(write_pump(sink, outbound, id));

    tokio::select! {
        result = read_pump(stream, hub, registration) => {
            log_exit(id, "read", result);
            match writer.await {
                Ok(result) => log_exit(id, "write", result),
                Err(e) => tracing::error!("Connection {} write pump panicked: {}", id, e),
            }
        }
        joined = &mut writer => {
            // The read pump future is dropped here, which unregisters.
            match joined {
                Ok(result) => log_exit(id, "write", result),
                Err(e) => tracing::error!("Connection {} write pump panicked: {}", id, e),
            }
        }
    }

    tracing::debug!("Connection {} closed", id);
}

fn log_exit(id: ConnectionId, pump: &str, result: Result<(), ConnectionError>) {
    match result {
        Ok(()) => tracing::debug!("Connection {} {} pump finished", id, pump),
        Err(ConnectionError::Transport(e)) => {
            tracing::debug!("Connection {} {} pump transport error: {}", id, pump, e)
        }
        Err(e) => tracing::warn!("Connection {} {} pump stopped: {}", id, pump, e),
    }
}
