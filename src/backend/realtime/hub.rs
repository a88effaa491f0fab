/**
 * Connection Hub
 *
 * The hub is a single task that owns the set of live WebSocket connections.
 * Nothing else touches the membership set: connection pumps and handlers
 * talk to it only through the channels behind a `HubHandle`.
 *
 * # Channels
 *
 * - **register** - add a connection; the call returns once the hub has
 *   recorded it, so every later broadcast reaches it
 * - **unregister** - remove a connection and close its outbound queue;
 *   unbounded so that it can be sent from `Drop`
 * - **broadcast** - deliver a payload to every member's outbound queue
 *
 * The loop services one command per iteration. Unregistrations are taken
 * first, then registrations, then broadcasts, so a membership change issued
 * before a broadcast is always applied before that broadcast.
 *
 * # Backpressure
 *
 * Delivery never waits. A member whose outbound queue is full is removed on
 * the spot and its queue is closed, which ends its write pump. Slow clients
 * lose messages and get disconnected instead of stalling everyone else.
 *
 * A sender receives its own broadcasts like every other member.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{Message, Utf8Bytes};
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot, watch,
};

/// Outbound queue length for each connection
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// Queue length of the register and broadcast command channels
const COMMAND_CAPACITY: usize = 1024;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An opaque broadcast payload. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(Utf8Bytes),
    Binary(Bytes),
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(Utf8Bytes::from(text.into()))
    }

    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self::Binary(data.into())
    }

    /// Extract the payload of a data frame. Control frames yield `None`.
    pub fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::Text(text) => Some(Self::Text(text)),
            Message::Binary(data) => Some(Self::Binary(data)),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.as_str().len(),
            Self::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Text(text) => Message::Text(text),
            Payload::Binary(data) => Message::Binary(data),
        }
    }
}

/// A connection waiting to join the hub.
///
/// Holds the sending half of the connection's outbound queue. Once
/// registered, the hub is the only holder, so removing the member closes
/// the queue.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    outbound: mpsc::Sender<Payload>,
}

impl Connection {
    /// Create a connection with a bounded outbound queue.
    ///
    /// Returns the connection and the receiving half of its queue, which
    /// belongs to the write pump.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (outbound, receiver) = mpsc::channel(capacity.max(1));
        let connection = Self {
            id: ConnectionId::next(),
            outbound,
        };
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Hub errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    /// The hub task is no longer running
    #[error("hub is not running")]
    Stopped,
}

/// Cloneable handle for talking to the hub task
#[derive(Debug, Clone)]
pub struct HubHandle {
    register: mpsc::Sender<(Connection, oneshot::Sender<()>)>,
    unregister: mpsc::UnboundedSender<ConnectionId>,
    broadcast: mpsc::Sender<Payload>,
    members: watch::Receiver<usize>,
}

impl HubHandle {
    /// Add a connection to the membership set.
    ///
    /// Returns once the hub has recorded the member. Dropping the returned
    /// `Registration` unregisters it.
    pub async fn register(&self, connection: Connection) -> Result<Registration, HubError> {
        let id = connection.id();
        let (ack, acked) = oneshot::channel();

        self.register
            .send((connection, ack))
            .await
            .map_err(|_| HubError::Stopped)?;
        acked.await.map_err(|_| HubError::Stopped)?;

        Ok(Registration {
            id,
            unregister: self.unregister.clone(),
        })
    }

    /// Remove a connection and close its outbound queue.
    ///
    /// A no-op when the connection is not a member.
    pub fn unregister(&self, id: ConnectionId) {
        // A stopped hub has no members left to remove.
        let _ = self.unregister.send(id);
    }

    /// Queue a payload for delivery to every member.
    pub async fn broadcast(&self, payload: Payload) -> Result<(), HubError> {
        self.broadcast
            .send(payload)
            .await
            .map_err(|_| HubError::Stopped)
    }

    /// Current number of members
    pub fn member_count(&self) -> usize {
        *self.members.borrow()
    }

    /// Wait until the hub has exactly `count` members.
    pub async fn wait_for_members(&self, count: usize) -> Result<(), HubError> {
        let mut members = self.members.clone();
        members
            .wait_for(|current| *current == count)
            .await
            .map(|_| ())
            .map_err(|_| HubError::Stopped)
    }
}

/// Membership guard. Unregisters the connection when dropped.
#[derive(Debug)]
pub struct Registration {
    id: ConnectionId,
    unregister: mpsc::UnboundedSender<ConnectionId>,
}

impl Registration {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let _ = self.unregister.send(self.id);
    }
}

/// The hub task state. Constructed with [`Hub::new`] and driven by [`Hub::run`].
pub struct Hub {
    register: mpsc::Receiver<(Connection, oneshot::Sender<()>)>,
    unregister: mpsc::UnboundedReceiver<ConnectionId>,
    broadcast: mpsc::Receiver<Payload>,
    members: HashMap<ConnectionId, mpsc::Sender<Payload>>,
    member_count: watch::Sender<usize>,
}

impl Hub {
    /// Create the hub and its first handle. The hub does nothing until
    /// [`Hub::run`] is polled.
    pub fn new() -> (Self, HubHandle) {
        let (register_tx, register_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (count_tx, count_rx) = watch::channel(0);

        let hub = Self {
            register: register_rx,
            unregister: unregister_rx,
            broadcast: broadcast_rx,
            members: HashMap::new(),
            member_count: count_tx,
        };
        let handle = HubHandle {
            register: register_tx,
            unregister: unregister_tx,
            broadcast: broadcast_tx,
            members: count_rx,
        };
        (hub, handle)
    }

    /// Create the hub and run it on a new task.
    pub fn spawn() -> HubHandle {
        let (hub, handle) = Self::new();
        tokio::spawn(hub.run());
        handle
    }

    /// Process commands until every handle and registration is gone.
    pub async fn run(mut self) {
        tracing::debug!("Hub started");

        loop {
            tokio::select! {
                biased;

                Some(id) = self.unregister.recv() => self.remove(id),
                Some((connection, ack)) = self.register.recv() => {
                    self.add(connection);
                    let _ = ack.send(());
                }
                Some(payload) = self.broadcast.recv() => self.fan_out(payload),
                else => break,
            }
        }

        tracing::debug!("Hub stopped with {} members", self.members.len());
    }

    fn add(&mut self, connection: Connection) {
        tracing::info!("Connection {} joined the hub", connection.id);
        self.members.insert(connection.id, connection.outbound);
        self.publish_count();
    }

    fn remove(&mut self, id: ConnectionId) {
        // Dropping the sender closes the outbound queue.
        if self.members.remove(&id).is_some() {
            tracing::info!("Connection {} left the hub", id);
            self.publish_count();
        }
    }

    fn fan_out(&mut self, payload: Payload) {
        let before = self.members.len();

        self.members.retain(|id, outbound| match outbound.try_send(payload.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Connection {} outbound queue is full, disconnecting", id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Connection {} outbound queue already closed", id);
                false
            }
        });

        if self.members.len() != before {
            self.publish_count();
        }
    }

    fn publish_count(&self) {
        self.member_count.send_replace(self.members.len());
    }
}
