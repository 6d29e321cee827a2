//! Realtime connection manager and the public subscribe/unsubscribe API.
//!
//! One background task per client runs the socket's receive loop; a writer
//! task drains an unbounded channel so sends never block the caller once the
//! socket is open. Registry mutation and state transitions share a single
//! lock, so the subscription replay on (re)connect can neither miss nor
//! double a concurrent register/unregister. The lock is never held across an
//! await point.
//!
//! There is deliberately no automatic reconnect: an unsolicited disconnect
//! reverts the state to `Disconnected` and callers decide when to call
//! `connect()` again (or let the next `subscribe_*` do it).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tungstenite::client::IntoClientRequest;
use tungstenite::handshake::client::Request;
use tungstenite::http::HeaderValue;
use tungstenite::http::header::AUTHORIZATION;
use tungstenite::protocol::Message as WsMessage;

use crate::config::ClientConfig;
use crate::error::RealtimeError;
use crate::realtime::dispatch::dispatch;
use crate::realtime::protocol;
use crate::realtime::registry::{Callback, Registry, SubscriptionHandle};
use crate::realtime::topic::Topic;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

/// State shared between the caller-facing client and the background task.
/// Guarded as a unit: registry membership and connection state must move
/// together.
struct Shared {
    registry: Registry,
    state_tx: watch::Sender<ConnectionState>,
    sender: Option<mpsc::UnboundedSender<WsMessage>>,
    task: Option<JoinHandle<()>>,
    closing: bool,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }
}

/// Client for the realtime update channel.
///
/// All methods take `&self`; the client is safe to share across tasks.
pub struct RealtimeClient {
    shared: Arc<Mutex<Shared>>,
    state_rx: watch::Receiver<ConnectionState>,
    url: String,
    api_key: String,
    connect_timeout: Duration,
    close_timeout: Duration,
}

impl RealtimeClient {
    pub fn new(config: &ClientConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Mutex::new(Shared {
                registry: Registry::new(),
                state_tx,
                sender: None,
                task: None,
                closing: false,
            })),
            state_rx,
            url: protocol::websocket_url(&config.base_url),
            api_key: config.api_key.clone(),
            connect_timeout: config.connect_timeout,
            close_timeout: config.close_timeout,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Number of distinct topics currently registered.
    pub fn subscription_count(&self) -> usize {
        self.shared.lock().unwrap().registry.len()
    }

    /// Opens the websocket connection.
    ///
    /// No-op when already connected; when a connect is in flight, awaits it.
    /// Otherwise spawns the background task and waits (bounded by the
    /// configured connect timeout) for the state to reach `Connected`.
    pub async fn connect(&self) -> Result<(), RealtimeError> {
        {
            let mut shared = self.shared.lock().unwrap();
            match shared.state() {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting => {}
                ConnectionState::Closing => {
                    return Err(RealtimeError::Connection(
                        "client is closing".to_string(),
                    ));
                }
                ConnectionState::Disconnected => {
                    let request = self.client_request()?;
                    shared.closing = false;
                    shared.set_state(ConnectionState::Connecting);
                    shared.task = Some(tokio::spawn(run_connection(self.shared.clone(), request)));
                }
            }
        }
        self.await_connected().await
    }

    /// Closes the connection and clears the subscription registry.
    ///
    /// Safe to call from any state and idempotent. The background task gets
    /// the configured close timeout to wind down before being aborted.
    pub async fn close(&self) {
        let task = {
            let mut shared = self.shared.lock().unwrap();
            shared.closing = true;
            if shared.state() != ConnectionState::Disconnected {
                shared.set_state(ConnectionState::Closing);
            }
            if let Some(sender) = shared.sender.take() {
                let _ = sender.send(WsMessage::Close(None));
            }
            shared.task.take()
        };

        if let Some(mut task) = task {
            if timeout(self.close_timeout, &mut task).await.is_err() {
                task.abort();
            }
        }

        let mut shared = self.shared.lock().unwrap();
        shared.registry.clear();
        shared.sender = None;
        shared.set_state(ConnectionState::Disconnected);
        shared.closing = false;
    }

    /// Subscribes to updates for an airport, connecting first if needed.
    ///
    /// `types` optionally narrows the event types; `None` subscribes to all.
    pub async fn subscribe_airport<F>(
        &self,
        airport: &str,
        callback: F,
        types: Option<Vec<String>>,
    ) -> Result<SubscriptionHandle, RealtimeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.ensure_connected().await?;
        Ok(self.register(Topic::airport(airport, types.as_deref()), Arc::new(callback)))
    }

    /// Subscribes to updates for one flight, connecting first if needed.
    pub async fn subscribe_flight<F>(
        &self,
        flight_id: &str,
        callback: F,
    ) -> Result<SubscriptionHandle, RealtimeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.ensure_connected().await?;
        Ok(self.register(Topic::flight(flight_id), Arc::new(callback)))
    }

    /// Subscribes to updates for a route, connecting first if needed.
    pub async fn subscribe_route<F>(
        &self,
        origin: &str,
        destination: &str,
        callback: F,
    ) -> Result<SubscriptionHandle, RealtimeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.ensure_connected().await?;
        Ok(self.register(Topic::route(origin, destination), Arc::new(callback)))
    }

    /// Removes an airport subscription: one callback when a handle is given,
    /// the whole topic otherwise. A wire no-op when disconnected.
    pub fn unsubscribe_airport(&self, airport: &str, handle: Option<&SubscriptionHandle>) {
        self.unregister(&Topic::airport(airport, None), handle);
    }

    /// Removes a flight subscription (see [`Self::unsubscribe_airport`]).
    pub fn unsubscribe_flight(&self, flight_id: &str, handle: Option<&SubscriptionHandle>) {
        self.unregister(&Topic::flight(flight_id), handle);
    }

    /// Removes a route subscription (see [`Self::unsubscribe_airport`]).
    pub fn unsubscribe_route(
        &self,
        origin: &str,
        destination: &str,
        handle: Option<&SubscriptionHandle>,
    ) {
        self.unregister(&Topic::route(origin, destination), handle);
    }

    async fn ensure_connected(&self) -> Result<(), RealtimeError> {
        if self.is_connected() {
            return Ok(());
        }
        self.connect().await
    }

    fn register(&self, topic: Topic, callback: Callback) -> SubscriptionHandle {
        let mut shared = self.shared.lock().unwrap();
        let (handle, first) = shared.registry.register(topic.clone(), callback);
        if first {
            // With no open socket the registry itself is the pending queue;
            // the subscribe frame goes out with the replay on connect.
            if let Some(sender) = &shared.sender {
                let _ = sender.send(WsMessage::Text(protocol::encode_subscribe(&topic).into()));
            }
        }
        handle
    }

    fn unregister(&self, topic: &Topic, handle: Option<&SubscriptionHandle>) {
        let mut shared = self.shared.lock().unwrap();
        if let Some(removed) = shared
            .registry
            .unregister(topic.key(), handle.map(|h| h.id))
        {
            if let Some(sender) = &shared.sender {
                let _ = sender.send(WsMessage::Text(
                    protocol::encode_unsubscribe(&removed).into(),
                ));
            }
        }
    }

    fn client_request(&self) -> Result<Request, RealtimeError> {
        let mut request = self.url.as_str().into_client_request()?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            RealtimeError::Connection("API key contains invalid header characters".to_string())
        })?;
        request.headers_mut().insert(AUTHORIZATION, bearer);
        Ok(request)
    }

    /// Waits for the in-flight attempt to reach `Connected`, failing fast
    /// when it falls back to `Disconnected` and failing with a timeout after
    /// the bounded wait. Signaled by the state watch channel, never polled.
    async fn await_connected(&self) -> Result<(), RealtimeError> {
        let mut state_rx = self.state_rx.clone();
        let wait = async move {
            loop {
                match *state_rx.borrow_and_update() {
                    ConnectionState::Connected => return Ok(()),
                    ConnectionState::Disconnected => {
                        return Err(RealtimeError::Connection(
                            "websocket failed to open".to_string(),
                        ));
                    }
                    _ => {}
                }
                if state_rx.changed().await.is_err() {
                    return Err(RealtimeError::Connection(
                        "connection manager dropped".to_string(),
                    ));
                }
            }
        };
        match timeout(self.connect_timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(RealtimeError::Connection(format!(
                "not connected after {:?}",
                self.connect_timeout
            ))),
        }
    }
}

/// Background task: opens the socket, performs the sub-protocol handshake,
/// replays registered topics, then runs the receive loop until the socket
/// closes. Frames are dispatched one at a time, so dispatch for one frame
/// completes before the next is decoded.
async fn run_connection(shared: Arc<Mutex<Shared>>, request: Request) {
    let (ws_stream, _response) = match connect_async(request).await {
        Ok(ok) => ok,
        Err(e) => {
            let mut shared = shared.lock().unwrap();
            if !shared.closing {
                tracing::warn!("websocket failed to open: {e}");
            }
            shared.sender = None;
            shared.set_state(ConnectionState::Disconnected);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    // Writer task: forwards queued frames to the socket.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, WsMessage::Close(_));
            if ws_sender.send(msg).await.is_err() {
                break;
            }
            if is_close {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    // Socket open: handshake first, then one subscribe frame per topic that
    // was registered while disconnected. Same lock as registration, so a
    // racing subscribe is sent exactly once.
    {
        let mut shared = shared.lock().unwrap();
        let _ = tx.send(WsMessage::Text(protocol::HANDSHAKE.into()));
        for topic in shared.registry.topics() {
            let _ = tx.send(WsMessage::Text(protocol::encode_subscribe(&topic).into()));
        }
        shared.sender = Some(tx);
        shared.set_state(ConnectionState::Connected);
    }

    loop {
        match ws_receiver.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                if let Some((event, payload)) = protocol::decode_event(text.as_str()) {
                    let callbacks = shared.lock().unwrap().registry.callbacks_for(&event);
                    dispatch(&event, &payload, &callbacks);
                }
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                if !shared.lock().unwrap().closing {
                    tracing::warn!("websocket error: {e}");
                }
                break;
            }
            None => break,
        }
    }

    {
        let mut shared = shared.lock().unwrap();
        shared.sender = None;
        if !shared.closing {
            tracing::warn!("websocket closed unexpectedly");
        }
        shared.set_state(ConnectionState::Disconnected);
    }

    let _ = writer.await;
}
