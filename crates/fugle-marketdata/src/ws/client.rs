/*
[INPUT]:  Connection config (URL, credential, health check), caller subscriptions
[OUTPUT]: Authenticated market data stream surfaced through the event hub
[POS]:    WebSocket layer - client facade, message routing and shared session state
[UPDATE]: When changing connection lifecycle, routing or outbound messages
*/

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use super::auth::{self, AuthMachine, AuthState};
use super::event::{Event, EventHub, EventKind, ListenerId};
use super::health::{self, HealthCheck, PingOutcome};
use super::message::{Inbound, InboundKind, Outbound};
use super::transport::{self, TransportEvent};
use crate::config::ConnectionConfig;
use crate::constants::UNAUTHENTICATED_MESSAGE;
use crate::error::{AuthError, FugleError, Result};

/// Auth state tagged with the connection generation it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Status {
    state: AuthState,
    generation: u64,
}

/// Everything mutated by the receive loop, the timers and the caller
#[derive(Debug, Default)]
pub(crate) struct Session {
    auth: AuthMachine,
    health: HealthCheck,
    /// Bumped on every connect and disconnect; stale tasks compare against it
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<WsMessage>>,
    auth_timer: Option<AbortHandle>,
    health_timer: Option<AbortHandle>,
}

impl Session {
    fn cancel_auth_timer(&mut self) {
        if let Some(timer) = self.auth_timer.take() {
            timer.abort();
        }
    }

    fn cancel_health_timer(&mut self) {
        if let Some(timer) = self.health_timer.take() {
            timer.abort();
        }
    }

    fn cancel_timers(&mut self) {
        self.cancel_auth_timer();
        self.cancel_health_timer();
    }
}

#[derive(Debug)]
pub(crate) struct Inner {
    config: ConnectionConfig,
    hub: EventHub,
    session: Mutex<Session>,
    status_tx: watch::Sender<Status>,
}

/// Streaming client for one market.
///
/// `connect` resolves once the server accepts or rejects the credentials.
/// Everything after that arrives through listeners registered with [`on`].
///
/// [`on`]: WebSocketClient::on
#[derive(Debug)]
pub struct WebSocketClient {
    inner: Arc<Inner>,
}

impl WebSocketClient {
    pub fn new(config: ConnectionConfig) -> Self {
        let (status_tx, _rx) = watch::channel(Status {
            state: AuthState::Pending,
            generation: 0,
        });
        Self {
            inner: Arc::new(Inner {
                config,
                hub: EventHub::new(),
                session: Mutex::new(Session::default()),
                status_tx,
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.config.url
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Open the socket, send credentials and wait for the verdict
    pub async fn connect(&self) -> Result<()> {
        self.inner.connect().await
    }

    /// Close the socket and return to `Pending`. Safe to call at any time.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    /// Send a `subscribe` frame carrying `params`
    pub fn subscribe<P: Serialize>(&self, params: P) -> Result<()> {
        self.inner.send(Outbound::subscribe(serde_json::to_value(params)?))
    }

    /// Send an `unsubscribe` frame carrying `params`
    pub fn unsubscribe<P: Serialize>(&self, params: P) -> Result<()> {
        self.inner.send(Outbound::unsubscribe(serde_json::to_value(params)?))
    }

    /// Send a `ping` frame; the server echoes `state` in its pong
    pub fn ping<P: Serialize>(&self, state: P) -> Result<()> {
        self.inner.send(Outbound::ping(serde_json::to_value(state)?))
    }

    /// Ask the server to list active subscriptions; the reply arrives as a message event
    pub fn subscriptions(&self) -> Result<()> {
        self.inner.send(Outbound::subscriptions())
    }

    /// Register a listener; listeners of one kind fire in registration order
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.hub.on(kind, listener)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.inner.hub.off(kind, id)
    }

    /// Current handshake state
    pub fn auth_state(&self) -> AuthState {
        self.inner.lock().auth.state()
    }

    /// Failure captured by the last handshake, cleared on disconnect
    pub fn pending_error(&self) -> Option<AuthError> {
        self.inner.lock().auth.error().cloned()
    }

    /// Pings sent since the last pong
    pub fn missed_pongs(&self) -> u32 {
        self.inner.lock().health.missed_pongs()
    }

    /// Whether a socket is installed for outbound frames
    pub fn is_connected(&self) -> bool {
        self.inner.lock().outbound.is_some()
    }
}

impl Drop for WebSocketClient {
    fn drop(&mut self) {
        self.inner.disconnect();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, session: &Session) {
        self.status_tx.send_replace(Status {
            state: session.auth.state(),
            generation: session.generation,
        });
    }

    async fn connect(self: &Arc<Self>) -> Result<()> {
        let generation = {
            let mut session = self.lock();
            if session.outbound.is_some() {
                return Err(FugleError::AlreadyConnected);
            }
            session.generation += 1;
            session.cancel_timers();
            session.auth.reset();
            session.health.reset();

            if self.config.credential.is_none() {
                session.auth.fail(AuthError::MissingCredentials);
                self.publish(&session);
                drop(session);
                warn!(url = %self.config.url, "ws connect without credentials");
                self.hub.emit(&Event::Unauthenticated(serde_json::json!({
                    "message": AuthError::MissingCredentials.to_string(),
                })));
                return Err(AuthError::MissingCredentials.into());
            }

            self.publish(&session);
            session.generation
        };
        let mut status_rx = self.status_tx.subscribe();

        info!(url = %self.config.url, "ws connecting");
        let stream = match transport::open(&self.config.url, self.config.connect_timeout).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(url = %self.config.url, error = %err, "ws connect failed");
                self.hub.emit(&Event::Error(err.to_string()));
                return Err(err);
            }
        };

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.on_open(generation, outbound_tx)?;
        self.spawn_receiver(generation, stream, outbound_rx);

        let status = *status_rx
            .wait_for(|status| status.generation != generation || status.state.is_terminal())
            .await
            .map_err(|_| FugleError::NotConnected)?;

        if status.generation != generation {
            return Err(FugleError::NotConnected);
        }
        match status.state {
            AuthState::Authenticated => Ok(()),
            _ => {
                let error = {
                    let mut session = self.lock();
                    session.cancel_timers();
                    session.outbound = None;
                    session.auth.error().cloned()
                };
                let error = error.unwrap_or(AuthError::Rejected {
                    message: "authentication failed".to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Transport is up: queue the credential frame and arm the timeout.
    ///
    /// Runs before the receive loop starts so a verdict can never arrive
    /// ahead of the `Authenticating` transition.
    fn on_open(
        self: &Arc<Self>,
        generation: u64,
        outbound_tx: mpsc::UnboundedSender<WsMessage>,
    ) -> Result<()> {
        let credential = self
            .config
            .credential
            .as_ref()
            .ok_or(AuthError::MissingCredentials)?;
        let text = Outbound::auth(credential.auth_payload()).to_text()?;

        {
            let mut session = self.lock();
            if session.generation != generation {
                return Err(FugleError::NotConnected);
            }
            session.auth.begin();
            session.auth_timer = Some(auth::spawn_timeout(
                Arc::downgrade(self),
                generation,
                self.config.auth_timeout,
            ));
            self.publish(&session);
            outbound_tx
                .send(WsMessage::Text(text.into()))
                .map_err(|_| FugleError::NotConnected)?;
            session.outbound = Some(outbound_tx);
        }
        debug!(credential = credential.kind(), "ws auth sent");
        self.hub.emit(&Event::Connect);
        Ok(())
    }

    fn spawn_receiver(
        self: &Arc<Self>,
        generation: u64,
        stream: transport::Stream,
        outbound_rx: mpsc::UnboundedReceiver<WsMessage>,
    ) {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let handler = weak.clone();
            let close = transport::run(stream, outbound_rx, move |event| {
                let Some(inner) = handler.upgrade() else {
                    return ControlFlow::Break(());
                };
                match event {
                    TransportEvent::Text(text) => inner.handle_frame(generation, &text),
                    TransportEvent::Error(message) => {
                        warn!(error = %message, "ws transport error");
                        inner.hub.emit(&Event::Error(message));
                    }
                }
                ControlFlow::Continue(())
            })
            .await;

            if let Some(inner) = weak.upgrade() {
                inner.transport_closed(generation, close.code, close.reason);
            }
        });
    }

    pub(crate) fn auth_timed_out(&self, generation: u64, duration: std::time::Duration) {
        {
            let mut session = self.lock();
            if session.generation != generation || !session.auth.time_out(duration) {
                return;
            }
            session.auth_timer = None;
            self.publish(&session);
        }
        let error = AuthError::Timeout { duration };
        warn!(url = %self.config.url, timeout_ms = duration.as_millis() as u64, "ws auth timed out");
        self.hub.emit(&Event::Unauthenticated(serde_json::json!({
            "message": error.to_string(),
        })));
    }

    fn handle_frame(self: &Arc<Self>, generation: u64, text: &str) {
        if self.lock().generation != generation {
            debug!(bytes = text.len(), "ws stale frame dropped");
            return;
        }
        let frame = match Inbound::parse(text) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, bytes = text.len(), "ws frame parse failed");
                self.hub.emit(&Event::Error(format!("malformed frame: {err}")));
                return;
            }
        };

        self.hub.emit(&Event::Message(text.to_string()));

        match frame.kind() {
            InboundKind::Authenticated => self.on_authenticated(generation, frame),
            InboundKind::Error => match frame.error_message() {
                Some(message) if message == UNAUTHENTICATED_MESSAGE => {
                    self.on_unauthenticated(generation, &frame)
                }
                message => {
                    let message = message.map_or_else(|| text.to_string(), str::to_string);
                    self.hub.emit(&Event::Error(message));
                }
            },
            InboundKind::Pong => {
                let mut session = self.lock();
                if session.generation == generation {
                    session.health.on_pong();
                }
            }
            InboundKind::Other => debug!(event = %frame.event, "ws event passed through"),
        }
    }

    fn on_authenticated(self: &Arc<Self>, generation: u64, frame: Inbound) {
        {
            let mut session = self.lock();
            if session.generation != generation || !session.auth.authenticate() {
                debug!("ws authenticated event ignored");
                return;
            }
            session.cancel_auth_timer();
            if self.config.health_check.enabled {
                session.health.reset();
                session.health_timer = Some(health::spawn_supervisor(
                    Arc::downgrade(self),
                    generation,
                    self.config.health_check.interval(),
                ));
            }
            self.publish(&session);
        }
        info!(url = %self.config.url, "ws authenticated");
        self.hub.emit(&Event::Authenticated(frame.to_value()));
    }

    fn on_unauthenticated(&self, generation: u64, frame: &Inbound) {
        {
            let mut session = self.lock();
            if session.generation != generation {
                return;
            }
            session.auth.fail(AuthError::Rejected {
                message: UNAUTHENTICATED_MESSAGE.to_string(),
            });
            session.cancel_timers();
            self.publish(&session);
        }
        warn!(url = %self.config.url, "ws credentials rejected");
        self.hub.emit(&Event::Unauthenticated(frame.to_value()));
    }

    /// One heartbeat cycle. Returns false once the supervisor should stop.
    pub(crate) fn health_tick(&self, generation: u64) -> bool {
        let max = self.config.health_check.max_missed_pongs;
        let failure = {
            let mut session = self.lock();
            if session.generation != generation || session.auth.state() != AuthState::Authenticated {
                return false;
            }
            let sent = match (&session.outbound, Outbound::ping(Value::Null).to_text()) {
                (Some(tx), Ok(text)) => tx.send(WsMessage::Text(text.into())).is_ok(),
                _ => false,
            };
            if sent {
                match session.health.on_ping_sent(max) {
                    PingOutcome::Healthy { missed } => {
                        debug!(missed_pongs = missed, "ws ping sent");
                        None
                    }
                    PingOutcome::Exceeded { missed, max } => Some(format!(
                        "missed {missed} consecutive pongs (max {max})"
                    )),
                }
            } else {
                Some("failed to send ping".to_string())
            }
        };

        match failure {
            None => true,
            Some(reason) => {
                let err = FugleError::HealthCheck(reason);
                error!(url = %self.config.url, error = %err, "ws health check failed");
                self.hub.emit(&Event::Error(err.to_string()));
                self.disconnect();
                false
            }
        }
    }

    fn transport_closed(&self, generation: u64, code: Option<u16>, reason: String) {
        {
            let mut session = self.lock();
            if session.generation == generation {
                session.outbound = None;
            }
        }
        info!(url = %self.config.url, code, reason = %reason, "ws disconnected");
        self.hub.emit(&Event::Disconnect { code, reason });
    }

    fn disconnect(&self) {
        let had_transport = {
            let mut session = self.lock();
            session.generation += 1;
            session.cancel_timers();
            session.auth.reset();
            session.health.reset();
            self.publish(&session);
            session.outbound.take().is_some()
        };
        if had_transport {
            info!(url = %self.config.url, "ws disconnect requested");
        }
    }

    fn send(&self, message: Outbound) -> Result<()> {
        let text = message.to_text()?;
        let tx = self.lock().outbound.clone().ok_or(FugleError::NotConnected)?;
        tx.send(WsMessage::Text(text.into()))
            .map_err(|_| FugleError::NotConnected)?;
        debug!(event = message.event, "ws message sent");
        Ok(())
    }
}
