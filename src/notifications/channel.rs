//! Real-time notification channel.
//!
//! One owned connection per signed-in session. On every successful connect,
//! first or after a drop, the client re-sends `register(userId)`. Pushed
//! notifications land in the [`NotificationStore`]; read receipts go out as
//! best-effort frames plus a REST call. Transport problems are logged and
//! retried with a bounded exponential backoff; they never reach the user.

use chrono::Utc;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::desktop::{DesktopNotifier, Permission};
use super::models::{ChannelStatus, ClientMessage, ServerEvent};
use super::service::NotificationBackend;
use super::store::NotificationStore;
use crate::auth::session::SessionStore;
use crate::common::PortalConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid channel request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub url: String,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Consecutive failed connects before giving up
    pub max_attempts: u32,
}

impl ChannelConfig {
    pub fn from_portal(config: &PortalConfig) -> Self {
        Self {
            url: config.realtime_url.clone(),
            initial_delay: Duration::from_millis(config.reconnect_initial_delay_ms),
            max_delay: Duration::from_millis(config.reconnect_max_delay_ms),
            max_attempts: config.reconnect_max_attempts.max(1),
        }
    }

    /// Exponential delay for the given 1-based attempt, ±20% jitter, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self
            .initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        let jitter: f64 = rand::thread_rng().gen_range(0.8..=1.2);
        base.mul_f64(jitter).min(self.max_delay)
    }
}

/// State shared between the owner and the connection task
struct ChannelShared {
    store: NotificationStore,
    notifier: Arc<dyn DesktopNotifier>,
    status: watch::Sender<ChannelStatus>,
}

impl ChannelShared {
    fn set_status(&self, status: ChannelStatus) {
        self.status.send_replace(status);
    }

    async fn handle_event(&self, event: ServerEvent) {
        match event {
            ServerEvent::Registered { user_id } => {
                info!(user_id = ?user_id, "Notification channel registered");
            }
            ServerEvent::Notification(mut notification) => {
                if notification.timestamp.is_none() {
                    notification.timestamp = Some(Utc::now());
                }
                let title = notification.title();
                let body = notification.message.clone();
                let id = notification.id.clone();

                if self.store.add_notification(*notification).await {
                    debug!(notification_id = %id, "Pushed notification stored");
                    self.display(title, &body);
                }
            }
            ServerEvent::NotificationMarkedRead { notification_id } => {
                self.store.mark_as_read(&notification_id).await;
                self.store.resolve_pending(&[notification_id]).await;
            }
            ServerEvent::Error { message } => {
                warn!(error = %message, "Notification channel reported an error");
            }
            ServerEvent::Unknown { event } => {
                debug!(event = %event, "Ignoring unknown channel event");
            }
        }
    }

    fn display(&self, title: &str, body: &str) {
        if self.notifier.permission() != Permission::Granted {
            return;
        }
        if let Err(e) = self.notifier.show(title, body) {
            debug!(error = %e, "Desktop notification not shown");
        }
    }
}

struct ActiveChannel {
    user_id: String,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owned push channel; at most one connection is open at a time
pub struct NotificationChannel {
    config: ChannelConfig,
    session: SessionStore,
    backend: Arc<dyn NotificationBackend>,
    shared: Arc<ChannelShared>,
    active: Mutex<Option<ActiveChannel>>,
}

impl NotificationChannel {
    pub fn new(
        config: ChannelConfig,
        session: SessionStore,
        store: NotificationStore,
        backend: Arc<dyn NotificationBackend>,
        notifier: Arc<dyn DesktopNotifier>,
    ) -> Self {
        let (status, _) = watch::channel(ChannelStatus::Disconnected);
        Self {
            config,
            session,
            backend,
            shared: Arc::new(ChannelShared {
                store,
                notifier,
                status,
            }),
            active: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.shared.store
    }

    /// Opens the channel for `user_id`, tearing down any open one first
    pub async fn open(&self, user_id: &str) {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            info!(user_id = %previous.user_id, "Replacing open notification channel");
            teardown(previous).await;
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let token = self.session.token().await;

        self.shared.set_status(ChannelStatus::Connecting);
        let task = tokio::spawn(run_connection(
            self.config.clone(),
            user_id.to_string(),
            token,
            self.shared.clone(),
            outbound_rx,
            shutdown_rx,
        ));

        *active = Some(ActiveChannel {
            user_id: user_id.to_string(),
            outbound: outbound_tx,
            shutdown: shutdown_tx,
            task,
        });
    }

    /// Safe to call when nothing is open
    pub async fn close(&self) {
        let previous = self.active.lock().await.take();
        if let Some(previous) = previous {
            info!(user_id = %previous.user_id, "Closing notification channel");
            teardown(previous).await;
        }
        self.shared.set_status(ChannelStatus::Disconnected);
    }

    /// False once the connection task has stopped, including after it gave up
    pub async fn is_open(&self) -> bool {
        self.live_channel().await.is_some()
    }

    pub async fn user_id(&self) -> Option<String> {
        self.live_channel().await
    }

    // Drops the handle of a task that already ended on its own
    async fn live_channel(&self) -> Option<String> {
        let mut active = self.active.lock().await;
        if active.as_ref().is_some_and(|a| a.task.is_finished()) {
            if let Some(stopped) = active.take() {
                debug!(user_id = %stopped.user_id, "Notification channel task has ended");
            }
        }
        active.as_ref().map(|a| a.user_id.clone())
    }

    pub fn status(&self) -> ChannelStatus {
        *self.shared.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ChannelStatus> {
        self.shared.status.subscribe()
    }

    /// Applies an inbound event as if it had arrived on the socket
    pub async fn handle_server_event(&self, event: ServerEvent) {
        self.shared.handle_event(event).await;
    }

    /// Optimistic read: local flag first, then a push frame and a REST call.
    /// Failures are logged and leave the id pending; nothing is rolled back.
    pub async fn mark_as_read(&self, id: &str) {
        self.shared.store.mark_as_read(id).await;
        self.shared.store.mark_pending([id.to_string()]).await;

        self.push(ClientMessage::MarkNotificationRead {
            notification_id: id.to_string(),
        })
        .await;

        match self.backend.mark_as_read(id).await {
            Ok(()) => self.shared.store.resolve_pending(&[id.to_string()]).await,
            Err(e) => warn!(notification_id = %id, error = %e, "Failed to persist read state"),
        }
    }

    /// Batched variant of [`mark_as_read`](Self::mark_as_read)
    pub async fn mark_all_as_read(&self) {
        let flipped = self.shared.store.mark_all_as_read().await;
        self.shared.store.mark_pending(flipped.iter().cloned()).await;

        for id in &flipped {
            self.push(ClientMessage::MarkNotificationRead {
                notification_id: id.clone(),
            })
            .await;
        }

        // Always sent: the server may hold unread entries beyond the local window
        match self.backend.mark_all_as_read().await {
            Ok(()) => self.shared.store.resolve_pending(&flipped).await,
            Err(e) => warn!(count = flipped.len(), error = %e, "Failed to persist read-all"),
        }
    }

    /// Asks for desktop notification permission if it was never decided
    pub fn permission_request(&self) -> bool {
        let notifier = &self.shared.notifier;
        let permission = match notifier.permission() {
            Permission::Default => notifier.request_permission(),
            decided => decided,
        };
        permission == Permission::Granted
    }

    async fn push(&self, message: ClientMessage) {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(channel) => {
                if channel.outbound.send(message).is_err() {
                    warn!(user_id = %channel.user_id, "Notification channel has stopped; push dropped");
                }
            }
            None => debug!("No notification channel open; push skipped"),
        }
    }
}

async fn teardown(channel: ActiveChannel) {
    let _ = channel.shutdown.send(true);
    let mut task = channel.task;
    if tokio::time::timeout(Duration::from_secs(2), &mut task)
        .await
        .is_err()
    {
        warn!(user_id = %channel.user_id, "Channel task did not stop in time, aborting");
        task.abort();
    }
}

fn build_request(url: &str, token: Option<&str>) -> Result<Request, ChannelError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ChannelError::InvalidRequest(e.to_string()))?;

    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ChannelError::InvalidRequest(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }
    Ok(request)
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

enum SessionEnd {
    Shutdown,
    Dropped,
}

async fn run_connection(
    config: ChannelConfig,
    user_id: String,
    token: Option<String>,
    shared: Arc<ChannelShared>,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut failures: u32 = 0;
    let mut connected_before = false;

    loop {
        let request = match build_request(&config.url, token.as_deref()) {
            Ok(request) => request,
            Err(e) => {
                error!(url = %config.url, error = %e, "Cannot build notification channel request");
                break;
            }
        };

        let attempt = tokio::select! {
            _ = shutdown_requested(&mut shutdown) => break,
            result = connect_async(request) => result,
        };

        match attempt {
            Ok((stream, _)) => {
                failures = 0;
                if connected_before {
                    info!(user_id = %user_id, "Notification channel reconnected");
                } else {
                    info!(user_id = %user_id, "Notification channel connected");
                }
                connected_before = true;
                shared.set_status(ChannelStatus::Connected);

                match drive_connection(stream, &user_id, &shared, &mut outbound, &mut shutdown).await
                {
                    SessionEnd::Shutdown => break,
                    SessionEnd::Dropped => {
                        warn!(user_id = %user_id, "Notification channel dropped");
                    }
                }
            }
            Err(e) => {
                failures += 1;
                warn!(
                    user_id = %user_id,
                    attempt = failures,
                    error = %e,
                    "Notification channel connection failed"
                );
                if failures >= config.max_attempts {
                    error!(
                        user_id = %user_id,
                        attempts = failures,
                        "Giving up on notification channel"
                    );
                    break;
                }
            }
        }

        shared.set_status(ChannelStatus::Reconnecting);
        let delay = config.backoff(failures.max(1));
        debug!(delay_ms = delay.as_millis() as u64, "Waiting before reconnect");
        tokio::select! {
            _ = shutdown_requested(&mut shutdown) => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    shared.set_status(ChannelStatus::Disconnected);
}

async fn drive_connection(
    stream: WsStream,
    user_id: &str,
    shared: &ChannelShared,
    outbound: &mut mpsc::UnboundedReceiver<ClientMessage>,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let (mut write, mut read) = stream.split();

    // Registration does not survive a reconnect, so it is sent on every connect
    let register = ClientMessage::Register {
        user_id: user_id.to_string(),
    };
    if let Err(e) = send_message(&mut write, &register).await {
        warn!(error = %e, "Failed to register on notification channel");
        return SessionEnd::Dropped;
    }

    loop {
        tokio::select! {
            _ = shutdown_requested(shutdown) => {
                let _ = write.send(Message::Close(None)).await;
                return SessionEnd::Shutdown;
            }
            queued = outbound.recv() => match queued {
                Some(message) => {
                    if let Err(e) = send_message(&mut write, &message).await {
                        warn!(error = %e, "Failed to send on notification channel");
                        return SessionEnd::Dropped;
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => match ServerEvent::parse(&text) {
                    Ok(event) => shared.handle_event(event).await,
                    Err(e) => warn!(error = %e, "Malformed notification channel frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!(frame = ?frame, "Server closed notification channel");
                    return SessionEnd::Dropped;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "Notification channel read error");
                    return SessionEnd::Dropped;
                }
                None => return SessionEnd::Dropped,
            },
        }
    }
}

async fn send_message(write: &mut WsSink, message: &ClientMessage) -> Result<(), ChannelError> {
    let text = message.to_text()?;
    write.send(Message::Text(text)).await?;
    Ok(())
}
