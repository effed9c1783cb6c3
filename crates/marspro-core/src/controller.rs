// ── Hub ──
//
// Lifecycle management for one MarsPro account. Handles the login check,
// the background poll, command routing, and snapshot distribution through
// the Catalog.

use std::sync::Arc;
use std::time::Duration;

use marspro_api::transport::{TlsMode, TransportConfig};
use marspro_api::MarsProClient;
use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec;
use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{HubConfig, TlsVerification};
use crate::entity::{FanController, LightController};
use crate::error::{CoreError, SetupError};
use crate::model::{Device, DeviceGroup};
use crate::store::{self, Catalog, Snapshot};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Hub ──────────────────────────────────────────────────────────

/// The main entry point for hosts.
///
/// Cheaply cloneable via `Arc<HubInner>`. Controllers keep a clone to
/// read state and send commands.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    config: HubConfig,
    client: MarsProClient,
    catalog: Arc<Catalog>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    refresh_requested: Notify,
    cancel: CancellationToken,
    /// Cancels the tasks of the current connection; replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Hub {
    /// Create a hub with its own HTTP client built from the config.
    /// Does NOT connect -- call [`connect()`](Self::connect).
    pub fn new(config: HubConfig) -> Result<Self, CoreError> {
        let client = MarsProClient::new(config.base_url.clone(), &build_transport(&config))?;
        Ok(Self::from_parts(config, client))
    }

    /// Create a hub on top of an HTTP client owned by the host.
    pub fn with_http(config: HubConfig, http: reqwest::Client) -> Self {
        let client = MarsProClient::with_client(http, config.base_url.clone());
        Self::from_parts(config, client)
    }

    fn from_parts(config: HubConfig, client: MarsProClient) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(HubInner {
                config,
                client,
                catalog: Arc::new(Catalog::new()),
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                refresh_requested: Notify::new(),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    /// The API client, for calls outside the poll/command cycle.
    pub fn client(&self) -> &MarsProClient {
        &self.inner.client
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.inner.catalog
    }

    // ── Setup ────────────────────────────────────────────────────

    /// Check the configured credentials against the service.
    ///
    /// Returns the entry title (the configured name prefix) on success.
    pub async fn validate_credentials(&self) -> Result<String, SetupError> {
        let credentials = &self.inner.config.credentials;
        if credentials.is_blank() {
            return Err(SetupError::InvalidAuth);
        }
        if self.inner.client.login(credentials).await? {
            Ok(self.inner.config.name_prefix.clone())
        } else {
            Err(SetupError::InvalidAuth)
        }
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Log in, run the first poll, and spawn the background tasks
    /// (periodic refresh, command processor).
    ///
    /// Calling this on a connected hub does nothing. A hub can connect
    /// again after [`disconnect()`](Self::disconnect).
    pub async fn connect(&self) -> Result<(), CoreError> {
        let starting = self
            .inner
            .connection_state
            .send_if_modified(|state| match *state {
                ConnectionState::Connecting | ConnectionState::Connected => false,
                ConnectionState::Disconnected | ConnectionState::Failed => {
                    *state = ConnectionState::Connecting;
                    true
                }
            });
        if !starting {
            debug!("connect called while connected, ignoring");
            return Ok(());
        }

        // Fresh child token for this connection
        let cancel = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = cancel.clone();

        let config = &self.inner.config;
        match self.inner.client.login(&config.credentials).await {
            Ok(true) => debug!("session accepted"),
            Ok(false) => {
                self.inner.connection_state.send_replace(ConnectionState::Failed);
                return Err(CoreError::AuthenticationFailed {
                    message: "the service declined the login".into(),
                });
            }
            Err(e) => {
                self.inner.connection_state.send_replace(ConnectionState::Failed);
                return Err(e.into());
            }
        }

        // Initial data load
        self.full_refresh().await;

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let hub = self.clone();
            handles.push(tokio::spawn(command_processor_task(
                hub,
                rx,
                cancel.clone(),
            )));
        }

        let hub = self.clone();
        handles.push(tokio::spawn(refresh_task(
            hub,
            config.refresh_interval_secs,
            cancel,
        )));

        self.inner.connection_state.send_replace(ConnectionState::Connected);
        info!(
            devices = self.inner.catalog.snapshot().len(),
            "connected to MarsPro"
        );
        Ok(())
    }

    /// Cancel background tasks and reset the state to
    /// [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        // The processor dropped its receiver; give the next connect a new channel.
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        *self.inner.command_tx.lock().await = tx;
        *self.inner.command_rx.lock().await = Some(rx);

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Poll every group and swap in the result.
    ///
    /// Never fails as a whole: groups whose call failed are absent from
    /// the new snapshot.
    pub async fn full_refresh(&self) -> Arc<Snapshot> {
        let snapshot =
            store::fetch_snapshot(&self.inner.client, &self.inner.config.other_groups).await;
        self.inner.catalog.replace(snapshot)
    }

    /// Ask the background task for an out-of-band refresh.
    ///
    /// Requests made while one is already pending collapse into one.
    pub fn request_refresh(&self) {
        self.inner.refresh_requested.notify_one();
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command through the command processor task.
    ///
    /// A successful command schedules a refresh so the next snapshot
    /// reflects it.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::HubDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::HubDisconnected)?;

        let result = rx.await.map_err(|_| CoreError::HubDisconnected)?;
        if result.is_ok() {
            self.request_refresh();
        }
        result
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect. Periodic refresh is
    /// disabled since only a single request-response cycle is needed.
    pub async fn oneshot<F, Fut, T>(config: HubConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Hub) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let hub = Hub::new(cfg)?;
        hub.connect().await?;
        let result = f(hub.clone()).await;
        hub.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.catalog.snapshot()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.catalog.subscribe()
    }

    pub fn device(&self, id: &str) -> Option<Arc<Device>> {
        self.inner.catalog.device(id)
    }

    /// One controller per light in the current snapshot.
    pub fn lights(&self) -> Vec<LightController> {
        self.snapshot()
            .group(DeviceGroup::Light)
            .iter()
            .map(|d| LightController::new(self.clone(), d))
            .collect()
    }

    /// One controller per fan in the current snapshot.
    pub fn fans(&self) -> Vec<FanController> {
        self.snapshot()
            .group(DeviceGroup::Fan)
            .iter()
            .map(|d| FanController::new(self.clone(), d))
            .collect()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll on the configured interval and whenever a refresh is requested.
async fn refresh_task(hub: Hub, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = (interval_secs > 0)
        .then(|| tokio::time::interval(Duration::from_secs(interval_secs)));
    if let Some(interval) = interval.as_mut() {
        interval.tick().await; // consume the immediate first tick
    }

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = hub.inner.refresh_requested.notified() => {
                debug!("out-of-band refresh");
                hub.full_refresh().await;
                if let Some(interval) = interval.as_mut() {
                    interval.reset();
                }
            }
            () = next_tick(interval.as_mut()) => {
                hub.full_refresh().await;
            }
        }
    }
}

/// Wait for the next tick, or forever when periodic polling is off.
async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Process commands one at a time, in arrival order.
async fn command_processor_task(
    hub: Hub,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&hub, envelope.command).await;
                if let Err(ref e) = result {
                    warn!(error = %e, "command failed");
                }
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(hub: &Hub, cmd: Command) -> Result<CommandResult, CoreError> {
    ensure_known(hub, cmd.device_id())?;
    let client = &hub.inner.client;

    match cmd {
        Command::SetLightBrightness {
            device_id,
            percentage,
        } => {
            let percentage = percentage.min(100);
            client.set_light_brightness(&device_id, percentage).await?;
            Ok(CommandResult::Brightness(percentage))
        }
        Command::SetFanSpeed {
            device_id,
            percentage,
        } => {
            let calc = client
                .set_fan_speed(&device_id, codec::fan_command_percent(percentage))
                .await?;
            Ok(CommandResult::FanSpeed(calc))
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the hub configuration.
fn build_transport(config: &HubConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
    }
}

fn ensure_known(hub: &Hub, device_id: &str) -> Result<(), CoreError> {
    hub.device(device_id)
        .map(|_| ())
        .ok_or_else(|| CoreError::DeviceNotFound {
            identifier: device_id.to_owned(),
        })
}
