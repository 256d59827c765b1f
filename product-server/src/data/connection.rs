//! Datastore connection lifecycle.
//!
//! [`ConnectionManager`] owns the single datastore handle and a readiness
//! flag. Connection attempts run on a background task that retries forever at
//! a fixed interval; failures are logged and never reach request handlers.
//! Once connected, an optional periodic ping reverts the manager to
//! `Disconnected` when the datastore goes away, and the retry loop resumes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::error::DomainError;

#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Handle, DomainError>;
    async fn ping(&self, handle: &Self::Handle) -> Result<(), DomainError>;
    /// Human readable target, safe to log.
    fn describe(&self) -> String;
}

/// Read side of the connection state, as seen by the HTTP layer.
pub trait Readiness: Send + Sync {
    fn is_ready(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            2 => ConnectionState::Connected,
            1 => ConnectionState::Connecting,
            _ => ConnectionState::Disconnected,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectionPolicy {
    pub retry_interval: Duration,
    /// `None` keeps a successful connection forever without re-checking.
    pub health_check_interval: Option<Duration>,
}

pub struct ConnectionManager<C: Connector> {
    connector: C,
    policy: ConnectionPolicy,
    state: AtomicU8,
    handle: RwLock<Option<C::Handle>>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, policy: ConnectionPolicy) -> Self {
        Self {
            connector,
            policy,
            state: AtomicU8::new(ConnectionState::Disconnected.as_u8()),
            handle: RwLock::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub async fn handle(&self) -> Option<C::Handle> {
        self.handle.read().await.clone()
    }

    /// Spawns the connection task. It lives as long as the runtime does.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.run().await })
    }

    async fn run(&self) {
        loop {
            self.connect_until_ready().await;
            match self.policy.health_check_interval {
                Some(interval) => self.watch_health(interval).await,
                None => return,
            }
        }
    }

    async fn connect_until_ready(&self) {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            self.set_state(ConnectionState::Connecting);
            info!(
                attempt,
                target = %self.connector.describe(),
                "attempting datastore connection"
            );

            match self.connector.connect().await {
                Ok(handle) => {
                    *self.handle.write().await = Some(handle);
                    self.set_state(ConnectionState::Connected);
                    info!(attempt, "datastore connected");
                    return;
                }
                Err(err) => {
                    self.set_state(ConnectionState::Disconnected);
                    warn!(
                        attempt,
                        error = %err,
                        retry_in_secs = self.policy.retry_interval.as_secs_f64(),
                        "datastore connection failed, will retry"
                    );
                    tokio::time::sleep(self.policy.retry_interval).await;
                }
            }
        }
    }

    /// Returns once a ping fails and the manager has been reset.
    async fn watch_health(&self, interval: Duration) {
        loop {
            tokio::time::sleep(interval).await;
            let Some(handle) = self.handle().await else {
                self.set_state(ConnectionState::Disconnected);
                return;
            };

            match self.connector.ping(&handle).await {
                Ok(()) => debug!("datastore health check passed"),
                Err(err) => {
                    warn!(error = %err, "datastore health check failed, reconnecting");
                    self.set_state(ConnectionState::Disconnected);
                    *self.handle.write().await = None;
                    return;
                }
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

impl<C: Connector> Readiness for ConnectionManager<C> {
    fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}
