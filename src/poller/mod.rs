use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::api::{ApiClient, RawNotification};
use crate::config::{ApiOptions, PollOptions};

#[derive(Debug, Clone)]
pub enum PollEvent {
    Started,
    Loaded(Vec<RawNotification>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum PollerStatus {
    Disabled,
    Idle {
        last_success: Option<OffsetDateTime>,
    },
    InFlight,
    Error {
        message: String,
        occurred_at: OffsetDateTime,
    },
}

/// UI-side handle to the background fetch worker. A single worker owns the
/// client and serializes fetches, so a slow response can never be applied
/// over a newer one.
pub struct PollerHandle {
    events: Receiver<PollEvent>,
    refresh: Sender<()>,
    status: Arc<Mutex<PollerStatus>>,
    enabled: bool,
}

impl PollerHandle {
    pub fn spawn(api: &ApiOptions, poll: &PollOptions) -> Result<Self> {
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        // Capacity 1: a refresh pressed during a fetch coalesces into one
        // extra pass instead of queueing.
        let (refresh_tx, refresh_rx) = crossbeam_channel::bounded(1);
        let status = Arc::new(Mutex::new(if poll.enabled {
            PollerStatus::Idle { last_success: None }
        } else {
            PollerStatus::Disabled
        }));

        let client = ApiClient::new(api)?;
        let worker = Worker {
            client,
            interval: poll.interval(),
            enabled: poll.enabled,
            events: event_tx,
            refresh: refresh_rx,
            status: Arc::clone(&status),
        };
        thread::Builder::new()
            .name("siren-poller".to_string())
            .spawn(move || worker.run())
            .context("failed to spawn poller thread")?;

        Ok(Self {
            events: event_rx,
            refresh: refresh_tx,
            status,
            enabled: poll.enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Non-blocking drain of pending events, called from the tick handler.
    pub fn try_recv(&self) -> Option<PollEvent> {
        self.events.try_recv().ok()
    }

    /// Asks the worker for an immediate fetch. A nudge that arrives while
    /// one is already queued is dropped.
    pub fn request_refresh(&self) {
        let _ = self.refresh.try_send(());
    }

    pub fn status(&self) -> PollerStatus {
        self.status.lock().clone()
    }
}

struct Worker {
    client: ApiClient,
    interval: Duration,
    enabled: bool,
    events: Sender<PollEvent>,
    refresh: Receiver<()>,
    status: Arc<Mutex<PollerStatus>>,
}

impl Worker {
    fn run(self) {
        if self.enabled {
            if self.fetch_once().is_err() {
                return;
            }
        }
        loop {
            let wait = if self.enabled {
                self.refresh.recv_timeout(self.interval)
            } else {
                // Polling off: wake only for manual refreshes.
                self.refresh
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected)
            };
            match wait {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {
                    if self.fetch_once().is_err() {
                        return;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// One fetch pass. `Err` means the UI side hung up and the worker
    /// should exit.
    fn fetch_once(&self) -> Result<(), ()> {
        *self.status.lock() = PollerStatus::InFlight;
        self.events.send(PollEvent::Started).map_err(|_| ())?;

        match self.client.fetch_notifications() {
            Ok(notifications) => {
                debug!(count = notifications.len(), "poll succeeded");
                *self.status.lock() = PollerStatus::Idle {
                    last_success: Some(OffsetDateTime::now_utc()),
                };
                self.events
                    .send(PollEvent::Loaded(notifications))
                    .map_err(|_| ())
            }
            Err(err) => {
                let message = err.to_string();
                warn!(%message, "poll failed");
                *self.status.lock() = PollerStatus::Error {
                    message: message.clone(),
                    occurred_at: OffsetDateTime::now_utc(),
                };
                self.events
                    .send(PollEvent::Failed(message))
                    .map_err(|_| ())
            }
        }
    }
}
