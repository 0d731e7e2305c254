//! Resume/suspend handshake between the UI thread and the audio device.
//!
//! The control half records the requested state and waits until the device half,
//! which lives inside the audio callback, has rendered a block in that state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::output::AudioError;

/// Longest wait for the audio callback to acknowledge a request.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportState {
    Suspended,
    Running,
    Failed(String),
}

pub struct TransportControl {
    requested: Arc<AtomicBool>,
    confirmed: watch::Receiver<TransportState>,
}

#[derive(Clone)]
pub struct TransportTap {
    requested: Arc<AtomicBool>,
    confirmed: Arc<watch::Sender<TransportState>>,
}

pub fn transport() -> (TransportControl, TransportTap) {
    let requested = Arc::new(AtomicBool::new(false));
    let (tx, rx) = watch::channel(TransportState::Suspended);
    (
        TransportControl {
            requested: requested.clone(),
            confirmed: rx,
        },
        TransportTap {
            requested,
            confirmed: Arc::new(tx),
        },
    )
}

impl TransportControl {
    pub fn confirmed(&self) -> TransportState {
        self.confirmed.borrow().clone()
    }

    pub async fn resume(&mut self) -> Result<(), AudioError> {
        self.request(true).await
    }

    pub async fn suspend(&mut self) -> Result<(), AudioError> {
        self.request(false).await
    }

    /// Must run inside a tokio runtime: the audio thread wakes the waiter, and the
    /// wait is bounded by `CONFIRM_TIMEOUT`. An unconfirmed request is withdrawn so
    /// the callback keeps rendering in the last confirmed state.
    async fn request(&mut self, running: bool) -> Result<(), AudioError> {
        let target = if running {
            TransportState::Running
        } else {
            TransportState::Suspended
        };
        let previous = self.requested.swap(running, Ordering::AcqRel);
        let outcome = self.confirmation(target).await;
        if outcome.is_err() {
            self.requested.store(previous, Ordering::Release);
        }
        outcome
    }

    async fn confirmation(&mut self, target: TransportState) -> Result<(), AudioError> {
        let wait = self
            .confirmed
            .wait_for(|state| *state == target || matches!(state, TransportState::Failed(_)));
        let state = tokio::time::timeout(CONFIRM_TIMEOUT, wait)
            .await
            .map_err(|_| AudioError::Unresponsive)?
            .map_err(|_| AudioError::Disconnected)?
            .clone();
        match state {
            TransportState::Failed(reason) => Err(AudioError::StreamFailed(reason)),
            _ => Ok(()),
        }
    }
}

impl TransportTap {
    /// Called once per audio block. Returns whether the block should carry signal;
    /// a failed device stays silent.
    pub fn poll(&self) -> bool {
        let running = self.requested.load(Ordering::Acquire);
        let observed = if running {
            TransportState::Running
        } else {
            TransportState::Suspended
        };
        let mut audible = running;
        self.confirmed.send_if_modified(|state| {
            if matches!(state, TransportState::Failed(_)) {
                audible = false;
                false
            } else if *state == observed {
                false
            } else {
                *state = observed;
                true
            }
        });
        audible
    }

    /// Latches a device failure; pending and future requests fail until rebuilt.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.confirmed.send_modify(|state| *state = TransportState::Failed(reason));
    }
}
