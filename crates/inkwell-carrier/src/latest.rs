//! Latest-request-wins slot.
//!
//! Each field of the address form owns one slot. Starting a lookup bumps the
//! slot's sequence number and aborts whatever lookup was still running, so
//! only the most recent request can ever deliver a result.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// A finished lookup tagged with the sequence number it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued<T> {
    pub seq: u64,
    pub value: T,
}

#[derive(Debug, Default)]
struct Slot {
    seq: u64,
    in_flight: Option<AbortHandle>,
}

#[derive(Debug, Default)]
pub struct LatestRequest {
    slot: Mutex<Slot>,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // The slot holds no invariants a panic could break.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sequence number of the most recently issued request.
    pub fn current(&self) -> u64 {
        self.lock().seq
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.lock().seq == seq
    }

    /// Supersede the in-flight request, if any, without issuing a new one.
    pub fn cancel(&self) {
        let mut slot = self.lock();
        slot.seq += 1;
        if let Some(handle) = slot.in_flight.take() {
            handle.abort();
        }
    }

    /// Run `fut` as the slot's latest request.
    ///
    /// Returns `None` when a newer request (or [`cancel`](Self::cancel))
    /// superseded this one before it finished.
    pub async fn run<F, T>(&self, fut: F) -> Option<Issued<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (seq, handle) = {
            let mut slot = self.lock();
            slot.seq += 1;
            let handle = tokio::spawn(fut);
            if let Some(previous) = slot.in_flight.replace(handle.abort_handle()) {
                debug!(seq = slot.seq, "aborting superseded lookup");
                previous.abort();
            }
            (slot.seq, handle)
        };

        let outcome = handle.await;

        let mut slot = self.lock();
        if slot.seq != seq {
            return None;
        }
        slot.in_flight = None;
        match outcome {
            Ok(value) => Some(Issued { seq, value }),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!(seq, "lookup task failed: {e}");
                None
            }
        }
    }
}
