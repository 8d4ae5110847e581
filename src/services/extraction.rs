use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ring::rand::{SecureRandom, SystemRandom};
use tokio::task::JoinHandle;

use crate::models::ExtractionResult;
use crate::services::catalog::{mock_receipt, mock_receipt_count};

/// Where extracted receipt data comes from.
pub trait ExtractionSource: Send {
    fn produce(&self) -> ExtractionResult;
}

/// Picks one catalog receipt uniformly at random.
pub struct MockReceiptSource {
    rng: SystemRandom,
}

impl MockReceiptSource {
    pub fn new() -> Self {
        MockReceiptSource {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for MockReceiptSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionSource for MockReceiptSource {
    fn produce(&self) -> ExtractionResult {
        mock_receipt(random_index(&self.rng, mock_receipt_count()))
    }
}

fn random_index(rng: &dyn SecureRandom, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let len = len as u32;
    // Values at or above `zone` would bias the modulo toward low indices.
    let zone = u32::MAX - u32::MAX % len;
    loop {
        let mut bytes = [0u8; 4];
        if rng.fill(&mut bytes).is_err() {
            tracing::warn!("System RNG unavailable, using first mock receipt");
            return 0;
        }
        let value = u32::from_le_bytes(bytes);
        if value < zone {
            return (value % len) as usize;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    Upload,
    Camera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionDelays {
    pub upload: Duration,
    pub camera: Duration,
}

impl ExtractionDelays {
    pub fn for_kind(&self, kind: ExtractionKind) -> Duration {
        match kind {
            ExtractionKind::Upload => self.upload,
            ExtractionKind::Camera => self.camera,
        }
    }
}

impl Default for ExtractionDelays {
    fn default() -> Self {
        ExtractionDelays {
            upload: Duration::from_millis(1800),
            camera: Duration::from_millis(2400),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtractionTicket(u64);

impl ExtractionTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A scheduled completion. Cancelling or dropping the handle aborts the task,
/// and the flag stops a completion that has already woken from firing.
pub struct ExtractionHandle {
    ticket: ExtractionTicket,
    label: String,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ExtractionHandle {
    pub fn ticket(&self) -> ExtractionTicket {
        self.ticket
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

impl Drop for ExtractionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Holds at most one pending extraction. Must be driven from inside a Tokio
/// runtime, since `start` spawns the delay task.
pub struct ExtractionSimulator {
    source: Box<dyn ExtractionSource>,
    delays: ExtractionDelays,
    next_ticket: u64,
    pending: Option<ExtractionHandle>,
}

impl ExtractionSimulator {
    pub fn new(source: Box<dyn ExtractionSource>, delays: ExtractionDelays) -> Self {
        ExtractionSimulator {
            source,
            delays,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn with_mock_catalog(delays: ExtractionDelays) -> Self {
        Self::new(Box::new(MockReceiptSource::new()), delays)
    }

    /// Cancels whatever was pending, then schedules `on_complete` with the new
    /// ticket and a freshly produced result after the delay for `kind`.
    pub fn start<F>(&mut self, kind: ExtractionKind, label: impl Into<String>, on_complete: F) -> ExtractionTicket
    where
        F: FnOnce(ExtractionTicket, ExtractionResult) + Send + 'static,
    {
        self.cancel_pending();

        self.next_ticket += 1;
        let ticket = ExtractionTicket(self.next_ticket);
        let label = label.into();
        let delay = self.delays.for_kind(kind);
        let result = self.source.produce();
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = cancelled.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if flag.load(Ordering::SeqCst) {
                return;
            }
            on_complete(ticket, result);
        });

        tracing::info!(ticket = ticket.id(), label = %label, ?kind, ?delay, "Extraction scheduled");
        self.pending = Some(ExtractionHandle {
            ticket,
            label,
            cancelled,
            task,
        });
        ticket
    }

    /// Returns true when `ticket` was the pending extraction.
    pub fn cancel(&mut self, ticket: ExtractionTicket) -> bool {
        if self.is_pending(ticket) {
            self.cancel_pending();
            true
        } else {
            false
        }
    }

    pub fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            tracing::debug!(ticket = handle.ticket().id(), label = %handle.label, "Extraction cancelled");
            handle.cancel();
        }
    }

    pub fn is_pending(&self, ticket: ExtractionTicket) -> bool {
        self.pending
            .as_ref()
            .map(|handle| handle.ticket() == ticket)
            .unwrap_or(false)
    }

    /// Releases the slot for a completion that arrived. Returns false for a
    /// ticket that was superseded or cancelled.
    pub fn finish(&mut self, ticket: ExtractionTicket) -> bool {
        if self.is_pending(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
