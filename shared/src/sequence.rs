//! Request sequencing and input debouncing for the UI data layer
//!
//! Every fetch takes a ticket; only the response for the newest ticket may
//! commit to shared state, so a slow stale response can no longer overwrite
//! fresher data.

use std::sync::atomic::{AtomicU64, Ordering};

/// Delay applied to search boxes before a request is dispatched
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Sequence number handed out when a request starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Rebuild a ticket whose sequence number crossed an FFI boundary
    pub fn from_sequence(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Issues request tickets and decides which responses may commit
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
    committed: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request; any earlier ticket becomes stale
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `ticket` is still the newest request
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Claim the right to commit a response. True at most once, and only
    /// for the newest ticket.
    pub fn accept(&self, ticket: RequestTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.committed.fetch_max(ticket.0, Ordering::AcqRel) < ticket.0
    }

    /// Invalidate every in-flight request, e.g. when the view goes away
    pub fn cancel_all(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }
}

/// Trailing-edge debounce driven by caller-supplied timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Record input at `now_ms`, restarting the wait
    pub fn touch(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// True once the quiet period has elapsed since the last input
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
