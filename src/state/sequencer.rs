use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use tokio_util::sync::CancellationToken;

/// Hands out monotonically increasing tickets. Issuing a ticket cancels the
/// previous one, and only the latest ticket may commit its response.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    seq: u64,
    token: CancellationToken,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        Ticket { seq, token }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }

    pub fn cancel_all(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = current.take() {
            token.cancel();
        }
    }
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drives `fut` until it finishes or the ticket is cancelled.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
