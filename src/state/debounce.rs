//! Quiet-period debouncing for text filters.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep_until},
};

enum Input<T> {
    Value(T),
    Cancel,
}

/// Commits the last pushed value once no new value arrived for `quiet`.
///
/// Each filter field owns one debouncer. The commit closure should apply its
/// value as a patch to the latest shared parameters rather than capturing a
/// snapshot of them.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Input<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(quiet: Duration, mut commit: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Input<T>>();

        let task = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            let mut deadline = Instant::now();

            loop {
                tokio::select! {
                    input = rx.recv() => match input {
                        Some(Input::Value(value)) => {
                            pending = Some(value);
                            deadline = Instant::now() + quiet;
                        }
                        Some(Input::Cancel) => pending = None,
                        None => break,
                    },
                    _ = sleep_until(deadline), if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            commit(value).await;
                        }
                    }
                }
            }
        });

        Self { tx, task }
    }

    /// Restarts the quiet period with `value` as the candidate.
    pub fn push(&self, value: T) {
        if self.tx.send(Input::Value(value)).is_err() {
            tracing::debug!("debouncer task already stopped");
        }
    }

    /// Drops the pending value without committing it.
    pub fn cancel(&self) {
        let _ = self.tx.send(Input::Cancel);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
