//! Single-flight job runner.
//!
//! A `Flight` owns at most one live job. Launching a new job cancels the
//! previous one through its `CancellationToken` and bumps the generation; any
//! event still queued from an older generation is dropped on receipt, so a
//! superseded job can never reach caller state.

use std::future::Future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct Tagged<E> {
    generation: u64,
    event: E,
}

/// Handle given to a running job for reporting back to its `Flight`.
#[derive(Debug, Clone)]
pub struct Emitter<E> {
    generation: u64,
    token: CancellationToken,
    tx: mpsc::UnboundedSender<Tagged<E>>,
}

impl<E> Emitter<E> {
    pub fn emit(&self, event: E) {
        if self.token.is_cancelled() {
            return;
        }
        let _ = self.tx.send(Tagged {
            generation: self.generation,
            event,
        });
    }
}

#[derive(Debug)]
pub struct Flight<E> {
    generation: u64,
    token: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<Tagged<E>>,
    rx: mpsc::UnboundedReceiver<Tagged<E>>,
}

impl<E: Send + 'static> Flight<E> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            generation: 0,
            token: None,
            tx,
            rx,
        }
    }

    /// Cancels the live job, if any, and spawns `job` in its place.
    /// Must be called from within a tokio runtime.
    pub fn launch<F, Fut>(&mut self, job: F) -> u64
    where
        F: FnOnce(Emitter<E>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let token = CancellationToken::new();
        let emitter = Emitter {
            generation: self.generation,
            token: token.clone(),
            tx: self.tx.clone(),
        };
        let fut = job(emitter);
        let guard = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = fut => {}
            }
        });
        self.token = Some(token);
        self.generation
    }

    /// Cancels the live job. Returns true when there was one to cancel.
    pub fn cancel(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                let was_live = !token.is_cancelled();
                token.cancel();
                if was_live {
                    debug!(generation = self.generation, "cancelled in-flight job");
                }
                was_live
            }
            None => false,
        }
    }

    /// Marks the current job as finished so a later `cancel` is a no-op.
    pub fn settle(&mut self) {
        self.token = None;
    }

    /// Returns the next queued event from the current generation without waiting.
    pub fn try_next(&mut self) -> Option<E> {
        while let Ok(tagged) = self.rx.try_recv() {
            if let Some(event) = self.accept(tagged) {
                return Some(event);
            }
        }
        None
    }

    /// Waits for the next event from the current generation.
    pub async fn next(&mut self) -> E {
        loop {
            // The flight holds a sender, so the channel never closes.
            let Some(tagged) = self.rx.recv().await else {
                continue;
            };
            if let Some(event) = self.accept(tagged) {
                return event;
            }
        }
    }

    fn accept(&self, tagged: Tagged<E>) -> Option<E> {
        if tagged.generation == self.generation && self.token.is_some() {
            Some(tagged.event)
        } else {
            debug!(
                stale = tagged.generation,
                current = self.generation,
                "dropping stale event"
            );
            None
        }
    }
}

impl<E: Send + 'static> Default for Flight<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Drop for Flight<E> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
