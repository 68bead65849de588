// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Single-slot admission for session operations
//!
//! One operation holds the slot at a time; the rest wait in FIFO order.
//! The slot is a one-permit fair semaphore, so release hands the permit to
//! the oldest waiter and a dropped waiter simply leaves the queue.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Error, Result};

/// Serializes operations against one session
#[derive(Debug)]
pub struct SessionGate {
    /// The single concurrency slot
    slot: Arc<Semaphore>,
    /// Queue bookkeeping
    queue: Arc<Mutex<QueueState>>,
}

#[derive(Debug, Default)]
struct QueueState {
    /// Callers waiting for the slot
    pending: usize,
    /// Maximum waiting callers (None = unbounded)
    max_pending: Option<usize>,
}

/// Proof of holding the slot; dropping it releases the slot
#[derive(Debug)]
pub struct SlotGuard {
    _permit: OwnedSemaphorePermit,
}

/// Decrements the pending count when a waiter stops waiting
struct PendingGuard {
    queue: Arc<Mutex<QueueState>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut queue = self.queue.lock();
        queue.pending = queue.pending.saturating_sub(1);
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SessionGate {
    /// Create a gate with an optional wait queue bound
    pub fn new(max_pending: Option<usize>) -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
            queue: Arc::new(Mutex::new(QueueState {
                pending: 0,
                max_pending,
            })),
        }
    }

    /// Bound the wait queue; `None` queues every caller
    pub fn set_max_pending(&self, max_pending: Option<usize>) {
        self.queue.lock().max_pending = max_pending;
    }

    /// Current wait queue bound
    pub fn max_pending(&self) -> Option<usize> {
        self.queue.lock().max_pending
    }

    /// Callers currently waiting for the slot
    pub fn pending(&self) -> usize {
        self.queue.lock().pending
    }

    /// Check if an operation holds the slot
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Wait for the slot
    ///
    /// Fails immediately with `QueueOverflow` when the slot is taken and the
    /// wait queue is already at its bound. Dropping the returned future while
    /// it waits leaves the queue without side effects.
    pub async fn acquire(&self) -> Result<SlotGuard> {
        // Fair semaphore: this fails while others wait, so nobody jumps the queue
        if let Ok(permit) = self.slot.clone().try_acquire_owned() {
            return Ok(SlotGuard { _permit: permit });
        }

        let _waiting = {
            let mut queue = self.queue.lock();
            if let Some(max) = queue.max_pending {
                if queue.pending >= max {
                    return Err(Error::QueueOverflow { max_pending: max });
                }
            }
            queue.pending += 1;
            PendingGuard {
                queue: Arc::clone(&self.queue),
            }
        };

        let permit = self
            .slot
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Config("session gate closed".into()))?;

        Ok(SlotGuard { _permit: permit })
    }

    /// Run `operation` while holding the slot
    ///
    /// The slot is released when the operation finishes, fails, or is
    /// dropped.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        let _slot = self.acquire().await?;
        operation.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_slot_is_exclusive() {
        let gate = Arc::new(SessionGate::default());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    gate.run(async {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .await
                })
            })
            .collect();

        for task in tasks {
            assert_ok!(task.await.unwrap());
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let gate = Arc::new(SessionGate::default());
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = assert_ok!(gate.acquire().await);
        let mut tasks = Vec::new();
        for i in 0..5 {
            let waiter = Arc::clone(&gate);
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let _slot = waiter.acquire().await.unwrap();
                order.lock().push(i);
            }));
            // Let the task enqueue before spawning the next one
            while gate.pending() < i + 1 {
                tokio::task::yield_now().await;
            }
        }

        drop(first);
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_queue_overflow() {
        let gate = Arc::new(SessionGate::new(Some(1)));
        let held = assert_ok!(gate.acquire().await);

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
        };
        while gate.pending() < 1 {
            tokio::task::yield_now().await;
        }

        let err = assert_err!(gate.acquire().await);
        assert!(matches!(err, Error::QueueOverflow { max_pending: 1 }));

        drop(held);
        assert_ok!(waiter.await.unwrap());
        assert_eq!(gate.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_leaves_queue() {
        let gate = Arc::new(SessionGate::new(Some(1)));
        let held = assert_ok!(gate.acquire().await);

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
        };
        while gate.pending() < 1 {
            tokio::task::yield_now().await;
        }
        waiter.abort();
        let _ = waiter.await;
        assert_eq!(gate.pending(), 0);

        drop(held);
        assert_ok!(gate.acquire().await);
    }

    #[tokio::test]
    async fn test_slot_released_on_error() {
        let gate = SessionGate::default();
        let result: Result<()> = gate.run(async { Err(Error::network("boom")) }).await;
        assert!(result.is_err());
        assert!(!gate.is_busy());
        assert_ok!(gate.run(async { Ok(()) }).await);
    }
}
