use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Bounded pool of grading slots.
///
/// Workers over the limit wait in FIFO order; a released slot wakes exactly
/// one waiter. This caps how many grading subprocesses run at once, replacing
/// unbounded fan-out with explicit backpressure.
#[derive(Clone)]
pub struct WorkerPool {
    slots: Arc<Mutex<SlotQueue>>,
}

struct SlotQueue {
    max_concurrent: usize,
    running: usize,
    waiting: VecDeque<Arc<Notify>>,
}

impl SlotQueue {
    /// Called when a job begins. Takes a slot if one is free, otherwise
    /// returns the notifier the job must wait on.
    fn try_acquire_slot(&mut self) -> Option<Arc<Notify>> {
        if self.running < self.max_concurrent {
            self.running += 1;
            None
        } else {
            let notify = Arc::new(Notify::new());
            self.waiting.push_back(notify.clone());
            Some(notify)
        }
    }

    /// Called when a job completes. Hands the slot to the oldest waiter.
    fn release_slot(&mut self) {
        self.running = self.running.saturating_sub(1);

        if let Some(waiting_task) = self.waiting.pop_front() {
            self.running += 1;
            waiting_task.notify_one();
        }
    }
}

impl WorkerPool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(SlotQueue {
                max_concurrent: max_concurrent.max(1),
                running: 0,
                waiting: VecDeque::new(),
            })),
        }
    }

    /// Take a slot, waiting in line if the pool is saturated.
    pub async fn acquire(&self) {
        let maybe_notify = {
            let mut slots = self.slots.lock().await;
            slots.try_acquire_slot()
        };

        // If we got a notify, wait for it outside the mutex.
        if let Some(notify) = maybe_notify {
            notify.notified().await;
        }
    }

    /// Return a slot to the pool.
    pub async fn release(&self) {
        let mut slots = self.slots.lock().await;
        slots.release_slot();
    }

    /// Number of jobs currently holding a slot.
    pub async fn running(&self) -> usize {
        self.slots.lock().await.running
    }
}
