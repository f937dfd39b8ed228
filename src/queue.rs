//! Work queue with per-item completion tracking.
//!
//! The queue is filled once at construction. Consumers take a [`Ticket`]
//! per item and the item counts as finished only when its ticket is
//! completed or dropped. [`WorkQueue::join`] resolves once every item has
//! been finished, which is stronger than the queue merely being empty.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, Notify};

#[derive(Debug)]
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    unfinished: AtomicUsize,
    finished: Notify,
}

impl<T> WorkQueue<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let items: VecDeque<T> = items.into_iter().collect();
        let unfinished = AtomicUsize::new(items.len());
        Self {
            items: Mutex::new(items),
            unfinished,
            finished: Notify::new(),
        }
    }

    /// Take the next item, or `None` once the queue is drained.
    pub async fn pop(&self) -> Option<Ticket<'_, T>> {
        let item = self.items.lock().await.pop_front()?;
        Some(Ticket { queue: self, item })
    }

    /// Items not yet dequeued.
    pub async fn pending(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Items dequeued or pending whose ticket has not been finished yet.
    pub fn unfinished(&self) -> usize {
        self.unfinished.load(Ordering::Acquire)
    }

    /// Wait until every item has been dequeued and finished.
    pub async fn join(&self) {
        loop {
            // Register before checking so a concurrent final ack is not missed.
            let notified = self.finished.notified();
            if self.unfinished() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish_one(&self) {
        if self.unfinished.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.finished.notify_waiters();
        }
    }
}

/// A dequeued item. Finishing it (explicitly or by drop) acknowledges it to
/// the queue exactly once.
#[derive(Debug)]
pub struct Ticket<'a, T> {
    queue: &'a WorkQueue<T>,
    item: T,
}

impl<T> Ticket<'_, T> {
    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn done(self) {}
}

impl<T> Drop for Ticket<'_, T> {
    fn drop(&mut self) {
        self.queue.finish_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn pops_in_insertion_order() {
        let q = WorkQueue::new([3u16, 1, 2]);
        let mut seen = Vec::new();
        while let Some(t) = q.pop().await {
            seen.push(*t.item());
            t.done();
        }
        assert_eq!(seen, vec![3, 1, 2]);
        assert_eq!(q.unfinished(), 0);
    }

    #[tokio::test]
    async fn join_on_empty_queue_returns() {
        let q: WorkQueue<u16> = WorkQueue::new(Vec::new());
        tokio::time::timeout(Duration::from_millis(100), q.join())
            .await
            .expect("join should not block on an empty queue");
    }

    #[tokio::test]
    async fn join_waits_for_acks_not_emptiness() {
        let q = Arc::new(WorkQueue::new([1u16, 2]));
        let a = q.pop().await.unwrap();
        let b = q.pop().await.unwrap();
        assert_eq!(q.pending().await, 0);

        let blocked = tokio::time::timeout(Duration::from_millis(50), q.join()).await;
        assert!(blocked.is_err(), "join released with items in flight");

        a.done();
        assert_eq!(q.unfinished(), 1);

        let waiter = {
            let q = q.clone();
            tokio::spawn(async move { q.join().await })
        };
        drop(b);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("join did not release")
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_see_each_item_once() {
        let q = Arc::new(WorkQueue::new(1u16..=500));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let q = q.clone();
            handles.push(tokio::spawn(async move {
                let mut got = Vec::new();
                while let Some(t) = q.pop().await {
                    got.push(*t.item());
                }
                got
            }));
        }
        let mut all = Vec::new();
        for h in handles {
            all.extend(h.await.unwrap());
        }
        q.join().await;
        all.sort_unstable();
        assert_eq!(all, (1u16..=500).collect::<Vec<_>>());
    }
}
