use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Semaphore;

/// Default number of pending connections a service holds before the
/// acceptor waits for a worker
pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

/// A bounded FIFO shared between one producer (the acceptor) and a pool of
/// consumers (the workers).
///
/// `slots` counts free positions and `items` counts queued elements, so
/// `enqueue` waits while the queue is full and `dequeue` waits while it is
/// empty. Each item is handed to exactly one `dequeue` call.
#[derive(Debug)]
pub struct WorkQueue<T> {
    buffer: Mutex<VecDeque<T>>,
    slots: Semaphore,
    items: Semaphore,
}

impl<T> WorkQueue<T> {
    /// Creates a queue holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer().len()
    }

    /// Appends `item`, waiting for a free slot if the queue is full.
    /// Hands the item back if the queue has been closed.
    pub async fn enqueue(&self, item: T) -> Result<(), T> {
        match self.slots.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Err(item),
        }

        self.buffer().push_back(item);
        self.items.add_permits(1);
        Ok(())
    }

    /// Removes the oldest item, waiting for one if the queue is empty.
    /// Once closed, drains whatever is left and then returns `None`.
    pub async fn dequeue(&self) -> Option<T> {
        match self.items.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return self.buffer().pop_front(),
        }

        let item = self.buffer().pop_front();
        self.slots.add_permits(1);
        item
    }

    /// Wakes every waiting producer and consumer; further `enqueue` calls fail
    pub fn close(&self) {
        self.slots.close();
        self.items.close();
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    const WAIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::new(4);
        for i in 0..4 {
            queue.enqueue(i).await.expect("enqueue");
        }

        assert_eq!(queue.len(), 4);
        for i in 0..4 {
            assert_eq!(queue.dequeue().await, Some(i));
        }
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_enqueue_waits_while_full() {
        let queue = Arc::new(WorkQueue::new(1));
        queue.enqueue(1).await.expect("enqueue");

        let blocked = tokio::time::timeout(WAIT, queue.enqueue(2)).await;
        assert!(blocked.is_err(), "enqueue into a full queue should wait");

        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.enqueue(3).await })
        };
        assert_eq!(queue.dequeue().await, Some(1));
        producer.await.expect("join").expect("enqueue");
        assert_eq!(queue.dequeue().await, Some(3));
    }

    #[tokio::test]
    async fn test_dequeue_waits_while_empty() {
        let queue = Arc::new(WorkQueue::<u32>::new(2));

        let blocked = tokio::time::timeout(WAIT, queue.dequeue()).await;
        assert!(blocked.is_err(), "dequeue from an empty queue should wait");

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.dequeue().await })
        };
        queue.enqueue(9).await.expect("enqueue");
        assert_eq!(consumer.await.expect("join"), Some(9));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_item_delivered_once() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 250;

        let queue = Arc::new(WorkQueue::new(3));

        let consumers = (0..6)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut seen = vec![];
                    while let Some(item) = queue.dequeue().await {
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect::<Vec<_>>();

        let producers = (0..PRODUCERS)
            .map(|p| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    for i in 0..PER_PRODUCER {
                        queue.enqueue(p * PER_PRODUCER + i).await.expect("enqueue");
                    }
                })
            })
            .collect::<Vec<_>>();

        for producer in futures::future::join_all(producers).await {
            producer.expect("producer");
        }
        queue.close();

        let mut delivered = HashSet::new();
        for consumer in futures::future::join_all(consumers).await {
            for item in consumer.expect("consumer") {
                assert!(delivered.insert(item), "item {item} delivered twice");
            }
        }
        assert_eq!(delivered.len(), PRODUCERS * PER_PRODUCER);
    }

    #[tokio::test]
    async fn test_close_drains_then_stops() {
        let queue = WorkQueue::new(2);
        queue.enqueue("a").await.expect("enqueue");
        queue.close();

        assert_eq!(queue.enqueue("b").await, Err("b"));
        assert_eq!(queue.dequeue().await, Some("a"));
        assert_eq!(queue.dequeue().await, None);
    }
}
