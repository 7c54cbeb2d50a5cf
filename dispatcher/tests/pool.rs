use dispatcher::WorkerPool;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, Instant, sleep};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pool_respects_max_concurrency() {
    let max_concurrent = 2;
    let pool = WorkerPool::new(max_concurrent);
    let total_runs = 5;
    let hold = Duration::from_millis(100);
    // ceil(5/2) batches of 100ms each.
    let expected_min_duration = Duration::from_millis(300);

    let running_count = Arc::new(AtomicUsize::new(0));
    let max_observed_concurrent = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let handles: Vec<_> = (0..total_runs)
        .map(|_| {
            let pool = pool.clone();
            let running = Arc::clone(&running_count);
            let max_observed = Arc::clone(&max_observed_concurrent);

            tokio::spawn(async move {
                pool.acquire().await;

                let current = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(current, Ordering::SeqCst);
                sleep(hold).await;
                running.fetch_sub(1, Ordering::SeqCst);

                pool.release().await;
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("worker should not panic");
    }
    let elapsed = start.elapsed();

    assert!(
        max_observed_concurrent.load(Ordering::SeqCst) <= max_concurrent,
        "observed {} concurrent workers with a cap of {}",
        max_observed_concurrent.load(Ordering::SeqCst),
        max_concurrent
    );
    assert!(
        elapsed >= expected_min_duration,
        "5 jobs through 2 slots finished too fast: {:?}",
        elapsed
    );
    assert_eq!(pool.running().await, 0);
}

#[tokio::test]
async fn released_slots_wake_waiters_in_order() {
    let pool = WorkerPool::new(1);
    pool.acquire().await;
    assert_eq!(pool.running().await, 1);

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move {
            pool.acquire().await;
        })
    };
    // Give the waiter time to enqueue behind the held slot.
    sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    pool.release().await;
    waiter.await.unwrap();
    assert_eq!(pool.running().await, 1);
}
