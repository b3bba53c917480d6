//! Concurrent load through the proxy.

use std::time::Instant;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_spread_evenly() {
    let a = common::start_named_backend("A").await;
    let b = common::start_named_backend("B").await;
    let c = common::start_named_backend("C").await;
    let proxy = common::start_proxy(&[a.url(), b.url(), c.url()]).await;

    let concurrency = 20;
    let requests_per_task = 15;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = proxy.url("/");
        tasks.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..requests_per_task {
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        ok += 1;
                    }
                }
            }
            ok
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        succeeded += task.await.unwrap();
    }

    println!(
        "{} requests in {:?} ({} ok)",
        total_requests,
        start.elapsed(),
        succeeded
    );

    assert_eq!(succeeded, total_requests);
    let per_backend = total_requests / 3;
    assert_eq!(a.hits(), per_backend);
    assert_eq!(b.hits(), per_backend);
    assert_eq!(c.hits(), per_backend);
}

/// Send `tasks * per_task` GETs concurrently and return how many succeeded.
async fn fire(url: String, tasks: usize, per_task: usize) -> usize {
    let client = common::client();
    let mut handles = Vec::new();
    for _ in 0..tasks {
        let client = client.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..per_task {
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        ok += 1;
                    }
                }
            }
            ok
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        succeeded += handle.await.unwrap();
    }
    succeeded
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn uneven_load_differs_by_at_most_one() {
    let a = common::start_named_backend("A").await;
    let b = common::start_named_backend("B").await;
    let c = common::start_named_backend("C").await;
    let proxy = common::start_proxy(&[a.url(), b.url(), c.url()]).await;

    assert_eq!(fire(proxy.url("/"), 7, 43).await, 301);

    let mut hits = [a.hits(), b.hits(), c.hits()];
    hits.sort();
    assert_eq!(hits, [100, 100, 101]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dead_member_under_load_is_skipped_evenly() {
    let a = common::start_named_backend("A").await;
    let b = common::start_named_backend("B").await;
    let c = common::start_named_backend("C").await;
    let proxy = common::start_proxy(&[a.url(), b.url(), c.url()]).await;
    proxy.pool.backends()[1].set_alive(false);

    assert_eq!(fire(proxy.url("/"), 20, 15).await, 300);

    assert_eq!(a.hits(), 150);
    assert_eq!(b.hits(), 0);
    assert_eq!(c.hits(), 150);
}
