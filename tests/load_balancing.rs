//! Round-robin rotation through a live proxy.

mod common;

#[tokio::test]
async fn rotates_through_pool_in_order() {
    let a = common::start_named_backend("A").await;
    let b = common::start_named_backend("B").await;
    let c = common::start_named_backend("C").await;
    let proxy = common::start_proxy(&[a.url(), b.url(), c.url()]).await;

    let client = common::client();
    let mut seen = Vec::new();
    for _ in 0..6 {
        seen.push(common::get_text(&client, &proxy.url("/")).await);
    }

    assert_eq!(seen, ["A", "B", "C", "A", "B", "C"]);
}

#[tokio::test]
async fn every_path_and_method_is_dispatched() {
    let a = common::start_named_backend("A").await;
    let b = common::start_named_backend("B").await;
    let proxy = common::start_proxy(&[a.url(), b.url()]).await;

    let client = common::client();
    let first = client
        .post(proxy.url("/deep/nested/path?x=1"))
        .body("data")
        .send()
        .await
        .unwrap();
    assert_eq!(first.text().await.unwrap(), "A");

    let second = client.delete(proxy.url("/other")).send().await.unwrap();
    assert_eq!(second.text().await.unwrap(), "B");
}

#[tokio::test]
async fn dead_backend_is_skipped() {
    let a = common::start_named_backend("A").await;
    let b = common::start_named_backend("B").await;
    let c = common::start_named_backend("C").await;
    let proxy = common::start_proxy(&[a.url(), b.url(), c.url()]).await;

    proxy.pool.backends()[1].set_alive(false);

    let client = common::client();
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(common::get_text(&client, &proxy.url("/")).await);
    }

    assert_eq!(seen, ["A", "C", "A", "C"]);
    assert_eq!(b.hits(), 0);
}

#[tokio::test]
async fn revived_backend_rejoins_rotation() {
    let a = common::start_named_backend("A").await;
    let b = common::start_named_backend("B").await;
    let proxy = common::start_proxy(&[a.url(), b.url()]).await;
    let client = common::client();

    proxy.pool.backends()[1].set_alive(false);
    for _ in 0..3 {
        assert_eq!(common::get_text(&client, &proxy.url("/")).await, "A");
    }

    proxy.pool.backends()[1].set_alive(true);
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(common::get_text(&client, &proxy.url("/")).await);
    }
    seen.sort();
    assert_eq!(seen, ["A", "A", "B", "B"]);
}
