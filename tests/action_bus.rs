use std::time::Duration;

use uniflow::bus::ActionBus;
use uniflow::errors::PublishError;

#[tokio::test]
async fn publish_fails_fast_when_buffer_is_full() {
    let (bus, rx) = ActionBus::bounded(2);
    bus.publish(vec![1]).expect("first");
    bus.publish(vec![2]).expect("second");

    let err = bus.publish(vec![3]).expect_err("third should overflow");
    assert!(matches!(err, PublishError::Full { capacity: 2 }));

    // Buffered batches are intact and FIFO.
    assert_eq!(rx.recv_async().await.unwrap(), vec![1]);
    assert_eq!(rx.recv_async().await.unwrap(), vec![2]);
}

#[tokio::test]
async fn publish_after_consumer_dropped_reports_disposed() {
    let (bus, rx) = ActionBus::bounded(2);
    drop(rx);

    let err = bus.publish(vec![1]).expect_err("no consumer");
    assert!(matches!(err, PublishError::Disposed));
}

#[tokio::test]
async fn batches_are_delivered_in_publish_order() {
    let (bus, rx) = ActionBus::bounded(8);
    for i in 0..5 {
        bus.publish(vec![i]).expect("publish");
    }
    for i in 0..5 {
        assert_eq!(rx.recv_async().await.unwrap(), vec![i]);
    }
}

#[tokio::test]
async fn feed_sender_suspends_until_capacity_frees_up() {
    let (bus, rx) = ActionBus::bounded(1);
    bus.publish(vec![1]).expect("fill buffer");

    let feed = bus.feed();
    let pending = tokio::spawn(async move { feed.send_async(vec![2]).await });

    // The internal sender is parked on the saturated buffer.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!pending.is_finished());

    assert_eq!(rx.recv_async().await.unwrap(), vec![1]);
    tokio::time::timeout(Duration::from_millis(200), pending)
        .await
        .expect("send resumed")
        .expect("join")
        .expect("send ok");

    assert_eq!(rx.recv_async().await.unwrap(), vec![2]);
}
