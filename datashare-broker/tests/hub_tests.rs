use datashare_broker::{ChangeCallback, ChangeHub};
use datashare_types::{ChangeNotification, ChangeType};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const URI: &str = "datashare://com.example.provider/entry/TBL00";

fn channel_callback() -> (ChangeCallback, mpsc::UnboundedReceiver<ChangeNotification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: ChangeCallback = Arc::new(move |notification| {
        let _ = tx.send(notification);
    });
    (callback, rx)
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<ChangeNotification>) -> ChangeNotification {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("delivery timed out")
        .expect("channel closed")
}

async fn assert_no_delivery(rx: &mut mpsc::UnboundedReceiver<ChangeNotification>) {
    assert!(
        timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
        "unexpected delivery"
    );
}

// ── Delivery ─────────────────────────────────────────────────────

#[tokio::test]
async fn notify_delivers_exactly_once() {
    let hub = ChangeHub::new();
    let (cb, mut rx) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, cb).await;

    let scheduled = hub.notify(ChangeType::DataChange, URI).await;
    assert_eq!(scheduled, 1);

    let notification = recv(&mut rx).await;
    assert_eq!(notification.uri, URI);
    assert_eq!(notification.change_type, ChangeType::DataChange);
    assert_no_delivery(&mut rx).await;
}

#[tokio::test]
async fn notify_without_observers_schedules_none() {
    let hub = ChangeHub::new();
    assert_eq!(hub.notify(ChangeType::DataChange, URI).await, 0);
}

#[tokio::test]
async fn notify_other_uri_does_not_deliver() {
    let hub = ChangeHub::new();
    let (cb, mut rx) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, cb).await;

    hub.notify(ChangeType::DataChange, "datashare://com.example.provider/other")
        .await;
    assert_no_delivery(&mut rx).await;
}

#[tokio::test]
async fn delivery_in_registration_order() {
    let hub = ChangeHub::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for index in 0..3u32 {
        let tx = tx.clone();
        let callback: ChangeCallback = Arc::new(move |_| {
            let _ = tx.send(index);
        });
        hub.subscribe(ChangeType::DataChange, URI, callback).await;
    }

    assert_eq!(hub.notify(ChangeType::DataChange, URI).await, 3);
    let mut order = Vec::new();
    for _ in 0..3 {
        order.push(
            timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap(),
        );
    }
    assert_eq!(order, vec![0, 1, 2]);
}

#[tokio::test]
async fn each_notify_delivers_again() {
    let hub = ChangeHub::new();
    let (cb, mut rx) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, cb).await;

    hub.notify(ChangeType::DataChange, URI).await;
    hub.notify(ChangeType::DataChange, URI).await;
    recv(&mut rx).await;
    recv(&mut rx).await;
    assert_no_delivery(&mut rx).await;
}

// ── Registration semantics ───────────────────────────────────────

#[tokio::test]
async fn duplicate_registration_is_idempotent() {
    let hub = ChangeHub::new();
    let (cb, mut rx) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, Arc::clone(&cb)).await;
    hub.subscribe(ChangeType::DataChange, URI, cb).await;

    assert_eq!(hub.observer_count(ChangeType::DataChange, URI).await, 1);
    assert_eq!(hub.notify(ChangeType::DataChange, URI).await, 1);
    recv(&mut rx).await;
    assert_no_delivery(&mut rx).await;
}

#[tokio::test]
async fn multiple_distinct_callbacks_share_a_key() {
    let hub = ChangeHub::new();
    let (cb_a, mut rx_a) = channel_callback();
    let (cb_b, mut rx_b) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, cb_a).await;
    hub.subscribe(ChangeType::DataChange, URI, cb_b).await;

    assert_eq!(hub.notify(ChangeType::DataChange, URI).await, 2);
    recv(&mut rx_a).await;
    recv(&mut rx_b).await;
}

#[tokio::test]
async fn off_without_callback_removes_all() {
    let hub = ChangeHub::new();
    let (cb_a, mut rx_a) = channel_callback();
    let (cb_b, mut rx_b) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, Arc::clone(&cb_a)).await;
    hub.subscribe(ChangeType::DataChange, URI, Arc::clone(&cb_b)).await;

    hub.unsubscribe(ChangeType::DataChange, URI, None).await;
    assert_eq!(hub.observer_count(ChangeType::DataChange, URI).await, 0);
    assert_eq!(hub.notify(ChangeType::DataChange, URI).await, 0);
    assert_no_delivery(&mut rx_a).await;
    assert_no_delivery(&mut rx_b).await;
}

#[tokio::test]
async fn off_with_callback_removes_only_match() {
    let hub = ChangeHub::new();
    let (cb_a, mut rx_a) = channel_callback();
    let (cb_b, mut rx_b) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, Arc::clone(&cb_a)).await;
    hub.subscribe(ChangeType::DataChange, URI, cb_b).await;

    hub.unsubscribe(ChangeType::DataChange, URI, Some(&cb_a)).await;
    assert_eq!(hub.observer_count(ChangeType::DataChange, URI).await, 1);

    hub.notify(ChangeType::DataChange, URI).await;
    recv(&mut rx_b).await;
    assert_no_delivery(&mut rx_a).await;
}

#[tokio::test]
async fn off_nonexistent_is_noop() {
    let hub = ChangeHub::new();
    let (cb, _rx) = channel_callback();
    // Neither form errors on an absent subscription.
    hub.unsubscribe(ChangeType::DataChange, URI, None).await;
    hub.unsubscribe(ChangeType::DataChange, URI, Some(&cb)).await;
}

#[tokio::test]
async fn resubscribe_after_off_delivers() {
    let hub = ChangeHub::new();
    let (cb, mut rx) = channel_callback();
    hub.subscribe(ChangeType::DataChange, URI, Arc::clone(&cb)).await;
    hub.unsubscribe(ChangeType::DataChange, URI, None).await;
    hub.subscribe(ChangeType::DataChange, URI, cb).await;

    assert_eq!(hub.notify(ChangeType::DataChange, URI).await, 1);
    recv(&mut rx).await;
}
