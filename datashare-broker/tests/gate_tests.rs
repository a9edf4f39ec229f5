use datashare_broker::{AccessKind, BrokerError, ProxyGate, ProxyState};
use datashare_types::{CallerId, ResourceUri};

const URI: &str = "datashare://com.example.provider/entry/TBL00";

// ── Tolerant-input contract ──────────────────────────────────────

#[tokio::test]
async fn enable_empty_uri_is_noop_success() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    assert!(gate.enable_silent_proxy(caller, "").await.is_ok());
    assert_eq!(gate.state(caller, "").await, ProxyState::Unregistered);
}

#[tokio::test]
async fn disable_empty_uri_is_noop_success() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    assert!(gate.disable_silent_proxy(caller, "").await.is_ok());
}

#[tokio::test]
async fn enable_malformed_uri_is_noop_success() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    assert!(gate.enable_silent_proxy(caller, "no scheme at all").await.is_ok());
    assert!(gate.disable_silent_proxy(caller, "no scheme at all").await.is_ok());
}

// ── State machine ────────────────────────────────────────────────

#[tokio::test]
async fn unregistered_by_default() {
    let gate = ProxyGate::new();
    assert_eq!(
        gate.state(CallerId::new(), URI).await,
        ProxyState::Unregistered
    );
}

#[tokio::test]
async fn enable_moves_to_enabled() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.enable_silent_proxy(caller, URI).await.unwrap();
    assert_eq!(gate.state(caller, URI).await, ProxyState::Enabled);
    assert!(gate.granted_at(caller, URI).await.is_some());
}

#[tokio::test]
async fn disable_moves_enabled_to_disabled() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.enable_silent_proxy(caller, URI).await.unwrap();
    gate.disable_silent_proxy(caller, URI).await.unwrap();
    assert_eq!(gate.state(caller, URI).await, ProxyState::Disabled);
    assert!(gate.granted_at(caller, URI).await.is_none());
}

#[tokio::test]
async fn disable_unregistered_stays_unregistered() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.disable_silent_proxy(caller, URI).await.unwrap();
    assert_eq!(gate.state(caller, URI).await, ProxyState::Unregistered);
}

#[tokio::test]
async fn disable_is_idempotent() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.enable_silent_proxy(caller, URI).await.unwrap();
    gate.disable_silent_proxy(caller, URI).await.unwrap();
    gate.disable_silent_proxy(caller, URI).await.unwrap();
    assert_eq!(gate.state(caller, URI).await, ProxyState::Disabled);
}

#[tokio::test]
async fn reenable_after_disable() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.enable_silent_proxy(caller, URI).await.unwrap();
    gate.disable_silent_proxy(caller, URI).await.unwrap();
    gate.enable_silent_proxy(caller, URI).await.unwrap();
    assert_eq!(gate.state(caller, URI).await, ProxyState::Enabled);
}

#[tokio::test]
async fn grants_are_per_caller() {
    let gate = ProxyGate::new();
    let granted = CallerId::new();
    let other = CallerId::new();
    gate.enable_silent_proxy(granted, URI).await.unwrap();
    assert_eq!(gate.state(granted, URI).await, ProxyState::Enabled);
    assert_eq!(gate.state(other, URI).await, ProxyState::Unregistered);
}

#[tokio::test]
async fn grants_keyed_by_normalized_uri() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.enable_silent_proxy(caller, &format!("{URI}?Proxy=true"))
        .await
        .unwrap();
    // Query variants share the grant.
    assert_eq!(gate.state(caller, URI).await, ProxyState::Enabled);
}

// ── Access checks ────────────────────────────────────────────────

#[tokio::test]
async fn check_access_unregistered_is_permission_denied() {
    let gate = ProxyGate::new();
    let uri = ResourceUri::parse(URI).unwrap();
    match gate
        .check_access(CallerId::new(), &uri, AccessKind::Write)
        .await
    {
        Err(BrokerError::PermissionDenied { .. }) => {}
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn check_access_disabled_is_proxy_disabled() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.enable_silent_proxy(caller, URI).await.unwrap();
    gate.disable_silent_proxy(caller, URI).await.unwrap();
    let uri = ResourceUri::parse(URI).unwrap();
    match gate.check_access(caller, &uri, AccessKind::Read).await {
        Err(BrokerError::ProxyDisabled { .. }) => {}
        other => panic!("expected ProxyDisabled, got {other:?}"),
    }
}

#[tokio::test]
async fn check_access_enabled_is_allowed() {
    let gate = ProxyGate::new();
    let caller = CallerId::new();
    gate.enable_silent_proxy(caller, URI).await.unwrap();
    let uri = ResourceUri::parse(URI).unwrap();
    assert!(gate.check_access(caller, &uri, AccessKind::Write).await.is_ok());
}
