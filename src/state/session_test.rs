use super::*;
use crate::test_helpers::stats;

#[test]
fn connectivity_starts_disconnected() {
    let conn = ConnectivityState::default();
    assert!(!conn.is_connected());
}

#[test]
fn connectivity_clones_share_flag() {
    let conn = ConnectivityState::new();
    let other = conn.clone();
    other.set_connected(true);
    assert!(conn.is_connected());
    other.set_connected(false);
    assert!(!conn.is_connected());
}

#[tokio::test]
async fn connectivity_subscribers_see_changes() {
    let conn = ConnectivityState::new();
    let mut rx = conn.subscribe();
    conn.set_connected(true);
    rx.changed().await.unwrap();
    assert!(*rx.borrow());
}

#[test]
fn stats_absent_until_published() {
    let state = StatsState::new();
    assert!(state.current().is_none());
    state.publish(stats(42));
    assert_eq!(state.current().unwrap().total_documents(), 42);
}

#[test]
fn stats_publish_replaces_previous() {
    let state = StatsState::new();
    state.publish(stats(1));
    state.clone().publish(stats(2));
    assert_eq!(state.current().unwrap().total_documents(), 2);
}
