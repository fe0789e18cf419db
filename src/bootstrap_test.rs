use super::*;
use crate::state::chat::{ConversationStore, MessageKind};
use crate::test_helpers::{ScriptedService, answer, stats};
use std::sync::atomic::Ordering;
use std::time::Duration;

fn bootstrap(service: Arc<ScriptedService>) -> SessionBootstrap {
    SessionBootstrap::new(service, ConnectivityState::new(), StatsState::new())
}

// =========================================================================
// check_connection
// =========================================================================

#[tokio::test]
async fn healthy_service_marks_connected() {
    let boot = bootstrap(ScriptedService::new().online().into_arc());
    assert!(boot.check_connection().await);
    assert!(boot.connectivity().is_connected());
}

#[tokio::test]
async fn failed_health_check_marks_disconnected() {
    let service = ScriptedService::new().online().into_arc();
    let boot = bootstrap(service.clone());
    assert!(boot.check_connection().await);

    service.healthy.store(false, Ordering::SeqCst);
    assert!(!boot.check_connection().await);
    assert!(!boot.connectivity().is_connected());
}

// =========================================================================
// load_stats
// =========================================================================

#[tokio::test]
async fn load_stats_publishes_result() {
    let boot = bootstrap(ScriptedService::new().stats(Ok(stats(900))).into_arc());
    assert!(boot.load_stats().await);
    assert_eq!(boot.stats().current().unwrap().total_documents(), 900);
}

#[tokio::test]
async fn failed_stats_load_keeps_previous_value() {
    let service = ScriptedService::new()
        .stats(Ok(stats(5)))
        .stats(Err(ApiError::Stats("Failed to get statistics".into())))
        .into_arc();
    let boot = bootstrap(service);

    assert!(boot.load_stats().await);
    assert!(!boot.load_stats().await);
    assert_eq!(boot.stats().current().unwrap().total_documents(), 5);
}

#[tokio::test]
async fn failed_first_stats_load_leaves_absent() {
    let service = ScriptedService::new().stats(Err(ApiError::Stats("boom".into()))).into_arc();
    let boot = bootstrap(service);
    assert!(!boot.load_stats().await);
    assert!(boot.stats().current().is_none());
}

// =========================================================================
// start
// =========================================================================

#[tokio::test]
async fn start_runs_both_independently() {
    let service = ScriptedService::new().stats(Ok(stats(12))).into_arc();
    let boot = bootstrap(service.clone());

    let tasks = boot.start();
    assert!(!tasks.health.await.unwrap());
    assert!(tasks.stats.await.unwrap());

    assert!(!boot.connectivity().is_connected());
    assert_eq!(boot.stats().current().unwrap().total_documents(), 12);
    assert_eq!(service.stats_calls.load(Ordering::SeqCst), 1);
}

// =========================================================================
// stats refresh wiring
// =========================================================================

#[tokio::test]
async fn answered_send_reloads_stats_once() {
    let service = ScriptedService::new().answer(answer("ok")).stats(Ok(stats(77))).into_arc();
    let boot = bootstrap(service.clone());
    let store = ConversationStore::with_stats_refresh(service.clone(), boot.stats_refresh_hook());

    let mut rx = boot.stats().subscribe();
    store.send("top crops").await;
    tokio::time::timeout(Duration::from_secs(2), rx.changed()).await.unwrap().unwrap();

    assert_eq!(boot.stats().current().unwrap().total_documents(), 77);
    assert_eq!(service.stats_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_send_does_not_reload_stats() {
    let service = ScriptedService::new().fail(ApiError::Query("nope".into())).into_arc();
    let boot = bootstrap(service.clone());
    let store = ConversationStore::with_stats_refresh(service.clone(), boot.stats_refresh_hook());

    store.send("top crops").await;
    tokio::task::yield_now().await;

    assert_eq!(store.last_message().unwrap().kind, MessageKind::Error);
    assert_eq!(service.stats_calls.load(Ordering::SeqCst), 0);
    assert!(boot.stats().current().is_none());
}

// =========================================================================
// trigger_indexing
// =========================================================================

#[tokio::test]
async fn trigger_indexing_reloads_stats() {
    let service = ScriptedService::new().stats(Ok(stats(3000))).into_arc();
    let boot = bootstrap(service.clone());

    let ack = boot.trigger_indexing().await.unwrap();
    assert_eq!(ack["status"], "success");
    assert_eq!(service.index_calls.load(Ordering::SeqCst), 1);
    assert_eq!(boot.stats().current().unwrap().total_documents(), 3000);
}
