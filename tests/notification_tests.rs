//! Integration tests for the notification center.
//!
//! Timer behaviour runs on tokio's paused clock so that auto-dismissal is
//! deterministic.

use std::time::Duration;

use stayfront::error::{ErrorCategory, Severity};
use stayfront::notification::{notify_capture, NotificationId, NotificationKind};
use stayfront::{
    ErrorMonitoringService, MonitoringConfig, NotificationCenter, NotificationConfig,
    NotificationSpec,
};

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn titles(center: &NotificationCenter) -> Vec<String> {
    center.notifications().into_iter().map(|n| n.title).collect()
}

#[tokio::test(start_paused = true)]
async fn test_insertion_order_and_removal() {
    let center = NotificationCenter::default();
    center.add_notification(NotificationSpec::info("A")).unwrap();
    let b = center.add_notification(NotificationSpec::info("B")).unwrap();
    center.add_notification(NotificationSpec::info("C")).unwrap();

    assert_eq!(titles(&center), vec!["A", "B", "C"]);

    center.remove_notification(&b);

    assert_eq!(titles(&center), vec!["A", "C"]);
}

#[tokio::test(start_paused = true)]
async fn test_saved_toast_expires_after_one_second() {
    let center = NotificationCenter::default();
    center
        .add_notification(NotificationSpec::success("Saved").duration(Duration::from_millis(1000)))
        .unwrap();

    tokio::time::advance(Duration::from_millis(1000)).await;
    settle().await;

    assert!(center.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_default_duration_from_config() {
    let config = NotificationConfig::default().with_default_duration(Duration::from_millis(200));
    let center = NotificationCenter::new(config);
    center.add_notification(NotificationSpec::info("Tip")).unwrap();

    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;
    assert_eq!(center.len(), 1);

    tokio::time::advance(Duration::from_millis(50)).await;
    settle().await;
    assert!(center.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_persistent_survives_any_elapsed_time() {
    let center = NotificationCenter::default();
    center
        .add_notification(NotificationSpec::warning("Complete your profile").persistent(true))
        .unwrap();
    center
        .add_notification(NotificationSpec::info("Short").duration(Duration::from_millis(10)))
        .unwrap();

    tokio::time::advance(Duration::from_secs(7 * 24 * 60 * 60)).await;
    settle().await;

    assert_eq!(titles(&center), vec!["Complete your profile"]);
}

#[tokio::test(start_paused = true)]
async fn test_remove_unknown_id_is_noop() {
    let center = NotificationCenter::default();
    center.add_notification(NotificationSpec::info("A")).unwrap();
    let before = titles(&center);

    assert!(center
        .remove_notification(&NotificationId::from("toast_does_not_exist"))
        .is_none());

    assert_eq!(titles(&center), before);
}

#[tokio::test(start_paused = true)]
async fn test_manual_removal_before_expiry() {
    let center = NotificationCenter::default();
    let id = center
        .add_notification(NotificationSpec::info("A").duration(Duration::from_millis(500)))
        .unwrap();
    center
        .add_notification(NotificationSpec::info("B").duration(Duration::from_millis(500)))
        .unwrap();

    center.remove_notification(&id);
    tokio::time::advance(Duration::from_millis(100)).await;
    settle().await;
    assert_eq!(titles(&center), vec!["B"]);

    tokio::time::advance(Duration::from_millis(400)).await;
    settle().await;
    assert!(center.is_empty());
    assert_eq!(center.pending_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_observe_expiry() {
    let center = NotificationCenter::default();
    let mut receiver = center.subscribe();
    center
        .add_notification(NotificationSpec::info("A").duration(Duration::from_millis(100)))
        .unwrap();
    receiver.changed().await.unwrap();
    assert_eq!(receiver.borrow_and_update().len(), 1);

    tokio::time::advance(Duration::from_millis(100)).await;
    receiver.changed().await.unwrap();

    assert!(receiver.borrow_and_update().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_capture_bridge_is_opt_in() {
    let service = ErrorMonitoringService::new(MonitoringConfig::default());
    let center = NotificationCenter::default();

    let id = service.capture_error(
        "Session expired",
        Severity::High,
        ErrorCategory::Auth,
        None,
    );
    assert!(center.is_empty());

    let report = service.get_error_report(&id).unwrap();
    let toast_id = notify_capture(&center, &report).unwrap();

    let toast = center.get(&toast_id).unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.title, "Session expired");
    assert!(toast.persistent);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_center_cancels_timers() {
    let center = NotificationCenter::default();
    let mut receiver = center.subscribe();
    center.add_notification(NotificationSpec::info("A")).unwrap();
    let _ = receiver.borrow_and_update();
    drop(center);

    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;

    // The list is gone, not emptied by a late timer
    assert!(receiver.changed().await.is_err());
    assert_eq!(receiver.borrow().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zero_duration_timers_leave_nothing_behind() {
    let center = NotificationCenter::default();
    for i in 0..20 {
        center
            .add_notification(NotificationSpec::info(format!("t{}", i)).duration(Duration::ZERO))
            .unwrap();
    }

    for _ in 0..200 {
        if center.is_empty() && center.pending_timers() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // A timer that fired before being registered would stay pending forever
    assert!(center.is_empty());
    assert_eq!(center.pending_timers(), 0);
}
