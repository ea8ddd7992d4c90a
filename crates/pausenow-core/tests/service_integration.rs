//! Integration tests for the async reminder service.
//!
//! Uses tokio's paused clock so the 1 Hz heartbeat runs instantly, and a
//! manual wall clock so due dates are deterministic.

mod support;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use pausenow_core::{
    AppSettings, Event, ManualClock, RecordStore, ReminderOutcome, ReminderService, ReminderType,
    RuntimeState, SharedSettings,
};
use support::{t0, PresenterMode, RecordingPresenter};

fn one_minute_settings() -> SharedSettings {
    SharedSettings::new(AppSettings {
        eye_break_interval_minutes: 1,
        standup_every_eye_breaks: 2,
        ..AppSettings::default()
    })
}

#[tokio::test(start_paused = true)]
async fn heartbeat_presents_due_reminder() {
    let presenter = RecordingPresenter::new(PresenterMode::Complete);
    let clock = ManualClock::new(t0());
    let (handle, task) = ReminderService::spawn(
        Arc::new(one_minute_settings()),
        presenter.boxed(),
        Arc::new(clock.clone()),
        None,
    );
    let mut events = handle.subscribe();

    handle.start().await.unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, RuntimeState::Running);
    assert_eq!(status.next_due_date, Some(t0() + Duration::seconds(60)));

    clock.advance(Duration::seconds(60));
    tokio::time::sleep(StdDuration::from_millis(1500)).await;

    assert_eq!(presenter.presented_events(), vec![ReminderType::EyeBreak]);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.iter().any(|e| matches!(e, Event::ReminderStarted { .. })));
    assert!(seen.iter().any(|e| matches!(
        e,
        Event::ReminderCompleted { reminder_type: ReminderType::EyeBreak, .. }
    )));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(handle.start().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn held_overlay_resolves_through_channel() {
    let presenter = RecordingPresenter::new(PresenterMode::Hold);
    let clock = ManualClock::new(t0());
    let (handle, task) = ReminderService::spawn(
        Arc::new(one_minute_settings()),
        presenter.boxed(),
        Arc::new(clock.clone()),
        None,
    );

    handle.manual_break().await.unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, RuntimeState::Running);
    assert!(status.overlay_in_flight);

    clock.advance(Duration::seconds(20));
    presenter.take_handle().unwrap().complete();
    tokio::time::sleep(StdDuration::from_millis(10)).await;

    let status = handle.status().await.unwrap();
    assert!(!status.overlay_in_flight);
    assert_eq!(status.next_due_date, Some(t0() + Duration::seconds(80)));

    handle.manual_break().await.unwrap();
    tokio::time::sleep(StdDuration::from_millis(10)).await;
    assert_eq!(
        presenter.presented_events(),
        vec![ReminderType::EyeBreak, ReminderType::Standup]
    );

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn sleeping_system_suppresses_heartbeat() {
    let presenter = RecordingPresenter::new(PresenterMode::Complete);
    let clock = ManualClock::new(t0());
    let (handle, task) = ReminderService::spawn(
        Arc::new(one_minute_settings()),
        presenter.boxed(),
        Arc::new(clock.clone()),
        None,
    );

    handle.start().await.unwrap();
    handle.set_system_sleeping(true).await.unwrap();
    clock.advance(Duration::minutes(5));
    tokio::time::sleep(StdDuration::from_secs(3)).await;
    assert_eq!(presenter.presented_count(), 0);

    handle.set_system_sleeping(false).await.unwrap();
    tokio::time::sleep(StdDuration::from_secs(2)).await;
    assert_eq!(presenter.presented_count(), 1);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn settings_change_and_reset_through_handle() {
    let settings = one_minute_settings();
    let presenter = RecordingPresenter::new(PresenterMode::Complete);
    let clock = ManualClock::new(t0());
    let (handle, task) = ReminderService::spawn(
        Arc::new(settings.clone()),
        presenter.boxed(),
        Arc::new(clock.clone()),
        None,
    );

    handle.toggle().await.unwrap();
    handle.toggle().await.unwrap();
    assert_eq!(handle.state().await.unwrap(), RuntimeState::Paused);
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.home.remaining_text, "01:00");
    assert!(!snapshot.home.is_flowing);

    let (old, new) = settings.update(|s| s.eye_break_interval_minutes = 2);
    handle.settings_changed(old, new).await.unwrap();
    assert_eq!(handle.state().await.unwrap(), RuntimeState::Stopped);
    assert_eq!(handle.snapshot().await.unwrap().home.remaining_text, "02:00");

    handle.start().await.unwrap();
    handle.reset().await.unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, RuntimeState::Stopped);
    assert_eq!(status.next_due_date, None);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn resolutions_are_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pausenow.db");
    let presenter = RecordingPresenter::new(PresenterMode::Hold);
    let clock = ManualClock::new(t0());
    let (handle, task) = ReminderService::spawn(
        Arc::new(one_minute_settings()),
        presenter.boxed(),
        Arc::new(clock.clone()),
        Some(RecordStore::open_at(&path).unwrap()),
    );

    handle.manual_break().await.unwrap();
    assert!(handle.status().await.unwrap().overlay_in_flight);
    clock.advance(Duration::seconds(20));
    presenter.take_handle().unwrap().complete();
    tokio::time::sleep(StdDuration::from_millis(10)).await;

    handle.manual_break().await.unwrap();
    assert!(handle.status().await.unwrap().overlay_in_flight);
    clock.advance(Duration::seconds(10));
    presenter.take_handle().unwrap().skip();
    tokio::time::sleep(StdDuration::from_millis(10)).await;

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let store = RecordStore::open_at(&path).unwrap();
    let records = store.recent(10).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].reminder_type, ReminderType::Standup);
    assert_eq!(records[0].outcome, ReminderOutcome::Skipped);
    assert_eq!(records[0].timestamp, t0() + Duration::seconds(30));
    assert_eq!(records[1].reminder_type, ReminderType::EyeBreak);
    assert_eq!(records[1].outcome, ReminderOutcome::Completed);
    assert_eq!(records[1].timestamp, t0() + Duration::seconds(20));

    let stats = store.today_stats(t0()).unwrap();
    assert_eq!(stats.completed_count, 1);
    assert_eq!(stats.skipped_count, 1);
}
