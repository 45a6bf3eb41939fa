use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use super::ChangeSource;
use super::debouncer::Debouncer;
use crate::core::{Stage, Trigger};

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn access_kind() -> notify::EventKind {
    notify::EventKind::Access(notify::event::AccessKind::Read)
}

// ----------------------------------------------------------------------------
// Debouncer
// ----------------------------------------------------------------------------

#[test]
fn test_debouncer_empty() {
    let mut debouncer = Debouncer::new();
    assert!(debouncer.take().is_none());
}

#[test]
fn test_debouncer_collapses_burst_to_one_trigger() {
    for n in 1..=8 {
        let mut debouncer = Debouncer::new();
        for i in 0..n {
            let path = format!("/tmp/src/file{}.js", i % 3);
            debouncer.add_event(&make_event(vec![&path], modify_kind()));
        }

        assert_eq!(debouncer.take(), Some(Trigger));
        assert_eq!(debouncer.take(), None);
    }
}

#[test]
fn test_debouncer_ignores_noise() {
    let mut debouncer = Debouncer::new();

    assert!(!debouncer.add_event(&make_event(vec!["/tmp/src/main.js"], metadata_kind())));
    assert!(!debouncer.add_event(&make_event(vec!["/tmp/src/main.js"], access_kind())));
    assert!(!debouncer.add_event(&make_event(vec!["/tmp/src/.main.js.swp"], modify_kind())));
    assert!(!debouncer.add_event(&make_event(vec!["/tmp/src/main.js~"], create_kind())));
    assert!(debouncer.take().is_none());

    assert!(debouncer.add_event(&make_event(vec!["/tmp/src/main.js"], create_kind())));
    assert_eq!(debouncer.pending.len(), 1);
}

#[test]
fn test_debouncer_dedups_paths() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(
        vec!["/tmp/src/a.css", "/tmp/src/a.css"],
        modify_kind(),
    ));
    debouncer.add_event(&make_event(vec!["/tmp/src/a.css"], create_kind()));
    assert_eq!(debouncer.pending.len(), 1);
}

// ----------------------------------------------------------------------------
// ChangeSource
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_same_turn_notifications_yield_one_trigger() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut source = ChangeSource::from_events(rx, Duration::ZERO);

    // Editor save: write + write + metadata touch.
    tx.send(Ok(make_event(vec!["/tmp/src/main.js"], modify_kind()))).unwrap();
    tx.send(Ok(make_event(vec!["/tmp/src/main.js"], modify_kind()))).unwrap();
    tx.send(Ok(make_event(vec!["/tmp/src/main.js"], metadata_kind()))).unwrap();
    tx.send(Ok(make_event(vec!["/tmp/src/main.css"], create_kind()))).unwrap();

    assert_eq!(source.next_trigger().await, Some(Ok(Trigger)));

    let second = tokio::time::timeout(Duration::from_millis(50), source.next_trigger()).await;
    assert!(second.is_err(), "burst produced more than one trigger");
}

#[tokio::test]
async fn test_window_coalesces_spaced_notifications() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut source = ChangeSource::from_events(rx, Duration::from_millis(80));

    tx.send(Ok(make_event(vec!["/tmp/src/main.js"], modify_kind()))).unwrap();
    let late = tx.clone();
    let (trigger, ()) = tokio::join!(source.next_trigger(), async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        late.send(Ok(make_event(vec!["/tmp/src/main.html"], modify_kind())))
            .unwrap();
    });
    assert_eq!(trigger, Some(Ok(Trigger)));

    let second = tokio::time::timeout(Duration::from_millis(150), source.next_trigger()).await;
    assert!(second.is_err());
}

#[tokio::test]
async fn test_noise_only_burst_yields_nothing() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut source = ChangeSource::from_events(rx, Duration::ZERO);

    tx.send(Ok(make_event(vec!["/tmp/src/main.js"], metadata_kind()))).unwrap();
    tx.send(Ok(make_event(vec!["/tmp/src/x.tmp"], create_kind()))).unwrap();
    drop(tx);

    assert_eq!(source.next_trigger().await, None);
}

#[tokio::test]
async fn test_notify_error_surfaces_as_watch_failure() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut source = ChangeSource::from_events(rx, Duration::ZERO);

    tx.send(Err(notify::Error::generic("inotify queue overflow"))).unwrap();
    tx.send(Ok(make_event(vec!["/tmp/src/main.js"], modify_kind()))).unwrap();

    let failure = source.next_trigger().await.unwrap().unwrap_err();
    assert!(failure.has_stage(Stage::Watch));

    // The change that arrived alongside the error still triggers.
    assert_eq!(source.next_trigger().await, Some(Ok(Trigger)));
}

#[tokio::test]
async fn test_stream_ends_when_channel_closes() {
    use futures::StreamExt;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = ChangeSource::from_events(rx, Duration::ZERO).into_stream();

    tx.send(Ok(make_event(vec!["/tmp/src/main.js"], modify_kind()))).unwrap();
    assert_eq!(stream.next().await, Some(Ok(Trigger)));

    drop(tx);
    assert_eq!(stream.next().await, None);
}

#[tokio::test]
async fn test_real_watcher_triggers_on_write() {
    let dir = TempDir::new().unwrap();
    let mut source = ChangeSource::new(dir.path(), Duration::from_millis(20)).unwrap();

    std::fs::write(dir.path().join("main.js"), "console.log(1)").unwrap();

    let trigger = tokio::time::timeout(Duration::from_secs(10), source.next_trigger())
        .await
        .expect("no trigger after write");
    assert_eq!(trigger, Some(Ok(Trigger)));
}

#[test]
fn test_watch_missing_root_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    let failure = ChangeSource::new(&missing, Duration::ZERO).err().unwrap();
    assert!(failure.has_stage(Stage::Watch));
}
