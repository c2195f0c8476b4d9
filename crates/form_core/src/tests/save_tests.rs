use super::*;
use std::{cell::RefCell, rc::Rc};

fn recording_coordinator() -> (SaveCoordinator, Rc<RefCell<Vec<FormSnapshot>>>) {
    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saved);
    let coordinator = SaveCoordinator::new(
        Box::new(move |snapshot: &FormSnapshot| -> anyhow::Result<()> {
            sink.borrow_mut().push(snapshot.clone());
            Ok(())
        }),
        ConfirmationTimer::default(),
    );
    (coordinator, saved)
}

fn failing_coordinator(fail: impl Fn() -> anyhow::Error + 'static) -> SaveCoordinator {
    SaveCoordinator::new(
        Box::new(move |_: &FormSnapshot| -> anyhow::Result<()> { Err(fail()) }),
        ConfirmationTimer::default(),
    )
}

fn snapshot() -> FormSnapshot {
    FormSnapshot {
        reason: "Strengthening neighborhoods".into(),
        people_served: vec!["Students".into()],
        ..FormSnapshot::default()
    }
}

#[test]
fn clean_form_skips_without_calling_sink() {
    let (mut coordinator, saved) = recording_coordinator();
    let mut dirty = DirtyTracker::new();

    let outcome = coordinator
        .save(&snapshot(), &mut dirty, Instant::now())
        .expect("skip is not an error");

    assert_eq!(outcome, SaveOutcome::Skipped);
    assert!(saved.borrow().is_empty());
    assert!(!coordinator.confirmation().is_pending());
}

#[test]
fn successful_save_clears_dirty_and_shows_confirmation() {
    let (mut coordinator, saved) = recording_coordinator();
    let mut dirty = DirtyTracker::new();
    dirty.mark();
    let now = Instant::now();

    let outcome = coordinator.save(&snapshot(), &mut dirty, now).expect("save");

    assert_eq!(outcome, SaveOutcome::Saved);
    assert!(!dirty.is_dirty());
    assert_eq!(saved.borrow().as_slice(), [snapshot()]);
    assert_eq!(coordinator.confirmation_message(now), Some("Saved!"));
    assert!(coordinator.last_saved_at().is_some());
    assert!(coordinator.last_failure().is_none());
}

#[test]
fn failed_save_keeps_dirty_and_reports_failure() {
    let mut coordinator = failing_coordinator(|| anyhow::anyhow!("disk full"));
    let mut dirty = DirtyTracker::new();
    dirty.mark();
    let now = Instant::now();

    let err = coordinator
        .save(&snapshot(), &mut dirty, now)
        .expect_err("sink failure surfaces");

    assert!(dirty.is_dirty());
    assert!(err.to_string().contains("disk full"));
    assert_eq!(coordinator.confirmation_message(now), None);
    let failure = coordinator.last_failure().expect("failure retained");
    assert_eq!(failure.code, ErrorCode::Internal);
    assert!(coordinator.last_saved_at().is_none());
}

#[test]
fn sink_rejection_code_is_preserved() {
    let mut coordinator =
        failing_coordinator(|| SinkRejection::new(ErrorCode::Unavailable, "offline").into());
    let mut dirty = DirtyTracker::new();
    dirty.mark();

    let err = coordinator
        .save(&snapshot(), &mut dirty, Instant::now())
        .expect_err("rejected");

    assert_eq!(err.failure(), SaveFailure::new(ErrorCode::Unavailable, "offline"));
}

#[test]
fn confirmation_dismisses_itself_after_ttl() {
    let mut timer = ConfirmationTimer::new("Saved!", Duration::from_secs(2));
    let start = Instant::now();

    timer.show(start);
    assert!(!timer.tick(start + Duration::from_millis(1999)));
    assert_eq!(timer.current(start + Duration::from_millis(1999)), Some("Saved!"));

    assert!(timer.tick(start + Duration::from_secs(2)));
    assert!(!timer.is_pending());
    assert_eq!(timer.current(start + Duration::from_secs(2)), None);
    assert!(!timer.tick(start + Duration::from_secs(3)));
}

#[test]
fn showing_again_restarts_countdown() {
    let mut timer = ConfirmationTimer::new("Saved!", Duration::from_secs(2));
    let start = Instant::now();

    timer.show(start);
    timer.show(start + Duration::from_secs(1));

    assert!(!timer.tick(start + Duration::from_secs(2)));
    assert!(timer.tick(start + Duration::from_secs(3)));
}

#[test]
fn failure_hides_older_confirmation_and_next_success_clears_failure() {
    let outcomes = Rc::new(RefCell::new(vec![Ok(()), Err(()), Ok(())]));
    let script = Rc::clone(&outcomes);
    let mut coordinator = SaveCoordinator::new(
        Box::new(move |_: &FormSnapshot| -> anyhow::Result<()> {
            match script.borrow_mut().remove(0) {
                Ok(()) => Ok(()),
                Err(()) => Err(anyhow::anyhow!("transient")),
            }
        }),
        ConfirmationTimer::default(),
    );
    let mut dirty = DirtyTracker::new();
    let now = Instant::now();

    dirty.mark();
    coordinator.save(&snapshot(), &mut dirty, now).expect("first");
    dirty.mark();
    assert!(coordinator.save(&snapshot(), &mut dirty, now).is_err());
    assert_eq!(coordinator.confirmation_message(now), None);
    assert!(coordinator.last_failure().is_some());

    coordinator.save(&snapshot(), &mut dirty, now).expect("retry");
    assert!(coordinator.last_failure().is_none());
    assert!(!dirty.is_dirty());
}
