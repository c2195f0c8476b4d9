use super::*;
use crate::ids::SequentialIds;
use std::{cell::RefCell, rc::Rc};

type Saved = Rc<RefCell<Vec<FormSnapshot>>>;

fn recording_form(seed: FormSeed) -> (FormAggregator, Saved) {
    let saved: Saved = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saved);
    let form = FormAggregator::with_id_source(
        seed,
        FormOptions::default(),
        Box::new(move |snapshot: &FormSnapshot| -> anyhow::Result<()> {
            sink.borrow_mut().push(snapshot.clone());
            Ok(())
        }),
        || Box::new(SequentialIds::new()),
    );
    (form, saved)
}

fn failing_form() -> FormAggregator {
    FormAggregator::with_id_source(
        FormSeed::empty(),
        FormOptions::default(),
        Box::new(|_: &FormSnapshot| -> anyhow::Result<()> { Err(anyhow::anyhow!("offline")) }),
        || Box::new(SequentialIds::new()),
    )
}

#[test]
fn seeded_form_starts_clean_with_seed_snapshot() {
    let (form, _) = recording_form(FormSeed::default());

    assert!(!form.is_dirty());
    assert!(!form.can_save());
    let snapshot = form.snapshot();
    assert_eq!(snapshot.people_served, ["Students"]);
    assert_eq!(snapshot.assumptions.len(), 3);
    assert_eq!(snapshot.assumptions[0].id.as_str(), "a_1");
    assert_eq!(snapshot.assumptions[0].certainty, Certainty::VeryCertain);
    assert_eq!(snapshot.direct_results.len(), 4);
    assert_eq!(snapshot.indirect_results.len(), 4);
    assert_eq!(snapshot.ultimate_impact.len(), 3);
}

#[test]
fn tag_add_marks_dirty_and_updates_snapshot() {
    let (mut form, _) = recording_form(FormSeed::default());

    assert!(form.apply(FormCommand::AddTag("Parents".into())));

    assert!(form.is_dirty());
    assert_eq!(form.snapshot().people_served, ["Students", "Parents"]);
}

#[test]
fn ignored_input_does_not_mark_dirty() {
    let (mut form, _) = recording_form(FormSeed::default());

    assert!(!form.apply(FormCommand::AddTag("students".into())));
    assert!(!form.apply(FormCommand::AddAssumption("   ".into())));
    assert!(!form.apply(FormCommand::DeleteOutcome {
        kind: OutcomeKind::Direct,
        id: EntryId::new("missing"),
    }));
    assert!(!form.apply(FormCommand::ToggleOutcomes(OutcomeKind::Indirect)));

    assert!(!form.is_dirty());
}

#[test]
fn reason_is_capped_and_marks_dirty() {
    let (mut form, _) = recording_form(FormSeed::empty());
    let long = "x".repeat(REASON_MAX_CHARS + 20);

    assert!(form.apply(FormCommand::SetReason(long)));

    assert!(form.is_dirty());
    assert_eq!(form.reason().chars().count(), REASON_MAX_CHARS);
    assert_eq!(form.snapshot().reason, form.reason());
}

#[test]
fn every_child_change_replaces_its_snapshot_part() {
    let (mut form, _) = recording_form(FormSeed::empty());

    form.apply(FormCommand::AddAssumption("People attend".into()));
    form.apply(FormCommand::SetCertainty {
        id: EntryId::new("a_1"),
        certainty: Certainty::Uncertain,
    });
    form.apply(FormCommand::AddOutcome {
        kind: OutcomeKind::Indirect,
        text: "More internships".into(),
    });
    form.apply(FormCommand::AddOutcome {
        kind: OutcomeKind::Ultimate,
        text: "Stronger community".into(),
    });

    let snapshot = form.snapshot();
    assert_eq!(snapshot.assumptions.len(), 1);
    assert_eq!(snapshot.assumptions[0].certainty, Certainty::Uncertain);
    assert!(snapshot.direct_results.is_empty());
    assert_eq!(snapshot.indirect_results[0].text, "More internships");
    assert_eq!(snapshot.ultimate_impact[0].id.as_str(), "u_1");
}

#[test]
fn assumption_draft_is_isolated_until_commit() {
    let (mut form, _) = recording_form(FormSeed::default());
    let id = form.assumptions().rows()[1].id.clone();

    form.apply(FormCommand::StartEditAssumption(id.clone()));
    assert!(!form.apply(FormCommand::UpdateAssumptionDraft("Draft text".into())));
    assert_eq!(form.snapshot().assumptions[1].description, "Assumption 1");
    assert!(!form.is_dirty());

    form.apply(FormCommand::CancelAssumptionEdit);
    assert_eq!(form.assumptions().rows()[1].description, "Assumption 1");

    form.apply(FormCommand::StartEditAssumption(id.clone()));
    form.apply(FormCommand::UpdateAssumptionDraft("   ".into()));
    assert!(!form.apply(FormCommand::CommitAssumptionEdit));
    assert_eq!(form.assumptions().rows()[1].description, "Assumption 1");

    form.apply(FormCommand::StartEditAssumption(id));
    form.apply(FormCommand::UpdateAssumptionDraft(" Revised ".into()));
    assert!(form.apply(FormCommand::CommitAssumptionEdit));
    assert_eq!(form.snapshot().assumptions[1].description, "Revised");
}

#[test]
fn outcome_edit_flows_into_snapshot() {
    let (mut form, _) = recording_form(FormSeed::default());
    let kind = OutcomeKind::Direct;
    let id = form.outcomes(kind).items()[0].id.clone();

    form.apply(FormCommand::StartEditOutcome { kind, id });
    form.apply(FormCommand::UpdateOutcomeDraft {
        kind,
        text: "Students gain skills".into(),
    });
    form.apply(FormCommand::CommitOutcomeEdit(kind));

    assert_eq!(form.snapshot().direct_results[0].text, "Students gain skills");
    assert!(form.is_dirty());
}

#[test]
fn save_lifecycle_clears_dirty_and_sends_full_payload() {
    let (mut form, saved) = recording_form(FormSeed::default());
    let now = Instant::now();

    assert_eq!(form.save_at(now).expect("skip"), SaveOutcome::Skipped);
    assert!(saved.borrow().is_empty());

    form.apply(FormCommand::AddTag("Parents".into()));
    form.apply(FormCommand::SetReason("Strengthening neighborhoods".into()));
    assert_eq!(form.save_at(now).expect("save"), SaveOutcome::Saved);

    assert!(!form.is_dirty());
    assert_eq!(form.confirmation_message(now), Some("Saved!"));
    let saved = saved.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].reason, "Strengthening neighborhoods");
    assert_eq!(saved[0].people_served, ["Students", "Parents"]);
    assert_eq!(&saved[0], form.snapshot());
}

#[test]
fn confirmation_auto_dismisses() {
    let (mut form, _) = recording_form(FormSeed::default());
    let now = Instant::now();
    form.apply(FormCommand::RemoveLastTag);
    form.save_at(now).expect("save");

    assert!(!form.tick(now + Duration::from_secs(1)));
    assert!(form.tick(now + Duration::from_secs(2)));
    assert_eq!(form.confirmation_message(now + Duration::from_secs(2)), None);
}

#[test]
fn failed_save_stays_dirty_and_retryable() {
    let mut form = failing_form();
    form.apply(FormCommand::AddTag("Parents".into()));

    let err = form.save().expect_err("sink failed");

    assert!(err.to_string().contains("offline"));
    assert!(form.is_dirty());
    assert!(form.can_save());
    assert_eq!(form.confirmation_message(Instant::now()), None);
    assert!(form.last_failure().is_some());
    assert!(form.save().is_err());
}

#[test]
fn tag_input_commands_follow_field_semantics() {
    let (mut form, _) = recording_form(FormSeed::default());

    form.apply(FormCommand::SetTagInput("Parents".into()));
    assert!(form.apply(FormCommand::SubmitTagInput));
    assert_eq!(form.tags().input(), "");

    assert!(form.apply(FormCommand::TagBackspace));
    assert_eq!(form.snapshot().people_served, ["Students"]);
}

#[test]
fn assumption_paging_commands() {
    let (mut form, _) = recording_form(FormSeed::empty());
    for index in 0..11 {
        form.apply(FormCommand::SetNewAssumptionText(format!("Belief {index}")));
        form.apply(FormCommand::SubmitNewAssumption);
    }
    assert_eq!(form.assumptions().page(), 2);

    form.apply(FormCommand::PreviousAssumptionPage);
    assert_eq!(form.assumptions().page(), 1);
    form.apply(FormCommand::SetRowsPerPage(RowsPerPage::Ten));
    assert_eq!(form.assumptions().page(), 1);
    form.apply(FormCommand::SetRowsPerPage(RowsPerPage::Twenty));
    assert_eq!(form.assumptions().page(), 0);
    form.apply(FormCommand::NextAssumptionPage);
    assert_eq!(form.assumptions().page(), 0);
    form.apply(FormCommand::SetAssumptionPage(7));
    assert_eq!(form.assumptions().page(), 0);
}

#[test]
fn resumed_form_keeps_saved_ids_and_issues_fresh_ones() {
    let (mut original, saved) = recording_form(FormSeed::default());
    original.apply(FormCommand::AddTag("Parents".into()));
    original.save().expect("save");
    let payload = saved.borrow()[0].clone();

    let (mut resumed, _) = recording_form(FormSeed::from_snapshot(payload.clone()));

    assert!(!resumed.is_dirty());
    assert_eq!(resumed.snapshot(), &payload);
    resumed.apply(FormCommand::AddAssumption("New belief".into()));
    let ids: Vec<&str> = resumed
        .assumptions()
        .rows()
        .iter()
        .map(|row| row.id.as_str())
        .collect();
    assert_eq!(ids, ["a_1", "a_2", "a_3", "a_4"]);
}

#[test]
fn resumed_entries_are_trimmed_and_blank_ones_dropped() {
    let snapshot = FormSnapshot {
        people_served: vec!["  Youth  ".into()],
        assumptions: vec![
            Assumption {
                id: EntryId::new("a_1"),
                description: "   ".into(),
                certainty: Certainty::Uncertain,
            },
            Assumption {
                id: EntryId::new("a_2"),
                description: "  Families need food  ".into(),
                certainty: Certainty::VeryCertain,
            },
        ],
        direct_results: vec![
            OutcomeItem::new("d_1", "  Pantry opens  "),
            OutcomeItem::new("d_2", ""),
        ],
        ..FormSnapshot::default()
    };

    let (form, _) = recording_form(FormSeed::from_snapshot(snapshot));

    assert!(!form.is_dirty());
    let snapshot = form.snapshot();
    assert_eq!(snapshot.people_served, ["Youth"]);
    assert_eq!(snapshot.assumptions.len(), 1);
    assert_eq!(snapshot.assumptions[0].id.as_str(), "a_2");
    assert_eq!(snapshot.assumptions[0].description, "Families need food");
    assert_eq!(snapshot.direct_results, [OutcomeItem::new("d_1", "Pantry opens")]);
}
