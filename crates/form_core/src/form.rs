use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use shared::{
    domain::{Assumption, Certainty, EntryId, OutcomeItem},
    error::SaveFailure,
    protocol::FormSnapshot,
};

use crate::{
    assumption_table::{AssumptionTable, RowsPerPage},
    dirty::DirtyTracker,
    editable_list::DraftEditing,
    ids::{IdGenerator, UuidIds},
    outcome_list::{OutcomeKind, OutcomeList, OutcomeListConfig},
    save::{
        ConfirmationTimer, SaveCoordinator, SaveError, SaveOutcome, SaveSink,
        DEFAULT_CONFIRMATION_MESSAGE, DEFAULT_CONFIRMATION_TTL,
    },
    tag_set::TagSet,
};

pub const REASON_MAX_CHARS: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    TagsChanged(Vec<String>),
    AssumptionsChanged(Vec<Assumption>),
    OutcomesChanged {
        kind: OutcomeKind,
        items: Vec<OutcomeItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    SetReason(String),
    AddTag(String),
    RemoveTag(String),
    RemoveLastTag,
    SetTagInput(String),
    SubmitTagInput,
    TagBackspace,
    AddAssumption(String),
    SetNewAssumptionText(String),
    SubmitNewAssumption,
    StartEditAssumption(EntryId),
    UpdateAssumptionDraft(String),
    CommitAssumptionEdit,
    CancelAssumptionEdit,
    DeleteAssumption(EntryId),
    SetCertainty {
        id: EntryId,
        certainty: Certainty,
    },
    SetRowsPerPage(RowsPerPage),
    SetAssumptionPage(usize),
    PreviousAssumptionPage,
    NextAssumptionPage,
    AddOutcome {
        kind: OutcomeKind,
        text: String,
    },
    StartEditOutcome {
        kind: OutcomeKind,
        id: EntryId,
    },
    UpdateOutcomeDraft {
        kind: OutcomeKind,
        text: String,
    },
    CommitOutcomeEdit(OutcomeKind),
    CancelOutcomeEdit(OutcomeKind),
    DeleteOutcome {
        kind: OutcomeKind,
        id: EntryId,
    },
    ToggleOutcomes(OutcomeKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub rows_per_page: RowsPerPage,
    pub confirmation_ttl: Duration,
    pub confirmation_message: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            rows_per_page: RowsPerPage::default(),
            confirmation_ttl: DEFAULT_CONFIRMATION_TTL,
            confirmation_message: DEFAULT_CONFIRMATION_MESSAGE.to_string(),
        }
    }
}

/// Initial content. Seeding never marks the form dirty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSeed {
    pub reason: String,
    pub tags: Vec<String>,
    pub assumptions: Vec<Assumption>,
    pub direct: OutcomeListConfig,
    pub indirect: OutcomeListConfig,
    pub ultimate: OutcomeListConfig,
}

impl FormSeed {
    pub fn empty() -> Self {
        let mut seed = Self::default();
        seed.tags.clear();
        seed.assumptions.clear();
        for config in [&mut seed.direct, &mut seed.indirect, &mut seed.ultimate] {
            config.initial_items.clear();
        }
        seed
    }

    pub fn from_snapshot(snapshot: FormSnapshot) -> Self {
        let mut seed = Self::empty();
        seed.reason = snapshot.reason;
        seed.tags = snapshot.people_served;
        seed.assumptions = snapshot.assumptions;
        seed.direct.initial_items = snapshot.direct_results;
        seed.indirect.initial_items = snapshot.indirect_results;
        seed.ultimate.initial_items = snapshot.ultimate_impact;
        seed
    }
}

impl Default for FormSeed {
    fn default() -> Self {
        let assumption = |id: &str, description: &str, certainty| Assumption {
            id: EntryId::new(id),
            description: description.to_string(),
            certainty,
        };
        Self {
            reason: String::new(),
            tags: vec!["Students".to_string()],
            assumptions: vec![
                assumption(
                    "a_1",
                    "Students are interested in acquiring new digital skills",
                    Certainty::VeryCertain,
                ),
                assumption("a_2", "Assumption 1", Certainty::ModeratelyCertain),
                assumption("a_3", "Assumption 2", Certainty::Uncertain),
            ],
            direct: OutcomeListConfig::direct_outcomes(),
            indirect: OutcomeListConfig::indirect_outcomes(),
            ultimate: OutcomeListConfig::ultimate_impact(),
        }
    }
}

fn forward(tx: &Sender<FormEvent>, event: FormEvent) {
    if tx.send(event).is_err() {
        tracing::warn!("form event queue disconnected; dropping change notification");
    }
}

fn truncate_reason(text: &str) -> String {
    text.chars().take(REASON_MAX_CHARS).collect()
}

pub struct FormAggregator {
    reason: String,
    tags: TagSet,
    assumptions: AssumptionTable,
    direct: OutcomeList,
    indirect: OutcomeList,
    ultimate: OutcomeList,
    snapshot: FormSnapshot,
    dirty: DirtyTracker,
    saver: SaveCoordinator,
    events: Receiver<FormEvent>,
}

impl FormAggregator {
    pub fn new(seed: FormSeed, options: FormOptions, sink: Box<dyn SaveSink>) -> Self {
        Self::with_id_source(seed, options, sink, || Box::new(UuidIds))
    }

    pub fn with_id_source(
        seed: FormSeed,
        options: FormOptions,
        sink: Box<dyn SaveSink>,
        mut make_ids: impl FnMut() -> Box<dyn IdGenerator>,
    ) -> Self {
        let (tx, events) = unbounded();

        let mut tags = TagSet::with_tags(&seed.tags);
        let sender = tx.clone();
        tags.subscribe(move |tags| forward(&sender, FormEvent::TagsChanged(tags.to_vec())));

        let mut assumptions =
            AssumptionTable::with_rows(make_ids(), options.rows_per_page, seed.assumptions);
        let sender = tx.clone();
        assumptions.subscribe(move |rows| {
            forward(&sender, FormEvent::AssumptionsChanged(rows.to_vec()))
        });

        let mut outcome_list = |kind: OutcomeKind, config: OutcomeListConfig| {
            let mut list = OutcomeList::new(kind, config, make_ids());
            let sender = tx.clone();
            list.subscribe(move |items| {
                forward(
                    &sender,
                    FormEvent::OutcomesChanged {
                        kind,
                        items: items.to_vec(),
                    },
                )
            });
            list
        };
        let direct = outcome_list(OutcomeKind::Direct, seed.direct);
        let indirect = outcome_list(OutcomeKind::Indirect, seed.indirect);
        let ultimate = outcome_list(OutcomeKind::Ultimate, seed.ultimate);

        let saver = SaveCoordinator::new(
            sink,
            ConfirmationTimer::new(options.confirmation_message, options.confirmation_ttl),
        );

        let mut form = Self {
            reason: truncate_reason(&seed.reason),
            tags,
            assumptions,
            direct,
            indirect,
            ultimate,
            snapshot: FormSnapshot::default(),
            dirty: DirtyTracker::new(),
            saver,
            events,
        };
        form.snapshot = form.assemble_snapshot();
        form
    }

    /// Applies one user action. Returns true when committed form content changed.
    pub fn apply(&mut self, command: FormCommand) -> bool {
        tracing::trace!(?command, "applying form command");
        let reason_changed = match command {
            FormCommand::SetReason(text) => {
                self.set_reason(&text);
                true
            }
            FormCommand::AddTag(text) => {
                self.tags.add(&text);
                false
            }
            FormCommand::RemoveTag(tag) => {
                self.tags.remove(&tag);
                false
            }
            FormCommand::RemoveLastTag => {
                self.tags.remove_last();
                false
            }
            FormCommand::SetTagInput(text) => {
                self.tags.set_input(&text);
                false
            }
            FormCommand::SubmitTagInput => {
                self.tags.submit_input();
                false
            }
            FormCommand::TagBackspace => {
                self.tags.backspace();
                false
            }
            FormCommand::AddAssumption(text) => {
                self.assumptions.add(&text);
                false
            }
            FormCommand::SetNewAssumptionText(text) => {
                self.assumptions.set_new_row_text(&text);
                false
            }
            FormCommand::SubmitNewAssumption => {
                self.assumptions.submit_new_row();
                false
            }
            FormCommand::StartEditAssumption(id) => {
                self.assumptions.start_edit(&id);
                false
            }
            FormCommand::UpdateAssumptionDraft(text) => {
                self.assumptions.update_draft_text(&text);
                false
            }
            FormCommand::CommitAssumptionEdit => {
                self.assumptions.commit_edit();
                false
            }
            FormCommand::CancelAssumptionEdit => {
                self.assumptions.cancel_edit();
                false
            }
            FormCommand::DeleteAssumption(id) => {
                self.assumptions.delete(&id);
                false
            }
            FormCommand::SetCertainty { id, certainty } => {
                self.assumptions.set_certainty(&id, certainty);
                false
            }
            FormCommand::SetRowsPerPage(rows_per_page) => {
                self.assumptions.set_rows_per_page(rows_per_page);
                false
            }
            FormCommand::SetAssumptionPage(page) => {
                self.assumptions.set_page(page);
                false
            }
            FormCommand::PreviousAssumptionPage => {
                self.assumptions.previous_page();
                false
            }
            FormCommand::NextAssumptionPage => {
                self.assumptions.next_page();
                false
            }
            FormCommand::AddOutcome { kind, text } => {
                self.outcome_mut(kind).add(&text);
                false
            }
            FormCommand::StartEditOutcome { kind, id } => {
                self.outcome_mut(kind).start_edit(&id);
                false
            }
            FormCommand::UpdateOutcomeDraft { kind, text } => {
                self.outcome_mut(kind).update_draft_text(&text);
                false
            }
            FormCommand::CommitOutcomeEdit(kind) => {
                self.outcome_mut(kind).commit_edit();
                false
            }
            FormCommand::CancelOutcomeEdit(kind) => {
                self.outcome_mut(kind).cancel_edit();
                false
            }
            FormCommand::DeleteOutcome { kind, id } => {
                self.outcome_mut(kind).delete(&id);
                false
            }
            FormCommand::ToggleOutcomes(kind) => {
                self.outcome_mut(kind).toggle_expanded();
                false
            }
        };

        let drained = self.drain_events();
        reason_changed || drained > 0
    }

    pub fn set_reason(&mut self, text: &str) {
        self.reason = truncate_reason(text);
        self.snapshot.reason = self.reason.clone();
        self.dirty.mark();
    }

    pub fn save(&mut self) -> Result<SaveOutcome, SaveError> {
        self.save_at(Instant::now())
    }

    pub fn save_at(&mut self, now: Instant) -> Result<SaveOutcome, SaveError> {
        self.drain_events();
        self.snapshot = self.assemble_snapshot();
        self.saver.save(&self.snapshot, &mut self.dirty, now)
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.saver.tick(now)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn assumptions(&self) -> &AssumptionTable {
        &self.assumptions
    }

    pub fn outcomes(&self, kind: OutcomeKind) -> &OutcomeList {
        match kind {
            OutcomeKind::Direct => &self.direct,
            OutcomeKind::Indirect => &self.indirect,
            OutcomeKind::Ultimate => &self.ultimate,
        }
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn can_save(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn confirmation_message(&self, now: Instant) -> Option<&str> {
        self.saver.confirmation_message(now)
    }

    pub fn confirmation_deadline(&self) -> Option<Instant> {
        self.saver.confirmation().deadline()
    }

    pub fn last_failure(&self) -> Option<&SaveFailure> {
        self.saver.last_failure()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.saver.last_saved_at()
    }

    fn outcome_mut(&mut self, kind: OutcomeKind) -> &mut OutcomeList {
        match kind {
            OutcomeKind::Direct => &mut self.direct,
            OutcomeKind::Indirect => &mut self.indirect,
            OutcomeKind::Ultimate => &mut self.ultimate,
        }
    }

    fn drain_events(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
            drained += 1;
        }
        drained
    }

    fn apply_event(&mut self, event: FormEvent) {
        match event {
            FormEvent::TagsChanged(tags) => self.snapshot.people_served = tags,
            FormEvent::AssumptionsChanged(rows) => self.snapshot.assumptions = rows,
            FormEvent::OutcomesChanged { kind, items } => match kind {
                OutcomeKind::Direct => self.snapshot.direct_results = items,
                OutcomeKind::Indirect => self.snapshot.indirect_results = items,
                OutcomeKind::Ultimate => self.snapshot.ultimate_impact = items,
            },
        }
        self.dirty.mark();
    }

    fn assemble_snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            reason: self.reason.clone(),
            people_served: self.tags.tags().to_vec(),
            assumptions: self.assumptions.rows().to_vec(),
            direct_results: self.direct.items().to_vec(),
            indirect_results: self.indirect.items().to_vec(),
            ultimate_impact: self.ultimate.items().to_vec(),
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
