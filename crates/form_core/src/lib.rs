pub mod assumption_table;
pub mod dirty;
pub mod editable_list;
pub mod form;
pub mod ids;
pub mod outcome_list;
pub mod save;
pub mod tag_set;

pub use assumption_table::{AssumptionTable, PageSummary, RowsPerPage};
pub use dirty::DirtyTracker;
pub use editable_list::{DraftEditing, EditDraft, EditableList, ListEntry};
pub use form::{FormAggregator, FormCommand, FormEvent, FormOptions, FormSeed, REASON_MAX_CHARS};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use outcome_list::{OutcomeKind, OutcomeList, OutcomeListConfig, OutcomeStyle};
pub use save::{ConfirmationTimer, SaveCoordinator, SaveError, SaveOutcome, SaveSink};
pub use tag_set::TagSet;
