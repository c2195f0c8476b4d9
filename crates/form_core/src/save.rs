use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use shared::{
    error::{ErrorCode, SaveFailure, SinkRejection},
    protocol::FormSnapshot,
};
use thiserror::Error;

use crate::dirty::DirtyTracker;

pub const DEFAULT_CONFIRMATION_MESSAGE: &str = "Saved!";
pub const DEFAULT_CONFIRMATION_TTL: Duration = Duration::from_secs(2);

pub trait SaveSink {
    fn persist(&mut self, snapshot: &FormSnapshot) -> anyhow::Result<()>;
}

impl<F> SaveSink for F
where
    F: FnMut(&FormSnapshot) -> anyhow::Result<()>,
{
    fn persist(&mut self, snapshot: &FormSnapshot) -> anyhow::Result<()> {
        self(snapshot)
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save sink failed: {source}")]
    Sink { source: anyhow::Error },
}

impl SaveError {
    pub fn failure(&self) -> SaveFailure {
        match self {
            SaveError::Sink { source } => match source.downcast_ref::<SinkRejection>() {
                Some(rejection) => SaveFailure::new(rejection.code, rejection.message.clone()),
                None => SaveFailure::new(ErrorCode::Internal, format!("{source:#}")),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ConfirmationTimer {
    message: String,
    ttl: Duration,
    deadline: Option<Instant>,
}

impl ConfirmationTimer {
    pub fn new(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            ttl,
            deadline: None,
        }
    }

    /// Shows the message, restarting the countdown if it was already showing.
    pub fn show(&mut self, now: Instant) {
        self.deadline = Some(now + self.ttl);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self, now: Instant) -> Option<&str> {
        match self.deadline {
            Some(deadline) if now < deadline => Some(&self.message),
            _ => None,
        }
    }
}

impl Default for ConfirmationTimer {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRMATION_MESSAGE, DEFAULT_CONFIRMATION_TTL)
    }
}

pub struct SaveCoordinator {
    sink: Box<dyn SaveSink>,
    confirmation: ConfirmationTimer,
    last_failure: Option<SaveFailure>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl SaveCoordinator {
    pub fn new(sink: Box<dyn SaveSink>, confirmation: ConfirmationTimer) -> Self {
        Self {
            sink,
            confirmation,
            last_failure: None,
            last_saved_at: None,
        }
    }

    // A failure leaves `dirty` set and hides any older confirmation.
    pub fn save(
        &mut self,
        snapshot: &FormSnapshot,
        dirty: &mut DirtyTracker,
        now: Instant,
    ) -> Result<SaveOutcome, SaveError> {
        if !dirty.is_dirty() {
            tracing::warn!("save requested without unsaved changes; ignoring");
            return Ok(SaveOutcome::Skipped);
        }

        if let Err(source) = self.sink.persist(snapshot) {
            let err = SaveError::Sink { source };
            let failure = err.failure();
            tracing::warn!(code = ?failure.code, message = %failure.message, "save failed");
            self.confirmation.cancel();
            self.last_failure = Some(failure);
            return Err(err);
        }

        dirty.clear();
        self.last_failure = None;
        self.last_saved_at = Some(Utc::now());
        self.confirmation.show(now);
        tracing::info!(
            tags = snapshot.people_served.len(),
            assumptions = snapshot.assumptions.len(),
            direct = snapshot.direct_results.len(),
            indirect = snapshot.indirect_results.len(),
            ultimate = snapshot.ultimate_impact.len(),
            "form saved"
        );
        Ok(SaveOutcome::Saved)
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.confirmation.tick(now)
    }

    pub fn confirmation(&self) -> &ConfirmationTimer {
        &self.confirmation
    }

    pub fn confirmation_message(&self, now: Instant) -> Option<&str> {
        self.confirmation.current(now)
    }

    pub fn last_failure(&self) -> Option<&SaveFailure> {
        self.last_failure.as_ref()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }
}

impl fmt::Debug for SaveCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveCoordinator")
            .field("confirmation", &self.confirmation)
            .field("last_failure", &self.last_failure)
            .field("last_saved_at", &self.last_saved_at)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/save_tests.rs"]
mod tests;
