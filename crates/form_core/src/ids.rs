use shared::domain::EntryId;
use uuid::Uuid;

pub trait IdGenerator {
    fn next_id(&mut self, prefix: &str) -> EntryId;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, prefix: &str) -> EntryId {
        EntryId(format!("{prefix}_{}", Uuid::new_v4().simple()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> EntryId {
        let value = self.next;
        self.next = self.next.saturating_add(1);
        EntryId(format!("{prefix}_{value}"))
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self, prefix: &str) -> EntryId {
        (**self).next_id(prefix)
    }
}
