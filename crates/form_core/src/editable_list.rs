use std::collections::HashSet;
use std::fmt;

use shared::domain::{Assumption, Certainty, EntryId, OutcomeItem};

use crate::ids::{IdGenerator, UuidIds};

const MAX_ID_ATTEMPTS: usize = 32;

pub trait ListEntry: Clone {
    fn create(id: EntryId, text: String) -> Self;
    fn id(&self) -> &EntryId;
    fn text(&self) -> &str;
    fn set_text(&mut self, text: String);
}

impl ListEntry for Assumption {
    fn create(id: EntryId, text: String) -> Self {
        Assumption {
            id,
            description: text,
            certainty: Certainty::default(),
        }
    }

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn text(&self) -> &str {
        &self.description
    }

    fn set_text(&mut self, text: String) {
        self.description = text;
    }
}

impl ListEntry for OutcomeItem {
    fn create(id: EntryId, text: String) -> Self {
        OutcomeItem { id, text }
    }

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

pub type ChangeListener<E> = Box<dyn FnMut(&[E])>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub target: EntryId,
    pub text: String,
}

pub(crate) fn normalized(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub struct EditableList<E: ListEntry> {
    items: Vec<E>,
    draft: Option<EditDraft>,
    ids: Box<dyn IdGenerator>,
    id_prefix: &'static str,
    listener: Option<ChangeListener<E>>,
}

impl<E: ListEntry> EditableList<E> {
    pub fn new(id_prefix: &'static str, ids: Box<dyn IdGenerator>) -> Self {
        Self::with_items(id_prefix, ids, Vec::new())
    }

    // Seeds are trimmed like added text; blank entries and repeated ids are dropped.
    pub fn with_items(id_prefix: &'static str, ids: Box<dyn IdGenerator>, items: Vec<E>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter_map(|mut item| {
                let Some(text) = normalized(item.text()) else {
                    tracing::warn!(id = %item.id(), "dropping seed entry with blank text");
                    return None;
                };
                if !seen.insert(item.id().clone()) {
                    tracing::warn!(id = %item.id(), "dropping seed entry with duplicate id");
                    return None;
                }
                item.set_text(text);
                Some(item)
            })
            .collect();

        Self {
            items,
            draft: None,
            ids,
            id_prefix,
            listener: None,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[E]) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: &EntryId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        self.draft.as_ref()
    }

    pub fn is_editing(&self, id: &EntryId) -> bool {
        self.draft.as_ref().is_some_and(|draft| &draft.target == id)
    }

    pub fn add(&mut self, raw_text: &str) -> Option<EntryId> {
        let Some(text) = normalized(raw_text) else {
            tracing::debug!(list = self.id_prefix, "ignoring blank entry");
            return None;
        };

        let id = self.fresh_id();
        self.items.push(E::create(id.clone(), text));
        self.notify();
        Some(id)
    }

    pub fn start_edit(&mut self, id: &EntryId) -> bool {
        let Some(item) = self.get(id) else {
            return false;
        };
        self.draft = Some(EditDraft {
            target: id.clone(),
            text: item.text().to_string(),
        });
        true
    }

    pub fn update_draft_text(&mut self, text: &str) -> bool {
        match self.draft.as_mut() {
            Some(draft) => {
                draft.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Writes the trimmed draft into its entry. A blank draft behaves like a cancel.
    /// The draft is cleared either way.
    pub fn commit_edit(&mut self) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        let Some(text) = normalized(&draft.text) else {
            tracing::debug!(list = self.id_prefix, id = %draft.target, "blank edit kept previous text");
            return false;
        };
        let Some(item) = self.items.iter_mut().find(|item| item.id() == &draft.target) else {
            return false;
        };

        item.set_text(text);
        self.notify();
        true
    }

    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    pub fn delete(&mut self, id: &EntryId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.items.remove(index);
        if self.is_editing(id) {
            self.draft = None;
        }
        self.notify();
        true
    }

    pub fn modify(&mut self, id: &EntryId, update: impl FnOnce(&mut E)) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };

        update(item);
        self.notify();
        true
    }

    fn fresh_id(&mut self) -> EntryId {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id(self.id_prefix);
            if self.position(&id).is_none() {
                return id;
            }
        }

        tracing::warn!(list = self.id_prefix, "id generator keeps repeating; using a random id");
        loop {
            let id = UuidIds.next_id(self.id_prefix);
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    fn notify(&mut self) {
        tracing::debug!(list = self.id_prefix, len = self.items.len(), "list changed");
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.items);
        }
    }
}

mod sealed {
    pub trait Backed {
        type Entry: super::ListEntry;

        fn entries(&self) -> &super::EditableList<Self::Entry>;
        fn entries_mut(&mut self) -> &mut super::EditableList<Self::Entry>;
    }
}

pub(crate) use sealed::Backed;

/// Row editing for the controllers built on [`EditableList`].
///
/// At most one draft is open. Starting an edit on another row discards the current draft,
/// and committing or cancelling always closes it.
pub trait DraftEditing: Backed {
    fn draft(&self) -> Option<&EditDraft> {
        self.entries().draft()
    }

    fn is_editing(&self, id: &EntryId) -> bool {
        self.entries().is_editing(id)
    }

    fn start_edit(&mut self, id: &EntryId) -> bool {
        self.entries_mut().start_edit(id)
    }

    fn update_draft_text(&mut self, text: &str) -> bool {
        self.entries_mut().update_draft_text(text)
    }

    fn commit_edit(&mut self) -> bool {
        self.entries_mut().commit_edit()
    }

    fn cancel_edit(&mut self) {
        self.entries_mut().cancel_edit();
    }
}

impl<T: Backed> DraftEditing for T {}

impl<E: ListEntry + fmt::Debug> fmt::Debug for EditableList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableList")
            .field("id_prefix", &self.id_prefix)
            .field("items", &self.items)
            .field("draft", &self.draft)
            .field("subscribed", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/editable_list_tests.rs"]
mod tests;
