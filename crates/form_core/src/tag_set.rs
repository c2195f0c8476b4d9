use std::fmt;

use crate::editable_list::{normalized, ChangeListener};

#[derive(Default)]
pub struct TagSet {
    tags: Vec<String>,
    input: String,
    listener: Option<ChangeListener<String>>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for tag in tags {
            set.insert(tag.as_ref());
        }
        set
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[String]) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, candidate: &str) -> bool {
        let lowered = candidate.trim().to_lowercase();
        self.tags.iter().any(|tag| tag.to_lowercase() == lowered)
    }

    pub fn add(&mut self, raw: &str) -> bool {
        let added = self.insert(raw);
        if added {
            self.notify();
        }
        added
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        let removed = self.tags.len() != before;
        if removed {
            self.notify();
        }
        removed
    }

    pub fn remove_last(&mut self) -> Option<String> {
        let removed = self.tags.pop();
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Enter in the input field: the buffer is cleared only when its tag was accepted.
    pub fn submit_input(&mut self) -> bool {
        let candidate = std::mem::take(&mut self.input);
        if self.add(&candidate) {
            true
        } else {
            self.input = candidate;
            false
        }
    }

    pub fn backspace(&mut self) -> Option<String> {
        if self.input.pop().is_some() {
            return None;
        }
        self.remove_last()
    }

    fn insert(&mut self, raw: &str) -> bool {
        let Some(candidate) = normalized(raw) else {
            tracing::debug!("ignoring blank tag");
            return false;
        };
        if self.contains(&candidate) {
            tracing::debug!(tag = %candidate, "ignoring duplicate tag");
            return false;
        }
        self.tags.push(candidate);
        true
    }

    fn notify(&mut self) {
        tracing::debug!(list = "tags", len = self.tags.len(), "list changed");
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.tags);
        }
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagSet")
            .field("tags", &self.tags)
            .field("input", &self.input)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/tag_set_tests.rs"]
mod tests;
