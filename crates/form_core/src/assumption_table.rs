use std::fmt;

use shared::domain::{Assumption, Certainty, EntryId};

use crate::editable_list::{Backed, EditableList};
use crate::ids::IdGenerator;

pub const ASSUMPTION_ID_PREFIX: &str = "a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowsPerPage {
    #[default]
    Five,
    Ten,
    Twenty,
}

impl RowsPerPage {
    pub const ALL: [RowsPerPage; 3] = [RowsPerPage::Five, RowsPerPage::Ten, RowsPerPage::Twenty];

    pub fn get(self) -> usize {
        match self {
            RowsPerPage::Five => 5,
            RowsPerPage::Ten => 10,
            RowsPerPage::Twenty => 20,
        }
    }

    pub fn from_count(count: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.get() == count)
    }
}

impl fmt::Display for RowsPerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

pub fn page_count(count: usize, rows_per_page: RowsPerPage) -> usize {
    count.div_ceil(rows_per_page.get()).max(1)
}

/// Footer numbers for the active page. `first` and `last` are 1-based and both 0 when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub first: usize,
    pub last: usize,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

impl PageSummary {
    pub fn showing_label(&self) -> String {
        format!("Showing {}–{} of {}", self.first, self.last, self.total)
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.page_count)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }
}

#[derive(Debug)]
pub struct AssumptionTable {
    list: EditableList<Assumption>,
    rows_per_page: RowsPerPage,
    page: usize,
    new_row: String,
}

impl AssumptionTable {
    pub fn new(ids: Box<dyn IdGenerator>, rows_per_page: RowsPerPage) -> Self {
        Self::with_rows(ids, rows_per_page, Vec::new())
    }

    pub fn with_rows(
        ids: Box<dyn IdGenerator>,
        rows_per_page: RowsPerPage,
        rows: Vec<Assumption>,
    ) -> Self {
        Self {
            list: EditableList::with_items(ASSUMPTION_ID_PREFIX, ids, rows),
            rows_per_page,
            page: 0,
            new_row: String::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[Assumption]) + 'static) {
        self.list.subscribe(listener);
    }

    pub fn rows(&self) -> &[Assumption] {
        self.list.items()
    }

    pub fn get(&self, id: &EntryId) -> Option<&Assumption> {
        self.list.get(id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> RowsPerPage {
        self.rows_per_page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.len(), self.rows_per_page)
    }

    pub fn visible_rows(&self) -> &[Assumption] {
        let size = self.rows_per_page.get();
        let start = (self.page * size).min(self.len());
        let end = (start + size).min(self.len());
        &self.rows()[start..end]
    }

    pub fn page_summary(&self) -> PageSummary {
        let total = self.len();
        let size = self.rows_per_page.get();
        let (first, last) = if total == 0 {
            (0, 0)
        } else {
            (self.page * size + 1, ((self.page + 1) * size).min(total))
        };
        PageSummary {
            first,
            last,
            total,
            page: self.page,
            page_count: self.page_count(),
        }
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: RowsPerPage) {
        self.rows_per_page = rows_per_page;
        self.clamp_page();
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
        self.clamp_page();
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn add(&mut self, description: &str) -> Option<EntryId> {
        let count_before = self.len();
        let id = self.list.add(description)?;
        self.page = count_before / self.rows_per_page.get();
        Some(id)
    }

    pub fn new_row_text(&self) -> &str {
        &self.new_row
    }

    pub fn set_new_row_text(&mut self, text: &str) {
        self.new_row = text.to_string();
    }

    /// Enter on the add-new row. The row input is cleared whether or not a row was added.
    pub fn submit_new_row(&mut self) -> Option<EntryId> {
        let text = std::mem::take(&mut self.new_row);
        self.add(&text)
    }

    pub fn delete(&mut self, id: &EntryId) -> bool {
        let deleted = self.list.delete(id);
        if deleted {
            self.clamp_page();
        }
        deleted
    }

    pub fn set_certainty(&mut self, id: &EntryId, certainty: Certainty) -> bool {
        self.list.modify(id, |row| row.certainty = certainty)
    }

    fn clamp_page(&mut self) {
        self.page = self.page.min(self.page_count() - 1);
    }
}

impl Backed for AssumptionTable {
    type Entry = Assumption;

    fn entries(&self) -> &EditableList<Assumption> {
        &self.list
    }

    fn entries_mut(&mut self) -> &mut EditableList<Assumption> {
        &mut self.list
    }
}

#[cfg(test)]
#[path = "tests/assumption_table_tests.rs"]
mod tests;
