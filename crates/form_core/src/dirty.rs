#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirtyTracker {
    dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark(&mut self) {
        self.dirty = true;
    }

    /// Only a confirmed save may call this.
    pub(crate) fn clear(&mut self) {
        self.dirty = false;
    }
}
