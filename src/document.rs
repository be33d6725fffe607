//! Editable document with revision tracking.
//!
//! Every accepted mutation bumps the revision and yields a [`DocChange`]
//! describing exactly the replaced region. Offsets are byte offsets and must
//! land on char boundaries.

use std::ops::Range;

use thiserror::Error;

/// Rejected edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("range {from}..{to} is inverted")]
    Inverted { from: usize, to: usize },

    #[error("range {from}..{to} is out of bounds (length {len})")]
    OutOfBounds { from: usize, to: usize, len: usize },

    #[error("offset {0} is not on a char boundary")]
    NotCharBoundary(usize),
}

/// A requested replacement of `from..to` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl Change {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            from: at,
            to: at,
            insert: text.into(),
        }
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self {
            from: range.start,
            to: range.end,
            insert: String::new(),
        }
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            from: range.start,
            to: range.end,
            insert: text.into(),
        }
    }

    fn is_empty(&self) -> bool {
        self.from == self.to && self.insert.is_empty()
    }
}

/// Notification of an accepted mutation.
///
/// `from..to` is the replaced region in the text *before* the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocChange {
    pub revision: u64,
    pub from: usize,
    pub to: usize,
    pub inserted: String,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    text: String,
    revision: u64,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a change. Returns `Ok(None)` for an empty change.
    pub fn apply(&mut self, change: Change) -> Result<Option<DocChange>, DocumentError> {
        self.check(&change)?;
        if change.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.commit(change)))
    }

    /// Replace the whole text in one change.
    ///
    /// Always counts as a mutation, even if the text is unchanged;
    /// callers that want to skip redundant replacements compare first.
    pub fn replace_all(&mut self, content: impl Into<String>) -> DocChange {
        let change = Change::replace(0..self.text.len(), content);
        self.commit(change)
    }

    fn check(&self, change: &Change) -> Result<(), DocumentError> {
        let Change { from, to, .. } = *change;
        if from > to {
            return Err(DocumentError::Inverted { from, to });
        }
        if to > self.text.len() {
            return Err(DocumentError::OutOfBounds {
                from,
                to,
                len: self.text.len(),
            });
        }
        for offset in [from, to] {
            if !self.text.is_char_boundary(offset) {
                return Err(DocumentError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    fn commit(&mut self, change: Change) -> DocChange {
        self.text.replace_range(change.from..change.to, &change.insert);
        self.revision += 1;
        DocChange {
            revision: self.revision,
            from: change.from,
            to: change.to,
            inserted: change.insert,
        }
    }
}
