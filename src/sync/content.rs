//! Content reconciliation.

use crate::document::{DocChange, Document};

/// Bring `document` to `new_content`.
///
/// Equal content is a no-op: no revision bump, no change. Otherwise the
/// whole text is replaced in one change, which the caller feeds through the
/// edit pipeline like any local edit.
pub fn reconcile(document: &mut Document, new_content: &str) -> Option<DocChange> {
    if document.text() == new_content {
        return None;
    }
    Some(document.replace_all(new_content))
}
