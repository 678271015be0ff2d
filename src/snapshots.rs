//! Snapshot translation: native store events into wire payloads.
//!
//! Both entry points are pure. They sanitize reference values (which
//! cannot cross the boundary) and otherwise pass everything through
//! untouched: document order, change order, and diff indices all come
//! from the native client and are never reinterpreted here.

use crate::client::{NativeDocumentSnapshot, NativeQuerySnapshot};
use crate::types::DocumentBody;
use crate::wire::{ChangeRecord, DocumentEntry};

/// A translated document event, ready to be tagged with a handle.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslatedDocument {
    pub path: String,
    /// `None` when the document does not exist.
    pub data: Option<DocumentBody>,
}

/// A translated query event, ready to be tagged with a handle.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslatedQuery {
    /// The current full result set, in native order.
    pub documents: Vec<DocumentEntry>,
    /// The diff since the previous snapshot, in native emission order.
    pub changes: Vec<ChangeRecord>,
}

/// Translate a document snapshot. A missing document becomes `None`;
/// an existing one has its top-level references rewritten to paths.
pub fn translate_document(snapshot: NativeDocumentSnapshot) -> TranslatedDocument {
    TranslatedDocument {
        path: snapshot.path,
        data: snapshot.data.map(sanitized),
    }
}

/// Translate a query snapshot: the full result set plus the ordered
/// diff, every body sanitized, nothing re-sorted.
pub fn translate_query(snapshot: NativeQuerySnapshot) -> TranslatedQuery {
    let documents = snapshot
        .documents
        .into_iter()
        .map(|document| DocumentEntry {
            path: document.path,
            document: sanitized(document.data),
        })
        .collect();

    let changes = snapshot
        .changes
        .into_iter()
        .map(|change| ChangeRecord {
            kind: change.kind,
            path: change.path,
            old_index: change.old_index,
            new_index: change.new_index,
            document: sanitized(change.data),
        })
        .collect();

    TranslatedQuery { documents, changes }
}

fn sanitized(mut body: DocumentBody) -> DocumentBody {
    body.sanitize_references();
    body
}
