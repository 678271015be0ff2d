//! Seam to the external document-store client.
//!
//! The native client (network transport, auth, local cache) is an
//! external collaborator and is assumed correct; this module only pins
//! down the shape the bridge consumes. Listener callbacks are invoked
//! by the client on its own threads, concurrently with inbound
//! commands, and keep firing until the matching [`CancelToken`] is
//! invoked.

use crate::error::Result;
use crate::types::{ChangeKind, DocumentBody, QueryDescription};
use serde_json::{Map, Value};
use std::fmt;

/// Detaches a live native listener.
///
/// Returned by the client when a listener is registered and owned
/// exclusively by the subscription registry from then on. Invoking it
/// consumes it, so a listener can never be detached twice.
pub struct CancelToken(Box<dyn FnOnce() + Send>);

impl CancelToken {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(cancel))
    }

    /// Detach the native listener.
    pub(crate) fn invoke(self) {
        (self.0)()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CancelToken")
    }
}

/// A point-in-time view of one document, as delivered to a document
/// listener. `data` is `None` when the document does not exist.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeDocumentSnapshot {
    pub path: String,
    pub data: Option<DocumentBody>,
}

/// One document inside a query result set. Documents in a result set
/// always exist, so the body is not optional here.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeDocument {
    pub path: String,
    pub data: DocumentBody,
}

/// One entry of the ordered diff between two consecutive query
/// snapshots. Indices are positions within the current document list;
/// -1 means not applicable for the change kind (no previous position
/// for an add, no current position for a removal).
#[derive(Clone, Debug, PartialEq)]
pub struct NativeChange {
    pub kind: ChangeKind,
    pub path: String,
    pub old_index: i64,
    pub new_index: i64,
    pub data: DocumentBody,
}

/// A point-in-time result set for a query, plus the diff since the
/// previous snapshot. Both sequences arrive in the client's native
/// order and must stay that way.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NativeQuerySnapshot {
    pub documents: Vec<NativeDocument>,
    pub changes: Vec<NativeChange>,
}

pub type DocumentCallback = Box<dyn Fn(NativeDocumentSnapshot) + Send + Sync>;
pub type QueryCallback = Box<dyn Fn(NativeQuerySnapshot) + Send + Sync>;

/// The external document-store client, as consumed by the dispatcher.
///
/// All calls are fire-and-forget from the bridge's point of view: a
/// successful listen or write means the client accepted the request,
/// not that anything is durable. Rejections surface as
/// [`BridgeError::ExternalStore`](crate::BridgeError::ExternalStore)
/// and are never retried at this layer.
pub trait StoreClient: Send + Sync {
    /// Attach a listener to a single document path.
    fn listen_document(&self, path: &str, callback: DocumentCallback) -> Result<CancelToken>;

    /// Attach a listener to a collection query.
    fn listen_query(&self, query: &QueryDescription, callback: QueryCallback)
        -> Result<CancelToken>;

    /// Overwrite a document with the supplied body.
    fn set_document(&self, path: &str, data: Map<String, Value>) -> Result<()>;

    /// Delete a document.
    fn delete_document(&self, path: &str) -> Result<()>;
}
