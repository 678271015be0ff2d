//! Command dispatcher: inbound commands to store calls and registry
//! updates.
//!
//! Commands arrive as a name plus a loose JSON argument object and are
//! handled without ever blocking on network I/O; store calls are
//! fire-and-forget with results delivered through listener callbacks.
//! Each listener callback is a closure over its handle, the registry,
//! and the outbound sink only. It never touches dispatcher state; it
//! translates the native snapshot and enqueues one message.
//!
//! A native event may race an unlisten: the callback can fire after
//! `remove-listener` succeeded but before the native cancellation
//! propagates. Emission for a handle the registry no longer knows is
//! logged and dropped, never treated as an error.

use crate::client::{NativeDocumentSnapshot, NativeQuerySnapshot, StoreClient};
use crate::error::{BridgeError, Result};
use crate::query;
use crate::registry::SubscriptionRegistry;
use crate::snapshots;
use crate::types::{Handle, ListenerKind};
use crate::wire::{EventSink, OutboundMessage};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Successful reply to a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// The handle of a freshly attached listener.
    Handle(Handle),
    /// Empty success.
    Empty,
}

/// Resolves inbound commands against the store client and the
/// subscription registry.
pub struct Dispatcher<C> {
    client: Arc<C>,
    registry: Arc<SubscriptionRegistry>,
    sink: Arc<dyn EventSink>,
}

impl<C: StoreClient + 'static> Dispatcher<C> {
    pub fn new(client: Arc<C>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            registry: Arc::new(SubscriptionRegistry::new()),
            sink,
        }
    }

    /// The registry backing this dispatcher.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Handle one command. Every error is scoped to this command; the
    /// caller turns `Err` into an error reply, `UnsupportedCommand`
    /// into a "not implemented" reply.
    pub fn dispatch(&self, command: &str, arguments: &Value) -> Result<Reply> {
        match command {
            "add-query-listener" => self.add_query_listener(arguments),
            "add-document-listener" => self.add_document_listener(arguments),
            "remove-listener" => self.remove_listener(arguments),
            "set-document-data" => self.set_document_data(arguments),
            "delete-document" => self.delete_document(arguments),
            other => Err(BridgeError::UnsupportedCommand(other.to_string())),
        }
    }

    /// Detach every live listener. Call before the process exits so no
    /// native listener leaks; dropping the dispatcher does the same.
    pub fn shutdown(&self) {
        self.registry.shutdown();
    }

    fn add_query_listener(&self, arguments: &Value) -> Result<Reply> {
        let path = required_str(arguments, "path")?;
        let parameters = optional_map(arguments, "parameters")?;
        let description = query::translate(path, parameters)?;

        let handle = self.registry.allocate();
        let registry = Arc::clone(&self.registry);
        let sink = Arc::clone(&self.sink);
        let callback = Box::new(move |snapshot: NativeQuerySnapshot| {
            if !registry.is_active(handle) {
                tracing::debug!(%handle, "dropping query event for unknown handle");
                return;
            }
            let translated = snapshots::translate_query(snapshot);
            sink.emit(OutboundMessage::QuerySnapshot {
                handle,
                documents: translated.documents,
                document_changes: translated.changes,
            });
        });

        let cancel = self.client.listen_query(&description, callback)?;
        self.registry.activate(handle, ListenerKind::Query, cancel);
        tracing::debug!(%handle, path, "query listener attached");

        Ok(Reply::Handle(handle))
    }

    fn add_document_listener(&self, arguments: &Value) -> Result<Reply> {
        let path = required_str(arguments, "path")?;

        let handle = self.registry.allocate();
        let registry = Arc::clone(&self.registry);
        let sink = Arc::clone(&self.sink);
        let callback = Box::new(move |snapshot: NativeDocumentSnapshot| {
            if !registry.is_active(handle) {
                tracing::debug!(%handle, "dropping document event for unknown handle");
                return;
            }
            let translated = snapshots::translate_document(snapshot);
            sink.emit(OutboundMessage::DocumentSnapshot {
                handle,
                path: translated.path,
                data: translated.data,
            });
        });

        let cancel = self.client.listen_document(path, callback)?;
        self.registry.activate(handle, ListenerKind::Document, cancel);
        tracing::debug!(%handle, path, "document listener attached");

        Ok(Reply::Handle(handle))
    }

    fn remove_listener(&self, arguments: &Value) -> Result<Reply> {
        // The legacy protocol occasionally sends remove-listener with
        // no handle at all; answer with an error reply, not a crash.
        let handle = arguments
            .get("handle")
            .and_then(Value::as_u64)
            .map(Handle)
            .ok_or_else(|| {
                BridgeError::InvalidParameter("handle must be an unsigned integer".into())
            })?;

        self.registry.unregister(handle)?;
        tracing::debug!(%handle, "listener removed");
        Ok(Reply::Empty)
    }

    fn set_document_data(&self, arguments: &Value) -> Result<Reply> {
        let path = required_str(arguments, "path")?;
        let data = arguments
            .get("data")
            .and_then(Value::as_object)
            .ok_or_else(|| BridgeError::InvalidParameter("data must be a map".into()))?;

        self.client.set_document(path, data.clone())?;
        Ok(Reply::Empty)
    }

    fn delete_document(&self, arguments: &Value) -> Result<Reply> {
        let path = required_str(arguments, "path")?;
        self.client.delete_document(path)?;
        Ok(Reply::Empty)
    }
}

fn required_str<'a>(arguments: &'a Value, name: &str) -> Result<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::InvalidParameter(format!("{name} must be a string")))
}

fn optional_map<'a>(arguments: &'a Value, name: &str) -> Result<Option<&'a Map<String, Value>>> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(BridgeError::InvalidParameter(format!(
            "{name} must be a map"
        ))),
    }
}
