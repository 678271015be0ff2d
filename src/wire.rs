//! Outbound wire messages and the sink they flow through.
//!
//! Messages here are pushed to the host asynchronously, not in reply to
//! a command. The sink is abstracted from any particular transport; the
//! crossbeam `Sender` impl is what in-process hosts (and the tests)
//! plug in.

use crate::types::{ChangeKind, DocumentBody, Handle};
use serde::Serialize;

/// One `{path, document}` entry in a query result set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentEntry {
    pub path: String,
    pub document: DocumentBody,
}

/// One entry in the ordered diff carried by a query snapshot message.
///
/// The relative order of change records encodes display-list-splice
/// semantics on the host side and is never re-sorted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub path: String,
    /// Position in the previous document list, -1 if newly present.
    pub old_index: i64,
    /// Position in the current document list, -1 if removed.
    pub new_index: i64,
    pub document: DocumentBody,
}

/// An event message pushed to the host, tagged with the subscription
/// handle it belongs to. Variant names are the wire message names.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    DocumentSnapshot {
        handle: Handle,
        path: String,
        data: Option<DocumentBody>,
    },
    #[serde(rename_all = "camelCase")]
    QuerySnapshot {
        handle: Handle,
        documents: Vec<DocumentEntry>,
        document_changes: Vec<ChangeRecord>,
    },
}

impl OutboundMessage {
    /// The wire name of this message.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundMessage::DocumentSnapshot { .. } => "DocumentSnapshot",
            OutboundMessage::QuerySnapshot { .. } => "QuerySnapshot",
        }
    }

    /// The subscription this message belongs to.
    pub fn handle(&self) -> Handle {
        match self {
            OutboundMessage::DocumentSnapshot { handle, .. } => *handle,
            OutboundMessage::QuerySnapshot { handle, .. } => *handle,
        }
    }
}

/// Where outbound messages go.
///
/// `emit` must not block the event callback for long and must not
/// fail: a sink with nowhere to deliver simply drops the message.
pub trait EventSink: Send + Sync {
    fn emit(&self, message: OutboundMessage);
}

impl EventSink for crossbeam_channel::Sender<OutboundMessage> {
    fn emit(&self, message: OutboundMessage) {
        // A disconnected receiver means the host side shut down first;
        // nothing useful to do with the message.
        let _ = self.send(message);
    }
}
