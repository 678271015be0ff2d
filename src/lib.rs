//! # docbridge
//!
//! A command-channel bridge between a managed host runtime and an
//! external document-oriented database client.
//!
//! ## Core Concepts
//!
//! - **Commands**: named requests (attach a listener, mutate a
//!   document) with loose JSON arguments, handled by the [`Dispatcher`]
//! - **Handles**: opaque integers identifying live subscriptions,
//!   issued monotonically and never reused
//! - **Translation**: parameter bags become typed
//!   [`QueryDescription`]s; native snapshots become canonical
//!   [`OutboundMessage`]s with reference values rewritten to paths
//!
//! ## Example
//!
//! ```ignore
//! use docbridge::{Dispatcher, OutboundMessage};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let (sender, receiver) = crossbeam_channel::unbounded::<OutboundMessage>();
//! let dispatcher = Dispatcher::new(client, Arc::new(sender));
//!
//! // Attach a listener; the reply carries its handle.
//! let reply = dispatcher.dispatch(
//!     "add-query-listener",
//!     &json!({"path": "rooms", "parameters": {"limit": 10}}),
//! )?;
//!
//! // Native events arrive on the receiver as wire messages.
//! let event = receiver.recv()?;
//! ```

pub mod client;
pub mod dispatch;
pub mod error;
pub mod query;
pub mod registry;
pub mod snapshots;
pub mod types;
pub mod wire;

// Re-exports
pub use client::{
    CancelToken, DocumentCallback, NativeChange, NativeDocument, NativeDocumentSnapshot,
    NativeQuerySnapshot, QueryCallback, StoreClient,
};
pub use dispatch::{Dispatcher, Reply};
pub use error::{BridgeError, Result};
pub use query::translate;
pub use registry::SubscriptionRegistry;
pub use snapshots::{translate_document, translate_query, TranslatedDocument, TranslatedQuery};
pub use types::*;
pub use wire::{ChangeRecord, DocumentEntry, EventSink, OutboundMessage};
