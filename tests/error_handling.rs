//! Error handling and edge case tests.
//!
//! Every failure here must be scoped to the command that triggered it:
//! no panic, no leaked listener, no registry mutation.

use docbridge::{
    BridgeError, CancelToken, Dispatcher, DocumentCallback, Handle, OutboundMessage,
    QueryCallback, QueryDescription, Reply, StoreClient,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// A client that accepts everything and never delivers events.
struct NullClient;

impl StoreClient for NullClient {
    fn listen_document(
        &self,
        _path: &str,
        _callback: DocumentCallback,
    ) -> docbridge::Result<CancelToken> {
        Ok(CancelToken::new(|| {}))
    }

    fn listen_query(
        &self,
        _query: &QueryDescription,
        _callback: QueryCallback,
    ) -> docbridge::Result<CancelToken> {
        Ok(CancelToken::new(|| {}))
    }

    fn set_document(&self, _path: &str, _data: Map<String, Value>) -> docbridge::Result<()> {
        Ok(())
    }

    fn delete_document(&self, _path: &str) -> docbridge::Result<()> {
        Ok(())
    }
}

/// A client that rejects everything, for surfacing store errors.
struct RejectingClient;

impl RejectingClient {
    fn rejected<T>() -> docbridge::Result<T> {
        Err(BridgeError::ExternalStore("permission denied".into()))
    }
}

impl StoreClient for RejectingClient {
    fn listen_document(
        &self,
        _path: &str,
        _callback: DocumentCallback,
    ) -> docbridge::Result<CancelToken> {
        Self::rejected()
    }

    fn listen_query(
        &self,
        _query: &QueryDescription,
        _callback: QueryCallback,
    ) -> docbridge::Result<CancelToken> {
        Self::rejected()
    }

    fn set_document(&self, _path: &str, _data: Map<String, Value>) -> docbridge::Result<()> {
        Self::rejected()
    }

    fn delete_document(&self, _path: &str) -> docbridge::Result<()> {
        Self::rejected()
    }
}

fn dispatcher<C: StoreClient + 'static>(client: C) -> Dispatcher<C> {
    let (sender, _receiver) = crossbeam_channel::unbounded::<OutboundMessage>();
    // The receiver is dropped on purpose; emission must cope.
    Dispatcher::new(Arc::new(client), Arc::new(sender))
}

// --- Unknown handles ---

#[test]
fn test_remove_listener_never_issued_handle() {
    let dispatcher = dispatcher(NullClient);

    let result = dispatcher.dispatch("remove-listener", &json!({"handle": 99}));

    assert!(matches!(result, Err(BridgeError::UnknownHandle(Handle(99)))));
    assert_eq!(dispatcher.registry().len(), 0);
}

#[test]
fn test_remove_listener_twice() {
    let dispatcher = dispatcher(NullClient);

    dispatcher
        .dispatch("add-document-listener", &json!({"path": "rooms/r1"}))
        .unwrap();

    assert_eq!(
        dispatcher
            .dispatch("remove-listener", &json!({"handle": 0}))
            .unwrap(),
        Reply::Empty
    );
    let second = dispatcher.dispatch("remove-listener", &json!({"handle": 0}));
    assert!(matches!(second, Err(BridgeError::UnknownHandle(Handle(0)))));
}

#[test]
fn test_remove_listener_without_handle_argument() {
    let dispatcher = dispatcher(NullClient);

    let result = dispatcher.dispatch("remove-listener", &json!({}));
    assert!(matches!(result, Err(BridgeError::InvalidParameter(_))));
}

// --- Malformed arguments ---

#[test]
fn test_listener_commands_require_path() {
    let dispatcher = dispatcher(NullClient);

    for command in ["add-query-listener", "add-document-listener"] {
        let result = dispatcher.dispatch(command, &json!({}));
        assert!(matches!(result, Err(BridgeError::InvalidParameter(_))));
    }
    // No listener was attached along the way.
    assert_eq!(dispatcher.registry().len(), 0);
}

#[test]
fn test_bad_query_parameters_leave_registry_untouched() {
    let dispatcher = dispatcher(NullClient);

    let result = dispatcher.dispatch(
        "add-query-listener",
        &json!({"path": "rooms", "parameters": {"equalTo": 1}}),
    );

    assert!(matches!(result, Err(BridgeError::InvalidParameter(_))));
    assert_eq!(dispatcher.registry().len(), 0);
}

#[test]
fn test_non_map_parameters_rejected() {
    let dispatcher = dispatcher(NullClient);

    let result = dispatcher.dispatch(
        "add-query-listener",
        &json!({"path": "rooms", "parameters": [1, 2, 3]}),
    );
    assert!(matches!(result, Err(BridgeError::InvalidParameter(_))));
}

#[test]
fn test_set_document_data_requires_map() {
    let dispatcher = dispatcher(NullClient);

    for arguments in [
        json!({"path": "rooms/r1"}),
        json!({"path": "rooms/r1", "data": 5}),
        json!({"data": {"a": 1}}),
    ] {
        let result = dispatcher.dispatch("set-document-data", &arguments);
        assert!(matches!(result, Err(BridgeError::InvalidParameter(_))));
    }
}

// --- Store rejections ---

#[test]
fn test_store_rejection_is_surfaced_verbatim() {
    let dispatcher = dispatcher(RejectingClient);

    for (command, arguments) in [
        ("add-query-listener", json!({"path": "rooms"})),
        ("add-document-listener", json!({"path": "rooms/r1"})),
        (
            "set-document-data",
            json!({"path": "rooms/r1", "data": {}}),
        ),
        ("delete-document", json!({"path": "rooms/r1"})),
    ] {
        let result = dispatcher.dispatch(command, &arguments);
        match result {
            Err(BridgeError::ExternalStore(message)) => {
                assert_eq!(message, "permission denied");
            }
            other => panic!("expected store error for {}, got {:?}", command, other),
        }
    }

    // Nothing was registered for the failed listens.
    assert_eq!(dispatcher.registry().len(), 0);
}

#[test]
fn test_registry_recovers_after_listen_failure() {
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Rejects the first listen, accepts the rest.
    struct FlakyClient {
        failed: AtomicBool,
    }

    impl StoreClient for FlakyClient {
        fn listen_document(
            &self,
            _path: &str,
            _callback: DocumentCallback,
        ) -> docbridge::Result<CancelToken> {
            Ok(CancelToken::new(|| {}))
        }

        fn listen_query(
            &self,
            _query: &QueryDescription,
            _callback: QueryCallback,
        ) -> docbridge::Result<CancelToken> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(BridgeError::ExternalStore("backend unavailable".into()));
            }
            Ok(CancelToken::new(|| {}))
        }

        fn set_document(&self, _path: &str, _data: Map<String, Value>) -> docbridge::Result<()> {
            Ok(())
        }

        fn delete_document(&self, _path: &str) -> docbridge::Result<()> {
            Ok(())
        }
    }

    let dispatcher = dispatcher(FlakyClient {
        failed: AtomicBool::new(false),
    });

    let first = dispatcher.dispatch("add-query-listener", &json!({"path": "rooms"}));
    assert!(matches!(first, Err(BridgeError::ExternalStore(_))));
    assert_eq!(dispatcher.registry().len(), 0);

    // The failed attempt consumed an allocation but the registry is
    // intact: the retry registers cleanly under a fresh handle.
    let second = dispatcher
        .dispatch("add-query-listener", &json!({"path": "rooms"}))
        .unwrap();
    assert_eq!(second, Reply::Handle(Handle(1)));
    assert_eq!(dispatcher.registry().len(), 1);
}

#[test]
fn test_error_replies_render_for_the_host() {
    // The host glue stringifies errors into replies; make sure the
    // display text carries the interesting part.
    assert_eq!(
        BridgeError::UnknownHandle(Handle(3)).to_string(),
        "Unknown handle: 3"
    );
    assert_eq!(
        BridgeError::UnsupportedCommand("foo".into()).to_string(),
        "Unsupported command: foo"
    );
}
