//! # Teardown
//!
//! Pending calls are discarded at shutdown and native completions that arrive
//! afterwards are silently dropped.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use bridge_runtime::{BridgeHost, RuntimeConfig};
    use callback_bridge::{
        BridgeApi, BridgeConfig, BridgeError, CallbackBridge, CallbackResult, Completion,
        ManagedSink, ManualCollaborator, ScriptedCollaborator,
    };

    #[test]
    fn test_late_completions_after_shutdown_dropped() {
        let native = Arc::new(ManualCollaborator::new());
        let received: Arc<Mutex<Vec<CallbackResult>>> = Arc::default();
        let store = received.clone();
        let sink: Arc<dyn ManagedSink> = Arc::new(move |r: CallbackResult| store.lock().push(r));
        let bridge = CallbackBridge::new(BridgeConfig::default(), native.clone(), sink).unwrap();

        for i in 0..3 {
            bridge
                .invoke("initSession".into(), String::new(), format!("tok-{i}").into())
                .unwrap();
        }
        assert_eq!(bridge.shutdown(), 3);

        for token in native.outstanding() {
            assert!(native.complete(&token, Completion::success("{}")));
        }
        assert!(received.lock().is_empty());

        assert!(matches!(
            bridge.invoke("initSession".into(), String::new(), "tok-new".into()),
            Err(BridgeError::ShutDown)
        ));
        let stats = bridge.stats();
        assert_eq!(stats.discarded, 3);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn test_completion_after_bridge_dropped() {
        let native = Arc::new(ManualCollaborator::new());
        let sink: Arc<dyn ManagedSink> = Arc::new(|_: CallbackResult| {
            panic!("no result expected after the bridge is gone");
        });
        let bridge = CallbackBridge::new(BridgeConfig::default(), native.clone(), sink).unwrap();
        bridge
            .invoke("getShortUrl".into(), String::new(), "tok".into())
            .unwrap();
        drop(bridge);

        // The completer outlives the bridge; completing is a no-op
        assert!(native.complete(&"tok".into(), Completion::success("https://x")));
    }

    #[tokio::test]
    async fn test_awaiting_callers_cancelled_by_shutdown() {
        let native = Arc::new(ScriptedCollaborator::new().with_default_delay(Duration::from_secs(60)));
        let sink: Arc<dyn ManagedSink> = Arc::new(|_: CallbackResult| {});
        let bridge = CallbackBridge::new(BridgeConfig::default(), native, sink).unwrap();

        let caller = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.call("getCreditHistory".into(), String::new()).await })
        };

        while bridge.pending_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(bridge.shutdown(), 1);

        let outcome = caller.await.unwrap();
        assert!(matches!(outcome, Err(BridgeError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_host_shutdown_reports_discarded() {
        let native = Arc::new(ManualCollaborator::new());
        let host = BridgeHost::new(&RuntimeConfig::default(), native.clone()).unwrap();

        host.bridge()
            .invoke("fetchRewards".into(), String::new(), "tok-1".into())
            .unwrap();
        host.bridge()
            .invoke("fetchRewards".into(), String::new(), "tok-2".into())
            .unwrap();
        native.complete(&"tok-1".into(), Completion::success("true"));

        assert_eq!(host.shutdown(), 1);
    }
}
