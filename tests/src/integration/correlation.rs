//! # Correlation Flows
//!
//! Results reach the caller that issued the matching token, once, whatever
//! order the native side completes in.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::time::timeout;

    use callback_bridge::{
        BridgeApi, BridgeConfig, BridgeError, CallStatus, CallbackBridge, CallbackResult,
        ChannelSink, Completion, ManagedSink, ManualCollaborator, ScriptedCollaborator,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn recording_bridge() -> (
        CallbackBridge,
        Arc<ManualCollaborator>,
        Arc<Mutex<Vec<CallbackResult>>>,
    ) {
        let native = Arc::new(ManualCollaborator::new());
        let received: Arc<Mutex<Vec<CallbackResult>>> = Arc::default();
        let store = received.clone();
        let sink: Arc<dyn ManagedSink> = Arc::new(move |r: CallbackResult| store.lock().push(r));
        let bridge = CallbackBridge::new(BridgeConfig::default(), native.clone(), sink).unwrap();
        (bridge, native, received)
    }

    // =============================================================================
    // ORDERING
    // =============================================================================

    #[test]
    fn test_reverse_completion_reaches_matching_callers() {
        let (bridge, native, received) = recording_bridge();

        bridge
            .invoke("getShortUrl".into(), r#"{"channel":"a"}"#.into(), "tok-A".into())
            .unwrap();
        bridge
            .invoke("getShortUrl".into(), r#"{"channel":"b"}"#.into(), "tok-B".into())
            .unwrap();
        assert_eq!(native.outstanding().len(), 2);

        assert!(native.complete(&"tok-B".into(), Completion::success("https://b")));
        assert!(native.complete(&"tok-A".into(), Completion::success("https://a")));

        let received = received.lock();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].token.as_str(), "tok-B");
        assert_eq!(received[0].payload, "https://b");
        assert_eq!(received[1].token.as_str(), "tok-A");
        assert_eq!(received[1].payload, "https://a");
    }

    #[test]
    fn test_fetch_rewards_round_trip() {
        let (bridge, native, received) = recording_bridge();

        bridge
            .invoke("fetchRewards".into(), String::new(), "tok-1".into())
            .unwrap();
        assert!(bridge.is_pending(&"tok-1".into()));

        native.complete(&"tok-1".into(), Completion::success("42"));

        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].token.as_str(), "tok-1");
        assert_eq!(received[0].operation.as_str(), "fetchRewards");
        assert_eq!(received[0].status, CallStatus::Success);
        assert_eq!(received[0].payload, "42");
        assert!(!bridge.is_pending(&"tok-1".into()));
    }

    #[test]
    fn test_token_reusable_after_completion() {
        let (bridge, native, received) = recording_bridge();

        bridge.invoke("initSession".into(), String::new(), "tok".into()).unwrap();
        assert!(matches!(
            bridge.invoke("initSession".into(), String::new(), "tok".into()),
            Err(BridgeError::DuplicateToken(_))
        ));

        native.complete(&"tok".into(), Completion::success("{}"));
        bridge.invoke("setIdentity".into(), String::new(), "tok".into()).unwrap();
        native.complete(&"tok".into(), Completion::failure("identity rejected"));

        let received = received.lock();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].operation.as_str(), "setIdentity");
        assert_eq!(received[1].error(), Some("identity rejected"));
        assert_eq!(bridge.stats().duplicate_rejections, 1);
    }

    // =============================================================================
    // SCRIPTED NATIVE SIDE
    // =============================================================================

    #[tokio::test]
    async fn test_scripted_completions_arrive_out_of_order() {
        let (sink, mut results) = ChannelSink::new();
        let native = ScriptedCollaborator::new()
            .with_response("initSession", Completion::success(r#"{"+is_first_session":true}"#))
            .with_response("getCreditHistory", Completion::success("[]"))
            .with_delay("initSession", Duration::from_millis(80))
            .with_delay("getCreditHistory", Duration::from_millis(10));
        let bridge =
            CallbackBridge::new(BridgeConfig::default(), Arc::new(native), Arc::new(sink)).unwrap();

        bridge
            .invoke("initSession".into(), String::new(), "slow".into())
            .unwrap();
        bridge
            .invoke("getCreditHistory".into(), String::new(), "fast".into())
            .unwrap();

        let first = timeout(Duration::from_secs(2), results.recv()).await.unwrap().unwrap();
        let second = timeout(Duration::from_secs(2), results.recv()).await.unwrap().unwrap();

        assert_eq!(first.token.as_str(), "fast");
        assert_eq!(first.payload, "[]");
        assert_eq!(second.token.as_str(), "slow");
        assert!(second.is_success());
        assert_eq!(bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_awaitable_calls_resolve_independently() {
        let (sink, _results) = ChannelSink::new();
        let native = ScriptedCollaborator::new()
            .with_response("getShortUrl", Completion::success("https://short"))
            .with_response("fetchRewards", Completion::failure("rewards offline"))
            .with_default_delay(Duration::from_millis(5));
        let bridge =
            CallbackBridge::new(BridgeConfig::default(), Arc::new(native), Arc::new(sink)).unwrap();

        let (url, rewards) = tokio::join!(
            bridge.call("getShortUrl".into(), "{}".into()),
            bridge.call("fetchRewards".into(), String::new()),
        );

        let url = url.unwrap();
        assert_eq!(url.payload, "https://short");
        let rewards = rewards.unwrap();
        assert_eq!(rewards.error(), Some("rewards offline"));
        assert_ne!(url.token, rewards.token);
        assert_eq!(bridge.stats().delivered, 2);
    }
}
