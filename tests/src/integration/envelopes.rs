//! # Managed Dispatch
//!
//! Results leave the bridge as JSON envelopes addressed to a named managed
//! object, and completions can come back in the same envelope form.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::Value;
    use tokio::time::timeout;

    use bridge_runtime::{BridgeHost, RuntimeConfig};
    use callback_bridge::{
        decode_envelope, deliver_envelope, BridgeApi, BridgeConfig, CallbackBridge, Completion,
        EnvelopeError, ManualCollaborator, MessageDispatchSink,
    };

    type Dispatched = Arc<Mutex<Vec<(String, String, String)>>>;

    fn dispatching_bridge() -> (CallbackBridge, Arc<ManualCollaborator>, Dispatched) {
        let native = Arc::new(ManualCollaborator::new());
        let dispatched: Dispatched = Arc::default();
        let store = dispatched.clone();
        let sink = MessageDispatchSink::new(
            "SessionObject",
            move |target: &str, method: &str, message: &str| {
                store
                    .lock()
                    .push((target.to_string(), method.to_string(), message.to_string()));
            },
        );
        let bridge =
            CallbackBridge::new(BridgeConfig::default(), native.clone(), Arc::new(sink)).unwrap();
        (bridge, native, dispatched)
    }

    #[test]
    fn test_dispatch_method_follows_result_shape() {
        let (bridge, native, dispatched) = dispatching_bridge();

        let calls = [
            ("initSession", r#"{"+clicked_link":true}"#),
            ("fetchRewards", "true"),
            ("getCreditHistory", r#"[{"amount":1}]"#),
            ("getShortUrl", "https://link/x"),
            ("initSessionWithUniversalObject", r#"{"universalObject":{},"linkProperties":{}}"#),
        ];
        for (i, (operation, _)) in calls.iter().enumerate() {
            bridge
                .invoke((*operation).into(), String::new(), format!("tok-{i}").into())
                .unwrap();
        }
        for (i, (_, payload)) in calls.iter().enumerate() {
            native.complete(&format!("tok-{i}").into(), Completion::success(*payload));
        }

        let dispatched = dispatched.lock();
        let methods: Vec<&str> = dispatched.iter().map(|(_, m, _)| m.as_str()).collect();
        assert_eq!(
            methods,
            vec![
                "asyncCallbackWithParams",
                "asyncCallbackWithStatus",
                "asyncCallbackWithList",
                "asyncCallbackWithUrl",
                "asyncCallbackWithUniversalObject",
            ]
        );
        assert!(dispatched.iter().all(|(t, _, _)| t == "SessionObject"));

        let status: Value = serde_json::from_str(&dispatched[1].2).unwrap();
        assert_eq!(status["callbackId"], "tok-1");
        assert_eq!(status["status"], Value::Bool(true));
        assert_eq!(status["error"], Value::Null);

        let url: Value = serde_json::from_str(&dispatched[3].2).unwrap();
        assert_eq!(url["url"], "https://link/x");
    }

    #[test]
    fn test_failure_envelope_carries_error() {
        let (bridge, native, dispatched) = dispatching_bridge();

        bridge
            .invoke("shareLink".into(), "{}".into(), "tok-share".into())
            .unwrap();
        native.complete(&"tok-share".into(), Completion::failure("user cancelled"));

        let dispatched = dispatched.lock();
        let (token, completion) = decode_envelope(&dispatched[0].2).unwrap();
        assert_eq!(token.as_str(), "tok-share");
        assert_eq!(completion, Completion::failure("user cancelled"));
    }

    #[test]
    fn test_envelopes_delivered_into_bridge() {
        let (bridge, native, dispatched) = dispatching_bridge();

        bridge
            .invoke("getShortUrl".into(), String::new(), "tok-A".into())
            .unwrap();
        bridge
            .invoke("getCreditHistory".into(), String::new(), "tok-B".into())
            .unwrap();

        // Completed from the wire rather than through the held completers
        let token = deliver_envelope(
            &bridge,
            r#"{"callbackId":"tok-B","list":[{"amount":3}],"error":null}"#,
        )
        .unwrap();
        assert_eq!(token.as_str(), "tok-B");
        deliver_envelope(&bridge, r#"{"callbackId":"tok-A","error":"offline"}"#).unwrap();

        // Stale native completers now find nothing
        assert!(native.complete(&"tok-A".into(), Completion::success("late")));
        assert_eq!(bridge.stats().unknown_deliveries, 1);

        let dispatched = dispatched.lock();
        assert_eq!(dispatched.len(), 2);
        let (_, list) = decode_envelope(&dispatched[0].2).unwrap();
        assert_eq!(list, Completion::success(r#"[{"amount":3}]"#));
        let (_, url) = decode_envelope(&dispatched[1].2).unwrap();
        assert_eq!(url, Completion::failure("offline"));
    }

    #[test]
    fn test_unreadable_envelopes_rejected() {
        let (bridge, _native, dispatched) = dispatching_bridge();
        bridge
            .invoke("initSession".into(), String::new(), "tok".into())
            .unwrap();

        assert!(matches!(
            deliver_envelope(&bridge, "not json"),
            Err(EnvelopeError::Malformed(_))
        ));
        assert!(matches!(
            deliver_envelope(&bridge, r#"{"params":{}}"#),
            Err(EnvelopeError::MissingToken)
        ));
        assert!(bridge.is_pending(&"tok".into()));
        assert!(dispatched.lock().is_empty());
    }

    #[tokio::test]
    async fn test_host_dispatches_to_configured_object() {
        let config = RuntimeConfig {
            target_object: "Listener".to_string(),
            ..Default::default()
        };
        let native = Arc::new(ManualCollaborator::new());
        let mut host = BridgeHost::new(&config, native.clone()).unwrap();

        let token = host.bridge().next_token();
        host.bridge()
            .invoke("fetchRewards".into(), String::new(), token.clone())
            .unwrap();
        native.complete(&token, Completion::success("false"));

        let message = timeout(Duration::from_secs(1), host.next_message())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.target, "Listener");
        assert_eq!(message.method, "asyncCallbackWithStatus");
        let (decoded, completion) = decode_envelope(&message.message).unwrap();
        assert_eq!(decoded, token);
        assert_eq!(completion, Completion::success("false"));
    }
}
