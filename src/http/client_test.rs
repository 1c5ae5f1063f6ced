use super::test_helpers::*;
use super::*;
use crate::envelope::FALLBACK_MESSAGE;
use crate::router::{LOGIN_PATH, Location, RETURN_URL_KEY, Router};
use serde_json::json;

// =============================================================================
// auth header
// =============================================================================

#[tokio::test]
async fn signed_in_request_carries_bearer_token() {
    let h = Harness::new(MockTransport::ok(json!(null))).signed_in("tok-123");
    h.client.request::<Value>("patient/myUser", Method::Get).await.unwrap();
    let req = h.transport.last_request().unwrap();
    assert_eq!(req.header("Authorization"), Some("Bearer tok-123"));
}

#[tokio::test]
async fn anonymous_request_has_no_authorization_header() {
    let h = Harness::new(MockTransport::ok(json!(null)));
    h.client.request::<Value>("code", Method::Get).await.unwrap();
    let req = h.transport.last_request().unwrap();
    assert_eq!(req.header("Authorization"), None);
}

#[tokio::test]
async fn token_is_read_per_request() {
    let h = Harness::new(MockTransport::ok(json!(null))).signed_in("first");
    h.client.request::<Value>("a", Method::Get).await.unwrap();
    h.session.set(patient_session("second"));
    h.client.request::<Value>("b", Method::Get).await.unwrap();
    let tokens: Vec<_> = h
        .transport
        .requests()
        .iter()
        .map(|r| r.header("Authorization").map(str::to_owned))
        .collect();
    assert_eq!(tokens, vec![Some("Bearer first".to_owned()), Some("Bearer second".to_owned())]);
}

// =============================================================================
// envelope classification
// =============================================================================

#[tokio::test]
async fn success_envelope_resolves_with_data() {
    let h = Harness::new(MockTransport::ok(json!({ "id": "o1" })));
    let data: Value = h.client.request("patient/consult/order", Method::Post).await.unwrap();
    assert_eq!(data, json!({ "id": "o1" }));
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn success_envelope_decodes_into_typed_payload() {
    #[derive(serde::Deserialize)]
    struct Created {
        id: String,
    }
    let h = Harness::new(MockTransport::ok(json!({ "id": "o1" })));
    let created: Created = h.client.request("patient/consult/order", Method::Post).await.unwrap();
    assert_eq!(created.id, "o1");
}

#[tokio::test]
async fn business_failure_notifies_and_rejects_with_envelope() {
    let h = Harness::new(MockTransport::status(200, &failure_body(10005, "验证码错误")));
    let err = h.client.request::<Value>("login", Method::Post).await.unwrap_err();

    assert_eq!(err, ApiError::Business { code: 10005, message: "验证码错误".into(), data: Value::Null });
    assert_eq!(err.envelope().unwrap().code, 10005);
    assert_eq!(h.notifier.messages(), vec!["验证码错误".to_owned()]);
}

#[tokio::test]
async fn business_failure_with_empty_message_uses_fallback() {
    let h = Harness::new(MockTransport::status(200, &failure_body(10010, "")));
    let err = h.client.request::<Value>("login", Method::Post).await.unwrap_err();
    assert!(err.is_business());
    assert_eq!(h.notifier.messages(), vec![FALLBACK_MESSAGE.to_owned()]);
}

#[tokio::test]
async fn business_failure_with_null_message_uses_fallback() {
    let h = Harness::new(MockTransport::status(200, r#"{"code":10001,"message":null,"data":null}"#));
    let err = h.client.request::<Value>("login", Method::Post).await.unwrap_err();

    assert_eq!(err, ApiError::Business { code: 10001, message: String::new(), data: Value::Null });
    assert_eq!(h.notifier.messages(), vec![FALLBACK_MESSAGE.to_owned()]);
}

#[tokio::test]
async fn business_failure_leaves_session_alone() {
    let h = Harness::new(MockTransport::status(200, &failure_body(1, "nope"))).signed_in("tok");
    h.client.request::<Value>("x", Method::Get).await.unwrap_err();
    assert!(h.session.is_authenticated());
    assert!(h.navigator.pushes().is_empty());
}

#[tokio::test]
async fn payload_shape_mismatch_is_decode_failure() {
    let h = Harness::new(MockTransport::ok(json!("not a number")));
    let err = h.client.request::<u32>("x", Method::Get).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Decode(_))));
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn non_envelope_body_is_decode_failure() {
    let h = Harness::new(MockTransport::status(200, "<html></html>"));
    let err = h.client.request::<Value>("x", Method::Get).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Decode(_))));
}

// =============================================================================
// transport failures
// =============================================================================

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_with_return_url() {
    let h = Harness::at("/user?tab=orders", MockTransport::status(401, "")).signed_in("stale");
    let err = h.client.request::<Value>("patient/myUser", Method::Get).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.session.get(), None);
    let pushes = h.navigator.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].path, LOGIN_PATH);
    assert_eq!(pushes[0].query_value(RETURN_URL_KEY), Some("/user?tab=orders"));
}

#[tokio::test]
async fn unauthorized_does_not_notify() {
    let h = Harness::new(MockTransport::status(401, "")).signed_in("stale");
    h.client.request::<Value>("x", Method::Get).await.unwrap_err();
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn concurrent_unauthorized_calls_clear_once_and_redirect_once() {
    let h = Harness::at("/user", MockTransport::status(401, "")).signed_in("stale");
    let (a, b) = tokio::join!(
        h.client.request::<Value>("patient/myUser", Method::Get),
        h.client.request::<Value>("patient/mylist", Method::Get),
    );

    assert!(a.unwrap_err().is_unauthorized());
    assert!(b.unwrap_err().is_unauthorized());
    assert_eq!(h.session.get(), None);
    assert_eq!(h.navigator.pushes(), vec![crate::router::login_redirect("/user")]);
}

#[tokio::test]
async fn return_url_is_the_path_active_when_the_call_started() {
    let h = Harness::at("/user", MockTransport::status(401, "")).signed_in("stale");
    let (result, ()) = tokio::join!(h.client.request::<Value>("patient/myUser", Method::Get), async {
        // Runs while the request is parked inside the transport.
        assert!(h.navigator.push(Location::new("/article")));
    });

    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(
        h.navigator.pushes(),
        vec![Location::new("/article"), crate::router::login_redirect("/user")]
    );
}

#[tokio::test]
async fn malformed_upload_is_rejected_before_dispatch() {
    let h = Harness::new(MockTransport::ok(json!(null))).signed_in("tok");
    let form = Form::new().file("file", "scan.png", Some("not a mime".into()), vec![1]);

    let err = h.client.upload::<Value>("upload", form).await.unwrap_err();

    assert!(matches!(err, ApiError::Request(_)));
    assert!(h.transport.requests().is_empty());
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn server_error_rejects_without_side_effects() {
    let h = Harness::new(MockTransport::status(500, "boom")).signed_in("tok");
    let err = h.client.request::<Value>("x", Method::Get).await.unwrap_err();

    assert_eq!(err, ApiError::Transport(TransportError::Status { status: 500, body: "boom".into() }));
    assert!(h.session.is_authenticated());
    assert!(h.navigator.pushes().is_empty());
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn timeout_rejects_as_transport_failure() {
    let h = Harness::new(MockTransport::new(|_| Err(TransportError::Timeout))).signed_in("tok");
    let err = h.client.request::<Value>("x", Method::Get).await.unwrap_err();
    assert_eq!(err, ApiError::Transport(TransportError::Timeout));
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn network_error_rejects_as_transport_failure() {
    let h = Harness::new(MockTransport::new(|_| Err(TransportError::Network("dns".into()))));
    let err = h.client.request::<Value>("x", Method::Get).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Network(_))));
}

#[tokio::test]
async fn invalid_request_is_never_dispatched() {
    let h = Harness::new(MockTransport::ok(json!(null)));
    let err = h.client.send::<Value>("upload", Method::Get, RequestData::Form(Form::new())).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
    assert!(h.transport.requests().is_empty());
}

// =============================================================================
// scenarios
// =============================================================================

#[tokio::test]
async fn listing_get_encodes_page_params_as_query() {
    let h = Harness::new(MockTransport::ok(json!({ "rows": [] }))).signed_in("tok");
    h.client
        .request_with::<Value, _>("patient/home/knowledge", Method::Get, &json!({ "page": 1, "pageSize": 10 }))
        .await
        .unwrap();
    let req = h.transport.last_request().unwrap();
    assert_eq!(req.url.query(), Some("page=1&pageSize=10"));
    assert_eq!(req.body, request::Body::Empty);
}

#[tokio::test]
async fn order_post_sends_json_body_with_auth() {
    let h = Harness::new(MockTransport::ok(json!({ "id": "o9" }))).signed_in("tok");
    let order = json!({ "type": 2, "illnessDesc": "头痛", "patientId": "p1" });
    h.client.request_with::<Value, _>("patient/consult/order", Method::Post, &order).await.unwrap();
    let req = h.transport.last_request().unwrap();
    assert_eq!(req.body, request::Body::Json(order));
    assert_eq!(req.url.query(), None);
    assert_eq!(req.header("Authorization"), Some("Bearer tok"));
}

#[tokio::test]
async fn unauthorized_with_real_router_lands_on_login() {
    let session = Arc::new(SessionStore::in_memory());
    session.set(patient_session("stale"));
    let router = Arc::new(Router::new(Arc::clone(&session)));
    router.navigate(Location::new("/user"));

    let transport = Arc::new(MockTransport::status(401, ""));
    let client = HttpClient::new(
        Url::parse("https://consult-api.itheima.net/").unwrap(),
        transport,
        Arc::clone(&session),
        Arc::clone(&router) as Arc<dyn Navigator>,
        Arc::new(LogNotifier),
    );
    client.request::<Value>("patient/myUser", Method::Get).await.unwrap_err();

    assert_eq!(router.current(), crate::router::login_redirect("/user"));
    assert_eq!(router.title(), "优医问诊-登录");
}
