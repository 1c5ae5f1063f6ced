use super::*;
use serde_json::json;

fn base() -> Url {
    Url::parse("https://consult-api.itheima.net/").unwrap()
}

// =============================================================================
// prepare: placement
// =============================================================================

#[test]
fn get_places_params_in_query_string() {
    let data = RequestData::Json(json!({ "page": 1, "pageSize": 10 }));
    let req = prepare(&base(), "patient/home/knowledge", Method::Get, data).unwrap();
    assert_eq!(req.url.query(), Some("page=1&pageSize=10"));
    assert_eq!(req.url.path(), "/patient/home/knowledge");
    assert_eq!(req.body, Body::Empty);
}

#[test]
fn delete_places_params_in_query_string() {
    let data = RequestData::Json(json!({ "id": "42" }));
    let req = prepare(&base(), "patient/order", Method::Delete, data).unwrap();
    assert_eq!(req.url.query(), Some("id=42"));
    assert_eq!(req.body, Body::Empty);
}

#[test]
fn post_places_data_in_json_body() {
    let payload = json!({ "patientId": "p1", "type": 2 });
    let req = prepare(&base(), "patient/consult/order", Method::Post, RequestData::Json(payload.clone())).unwrap();
    assert_eq!(req.url.query(), None);
    assert_eq!(req.body, Body::Json(payload));
}

#[test]
fn put_places_data_in_json_body() {
    let payload = json!({ "id": "p1", "name": "张三" });
    let req = prepare(&base(), "patient/update", Method::Put, RequestData::Json(payload.clone())).unwrap();
    assert_eq!(req.body, Body::Json(payload));
}

#[test]
fn post_form_becomes_multipart_body() {
    let form = Form::new().file("file", "a.png", Some("image/png".into()), vec![1, 2, 3]);
    let req = prepare(&base(), "upload", Method::Post, RequestData::Form(form.clone())).unwrap();
    assert_eq!(req.body, Body::Multipart(form));
}

#[test]
fn get_rejects_multipart_form() {
    let err = prepare(&base(), "upload", Method::Get, RequestData::Form(Form::new())).unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}

#[test]
fn no_data_leaves_url_and_body_bare() {
    let req = prepare(&base(), "patient/myUser", Method::Get, RequestData::None).unwrap();
    assert_eq!(req.url.as_str(), "https://consult-api.itheima.net/patient/myUser");
    assert_eq!(req.body, Body::Empty);
}

#[test]
fn leading_slash_resolves_against_base_path() {
    let base = Url::parse("https://example.test/api/").unwrap();
    let req = prepare(&base, "/patient/del/7", Method::Delete, RequestData::None).unwrap();
    assert_eq!(req.url.as_str(), "https://example.test/api/patient/del/7");
}

// =============================================================================
// query flattening
// =============================================================================

#[test]
fn query_skips_nulls_and_stringifies_scalars() {
    let data = RequestData::Json(json!({ "a": null, "b": true, "c": "x y", "d": 2.5 }));
    let req = prepare(&base(), "q", Method::Get, data).unwrap();
    assert_eq!(req.url.query(), Some("b=true&c=x+y&d=2.5"));
}

#[test]
fn query_repeats_array_keys() {
    let data = RequestData::Json(json!({ "ids": ["1", "2"] }));
    let req = prepare(&base(), "q", Method::Get, data).unwrap();
    assert_eq!(req.url.query(), Some("ids%5B%5D=1&ids%5B%5D=2"));
}

#[test]
fn query_ignores_non_object_data() {
    let req = prepare(&base(), "q", Method::Get, RequestData::Json(json!([1, 2]))).unwrap();
    assert_eq!(req.url.query(), None);
}

#[test]
fn empty_object_adds_no_question_mark() {
    let req = prepare(&base(), "q", Method::Get, RequestData::Json(json!({}))).unwrap();
    assert!(!req.url.as_str().ends_with('?'));
}

// =============================================================================
// attach_auth
// =============================================================================

#[test]
fn attach_auth_adds_bearer_header() {
    let req = prepare(&base(), "patient/myUser", Method::Get, RequestData::None).unwrap();
    let req = attach_auth(req, Some("abc.def"));
    assert_eq!(req.header("authorization"), Some("Bearer abc.def"));
}

#[test]
fn attach_auth_without_token_adds_nothing() {
    let req = prepare(&base(), "patient/myUser", Method::Get, RequestData::None).unwrap();
    let req = attach_auth(req, None);
    assert_eq!(req.header(AUTHORIZATION), None);
}

#[test]
fn attach_auth_ignores_empty_token() {
    let req = prepare(&base(), "patient/myUser", Method::Get, RequestData::None).unwrap();
    let req = attach_auth(req, Some(""));
    assert!(req.headers.is_empty());
}

#[test]
fn attach_auth_leaves_body_untouched() {
    let payload = json!({ "mobile": "13230000001" });
    let req = prepare(&base(), "login", Method::Post, RequestData::Json(payload.clone())).unwrap();
    let req = attach_auth(req, Some("t"));
    assert_eq!(req.body, Body::Json(payload));
}

// =============================================================================
// misc
// =============================================================================

#[test]
fn method_placement_rules() {
    assert!(!Method::Get.carries_body());
    assert!(!Method::Delete.carries_body());
    assert!(Method::Post.carries_body());
    assert!(Method::Put.carries_body());
}

#[test]
fn request_data_json_serializes_struct() {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Page {
        current: u32,
        page_size: u32,
    }
    let data = RequestData::json(&Page { current: 1, page_size: 10 }).unwrap();
    assert_eq!(data, RequestData::Json(json!({ "current": 1, "pageSize": 10 })));
}

#[test]
fn malformed_upload_content_type_is_a_request_error() {
    let form = Form::new().file("file", "scan.png", Some("not a mime".into()), vec![1, 2]);
    let err = prepare(&base(), "upload", Method::Post, RequestData::Form(form)).unwrap_err();
    assert!(matches!(err, ApiError::Request(_)), "got {err:?}");
}

#[test]
fn upload_with_valid_content_type_is_multipart() {
    let form = Form::new().file("file", "scan.png", Some("image/png".into()), vec![1, 2]);
    let req = prepare(&base(), "upload", Method::Post, RequestData::Form(form.clone())).unwrap();
    assert_eq!(req.body, Body::Multipart(form));
}
