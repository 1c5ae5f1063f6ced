//! Articles, doctors, departments and consultation orders.

#[cfg(test)]
#[path = "consult_test.rs"]
mod consult_test;

use serde_json::json;

use super::discard;
use super::types::{
    ConsultOrderListParams, ConsultOrderPage, ConsultOrderPreData, ConsultOrderPreParams, ConsultType, CreatedOrder,
    DoctorPage, FollowType, IllnessType, Image, KnowledgePage, KnowledgeParams, OrderDetail, PageParams, PartialConsult,
    PayParams, PayUrl, PrescriptionPic, TopDep,
};
use crate::error::ApiError;
use crate::http::{Form, HttpClient, Method};

// =============================================================================
// HOME
// =============================================================================

/// Article feed for one tab.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_knowledge_page(client: &HttpClient, params: KnowledgeParams) -> Result<KnowledgePage, ApiError> {
    client.request_with("patient/home/knowledge", Method::Get, &params).await
}

/// Doctors recommended for following.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_doctor_page(client: &HttpClient, params: PageParams) -> Result<DoctorPage, ApiError> {
    client.request_with("home/page/doc", Method::Get, &params).await
}

/// Toggle the follow state of a doctor (or another followable target).
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn follow_doctor(client: &HttpClient, id: &str, kind: FollowType) -> Result<(), ApiError> {
    discard(client.request_with("/like", Method::Post, &json!({ "id": id, "type": kind })).await)
}

/// Department tree used when picking a specialty.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_all_dep(client: &HttpClient) -> Result<Vec<TopDep>, ApiError> {
    client.request("dep/all", Method::Get).await
}

/// Upload one illness picture.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn upload_image(
    client: &HttpClient,
    file_name: &str,
    mime: Option<&str>,
    bytes: Vec<u8>,
) -> Result<Image, ApiError> {
    let form = Form::new().file("file", file_name, mime.map(str::to_owned), bytes);
    client.upload("upload", form).await
}

// =============================================================================
// ORDERS
// =============================================================================

/// Price breakdown for a consultation before it is created.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_consult_order_pre(
    client: &HttpClient,
    kind: ConsultType,
    illness_type: IllnessType,
) -> Result<ConsultOrderPreData, ApiError> {
    let params = ConsultOrderPreParams { kind, illness_type };
    client.request_with("patient/consult/order/pre", Method::Get, &params).await
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn create_consult_order(client: &HttpClient, consult: &PartialConsult) -> Result<CreatedOrder, ApiError> {
    client.request_with("patient/consult/order", Method::Post, consult).await
}

/// Obtain the payment page for an order.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_consult_order_pay_url(client: &HttpClient, params: &PayParams) -> Result<PayUrl, ApiError> {
    client.request_with("patient/consult/pay", Method::Post, params).await
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_consult_order_list(
    client: &HttpClient,
    params: ConsultOrderListParams,
) -> Result<ConsultOrderPage, ApiError> {
    client.request_with("patient/consult/order/list", Method::Get, &params).await
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn cancel_order(client: &HttpClient, id: &str) -> Result<(), ApiError> {
    discard(client.request(&format!("patient/order/cancel/{id}"), Method::Put).await)
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn delete_order(client: &HttpClient, id: &str) -> Result<(), ApiError> {
    discard(client.request(&format!("patient/order/{id}"), Method::Delete).await)
}

/// Original prescription image.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_prescription_pic(client: &HttpClient, id: &str) -> Result<PrescriptionPic, ApiError> {
    client.request(&format!("patient/consult/prescription/{id}"), Method::Get).await
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_medical_order_detail(client: &HttpClient, id: &str) -> Result<OrderDetail, ApiError> {
    client.request(&format!("patient/medicine/order/detail/{id}"), Method::Get).await
}
