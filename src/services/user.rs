//! Login, profile and patient management endpoints.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use serde_json::json;

use super::discard;
use super::types::{CodeType, Patient, UserInfo};
use crate::error::ApiError;
use crate::http::{HttpClient, Method};
use crate::router::{LOGIN_PATH, Location, RETURN_URL_KEY};
use crate::session::Session;

/// Where to land after signing in when no `returnUrl` was given.
pub const DEFAULT_LANDING: &str = "/user";

/// Log in with mobile number and password.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn login_by_password(client: &HttpClient, mobile: &str, password: &str) -> Result<Session, ApiError> {
    client
        .request_with("login/password", Method::Post, &json!({ "mobile": mobile, "password": password }))
        .await
}

/// Ask the server to text a verification code.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn send_mobile_code(client: &HttpClient, mobile: &str, kind: CodeType) -> Result<(), ApiError> {
    discard(client.request_with("code", Method::Get, &json!({ "mobile": mobile, "type": kind })).await)
}

/// Log in with mobile number and SMS code.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn login_by_mobile(client: &HttpClient, mobile: &str, code: &str) -> Result<Session, ApiError> {
    client.request_with("/login", Method::Post, &json!({ "mobile": mobile, "code": code })).await
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_user_info(client: &HttpClient) -> Result<UserInfo, ApiError> {
    client.request("patient/myUser", Method::Get).await
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_patient_list(client: &HttpClient) -> Result<Vec<Patient>, ApiError> {
    client.request("patient/mylist", Method::Get).await
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn add_patient(client: &HttpClient, patient: &Patient) -> Result<(), ApiError> {
    discard(client.request_with("patient/add", Method::Post, patient).await)
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn edit_patient(client: &HttpClient, patient: &Patient) -> Result<(), ApiError> {
    discard(client.request_with("patient/update", Method::Put, patient).await)
}

/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn del_patient(client: &HttpClient, id: &str) -> Result<(), ApiError> {
    discard(client.request(&format!("/patient/del/{id}"), Method::Delete).await)
}

// =============================================================================
// SESSION LIFECYCLE
// =============================================================================

/// Where to go once signed in: the `returnUrl` carried by the login route,
/// or [`DEFAULT_LANDING`].
#[must_use]
pub fn landing_after_login(login_route: &Location) -> Location {
    login_route
        .query_value(RETURN_URL_KEY)
        .filter(|url| !url.is_empty())
        .map_or_else(|| Location::new(DEFAULT_LANDING), Location::parse)
}

/// Store a freshly issued session and move on to the landing route.
pub fn complete_login(client: &HttpClient, session: Session) -> Location {
    let login_route = Location::parse(&client.navigator().current_full_path());
    tracing::info!(user_id = %session.id, "signed in");
    client.session().set(session);
    let target = landing_after_login(&login_route);
    client.navigator().push(target.clone());
    target
}

/// Password login followed by [`complete_login`].
///
/// # Errors
///
/// Propagates any [`ApiError`] from the login call; the store is untouched
/// on failure.
pub async fn sign_in_with_password(client: &HttpClient, mobile: &str, password: &str) -> Result<Location, ApiError> {
    let session = login_by_password(client, mobile, password).await?;
    Ok(complete_login(client, session))
}

/// SMS-code login followed by [`complete_login`].
///
/// # Errors
///
/// Propagates any [`ApiError`] from the login call.
pub async fn sign_in_with_code(client: &HttpClient, mobile: &str, code: &str) -> Result<Location, ApiError> {
    let session = login_by_mobile(client, mobile, code).await?;
    Ok(complete_login(client, session))
}

/// Forget the session and return to the login route.
pub fn logout(client: &HttpClient) {
    client.session().clear();
    client.navigator().push(Location::new(LOGIN_PATH));
    tracing::info!("signed out");
}
