//! Calls paired with the local state change a screen applies on success.
//!
//! Each helper leaves its target untouched when the call fails, so a list
//! row never shows a state the server did not accept.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use super::consult;
use super::types::{ConsultOrderItem, Doctor, FollowType, Knowledge, OrderType};
use crate::error::ApiError;
use crate::http::HttpClient;

pub const CANCELLED_STATUS_TEXT: &str = "已取消";

/// Anything carrying a `likeFlag` the user can toggle.
pub trait Likeable {
    fn id(&self) -> &str;
    fn like_flag(&self) -> u8;
    fn set_like_flag(&mut self, flag: u8);
}

impl Likeable for Doctor {
    fn id(&self) -> &str {
        &self.id
    }

    fn like_flag(&self) -> u8 {
        self.like_flag
    }

    fn set_like_flag(&mut self, flag: u8) {
        self.like_flag = flag;
    }
}

impl Likeable for Knowledge {
    fn id(&self) -> &str {
        &self.id
    }

    fn like_flag(&self) -> u8 {
        self.like_flag
    }

    fn set_like_flag(&mut self, flag: u8) {
        self.like_flag = flag;
    }
}

/// Follow or unfollow `target`, flipping its flag once the server agrees.
///
/// # Errors
///
/// Propagates the [`ApiError`]; the flag is not changed.
pub async fn follow<T: Likeable>(client: &HttpClient, target: &mut T, kind: FollowType) -> Result<(), ApiError> {
    consult::follow_doctor(client, target.id(), kind).await?;
    target.set_like_flag(if target.like_flag() == 1 { 0 } else { 1 });
    Ok(())
}

/// Cancel an order and mark the row cancelled.
///
/// # Errors
///
/// Propagates the [`ApiError`] after notifying the user.
pub async fn cancel_consult_order(client: &HttpClient, item: &mut ConsultOrderItem) -> Result<(), ApiError> {
    match consult::cancel_order(client, &item.id).await {
        Ok(()) => {
            item.status = OrderType::ConsultCancel;
            CANCELLED_STATUS_TEXT.clone_into(&mut item.status_value);
            client.notifier().notify("取消成功");
            Ok(())
        }
        Err(error) => {
            client.notifier().notify("取消失败");
            Err(error)
        }
    }
}

/// Delete an order and drop it from `orders`.
///
/// # Errors
///
/// Propagates the [`ApiError`] after notifying the user; `orders` is kept.
pub async fn delete_consult_order(
    client: &HttpClient,
    orders: &mut Vec<ConsultOrderItem>,
    id: &str,
) -> Result<(), ApiError> {
    match consult::delete_order(client, id).await {
        Ok(()) => {
            orders.retain(|order| order.id != id);
            client.notifier().notify("删除成功");
            Ok(())
        }
        Err(error) => {
            client.notifier().notify("删除失败");
            Err(error)
        }
    }
}

/// URL of the original prescription, if the order has one.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn prescription_url(client: &HttpClient, prescription_id: Option<&str>) -> Result<Option<String>, ApiError> {
    match prescription_id {
        Some(id) => Ok(Some(consult::get_prescription_pic(client, id).await?.url)),
        None => Ok(None),
    }
}
