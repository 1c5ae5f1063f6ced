//! Wire types for the consult API. Field names follow the server's camelCase.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

use crate::envelope::null_as_default;

/// Integer-coded enum serialized as its discriminant.
macro_rules! numeric_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(raw: u8) -> Result<Self, Self::Error> {
                match raw {
                    $($value => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} value {other}", stringify!($name))),
                }
            }
        }
    };
}

// =============================================================================
// USER
// =============================================================================

/// Purpose of an SMS verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CodeType {
    Login,
    Register,
    ChangeMobile,
    ForgetPassword,
    BindMobile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderInfo {
    pub paid_number: u32,
    pub received_number: u32,
    pub shipped_number: u32,
    pub finished_number: u32,
}

/// Profile shown on the personal center page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub id: String,
    pub account: String,
    pub mobile: String,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar: String,
    pub like_number: u32,
    pub collection_number: u32,
    pub score: u32,
    pub coupon_number: u32,
    pub order_info: OrderInfo,
}

numeric_enum! {
    #[derive(Default)]
    pub enum Gender {
        Female = 0,
        #[default]
        Male = 1,
    }
}

/// A person the account holder books consultations for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub id_card: String,
    /// `1` marks the default patient.
    pub default_flag: u8,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

// =============================================================================
// PAGING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub current: u32,
    pub page_size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { current: 1, page_size: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub page_total: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
}

// =============================================================================
// KNOWLEDGE / DOCTORS
// =============================================================================

/// Article feed tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KnowledgeType {
    Like,
    #[default]
    Recommend,
    FatReduction,
    Food,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeParams {
    #[serde(rename = "type")]
    pub kind: KnowledgeType,
    #[serde(flatten)]
    pub page: PageParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Knowledge {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cover_url: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    pub collection_number: u32,
    pub comment_number: u32,
    pub creator_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creator_avatar: String,
    pub creator_hospatal_name: String,
    pub creator_dep: String,
    pub creator_titles: String,
    pub creator_id: String,
    pub like_flag: u8,
    pub content: String,
}

pub type KnowledgePage = Page<Knowledge>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar: String,
    pub hospital_name: String,
    pub grade_name: String,
    pub dep_name: String,
    pub positional_titles: String,
    pub like_flag: u8,
    pub service_price: f64,
    pub consultation_num: u32,
}

pub type DoctorPage = Page<Doctor>;

/// What a follow (like) targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FollowType {
    Topic,
    Knowledge,
    #[default]
    Doc,
    Disease,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubDep {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopDep {
    pub id: String,
    pub name: String,
    pub child: Vec<SubDep>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: String,
    pub url: String,
}

// =============================================================================
// CONSULT ORDERS
// =============================================================================

numeric_enum! {
    #[derive(Default)]
    pub enum ConsultType {
        Doctor = 1,
        #[default]
        Fast = 2,
        Medication = 3,
    }
}

numeric_enum! {
    /// Triage level for a fast consultation: `0` ordinary, `1` specialist.
    #[derive(Default)]
    pub enum IllnessType {
        #[default]
        Normal = 0,
        Special = 1,
    }
}

numeric_enum! {
    pub enum IllnessTime {
        Week = 1,
        Month = 2,
        HalfYear = 3,
        More = 4,
    }
}

numeric_enum! {
    pub enum OrderType {
        ConsultPay = 1,
        ConsultWait = 2,
        ConsultChat = 3,
        ConsultComplete = 4,
        ConsultCancel = 5,
        MedicinePay = 10,
        MedicineSend = 11,
        MedicineTake = 12,
        MedicineComplete = 13,
        MedicineCancel = 14,
    }
}

/// Consultation draft assembled across the booking screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConsult {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConsultType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illness_type: Option<IllnessType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dep_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illness_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illness_time: Option<IllnessTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consult_flag: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pictures: Vec<Image>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultOrderPreParams {
    #[serde(rename = "type")]
    pub kind: ConsultType,
    pub illness_type: IllnessType,
}

/// Price breakdown shown before payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultOrderPreData {
    pub point_deduction: f64,
    pub coupon_deduction: f64,
    pub coupon_id: String,
    pub payment: f64,
    pub actual_payment: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatedOrder {
    pub id: String,
}

numeric_enum! {
    pub enum PaymentMethod {
        WeChat = 0,
        Alipay = 1,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayParams {
    pub payment_method: PaymentMethod,
    pub order_id: String,
    pub pay_callback: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayUrl {
    pub pay_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultOrderListParams {
    #[serde(rename = "type")]
    pub kind: ConsultType,
    #[serde(flatten)]
    pub page: PageParams,
}

/// One row of the consultation order list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultOrderItem {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_no: String,
    #[serde(rename = "type")]
    pub kind: ConsultType,
    pub status: OrderType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub illness_desc: String,
    #[serde(default)]
    pub illness_time: Option<IllnessTime>,
    #[serde(default)]
    pub consult_flag: Option<u8>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pay_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub create_time: String,
    #[serde(default)]
    pub actual_payment: f64,
    #[serde(default)]
    pub prescription_id: Option<String>,
    #[serde(default)]
    pub doc_info: Option<Doctor>,
    #[serde(default)]
    pub patient_info: Option<Patient>,
}

pub type ConsultOrderPage = Page<ConsultOrderItem>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrescriptionPic {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Medical {
    pub id: String,
    pub name: String,
    pub amount: String,
    pub avatar: String,
    pub spec_value: String,
    pub used_dosage: String,
    pub quantity: String,
    pub prescription_flag: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub id: String,
    pub mobile: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub county: String,
    pub address_detail: String,
}

/// Medicine order detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: String,
    #[serde(default)]
    pub order_no: String,
    pub status: OrderType,
    #[serde(default)]
    pub status_value: String,
    #[serde(default)]
    pub medicines: Vec<Medical>,
    #[serde(default)]
    pub address_info: Option<Address>,
    #[serde(default)]
    pub create_time: String,
    #[serde(default)]
    pub pay_time: String,
    #[serde(default)]
    pub expressage: Option<serde_json::Value>,
    #[serde(default)]
    pub actual_payment: f64,
}
