//! Display labels for coded consultation fields.

#[cfg(test)]
#[path = "labels_test.rs"]
mod labels_test;

use super::types::IllnessTime;

pub const ILLNESS_TIME_OPTIONS: [(IllnessTime, &str); 4] = [
    (IllnessTime::Week, "一周内"),
    (IllnessTime::Month, "一月内"),
    (IllnessTime::HalfYear, "半年内"),
    (IllnessTime::More, "大于半年"),
];

pub const CONSULT_FLAG_OPTIONS: [(u8, &str); 2] = [(1, "就诊过"), (0, "没就诊过")];

/// Label for how long the patient has been ill.
#[must_use]
pub fn illness_time_text(time: IllnessTime) -> Option<&'static str> {
    ILLNESS_TIME_OPTIONS.iter().find(|(t, _)| *t == time).map(|(_, label)| *label)
}

/// Label for the "seen a doctor about this before" flag.
#[must_use]
pub fn consult_flag_text(flag: u8) -> Option<&'static str> {
    CONSULT_FLAG_OPTIONS.iter().find(|(f, _)| *f == flag).map(|(_, label)| *label)
}
