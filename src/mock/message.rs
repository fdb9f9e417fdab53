//! A ready-made error body for mocks of failing endpoints.

use serde::Serialize;

use crate::mock::payload::Payload;

/// An API error body: `{"code":404,"message":"not found"}` in JSON,
/// `<ErrorMessage><code>404</code><message>not found</message></ErrorMessage>`
/// in XML.
///
/// A zero `code` or empty `message` is left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename = "ErrorMessage")]
pub struct ErrorMessage {
    #[serde(skip_serializing_if = "is_zero")]
    pub code: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ErrorMessage {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ErrorMessage> for Payload {
    fn from(message: ErrorMessage) -> Self {
        Payload::structured(message)
    }
}

fn is_zero(code: &i64) -> bool {
    *code == 0
}
