//! Mock rule definitions.

use crate::mock::payload::Payload;
use crate::parser::Method;
use crate::server::StatusCode;

/// One canned response: requests matching `method` and `path` get `status`
/// and `payload`.
///
/// An empty `path` matches every path for `method`.
#[derive(Debug, Clone)]
pub struct MockRule {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub payload: Payload,
}

impl MockRule {
    /// # Panics
    ///
    /// Panics if `status` is outside `100..=999`.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        status: impl Into<StatusCode>,
        payload: impl Into<Payload>,
    ) -> Self {
        let status = status.into();
        assert_valid_status(status);
        Self {
            method,
            path: path.into(),
            status,
            payload: payload.into(),
        }
    }

    /// Whether this rule answers on every path.
    pub fn is_catch_all(&self) -> bool {
        self.path.is_empty()
    }
}

pub(crate) fn assert_valid_status(status: StatusCode) {
    assert!(status.is_valid(), "invalid status code {status}, expected 100..=999");
}
