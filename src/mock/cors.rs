//! CORS response headers.

use crate::server::HttpResponse;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";
pub const ALLOW_METHODS: &str = "GET, POST, DELETE, PUT, OPTIONS";

/// Add the permissive CORS headers to a response.
pub(crate) fn apply(response: HttpResponse) -> HttpResponse {
    response
        .with_header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .with_header("Access-Control-Allow-Headers", ALLOW_HEADERS)
        .with_header("Access-Control-Allow-Methods", ALLOW_METHODS)
}
