//! HTTP request parsing.
//!
//! Just enough HTTP/1.x to read what a test client sends to a mock: the
//! request line, headers and a `Content-Length` delimited body.

mod request;
mod method;
mod version;
mod error;
mod tests;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

pub use request::parse_request;
