//! A programmable HTTP mock server for integration tests.
//!
//! Describe the responses an HTTP client should see as a list of rules
//! (method, path, status, payload), start the server, point the client at
//! [`MockServer::url`] and stop the server when the test is done.
//!
//! # Features
//!
//! - Exact method + path matching, first registered rule wins
//! - Structured payloads encoded as JSON or XML, fixed per server
//! - Raw byte payloads sent verbatim
//! - Optional permissive CORS headers and automatic `OPTIONS` preflight answers
//! - Ephemeral loopback port, released on [`MockServer::stop`] or drop
//!
//! # Examples
//!
//! ```
//! use apimock_rs::{Method, MockServer, Payload};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! #[serde(rename = "user")]
//! struct User {
//!     name: String,
//! }
//!
//! # async fn run() -> Result<(), apimock_rs::MockError> {
//! let mut server = MockServer::new(true, "json");
//! server.add(Method::GET, "/hello", 200, "world");
//! server.add(Method::POST, "/users", 201, Payload::structured(User { name: "ada".into() }));
//!
//! server.start().await?;
//! let base = server.url().unwrap_or_default().to_string();
//! // GET {base}/hello answers 200 with the body "world" plus a newline
//! # let _ = base;
//! server.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Choosing the format without panicking
//!
//! [`MockServer::new`] panics on anything but `"json"` or `"xml"`. Parse the
//! format first to handle that case:
//!
//! ```
//! use apimock_rs::{Format, MockError, MockServer};
//!
//! match "yaml".parse::<Format>() {
//!     Ok(format) => drop(MockServer::with_format(false, format)),
//!     Err(MockError::InvalidFormat(name)) => println!("unsupported format: {name}"),
//!     Err(err) => println!("other error: {err}"),
//! }
//! ```

pub mod parser;

pub mod server;

pub mod mock;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{Error as ServerError, HttpResponse, HttpServer, ServerConfig, StatusCode};
pub use mock::{Error as MockError, ErrorMessage, Format, MockRule, MockServer, Payload};
