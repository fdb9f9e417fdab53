//! The HTTP server the mocks run on.
//!
//! A small tokio listener with an ordered, immutable route table. Matching is
//! exact on method and path and the first matching route wins; anything else
//! gets a `404 Not Found`.

mod response;
mod config;
mod error;
mod handler;
mod http_server;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{HandlerFn, HandlerFuture, Route, RoutePath, Router};
pub use http_server::{HttpServer, ServerHandle};
