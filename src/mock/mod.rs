//! Declarative mock rules and the server that serves them.
//!
//! Rules are collected on a [`MockServer`]; [`MockServer::start`] compiles a
//! snapshot of them into a [`Router`](crate::server::Router) and binds it to
//! a loopback port.

mod cors;
mod dispatch;
mod error;
mod format;
mod message;
mod payload;
mod rule;
mod server;

pub use cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN};
pub use dispatch::compile;
pub use error::Error;
pub use format::Format;
pub use message::ErrorMessage;
pub use payload::{EncodeError, Payload};
pub use rule::MockRule;
pub use server::MockServer;
