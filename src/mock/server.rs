//! The mock server: a rule registry plus the listener serving it.

use std::str::FromStr;

use log::{debug, info};

use crate::mock::dispatch;
use crate::mock::error::Error;
use crate::mock::format::Format;
use crate::mock::payload::Payload;
use crate::mock::rule::{self, MockRule};
use crate::parser::Method;
use crate::server::{HttpServer, ServerConfig, ServerHandle, StatusCode};

/// A programmable HTTP server answering with canned responses.
///
/// Rules are appended with [`add`](MockServer::add) or
/// [`add_rule`](MockServer::add_rule). [`start`](MockServer::start) compiles
/// the rules registered so far and binds a loopback port; rules added later
/// only take effect after a restart.
///
/// `start` and `stop` are meant to be called once each, from test setup and
/// teardown. Starting a running server replaces its listener. Dropping a
/// running server shuts its listener down.
#[derive(Debug)]
pub struct MockServer {
    cors_enabled: bool,
    format: Format,
    config: ServerConfig,
    rules: Vec<MockRule>,
    running: Option<ServerHandle>,
    url: Option<String>,
}

impl MockServer {
    /// Create a server that encodes structured payloads as `format`.
    ///
    /// # Panics
    ///
    /// Panics unless `format` is exactly `"json"` or `"xml"`. Use
    /// [`with_format`](MockServer::with_format) with a parsed [`Format`] to
    /// handle the error instead.
    pub fn new(cors_enabled: bool, format: &str) -> Self {
        match Format::from_str(format) {
            Ok(format) => Self::with_format(cors_enabled, format),
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a server with an already validated format.
    pub fn with_format(cors_enabled: bool, format: Format) -> Self {
        Self {
            cors_enabled,
            format,
            config: ServerConfig::default(),
            rules: Vec::new(),
            running: None,
            url: None,
        }
    }

    /// Replace the listener configuration used by the next [`start`](MockServer::start).
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cors_enabled(&self) -> bool {
        self.cors_enabled
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The registered rules, in registration order.
    pub fn rules(&self) -> &[MockRule] {
        &self.rules
    }

    /// Append a rule.
    ///
    /// # Panics
    ///
    /// Panics if the rule's status is outside `100..=999`.
    pub fn add_rule(&mut self, rule: MockRule) {
        rule::assert_valid_status(rule.status);
        self.rules.push(rule);
    }

    /// Append a rule built from its parts.
    ///
    /// ```
    /// use apimock_rs::{Method, MockServer, Payload};
    ///
    /// let mut server = MockServer::new(true, "json");
    /// server.add(Method::GET, "/hello", 200, "world");
    /// server.add(Method::GET, "/logo.png", 200, vec![0x89, b'P', b'N', b'G']);
    /// server.add(Method::POST, "/items", 201, Payload::structured(vec![1, 2, 3]));
    /// assert_eq!(server.rules().len(), 3);
    /// ```
    pub fn add(
        &mut self,
        method: Method,
        path: impl Into<String>,
        status: impl Into<StatusCode>,
        payload: impl Into<Payload>,
    ) {
        self.add_rule(MockRule::new(method, path, status, payload));
    }

    /// Bind the configured address and start serving the current rules.
    ///
    /// Must be called from within a tokio runtime. Bind failures are returned.
    pub async fn start(&mut self) -> Result<(), Error> {
        let router = dispatch::compile(&self.rules, self.cors_enabled, self.format);
        let handle = HttpServer::new(self.config.clone(), router).bind().await?;

        let url = format!("http://{addr}", addr = handle.addr());
        info!(
            "Mock server started at {url} ({count} rules, {format})",
            count = self.rules.len(),
            format = self.format,
        );

        self.url = Some(url);
        self.running = Some(handle);
        Ok(())
    }

    /// Stop serving and release the port.
    ///
    /// Waits for in-flight requests up to the configured shutdown timeout.
    /// Does nothing if the server is not running.
    pub async fn stop(&mut self) {
        self.url = None;
        match self.running.take() {
            Some(handle) => {
                handle.shutdown().await;
                info!("Mock server stopped");
            }
            None => debug!("Stop called on a mock server that is not running"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The base URL (`http://host:port`), while running.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The port parsed from [`url`](MockServer::url).
    pub fn port(&self) -> Option<u16> {
        self.url.as_deref().and_then(port_of)
    }

    /// The scheme parsed from [`url`](MockServer::url).
    pub fn protocol(&self) -> Option<&str> {
        self.url.as_deref().and_then(protocol_of)
    }
}

fn protocol_of(url: &str) -> Option<&str> {
    url.split_once("://").map(|(scheme, _)| scheme)
}

fn port_of(url: &str) -> Option<u16> {
    let authority = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = authority.split('/').next().unwrap_or(authority);
    let (_, port) = authority.rsplit_once(':')?;
    port.parse().ok()
}
