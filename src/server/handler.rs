//! HTTP request handlers and routing.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::{HttpRequest, Method};
use crate::server::{HttpResponse, Error};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for a handler function that takes an HttpRequest and returns a HandlerFuture.
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// The path a route answers on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePath {
    /// Matches this path exactly, query string excluded.
    Exact(String),
    /// Matches every path.
    Any,
}

impl RoutePath {
    /// An empty path means "any path".
    pub fn from_pattern(pattern: &str) -> Self {
        if pattern.is_empty() {
            RoutePath::Any
        } else {
            RoutePath::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePath::Exact(expected) => expected == path,
            RoutePath::Any => true,
        }
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePath::Exact(path) => f.write_str(path),
            RoutePath::Any => f.write_str("*"),
        }
    }
}

/// Represents a route in the HTTP server.
#[derive(Clone)]
pub struct Route {
    /// The path to match.
    pub path: RoutePath,
    /// The HTTP methods to match.
    pub methods: Vec<Method>,
    /// The handler function.
    pub handler: HandlerFn,
}

impl Route {
    pub fn matches(&self, method: Method, path: &str) -> bool {
        self.methods.contains(&method) && self.path.matches(path)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// An ordered route table.
///
/// Routes are tried in insertion order and the first match wins, so a
/// duplicate registration never shadows an earlier one.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    pub fn route<F, Fut>(&mut self, path: RoutePath, methods: Vec<Method>, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let handler: HandlerFn = Arc::new(move |req: HttpRequest| -> HandlerFuture {
            Box::pin(handler(req))
        });

        self.routes.push(Route {
            path,
            methods,
            handler,
        });
    }

    /// Find the first route matching `method` and `path`.
    pub fn find(&self, method: Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(method, path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
