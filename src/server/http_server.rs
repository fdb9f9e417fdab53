//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use log::{debug, error, info, warn};

use crate::parser::{Error as ParserError, HttpRequest, Method, parse_request};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::Router;
use crate::server::response::{HttpResponse, StatusCode};

/// An HTTP server serving a fixed route table.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The routes, frozen for the lifetime of the listener.
    pub router: Arc<Router>,
}

/// A running server.
///
/// Dropping the handle signals the accept loop to stop; [`ServerHandle::shutdown`]
/// additionally waits for it.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, close the listener and wait for in-flight connections.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Server task failed during shutdown: {e}");
            }
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and routes.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Log the registered endpoints.
    fn display_routes(&self) {
        for route in self.router.routes() {
            let methods = route.methods.iter()
                .map(|m| m.as_str())
                .collect::<Vec<&str>>()
                .join(", ");
            debug!("Registered endpoint: {methods} {path}", path = route.path);
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        Ok(listener)
    }

    /// Bind the listener and start serving in a background task.
    ///
    /// Bind failures are returned here; everything after that is logged.
    pub async fn bind(self) -> Result<ServerHandle, Error> {
        self.display_routes();

        let listener = self.setup_listener().await?;
        let addr = listener.local_addr()?;
        info!("Listening on http://{addr}");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.serve(listener, addr, shutdown_rx));

        Ok(ServerHandle {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    async fn serve(self, listener: TcpListener, addr: SocketAddr, mut shutdown_rx: oneshot::Receiver<()>) {
        // Create a semaphore to limit concurrent connections
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));

        // Tells connections still waiting for their request to give up
        let (drain_tx, drain_rx) = watch::channel(false);

        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                // Fires on an explicit signal and when the handle is dropped
                _ = &mut shutdown_rx => {
                    info!("Shutting down server on {addr}");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, peer)) => {
                            Self::handle_new_connection(
                                socket,
                                peer,
                                semaphore.clone(),
                                self.router.clone(),
                                self.config.clone(),
                                drain_rx.clone(),
                                &mut tasks,
                            ).await;
                        }
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }

                Some(res) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = res {
                        error!("Connection task failed: {e}");
                    }
                }
            }
        }

        // Refuse new connections before draining the old ones
        drop(listener);
        let _ = drain_tx.send(true);

        Self::perform_shutdown(&mut tasks, &self.config).await;
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        router: Arc<Router>,
        config: ServerConfig,
        mut drain_rx: watch::Receiver<bool>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE)
                    .with_content_type("text/plain")
                    .with_body_string("Server is at capacity, please try again later");
                let _ = Self::write_response(&mut socket, response, false).await;
                return;
            }
        };

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            // Only requests that already arrived are answered once shutdown starts
            let request = tokio::select! {
                request = Self::read_request(&mut socket, &config) => request,
                _ = drain_rx.changed() => {
                    debug!("Dropping idle connection from {addr} on shutdown");
                    return;
                }
            };

            match Self::answer(&mut socket, request, Some(addr), &router).await {
                Ok(()) => {}
                Err(Error::NotFound(method, path)) => debug!("No route for {method} {path} from {addr}"),
                Err(e) => error!("Error handling connection from {addr}: {e}"),
            }
        });
    }

    /// Handle connection errors.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors (e.g. out of file descriptors), back off before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>, config: &ServerConfig) {
        if !tasks.is_empty() {
            debug!("Waiting for {len} active connections to complete...", len = tasks.len());
        }
        let drained = tokio::time::timeout(config.shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        if drained.is_err() {
            warn!("Shutdown timed out, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }

        info!("Server shutdown complete");
    }

    /// Read bytes until they form a complete request.
    ///
    /// Returns `Ok(None)` when the peer closes without sending anything.
    async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        config: &ServerConfig,
    ) -> Result<Option<HttpRequest>, Error> {
        let mut buf = Vec::with_capacity(config.read_buffer_size);
        let mut chunk = vec![0; config.read_buffer_size];

        loop {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                if buf.is_empty() {
                    return Ok(None);
                }
                // Peer stopped sending mid-request
                return parse_request(&buf).map(Some).map_err(Error::from);
            }

            buf.extend_from_slice(&chunk[..n]);
            match parse_request(&buf) {
                Ok(request) => return Ok(Some(request)),
                Err(ParserError::Incomplete) if buf.len() < config.max_request_size => continue,
                Err(ParserError::Incomplete) => return Err(Error::RequestTooLarge(config.max_request_size)),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Write a response and close the connection.
    ///
    /// With `head_only` the body is left out, as for a `HEAD` request.
    async fn write_response(
        socket: &mut (impl AsyncWrite + Unpin),
        response: HttpResponse,
        head_only: bool,
    ) -> Result<(), Error> {
        let response = response.with_header("Connection", "close");
        let bytes = if head_only {
            response.to_head_bytes()
        } else {
            response.to_bytes()
        };
        socket.write_all(&bytes).await?;
        socket.flush().await?;
        let _ = socket.shutdown().await;
        Ok(())
    }

    /// Handle a single connection: one request, one response.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        peer: Option<SocketAddr>,
        router: &Router,
        config: &ServerConfig,
    ) -> Result<(), Error> {
        let request = Self::read_request(socket, config).await;
        Self::answer(socket, request, peer, router).await
    }

    /// Route a read request and write the reply, or the error reply for a
    /// request that could not be read.
    async fn answer(
        socket: &mut (impl AsyncWrite + Unpin),
        request: Result<Option<HttpRequest>, Error>,
        peer: Option<SocketAddr>,
        router: &Router,
    ) -> Result<(), Error> {
        let mut request = match request {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()), // Connection closed
            Err(Error::ParseError(e)) => {
                let response = HttpResponse::new(StatusCode::BAD_REQUEST)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                Self::write_response(socket, response, false).await?;
                return Err(Error::ParseError(e));
            }
            Err(Error::RequestTooLarge(limit)) => {
                let response = HttpResponse::new(StatusCode::PAYLOAD_TOO_LARGE)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Request exceeds {limit} bytes"));
                Self::write_response(socket, response, false).await?;
                return Err(Error::RequestTooLarge(limit));
            }
            Err(e) => return Err(e),
        };
        request.remote_addr = peer;
        let head_only = request.method == Method::HEAD;

        let route = match router.find(request.method, &request.path) {
            Some(route) => route,
            None => {
                let response = HttpResponse::new(StatusCode::NOT_FOUND)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Not found: {path}", path = request.path));
                Self::write_response(socket, response, head_only).await?;
                return Err(Error::NotFound(request.method, request.path));
            }
        };

        let response = match (route.handler)(request).await {
            Ok(response) => response,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Internal server error: {e}"));
                Self::write_response(socket, response, head_only).await?;
                return Err(e);
            }
        };

        Self::write_response(socket, response, head_only).await
    }
}
