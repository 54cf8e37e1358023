//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex, RwLock, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::signal;
use log::{debug, error, info, warn};

use crate::parser::{HttpRequest, Method, parse_request, request_complete};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{Route, RoutePattern};
use crate::server::response::{HttpResponse, StatusCode};

/// How long shutdown waits for in-flight connections.
const SHUTDOWN_TIMEOUT: tokio::time::Duration = tokio::time::Duration::from_secs(30);

/// An HTTP server.
///
/// Routes are registered with [`HttpServer::add_route`]; the server then runs
/// with [`HttpServer::start`] (or [`HttpServer::bind`] + [`HttpServer::serve`])
/// until [`HttpServer::stop`] is called or the process receives Ctrl+C.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The routes.
    pub routes: Arc<RwLock<Vec<Route>>>,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: Mutex<Option<mpsc::Receiver<()>>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            config,
            routes: Arc::new(RwLock::new(Vec::new())),
            shutdown_tx,
            shutdown_rx: Mutex::new(Some(shutdown_rx)),
        }
    }

    /// Add a route to the server.
    ///
    /// `pattern` may contain `{name}` segments; their values are available to
    /// the handler through [`HttpRequest::path_param`].
    pub async fn add_route<F, Fut>(&self, pattern: impl Into<String>, methods: Vec<Method>, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let handler = Arc::new(move |req: HttpRequest| -> Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>> {
            Box::pin(handler(req))
        });

        let route = Route {
            pattern: RoutePattern::parse(pattern),
            methods,
            handler,
        };

        self.routes.write().await.push(route);
    }

    /// Display the server banner and registered endpoints.
    async fn display_server_info(&self) {
        let banner = include_str!("../banner.txt");
        info!("\n{banner}");

        let routes = self.routes.read().await;
        info!("Registered endpoints:");
        for route in routes.iter() {
            let methods = route.methods.iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            info!("  {methods} {}", route.pattern.as_str());
        }
    }

    /// Bind the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoError`] if the address cannot be bound.
    pub async fn bind(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = listener.local_addr()?);
        Ok(listener)
    }

    /// Ask a running server to stop accepting connections.
    ///
    /// Calling this before the server starts makes the next run return as
    /// soon as it begins.
    pub fn stop(&self) {
        if self.shutdown_tx.try_send(()).is_err() {
            debug!("Shutdown already requested");
        }
    }

    /// Forward Ctrl+C to the shutdown channel.
    fn spawn_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        })
    }

    /// Handle a new connection.
    fn handle_new_connection(
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        routes: &Arc<RwLock<Vec<Route>>>,
        config: &ServerConfig,
        tasks: &mut JoinSet<()>,
    ) {
        let config = config.clone();

        let Ok(permit) = semaphore.clone().try_acquire_owned() else {
            warn!("Connection limit reached, rejecting connection from {addr}");
            tasks.spawn(async move {
                // Consume the request so closing the socket does not reset it.
                let _ = Self::read_request(&mut socket, &config).await;

                let response = HttpResponse::new(StatusCode::ServiceUnavailable)
                    .with_content_type("text/plain")
                    .with_body_string("Server is at capacity, please try again later");
                let _ = socket.write_all(&response.to_bytes()).await;
                let _ = socket.shutdown().await;
            });
            return;
        };

        let routes = routes.clone();
        tasks.spawn(async move {
            // Released when the connection is done.
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, routes, &config).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Handle accept errors. Returns true when the accept loop should stop.
    async fn handle_accept_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Wait for in-flight connections, up to [`SHUTDOWN_TIMEOUT`].
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
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

    /// Bind the configured address and serve until stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server is
    /// already running.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info().await;
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Accept connections on `listener` until stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalError`] if the server is already serving.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        let mut shutdown_rx = self
            .shutdown_rx
            .lock()
            .await
            .take()
            .ok_or_else(|| Error::InternalError("server is already running".to_string()))?;

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();
        let ctrl_c = Self::spawn_ctrl_c_handler(self.shutdown_tx.clone());

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            debug!("Connection from {addr}");
                            Self::handle_new_connection(
                                socket,
                                addr,
                                &semaphore,
                                &self.routes,
                                &self.config,
                                &mut tasks,
                            );
                        }
                        Err(e) => {
                            if Self::handle_accept_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        ctrl_c.abort();
        drop(listener);
        Self::perform_shutdown(&mut tasks).await;

        *self.shutdown_rx.lock().await = Some(shutdown_rx);
        Ok(())
    }

    /// Read raw request bytes until the request is complete or the peer
    /// closes its side.
    ///
    /// The whole read is bounded by `config.read_timeout`, so a client that
    /// stops sending cannot hold its connection slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] past `config.read_buffer_size` bytes,
    /// [`Error::RequestTimeout`] when the deadline passes, and
    /// [`Error::IoError`] if reading fails.
    pub async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        config: &ServerConfig,
    ) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        let read = tokio::time::timeout(
            config.read_timeout,
            Self::read_until_complete(socket, &mut buf, config.read_buffer_size),
        )
        .await;

        match read {
            Ok(Ok(())) => Ok(buf),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::RequestTimeout(config.read_timeout)),
        }
    }

    async fn read_until_complete(
        socket: &mut (impl AsyncRead + Unpin),
        buf: &mut Vec<u8>,
        limit: usize,
    ) -> Result<(), Error> {
        let mut chunk = vec![0; limit.max(1)];

        loop {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }

            buf.extend_from_slice(&chunk[..n]);
            if buf.len() > limit {
                return Err(Error::PayloadTooLarge(limit));
            }

            if request_complete(buf) {
                return Ok(());
            }
        }
    }

    /// Read one request from `socket`, dispatch it and write the response.
    ///
    /// Client mistakes, including oversized or stalled requests, are answered
    /// with an error status and are not errors of this function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoError`] if reading or writing the socket fails.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        routes: Arc<RwLock<Vec<Route>>>,
        config: &ServerConfig,
    ) -> Result<(), Error> {
        let response = match Self::read_request(socket, config).await {
            Ok(buf) if buf.is_empty() => return Ok(()), // Connection closed
            Ok(buf) => match parse_request(&buf) {
                Ok(request) => Self::dispatch(&routes, request).await,
                Err(e) => {
                    let err = Error::ParseError(e);
                    warn!("Rejecting request: {err}");
                    err.to_response()
                }
            },
            Err(Error::IoError(e)) => return Err(Error::IoError(e)),
            Err(err) => {
                warn!("Rejecting request: {err}");
                err.to_response()
            }
        };

        socket.write_all(&response.to_bytes()).await?;
        socket.flush().await?;
        socket.shutdown().await?;
        Ok(())
    }

    /// Route a parsed request to its handler and produce the response.
    ///
    /// No matching pattern gives 404, a matching pattern without the method
    /// gives 405, and handler errors are rendered by [`Error::to_response`].
    pub async fn dispatch(routes: &RwLock<Vec<Route>>, mut request: HttpRequest) -> HttpResponse {
        let method = request.method;
        let path = request.path.clone();

        let matched = {
            let routes = routes.read().await;
            let mut allowed = Vec::new();
            let mut matched = None;

            for route in routes.iter() {
                let Some(params) = route.pattern.matches(&path) else {
                    continue;
                };
                if route.methods.contains(&method) {
                    matched = Some((route.handler.clone(), params));
                    break;
                }
                allowed.extend(route.methods.iter().copied());
            }

            matched.ok_or_else(|| {
                if allowed.is_empty() {
                    Error::NotFound(path.clone())
                } else {
                    Error::MethodNotAllowed { method, path: path.clone(), allowed }
                }
            })
        };

        let result = match matched {
            Ok((handler, params)) => {
                request.path_params = params;
                handler(request).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                info!("{method} {path} {status}", status = response.status.as_u16());
                response
            }
            Err(e) => {
                let response = e.to_response();
                if response.status == StatusCode::InternalServerError {
                    error!("{method} {path} {status}: {e}", status = response.status.as_u16());
                } else {
                    warn!("{method} {path} {status}: {e}", status = response.status.as_u16());
                }
                response
            }
        }
    }
}
