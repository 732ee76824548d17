//! Accept loop, interrupt wait and bounded drain, wired together
//!
//! Two tasks run once the server is bound:
//! - the accept loop, which serves each connection in its own tracked task
//! - the interrupt wait, which requests shutdown and fires the completion signal
//!
//! The caller of `BoundServer::run` blocks on the completion signal and
//! bails out early only if the accept loop dies on its own.

use super::health::build_router;
use super::lifecycle::{Lifecycle, LifecycleState};
use super::shutdown::{completion_signal, CompletionNotifier, InterruptSource, ShutdownReport};
use crate::config::ServerConfig;
use crate::error::{ServerError, ShutdownError};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tower_http::timeout::TimeoutLayer;
use tracing::{debug, error, info, warn};

/// Source of inbound connections for the accept loop
#[async_trait]
pub(crate) trait Acceptor: Send + 'static {
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    async fn next_connection(&mut self) -> io::Result<Self::Io>;
}

#[async_trait]
impl Acceptor for TcpListener {
    type Io = TcpStream;

    async fn next_connection(&mut self) -> io::Result<TcpStream> {
        let (stream, remote) = self.accept().await?;
        debug!(remote = %remote, "Accepted connection");
        Ok(stream)
    }
}

/// Health server that has not been bound yet
pub struct GracefulServer {
    config: ServerConfig,
    router: Router,
}

impl GracefulServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: build_router(),
        }
    }

    /// Replace the served routes (tests use this to add slow handlers)
    #[cfg(test)]
    pub(crate) fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Bind the listener on all interfaces at the configured port
    ///
    /// Logs the startup line once the socket is listening.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let lifecycle = Lifecycle::new();
        let port = self.config.port();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { port, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { port, source })?;

        lifecycle.advance(LifecycleState::Serving)?;
        info!("server run at :{}", local_addr.port());

        Ok(BoundServer {
            config: self.config,
            router: self.router,
            listener,
            local_addr,
            lifecycle,
        })
    }
}

/// Listening server waiting to be run
pub struct BoundServer {
    config: ServerConfig,
    router: Router,
    listener: TcpListener,
    local_addr: SocketAddr,
    lifecycle: Lifecycle,
}

impl BoundServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    #[cfg(test)]
    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Serve until `interrupt` fires and shutdown completes
    ///
    /// Returns the shutdown report carried by the completion signal. A drain
    /// that overruns the write timeout is reported, not returned as an error;
    /// only a failing accept loop or a lost shutdown task is fatal. Every
    /// connection task has finished by the time this returns.
    pub async fn run<I>(self, interrupt: I) -> Result<ShutdownReport, ServerError>
    where
        I: InterruptSource + 'static,
    {
        let Self {
            config,
            router,
            listener,
            lifecycle,
            ..
        } = self;
        serve(config, router, listener, lifecycle, interrupt).await
    }

    /// Like `run`, but take connections from `acceptor` instead of the bound listener
    #[cfg(test)]
    pub(crate) async fn run_on<A, I>(
        self,
        acceptor: A,
        interrupt: I,
    ) -> Result<ShutdownReport, ServerError>
    where
        A: Acceptor,
        I: InterruptSource + 'static,
    {
        let Self {
            config,
            router,
            lifecycle,
            ..
        } = self;
        serve(config, router, acceptor, lifecycle, interrupt).await
    }
}

/// Bind, then serve until shutdown completes
pub async fn start<I>(config: ServerConfig, interrupt: I) -> Result<ShutdownReport, ServerError>
where
    I: InterruptSource + 'static,
{
    GracefulServer::new(config).bind().await?.run(interrupt).await
}

async fn serve<A, I>(
    config: ServerConfig,
    router: Router,
    acceptor: A,
    lifecycle: Lifecycle,
    interrupt: I,
) -> Result<ShutdownReport, ServerError>
where
    A: Acceptor,
    I: InterruptSource + 'static,
{
    let write_timeout = config.write_timeout();
    let app = with_write_timeout(router, write_timeout);

    let (close_tx, close_rx) = oneshot::channel::<()>();
    let (drained_tx, drained_rx) = oneshot::channel();
    let (notifier, completion) = completion_signal();

    let mut accept_loop = tokio::spawn(accept_connections(
        acceptor,
        app,
        close_rx,
        drained_tx,
        write_timeout,
    ));

    let drain = Drain {
        close: close_tx,
        drained: drained_rx,
        deadline: write_timeout,
    };
    let shutdown_lifecycle = lifecycle.clone();
    let shutdown_task = tokio::spawn(async move {
        let mut interrupt = interrupt;
        interrupt.interrupted().await;
        request_shutdown(drain, &shutdown_lifecycle, notifier).await;
    });

    let completion = completion.wait();
    tokio::pin!(completion);
    let mut accept_finished = false;

    let report = loop {
        tokio::select! {
            report = &mut completion => break report,
            joined = &mut accept_loop, if !accept_finished => {
                let fatal = match joined {
                    // Listener closed by shutdown; completion follows.
                    Ok(Ok(())) => {
                        accept_finished = true;
                        continue;
                    }
                    Ok(Err(e)) => ServerError::Accept(e),
                    Err(e) => ServerError::Task(e),
                };
                shutdown_task.abort();
                let _ = shutdown_task.await;
                return Err(fatal);
            }
        }
    };

    let report = match report {
        Ok(report) => report,
        Err(lost) => {
            // Dropped close sender makes the accept loop drain on its own
            join_accept_loop(accept_loop, accept_finished).await?;
            return Err(match shutdown_task.await {
                Err(e) => ServerError::Task(e),
                Ok(()) => lost,
            });
        }
    };

    shutdown_task.await?;
    join_accept_loop(accept_loop, accept_finished).await?;

    info!("server exit");
    Ok(report)
}

fn with_write_timeout(router: Router, write_timeout: Duration) -> Router {
    router.layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        write_timeout,
    ))
}

/// Errors that only affect the connection being accepted
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

/// Accept and serve connections until `close` resolves, then drain
///
/// Each connection runs in a task of `connections`. On close the acceptor is
/// dropped, open connections are asked to finish, and whatever is still open
/// after `deadline` is aborted. All connection tasks are joined before the
/// drain outcome is sent.
async fn accept_connections<A: Acceptor>(
    mut acceptor: A,
    app: Router,
    mut close: oneshot::Receiver<()>,
    drained: oneshot::Sender<Result<(), ShutdownError>>,
    deadline: Duration,
) -> io::Result<()> {
    let mut builder = http1::Builder::new();
    builder.timer(TokioTimer::new());
    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut close => break,
            accepted = acceptor.next_connection() => {
                let io = match accepted {
                    Ok(io) => io,
                    Err(e) if is_connection_error(&e) => {
                        debug!(error = %e, "Connection dropped before serving");
                        continue;
                    }
                    Err(e) => {
                        connections.abort_all();
                        while connections.join_next().await.is_some() {}
                        return Err(e);
                    }
                };
                let service = TowerToHyperService::new(app.clone());
                let conn = graceful.watch(builder.serve_connection(TokioIo::new(io), service));
                connections.spawn(async move {
                    if let Err(e) = conn.await {
                        debug!(error = %e, "Connection closed with error");
                    }
                });
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(acceptor);
    debug!(open = connections.len(), "Listener closed, draining connections");

    let outcome = match tokio::time::timeout(deadline, graceful.shutdown()).await {
        Ok(()) => Ok(()),
        Err(_) => {
            connections.abort_all();
            Err(ShutdownError::DeadlineExceeded(deadline))
        }
    };
    while connections.join_next().await.is_some() {}

    let _ = drained.send(outcome);
    Ok(())
}

/// Handles for closing the listener and observing the drain
struct Drain {
    close: oneshot::Sender<()>,
    drained: oneshot::Receiver<Result<(), ShutdownError>>,
    deadline: Duration,
}

impl Drain {
    async fn run(self) -> Result<(), ShutdownError> {
        let _ = self.close.send(());

        match self.drained.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ShutdownError::AcceptLoopGone),
        }
    }
}

/// Close the listener, wait for the drain, then fire the completion signal
///
/// The signal fires whatever the drain outcome.
async fn request_shutdown(drain: Drain, lifecycle: &Lifecycle, notifier: CompletionNotifier) {
    if let Err(e) = lifecycle.advance(LifecycleState::ShuttingDown) {
        warn!(error = %e, "Shutdown requested outside of Serving");
    }
    info!(deadline = ?drain.deadline, "Initiating graceful shutdown");

    let drained = drain.run().await;
    if let Err(ref e) = drained {
        error!("HTTP server Shutdown: {}", e);
    }

    if let Err(e) = lifecycle.advance(LifecycleState::Stopped) {
        warn!(error = %e, "Unexpected lifecycle state after shutdown");
    }
    notifier.fire(ShutdownReport { drain: drained });
}

/// Wait for the accept loop once shutdown has completed
///
/// The loop joins its connection tasks before finishing, so this returns only
/// after every connection is closed.
async fn join_accept_loop(
    accept_loop: JoinHandle<io::Result<()>>,
    finished: bool,
) -> Result<(), ServerError> {
    if finished {
        return Ok(());
    }
    accept_loop.await?.map_err(ServerError::Accept)
}
