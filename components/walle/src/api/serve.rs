// Local crates
use crate::api::cors::CorsPolicy;
use crate::api::migrations::{self, MigrateError};
use crate::api::settings::{self, SettingsError};
use crate::app::app::App;
use crate::helpers::shutdown::Shutdown;

// External crates
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderValue, ORIGIN, VARY,
};
use hyper::http::{Method, Request, Response, StatusCode};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HyperServerBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use serde::Serialize;
use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, warn};

/// How long in-flight requests may keep running after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// ServeConfig is the configuration consumed by [`serve`].
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// TCP address the HTTP server listens on (eg. `127.0.0.1:80`).
    pub http_addr: String,

    /// Optional TCP address for the HTTPS server (eg. `127.0.0.1:443`).
    pub https_addr: Option<String>,

    /// Optional domains list to use when issuing the TLS certificate.
    ///
    /// For convenience, each non-www domain also gets a `www.` entry and
    /// redirect.
    pub certificate_domains: Vec<String>,

    /// Optional list of CORS origins (defaults to `*`).
    pub allowed_origins: Vec<String>,
}

/// Errors raised while launching or running the web server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid listen address {addr}: {source}")]
    Addr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error(transparent)]
    Migrate(#[from] MigrateError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Handle to a running web server.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    // Keeps the shutdown channel's sender side alive for as long as the
    // server runs; otherwise a caller dropping its own handle would close
    // the channel and read as an immediate shutdown.
    _shutdown: Shutdown,
}

impl ServerHandle {
    /// Returns the address the HTTP listener is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Requests a graceful stop, equivalent to a termination signal.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Waits for the server to finish draining and shut down.
    pub async fn wait(self) -> Result<(), ServeError> {
        self.task.await.map_err(ServeError::from)
    }
}

/// Starts the web server for the given application context.
///
/// Before the listener accepts traffic the pending migrations run and the
/// persisted settings are reloaded; a failure in either aborts the launch.
/// Binding errors are fatal. The returned handle stops the server either via
/// [`ServerHandle::stop`] or through the supplied shutdown channel.
pub async fn serve(
    app: &dyn App,
    mut config: ServeConfig,
    shutdown: Shutdown,
) -> Result<ServerHandle, ServeError> {
    if config.allowed_origins.is_empty() {
        config.allowed_origins = vec!["*".to_string()];
    }

    migrations::run_pending(app).await?;
    let settings = settings::reload(app).await?;

    if let Some(https_addr) = config.https_addr.as_deref() {
        let domains = expand_certificate_domains(&config.certificate_domains);
        warn!(
            addr = %https_addr,
            domains = ?domains,
            "TLS certificate provisioning is not implemented yet; the HTTPS listener stays offline"
        );
    }

    let addr: SocketAddr = config.http_addr.parse().map_err(|source| ServeError::Addr {
        addr: config.http_addr.clone(),
        source,
    })?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.http_addr.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| ServeError::Bind {
        addr: config.http_addr.clone(),
        source,
    })?;

    info!(
        app_name = %settings.app_name,
        addr = %local_addr,
        dev = app.is_dev(),
        origins = ?config.allowed_origins,
        "HTTP server listening"
    );

    let cancel = CancellationToken::new();

    // Bridge the process-wide shutdown broadcast onto this server's token.
    let mut shutdown_rx = shutdown.subscribe();
    let bridge = cancel.clone();
    tokio::spawn(async move {
        let _ = shutdown_rx.recv().await;
        bridge.cancel();
    });

    let cors = Arc::new(CorsPolicy::new(config.allowed_origins.clone()));
    let task = tokio::spawn(
        accept_loop(listener, cancel.clone(), cors).instrument(app.logger().clone()),
    );

    Ok(ServerHandle {
        addr: local_addr,
        cancel,
        task,
        _shutdown: shutdown,
    })
}

/// Accepts connections until cancelled, then drains in-flight requests up to
/// the grace period before dropping whatever is left.
async fn accept_loop(listener: TcpListener, cancel: CancellationToken, cors: Arc<CorsPolicy>) {
    let server = HyperServerBuilder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let io = TokioIo::new(stream);
                        let cors = Arc::clone(&cors);
                        let service = service_fn(move |req: Request<Incoming>| {
                            let cors = Arc::clone(&cors);
                            async move { handle_request(req, cors).await }
                        });

                        let conn = graceful.watch(server.serve_connection(io, service).into_owned());
                        tokio::spawn(async move {
                            if let Err(err) = conn.await {
                                error!(error = %err, peer = %peer, "connection error");
                            }
                        });
                    }
                    Err(err) => error!(error = %err, "failed to accept connection"),
                }
            }
        }
    }

    drop(listener);
    if tokio::time::timeout(SHUTDOWN_GRACE, graceful.shutdown())
        .await
        .is_err()
    {
        warn!(grace = ?SHUTDOWN_GRACE, "grace period expired, closing remaining connections");
    }

    info!("HTTP server stopped");
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    code: u16,
    message: &'a str,
}

async fn handle_request(
    req: Request<Incoming>,
    cors: Arc<CorsPolicy>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let request_origin = req
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut response = match (req.method(), req.uri().path()) {
        (&Method::OPTIONS, _) => preflight_response(),
        (&Method::GET, "/api/health") => json_response(
            StatusCode::OK,
            &ApiMessage {
                code: 200,
                message: "API is healthy.",
            },
        ),
        _ => json_response(
            StatusCode::NOT_FOUND,
            &ApiMessage {
                code: 404,
                message: "The requested resource wasn't found.",
            },
        ),
    };

    if let Some(allow) = cors.allow_origin(request_origin.as_deref()) {
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response
                .headers_mut()
                .insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            response
                .headers_mut()
                .insert(VARY, HeaderValue::from_static("Origin"));
        }
    }

    Ok(response)
}

fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response.headers_mut().insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS"),
    );
    response.headers_mut().insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Authorization, Content-Type"),
    );
    response
}

fn json_response(status: StatusCode, body: &impl Serialize) -> Response<Full<Bytes>> {
    let payload = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(payload)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Expands the certificate domain list with a `www.` variant for each
/// non-www domain, preserving order and skipping duplicates.
pub fn expand_certificate_domains(domains: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::with_capacity(domains.len() * 2);

    for domain in domains {
        if !expanded.contains(domain) {
            expanded.push(domain.clone());
        }

        if !domain.starts_with("www.") {
            let www = format!("www.{domain}");
            if !expanded.contains(&www) && !domains.contains(&www) {
                expanded.push(www);
            }
        }
    }

    expanded
}
