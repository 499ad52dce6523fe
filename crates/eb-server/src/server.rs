//! HTTP transport: a pool of worker threads sharing one `tiny_http` listener.

use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use eb_config::ServerConfig;
use tracing::{debug, error, info, warn};

use crate::echo::EchoRequest;
use crate::error::{EchoError, ServeError};
use crate::handler::{handle, AppState, EchoResponse};
use crate::logging::{event_names, generate_request_id};

const RECV_TIMEOUT: Duration = Duration::from_millis(250);

/// Handle to the running echo server.
pub struct EchoServer {
    server: Arc<tiny_http::Server>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<thread::JoinHandle<()>>,
    addr: SocketAddr,
}

impl EchoServer {
    /// Bind and start `config.workers` worker threads.
    pub fn start(config: &ServerConfig, state: AppState) -> Result<Self, ServeError> {
        let requested = config.socket_addr()?;

        let server = tiny_http::Server::http(requested).map_err(|e| ServeError::Bind {
            addr: requested.to_string(),
            message: e.to_string(),
        })?;
        let addr = server.server_addr().to_ip().unwrap_or(requested);
        let server = Arc::new(server);

        let shutdown = Arc::new(AtomicBool::new(false));
        let state = Arc::new(state);

        let mut workers = Vec::with_capacity(config.workers);
        for idx in 0..config.workers {
            let worker_server = Arc::clone(&server);
            let worker_shutdown = Arc::clone(&shutdown);
            let worker_state = Arc::clone(&state);
            let spawned = thread::Builder::new()
                .name(format!("echoback-worker-{}", idx))
                .spawn(move || serve_loop(&worker_server, &worker_state, &worker_shutdown));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    stop_workers(&server, &shutdown, &mut workers);
                    return Err(ServeError::Spawn(e));
                }
            }
        }

        info!(
            event = event_names::SERVER_STARTED,
            addr = %addr,
            workers = config.workers,
            policy_version = state.engine.policy_version(),
            "echo server started"
        );

        Ok(Self {
            server,
            shutdown,
            workers,
            addr,
        })
    }

    /// The bound address (resolves port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until every worker exits.
    pub fn join(mut self) {
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    /// Stop accepting requests and wait for in-flight ones.
    pub fn shutdown(mut self) {
        stop_workers(&self.server, &self.shutdown, &mut self.workers);
        info!(event = event_names::SERVER_STOPPED, addr = %self.addr, "echo server stopped");
    }
}

impl Drop for EchoServer {
    fn drop(&mut self) {
        stop_workers(&self.server, &self.shutdown, &mut self.workers);
    }
}

fn stop_workers(
    server: &tiny_http::Server,
    shutdown: &AtomicBool,
    workers: &mut Vec<thread::JoinHandle<()>>,
) {
    shutdown.store(true, Ordering::SeqCst);
    for _ in 0..workers.len() {
        server.unblock();
    }
    for worker in workers.drain(..) {
        let _ = worker.join();
    }
}

/// Worker loop: receive with a timeout so the shutdown flag is honored.
fn serve_loop(server: &tiny_http::Server, state: &AppState, shutdown: &AtomicBool) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let request = match server.recv_timeout(RECV_TIMEOUT) {
            Ok(Some(req)) => req,
            Ok(None) => continue,
            Err(e) => {
                if !shutdown.load(Ordering::SeqCst) {
                    error!(error = %e, "echo server accept error");
                }
                break;
            }
        };

        serve_one(request, state);
    }
}

fn serve_one(mut request: tiny_http::Request, state: &AppState) {
    let request_id = generate_request_id();

    let response = match read_request(&mut request, state.max_body_bytes) {
        Ok(echo_request) => handle(&echo_request, state, &request_id),
        Err(err) => {
            warn!(request_id = %request_id, error = %err, "failed to read request");
            EchoResponse::error(&err)
        }
    };

    debug!(request_id = %request_id, status = response.status, "responding");
    if let Err(e) = request.respond(to_tiny_response(response, &request_id)) {
        warn!(request_id = %request_id, error = %e, "failed to send response");
    }
}

/// Copy method, target, headers and (for PUT/POST) the body out of `request`.
fn read_request(
    request: &mut tiny_http::Request,
    max_body_bytes: u64,
) -> Result<EchoRequest, EchoError> {
    let mut echo = EchoRequest::new(request.method().as_str(), request.url());
    echo.headers = request
        .headers()
        .iter()
        .map(|h| (h.field.to_string(), h.value.to_string()))
        .collect();

    if echo.echoes_body() && has_body(request, &echo) {
        if let Some(len) = request.body_length() {
            if len as u64 > max_body_bytes {
                return Err(EchoError::BodyTooLarge {
                    limit: max_body_bytes,
                });
            }
        }

        let mut body = Vec::new();
        request
            .as_reader()
            .take(max_body_bytes + 1)
            .read_to_end(&mut body)
            .map_err(|_| EchoError::Internal)?;
        if body.len() as u64 > max_body_bytes {
            return Err(EchoError::BodyTooLarge {
                limit: max_body_bytes,
            });
        }
        echo.body = Some(body);
    }

    Ok(echo)
}

fn has_body(request: &tiny_http::Request, echo: &EchoRequest) -> bool {
    request.body_length().is_some() || echo.header("transfer-encoding").is_some()
}

fn to_tiny_response(
    response: EchoResponse,
    request_id: &str,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut out = tiny_http::Response::from_data(response.body)
        .with_status_code(tiny_http::StatusCode(response.status));

    let extra = [("X-Request-Id".to_string(), request_id.to_string())];
    for (name, value) in response.headers.iter().chain(extra.iter()) {
        match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => out.add_header(header),
            Err(()) => warn!(header = %name, "dropping invalid response header"),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use eb_redact::RedactionEngine;
    use std::net::TcpListener;

    fn ephemeral_config(workers: usize) -> ServerConfig {
        ServerConfig {
            port: 0,
            workers,
            ..ServerConfig::default()
        }
    }

    fn start(config: &ServerConfig) -> Result<EchoServer, ServeError> {
        EchoServer::start(config, AppState::new(config, RedactionEngine::default()))
    }

    #[test]
    fn test_start_resolves_ephemeral_port_and_shuts_down() {
        let server = start(&ephemeral_config(3)).unwrap();
        assert_ne!(server.addr().port(), 0);
        assert_eq!(server.workers.len(), 3);

        let shutdown = Arc::clone(&server.shutdown);
        server.shutdown();
        assert!(shutdown.load(Ordering::SeqCst));
    }

    #[test]
    fn test_drop_stops_workers() {
        let server = start(&ephemeral_config(2)).unwrap();
        let shutdown = Arc::clone(&server.shutdown);
        drop(server);
        assert!(shutdown.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stop_workers_unblocks_idle_loops() {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").unwrap());
        let shutdown = Arc::new(AtomicBool::new(false));
        let state = Arc::new(AppState::default());
        let mut workers: Vec<_> = (0..2)
            .map(|_| {
                let worker_server = Arc::clone(&server);
                let worker_shutdown = Arc::clone(&shutdown);
                let worker_state = Arc::clone(&state);
                thread::spawn(move || serve_loop(&worker_server, &worker_state, &worker_shutdown))
            })
            .collect();

        stop_workers(&server, &shutdown, &mut workers);
        assert!(workers.is_empty());
        assert!(shutdown.load(Ordering::SeqCst));
    }

    #[test]
    fn test_port_in_use_is_bind_error() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ServerConfig {
            port: taken.local_addr().unwrap().port(),
            ..ephemeral_config(1)
        };
        let err = start(&config).err().unwrap();
        assert!(matches!(err, ServeError::Bind { .. }), "got {:?}", err);
    }

    #[test]
    fn test_response_carries_request_id() {
        let response = EchoResponse::error(&EchoError::MissingHost);
        let out = to_tiny_response(response, "req-0123456789ab");
        assert_eq!(out.status_code().0, 400);
        assert!(out
            .headers()
            .iter()
            .any(|h| h.field.equiv("x-request-id") && h.value.as_str() == "req-0123456789ab"));
    }
}
