use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    axum::{
        Router,
        body::Bytes,
        extract::State,
        http::StatusCode,
        response::{Html, IntoResponse, Response},
        routing::{get, post},
    },
    tokio::{net::TcpListener, sync::oneshot, task::JoinHandle},
    tracing::{debug, error, info, warn},
};

use crate::{Error, Result};

/// The token import form served at `GET /`.
pub const KIRO_IMPORT_PAGE: &str = include_str!("assets/kiro_import.html");

const RECEIVED_PAGE: &str = r#"<html>
<body style="font-family:system-ui;text-align:center;padding:50px;">
<h2>JSON received! You can close this window.</h2></body></html>"#;

const ALREADY_RECEIVED_PAGE: &str = r#"<html>
<body style="font-family:system-ui;text-align:center;padding:50px;">
<h2>A token was already submitted. You can close this window.</h2></body></html>"#;

/// Sender half of the capture. Whoever takes it first owns the submission.
type PayloadSlot = Arc<Mutex<Option<oneshot::Sender<Bytes>>>>;

/// Short-lived loopback server that serves the import form and captures
/// exactly one submitted payload.
pub struct ImportServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl ImportServer {
    /// Bind `127.0.0.1` on an OS-assigned port.
    ///
    /// The port is found with a throwaway listener that is released
    /// before the real one binds. Another process can grab the port in
    /// between; that surfaces as [`Error::Bind`].
    pub async fn bind() -> Result<Self> {
        let port = {
            let scout = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
                .map_err(|source| Error::Bind { source })?;
            scout
                .local_addr()
                .map_err(|source| Error::Bind { source })?
                .port()
        };
        Self::bind_on(port).await
    }

    /// Bind `127.0.0.1:{port}` once. A taken port is an [`Error::Bind`],
    /// never retried.
    pub async fn bind_on(port: u16) -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .map_err(|source| Error::Bind { source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| Error::Bind { source })?;
        debug!(%addr, "import server bound");
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL of the import form.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve until the first `POST /submit` or until `timeout` elapses.
    ///
    /// The listener is closed before this returns, whatever the outcome.
    pub async fn capture(self, timeout: Duration) -> Result<Bytes> {
        let (tx, rx) = oneshot::channel::<Bytes>();
        let slot: PayloadSlot = Arc::new(Mutex::new(Some(tx)));

        let mut server = ServerTask::spawn(self.listener, import_router(slot));
        info!(
            addr = %self.addr,
            timeout_secs = timeout.as_secs(),
            "waiting for token JSON"
        );

        let outcome = tokio::select! {
            payload = rx => payload.map_err(|_| {
                Error::message("import server stopped before a submission arrived")
            }),
            () = tokio::time::sleep(timeout) => {
                warn!(timeout_secs = timeout.as_secs(), "timeout waiting for JSON input");
                Err(Error::Timeout { after: timeout })
            }
        };

        server.shutdown().await;

        let payload = outcome?;
        if payload.is_empty() {
            return Err(Error::EmptyPayload);
        }
        Ok(payload)
    }
}

fn import_router(slot: PayloadSlot) -> Router {
    Router::new()
        .route("/", get(import_page))
        .route("/submit", post(submit))
        .with_state(slot)
}

async fn import_page() -> Html<&'static str> {
    Html(KIRO_IMPORT_PAGE)
}

async fn submit(State(slot): State<PayloadSlot>, body: Bytes) -> Response {
    let sender = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    let Some(tx) = sender else {
        warn!(bytes = body.len(), "ignoring submission after capture completed");
        return (StatusCode::CONFLICT, Html(ALREADY_RECEIVED_PAGE)).into_response();
    };

    let bytes = body.len();
    if tx.send(body).is_err() {
        // The caller already gave up (timeout); nothing left to deliver to.
        debug!(bytes, "submission arrived after the capture ended");
    } else {
        info!(bytes, "token JSON received");
    }
    Html(RECEIVED_PAGE).into_response()
}

/// Background task running the axum server. Aborted on shutdown or drop.
struct ServerTask {
    handle: Option<JoinHandle<()>>,
}

impl ServerTask {
    fn spawn(listener: TcpListener, app: Router) -> Self {
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "import server error");
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the server and wait until its listener is dropped. Safe to call
    /// more than once.
    async fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            debug!("import server closed");
        }
    }
}

impl Drop for ServerTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        axum::{body::Body, http::Request},
        tower::ServiceExt,
    };

    use super::*;

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: &'static str,
    ) -> (StatusCode, Bytes) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body))
            .unwrap();
        send(app, req).await
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn router() -> (Router, oneshot::Receiver<Bytes>) {
        let (tx, rx) = oneshot::channel();
        (import_router(Arc::new(Mutex::new(Some(tx)))), rx)
    }

    #[tokio::test]
    async fn form_is_identical_before_and_after_submission() {
        let (app, _rx) = router();
        let (status, before) = call(&app, "GET", "/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(before, KIRO_IMPORT_PAGE.as_bytes());

        let (status, _) = call(&app, "POST", "/submit", r#"{"accessToken":"x"}"#).await;
        assert_eq!(status, StatusCode::OK);

        let (_, again) = call(&app, "GET", "/", "").await;
        let (_, third) = call(&app, "GET", "/", "").await;
        assert_eq!(before, again);
        assert_eq!(again, third);
    }

    #[tokio::test]
    async fn second_submission_does_not_replace_the_first() {
        let (app, mut rx) = router();
        let (status, body) = call(&app, "POST", "/submit", "first").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8_lossy(&body).contains("JSON received"));

        let (status, body) = call(&app, "POST", "/submit", "second").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(String::from_utf8_lossy(&body).contains("already submitted"));

        assert_eq!(rx.try_recv().unwrap(), Bytes::from_static(b"first"));
    }

    #[tokio::test]
    async fn unreadable_body_is_rejected_without_completing() {
        let (app, mut rx) = router();
        let broken = futures::stream::iter([
            Ok::<_, std::io::Error>(Bytes::from_static(b"{\"access")),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "client went away",
            )),
        ]);
        let req = Request::builder()
            .method("POST")
            .uri("/submit")
            .body(Body::from_stream(broken))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err());

        let (status, _) = call(&app, "POST", "/submit", r#"{"accessToken":"x"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            rx.try_recv().unwrap(),
            Bytes::from_static(br#"{"accessToken":"x"}"#)
        );
    }

    #[tokio::test]
    async fn taken_port_is_a_bind_error() {
        let holder = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = holder.local_addr().unwrap().port();

        let err = ImportServer::bind_on(port).await.err().unwrap();
        assert!(matches!(err, Error::Bind { .. }));
        assert!(err.to_string().starts_with("failed to bind loopback listener"));
    }

    #[tokio::test]
    async fn wrong_method_and_unknown_route() {
        let (app, mut rx) = router();
        let (status, _) = call(&app, "GET", "/submit", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (status, _) = call(&app, "GET", "/callback", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn form_is_served_as_html() {
        let (app, _rx) = router();
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()["content-type"],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn capture_returns_posted_payload() {
        let server = ImportServer::bind().await.unwrap();
        assert!(server.local_addr().ip().is_loopback());
        let url = server.url();
        let capture = tokio::spawn(server.capture(Duration::from_secs(10)));

        let resp = reqwest::Client::new()
            .post(format!("{url}/submit"))
            .body(r#"{"accessToken":"x"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let payload = capture.await.unwrap().unwrap();
        assert_eq!(payload, Bytes::from_static(br#"{"accessToken":"x"}"#));
    }

    #[tokio::test]
    async fn empty_submission_is_reported() {
        let server = ImportServer::bind().await.unwrap();
        let url = server.url();
        let capture = tokio::spawn(server.capture(Duration::from_secs(10)));

        reqwest::Client::new()
            .post(format!("{url}/submit"))
            .send()
            .await
            .unwrap();

        let err = capture.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::EmptyPayload));
    }

    #[tokio::test]
    async fn concurrent_submissions_complete_once() {
        let server = ImportServer::bind().await.unwrap();
        let url = server.url();
        let capture = tokio::spawn(server.capture(Duration::from_secs(10)));

        let client = reqwest::Client::new();
        let posts: Vec<_> = (0..8)
            .map(|i| {
                let client = client.clone();
                let url = format!("{url}/submit");
                tokio::spawn(async move {
                    client.post(url).body(format!("payload-{i}")).send().await
                })
            })
            .collect();

        let mut accepted = 0;
        for post in posts {
            // Late requests may find the listener already gone.
            if let Ok(resp) = post.await.unwrap()
                && resp.status() == StatusCode::OK
            {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);

        let payload = capture.await.unwrap().unwrap();
        let text = String::from_utf8(payload.to_vec()).unwrap();
        assert!(text.starts_with("payload-"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_releases_listener() {
        let server = ImportServer::bind().await.unwrap();
        let addr = server.local_addr();

        let err = server
            .capture(Duration::from_secs(5 * 60))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { after } if after == Duration::from_secs(300)));

        // Port is free again once capture returns.
        std::net::TcpListener::bind(addr).unwrap();
    }

    #[tokio::test]
    async fn shutdown_twice_is_harmless() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let (app, _rx) = router();
        let mut task = ServerTask::spawn(listener, app);
        task.shutdown().await;
        task.shutdown().await;
        drop(task);
    }
}
