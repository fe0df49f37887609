//! End-to-end checks of the serve launcher: bind, answer traffic, drain on
//! shutdown, and fail fast when the address is taken.

use walle::api::serve::{ServeConfig, ServeError, serve};
use walle::app::base::{BaseApp, BaseAppConfig};
use walle::helpers::shutdown::Shutdown;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn test_app(root: &tempfile::TempDir) -> BaseApp {
    BaseApp::new(BaseAppConfig {
        data_dir: root.path().join("data"),
        is_dev: true,
    })
}

fn test_config(addr: &str) -> ServeConfig {
    ServeConfig {
        http_addr: addr.to_string(),
        https_addr: None,
        certificate_domains: Vec::new(),
        allowed_origins: Vec::new(),
    }
}

async fn request(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let payload = format!(
        "GET {path} HTTP/1.1\r\nHost: localhost\r\nOrigin: https://client.test\r\nConnection: close\r\n\r\n"
    );
    stream
        .write_all(payload.as_bytes())
        .await
        .expect("send request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");
    String::from_utf8_lossy(&raw).into_owned()
}

#[tokio::test]
async fn serves_health_and_drains_on_shutdown() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = test_app(&root);
    let shutdown = Shutdown::new();

    let handle = serve(&app, test_config("127.0.0.1:0"), shutdown.clone())
        .await
        .expect("serve should bind an ephemeral port");
    let addr = handle.addr();
    assert_ne!(addr.port(), 0);

    // Empty origins list normalizes to the wildcard policy.
    let response = request(addr, "/api/health").await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert!(response.to_lowercase().contains("content-type: application/json"));
    assert!(response.to_lowercase().contains("access-control-allow-origin: *"));
    assert!(response.contains("API is healthy."));

    let missing = request(addr, "/definitely/not/here").await;
    assert!(missing.starts_with("HTTP/1.1 404"), "got: {missing}");

    // The migration step runs before traffic is accepted.
    assert!(root.path().join("data").is_dir());

    shutdown.trigger();
    handle.wait().await.expect("clean shutdown");
}

#[tokio::test]
async fn stop_is_equivalent_to_a_termination_signal() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = test_app(&root);

    let handle = serve(&app, test_config("127.0.0.1:0"), Shutdown::new())
        .await
        .expect("serve should bind");

    handle.stop();
    handle.wait().await.expect("clean shutdown");
}

#[tokio::test]
async fn bind_conflict_is_fatal() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = test_app(&root);

    let blocker = TcpListener::bind("127.0.0.1:0").await.expect("blocker bind");
    let taken = blocker.local_addr().expect("blocker addr");

    let err = serve(&app, test_config(&taken.to_string()), Shutdown::new())
        .await
        .expect_err("second bind should fail");
    assert!(matches!(err, ServeError::Bind { .. }), "got: {err}");
}

#[tokio::test]
async fn malformed_listen_address_is_rejected() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = test_app(&root);

    let err = serve(&app, test_config("not-an-address"), Shutdown::new())
        .await
        .expect_err("address should not parse");
    assert!(matches!(err, ServeError::Addr { .. }), "got: {err}");
}
