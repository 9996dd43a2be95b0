//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the controller over
//! real HTTP with `ReqwestTransport`. Observers forward completions into a
//! channel so each test can wait for the notification rather than only the
//! returned `JoinHandle`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_controller_core::{
    ClientConfig, Completion, HttpController, HttpMethod, HttpObserver, InstallId,
    ReqwestTransport,
};
use mock_server::RecordedRequest;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn controller(base_url: &str) -> HttpController {
    let config = ClientConfig::new(base_url);
    let transport = Arc::new(ReqwestTransport::from_config(&config).unwrap());
    HttpController::new(config, transport, Handle::current())
        .with_device_identity(Arc::new(InstallId::new("INTEGRATION-DEVICE")))
}

fn channel_observer() -> (Arc<dyn HttpObserver>, mpsc::UnboundedReceiver<Completion>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let observer: Arc<dyn HttpObserver> = Arc::new(move |c: &Completion| {
        let _ = tx.send(c.clone());
    });
    (observer, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Completion>) -> Completion {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for notification")
        .expect("observer channel closed")
}

async fn recorded(addr: SocketAddr) -> Vec<RecordedRequest> {
    let client = ReqwestTransport::new().unwrap();
    let c = HttpController::new(ClientConfig::new(&format!("http://{addr}")), Arc::new(client), Handle::current());
    let completion = c.get(&(), "/requests", "inspect").await.unwrap();
    serde_json::from_str(completion.response.as_deref().unwrap()).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_ping_notifies_with_body() {
    let addr = start_server();
    let c = controller(&format!("http://{addr}"));
    let (observer, mut rx) = channel_observer();
    c.set_delegate(&observer);

    let handle = c.do_get(&(), "/ping", "id1").unwrap();
    let notified = next(&mut rx).await;
    let returned = handle.await.unwrap();

    assert_eq!(notified, returned);
    assert_eq!(notified.method, HttpMethod::Get);
    assert_eq!(notified.response.as_deref(), Some(r#"{"ok":true}"#));
    assert!(notified.error_message.is_none());
    assert_eq!(notified.identify, "id1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn post_echo_round_trips_body_and_headers() {
    let addr = start_server();
    let c = controller(&format!("http://{addr}"));
    let (observer, mut rx) = channel_observer();
    c.set_delegate(&observer);

    let params = serde_json::json!({ "phone": "0900000000", "otp": 1234 });
    c.do_post(&params, "/echo", "login").unwrap();
    let notified = next(&mut rx).await;

    let echoed: serde_json::Value = serde_json::from_str(notified.response.as_deref().unwrap()).unwrap();
    assert_eq!(echoed, params);
    assert_eq!(notified.identify, "login");

    let requests = recorded(addr).await;
    let post = &requests[0];
    assert_eq!(post.method, "POST");
    assert_eq!(post.path, "/echo");
    assert_eq!(post.header("device-id"), Some("INTEGRATION-DEVICE"));
    assert_eq!(post.header("package-name"), Some("vn.giaohanggiare.customer"));
    assert_eq!(post.header("app-type"), Some("user"));
    assert_eq!(post.header("content-type"), Some("application/json"));
    assert_eq!(post.header("accept"), Some("application/json"));
    assert!(post.header("user-agent").unwrap().contains("iPhone"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_error_body_is_forwarded() {
    let addr = start_server();
    let c = controller(&format!("http://{addr}"));
    let (observer, mut rx) = channel_observer();
    c.set_delegate(&observer);

    c.do_get(&(), "/fail", "id2").unwrap();
    let notified = next(&mut rx).await;
    assert_eq!(notified.response.as_deref(), Some("err"));
    assert!(notified.error_message.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_error_without_body_is_absent() {
    let addr = start_server();
    let c = controller(&format!("http://{addr}"));
    let (observer, mut rx) = channel_observer();
    c.set_delegate(&observer);

    c.do_get(&(), "/empty-error", "id3").unwrap();
    let notified = next(&mut rx).await;
    assert!(notified.response.is_none());
    assert_eq!(notified.identify, "id3");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn connection_refused_is_absent() {
    // Bind then drop to get a port nobody is listening on.
    let addr = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap()
    };
    let c = controller(&format!("http://{addr}"));
    let (observer, mut rx) = channel_observer();
    c.set_delegate(&observer);

    c.do_post(&serde_json::json!({}), "/echo", "offline").unwrap();
    let notified = next(&mut rx).await;
    assert!(notified.response.is_none());
    assert!(notified.error_message.is_none());
    assert_eq!(notified.identify, "offline");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_requests_each_notify_once() {
    let addr = start_server();
    let c = controller(&format!("http://{addr}"));
    let (observer, mut rx) = channel_observer();
    c.set_delegate(&observer);

    let handles: Vec<_> = (0..10)
        .map(|i| c.do_get(&(), "/ping", &format!("req-{i}")).unwrap())
        .collect();
    for h in handles {
        h.await.unwrap();
    }

    let mut ids = Vec::new();
    for _ in 0..10 {
        ids.push(next(&mut rx).await.identify);
    }
    ids.sort();
    let mut expected: Vec<String> = (0..10).map(|i| format!("req-{i}")).collect();
    expected.sort();
    assert_eq!(ids, expected);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_params_are_not_sent() {
    let addr = start_server();
    let c = controller(&format!("http://{addr}"));

    c.get(&serde_json::json!({ "page": 3 }), "/ping", "q").await.unwrap();

    let requests = recorded(addr).await;
    assert_eq!(requests[0].path, "/ping");
    assert_eq!(requests[0].query, None);
    assert_eq!(requests[0].body, "");
}
