//! Drives the reqwest transport against a local HTTP server serving canned
//! responses.

use std::time::Duration;

use linear::{ApiToken, GraphQlClient, HttpTransport, LinearTracker};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use triage::{AccountDirectory, TrackerError};

/// A request as seen by the test server.
struct Captured {
    head: String,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

/// Serves exactly one request with `status` and `body`, then reports what it
/// received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/graphql", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let captured = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let head = text[..split].to_string();
                let length = head
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                let body = &text[split + 4..];
                if body.len() >= length {
                    break Captured {
                        head,
                        body: body.to_string(),
                    };
                }
            }
            if n == 0 {
                panic!("client closed the connection early");
            }
        };

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(captured);
    });

    (endpoint, rx)
}

fn tracker(endpoint: &str, timeout: Duration) -> LinearTracker {
    let transport = HttpTransport::new(endpoint, timeout).unwrap();
    LinearTracker::new(
        GraphQlClient::new(transport),
        ApiToken::new("lin_api_raw_token").unwrap(),
    )
}

#[tokio::test]
async fn request_is_posted_with_raw_token_and_json_body() {
    let (endpoint, captured) = serve_once(
        "200 OK",
        r#"{"data":{"users":{"nodes":[{"id":"u1","name":"Jane","email":"jane.doe@beeper.com"}]}}}"#,
    )
    .await;

    let accounts = tracker(&endpoint, Duration::from_secs(5))
        .find_accounts_by_email("jane.doe@beeper.com")
        .await
        .unwrap();
    assert_eq!(accounts[0].id, "u1");

    let request = captured.await.unwrap();
    assert!(request.head.starts_with("POST /graphql "));
    assert_eq!(request.header("authorization").as_deref(), Some("lin_api_raw_token"));
    assert_eq!(request.header("content-type").as_deref(), Some("application/json"));
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert!(body["query"].as_str().unwrap().contains("FindUserByEmail"));
    assert_eq!(body["variables"]["filter"]["email"]["eq"], "jane.doe@beeper.com");
    assert!(!request.body.contains("lin_api_raw_token"));
}

#[tokio::test]
async fn error_envelope_behind_non_200_status_is_reported() {
    let (endpoint, _captured) = serve_once(
        "400 Bad Request",
        r#"{"errors":[{"message":"boom"}],"data":null}"#,
    )
    .await;

    let err = tracker(&endpoint, Duration::from_secs(5))
        .list_accounts()
        .await
        .unwrap_err();
    assert_eq!(err, TrackerError::GraphQl { message: "boom".into() });
}

#[tokio::test]
async fn slow_backend_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/graphql", listener.local_addr().unwrap());
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let timeout = Duration::from_millis(200);
    let err = tracker(&endpoint, timeout).list_accounts().await.unwrap_err();
    assert_eq!(err, TrackerError::Timeout { after: timeout });
    server.abort();
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/graphql", listener.local_addr().unwrap());
    drop(listener);

    let err = tracker(&endpoint, Duration::from_secs(5))
        .list_accounts()
        .await
        .unwrap_err();
    match err {
        TrackerError::Transport { message } => {
            assert!(
                message.to_ascii_lowercase().contains("connection refused"),
                "{message}"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
