//! Retry behaviour of the HTTP transport against a local responder.
//!
//! The responder answers each connection with the next canned status and
//! closes it, so every attempt is visible as one recorded request body.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use qsuper_adapter_http::{HttpTransport, TransportConfig, WireEnvelope};
use qsuper_core::{CoreError, SuperposeClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Seen = Arc<Mutex<Vec<String>>>;

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Read one HTTP request and return its body.
async fn read_body(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let start = end + 4;
            if buf.len() >= start + len {
                return String::from_utf8_lossy(&buf[start..start + len]).into_owned();
            }
        }
    }
}

/// Serve `replies` in order, one per connection.
async fn responder(replies: Vec<(u16, String)>) -> (String, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);

    tokio::spawn(async move {
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_body(&mut stream).await;
            record.lock().unwrap().push(request);
            let reply = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}"), seen)
}

fn fast_config(endpoint: &str, max_retries: u32) -> TransportConfig {
    TransportConfig::default()
        .with_endpoint(endpoint)
        .with_max_retries(max_retries)
        .with_backoff(Duration::from_millis(1), Duration::from_millis(5))
        .with_envelope(WireEnvelope::Plain)
}

fn client(config: TransportConfig) -> SuperposeClient<HttpTransport> {
    let transport = HttpTransport::with_config(config).unwrap();
    let mut client = SuperposeClient::with_token("abc", transport).unwrap();
    let state = client.state_mut();
    state.set_metric("euclidean").unwrap();
    state.set_state_by_index(4, 3u32).unwrap();
    state.set_distances(["1/2", "inf"]).unwrap();
    state.set_allow_nan(true);
    client
}

#[tokio::test]
async fn test_retries_transient_statuses_with_same_payload() {
    let (endpoint, seen) = responder(vec![
        (503, String::new()),
        (502, String::new()),
        (200, r#"{"response": {"extra_qubits": 4}}"#.to_string()),
    ])
    .await;

    let extra = client(fast_config(&endpoint, 3))
        .calculate_extra_qubits()
        .await
        .unwrap();
    assert_eq!(extra, 4);

    let bodies = seen.lock().unwrap().clone();
    assert_eq!(bodies.len(), 3);
    assert!(bodies.iter().all(|b| b == &bodies[0]));
    let sent: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(sent["service"], "extra_qubits_service");
    assert_eq!(sent["distances"], serde_json::json!(["1/2", "inf"]));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (endpoint, seen) = responder(vec![(400, r#"{"message": "bad metric"}"#.to_string())]).await;

    let err = client(fast_config(&endpoint, 3))
        .calculate_num_superposed()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Transport {
            status: Some(400),
            ..
        }
    ));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_retry_budget_exhausted_on_server_errors() {
    let (endpoint, seen) = responder(vec![(500, String::new()), (500, String::new())]).await;

    let err = client(fast_config(&endpoint, 1))
        .generate_circuit()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Transport {
            status: Some(500),
            ..
        }
    ));
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_connection_refused_exhausts_retries() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(fast_config(&endpoint, 1))
        .calculate_extra_qubits()
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Transport { status: None, .. }));
}

#[tokio::test]
async fn test_gateway_envelope_round_trip() {
    let reply = serde_json::json!({
        "body": serde_json::json!({"response": {
            "distances_range_min": "1/2",
            "distances_range_max": "inf",
        }})
        .to_string()
    })
    .to_string();
    let (endpoint, seen) = responder(vec![(200, reply)]).await;

    let config = fast_config(&endpoint, 0).with_envelope(WireEnvelope::Gateway);
    let (min, max) = client(config).calculate_distance_range().await.unwrap();
    assert_eq!(min.to_string(), "1/2");
    assert_eq!(max.to_string(), "inf");

    let bodies = seen.lock().unwrap().clone();
    let outer: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    let inner: serde_json::Value = serde_json::from_str(outer["body"].as_str().unwrap()).unwrap();
    assert_eq!(inner["service"], "distances_range_service");
    assert!(inner.get("with_nan").is_none());
}

/// Accept every connection and never answer.
async fn silent_responder() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_total_timeout_bounds_every_retry() {
    let endpoint = silent_responder().await;
    let config = fast_config(&endpoint, 3)
        .with_connect_timeout(Duration::from_millis(100))
        .with_timeout(Duration::from_millis(300));

    let started = Instant::now();
    let err = client(config).calculate_extra_qubits().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(900), "took {elapsed:?}");
    assert!(matches!(
        err,
        CoreError::Transport { status: None, ref message } if message.contains("timed out")
    ));
}

#[tokio::test]
async fn test_wide_index_sent_exactly() {
    let (endpoint, seen) =
        responder(vec![(200, r#"{"response": {"extra_qubits": 9}}"#.to_string())]).await;

    let mut client = client(fast_config(&endpoint, 0));
    client
        .state_mut()
        .set_state_by_index(100, 1u128 << 80)
        .unwrap();
    assert_eq!(client.calculate_extra_qubits().await.unwrap(), 9);

    let bodies = seen.lock().unwrap().clone();
    assert!(bodies[0].contains(r#""n_qubits":100"#));
    assert!(bodies[0].contains(r#""state":1208925819614629174706176"#));
}
