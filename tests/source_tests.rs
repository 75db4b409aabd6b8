//! Integration tests for dataset sources: local file precedence and remote fetch.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use gov_domain_registry::{
    AutoLoader, DatasetLoader, DomainRegistry, RegistryConfig, RegistryError,
};

const DATASET: &str = r#"{
    "meta": { "count": 2, "headers_map": { "col1": "2024-05-02" } },
    "links": { "self": "https://example.org/data" },
    "data": [
        { "attributes": { "col1": { "val": "mf.gov.pl" } } },
        { "attributes": { "col1": { "val": "zus.gov.pl" } } }
    ]
}"#;

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("gov_domain_registry_source_tests");
    let _ = fs::create_dir_all(&dir);
    dir.join(name)
}

/// Serve a single HTTP response, handing the raw request back over a channel
fn serve_once(status: &str, body: &str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/gov.json", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
    });

    (url, rx)
}

#[test]
fn test_remote_fetch_when_no_local_file() {
    let (url, requests) = serve_once("200 OK", DATASET);

    let config = RegistryConfig::new()
        .with_snapshot_path(scratch_path("absent.json"))
        .with_remote_url(&url)
        .with_remote_timeout(Duration::from_secs(5));
    let registry = DomainRegistry::new(config).unwrap();

    let result = registry.verify("zus.gov.pl").unwrap();
    assert!(result.is_listed);
    assert_eq!(result.source.origin.as_deref(), Some(url.as_str()));
    assert_eq!(result.source.declared_count, Some(2));

    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.starts_with("GET /gov.json"), "got: {}", request);
    assert!(
        request.to_lowercase().contains("user-agent: gov-domain-registry/"),
        "got: {}",
        request
    );
}

#[test]
fn test_remote_error_status_is_fetch_error() {
    let (url, _requests) = serve_once("503 Service Unavailable", "{}");

    let loader = AutoLoader::new()
        .with_remote_url(&url)
        .with_timeout(Duration::from_secs(5));

    match loader.load() {
        Err(RegistryError::FetchError { url: failed, .. }) => assert_eq!(failed, url),
        other => panic!("expected FetchError, got {:?}", other),
    }
}

#[test]
fn test_local_file_preferred() {
    let path = scratch_path("preferred.json");
    fs::write(&path, DATASET).unwrap();

    // Never contacted: nothing listens on port 1
    let config = RegistryConfig::new()
        .with_snapshot_path(&path)
        .with_remote_url("http://127.0.0.1:1/gov.json")
        .with_remote_timeout(Duration::from_millis(200));
    let registry = DomainRegistry::new(config).unwrap();

    let snapshot = registry.snapshot().unwrap();
    assert_eq!(snapshot.meta().origin, format!("file://{}", path.display()));
    assert!(registry.verify("mf.gov.pl").unwrap().is_listed);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_no_source_fails_startup() {
    let config = RegistryConfig::new().with_snapshot_path(scratch_path("missing.json"));
    match DomainRegistry::new(config) {
        Err(RegistryError::SourceUnavailable { path }) => {
            assert_eq!(path, Some(scratch_path("missing.json")));
        }
        Err(other) => panic!("expected SourceUnavailable, got {:?}", other),
        Ok(_) => panic!("registry should not start without data"),
    }
}

#[test]
fn test_unreachable_remote_fails_startup() {
    let config = RegistryConfig::new()
        .without_snapshot_path()
        .with_remote_url("http://127.0.0.1:1/gov.json")
        .with_remote_timeout(Duration::from_secs(2));
    assert!(matches!(
        DomainRegistry::new(config),
        Err(RegistryError::FetchError { .. })
    ));
}

#[test]
fn test_silent_remote_times_out() {
    // Accepts the connection, then never answers
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/gov.json", listener.local_addr().unwrap());
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(10));
        drop(stream);
    });

    let loader = AutoLoader::new()
        .with_remote_url(&url)
        .with_timeout(Duration::from_millis(500));

    let started = Instant::now();
    let result = loader.load();
    let elapsed = started.elapsed();

    assert!(
        matches!(result, Err(RegistryError::FetchError { .. })),
        "expected FetchError, got {:?}",
        result.map(|payload| payload.origin)
    );
    assert!(elapsed >= Duration::from_millis(400), "returned after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "returned after {:?}", elapsed);
}
