// End-to-end tests for error responses.

use serde_json::json;

use crate::support::{do_json, do_request, KvServer};

/// Error bodies carry the status code and a message.
#[tokio::test]
async fn test_not_found_error_body() {
    let server = KvServer::start().await.unwrap();

    let (status, body) = do_json("GET", &server.url("/api/nope"), None).await.unwrap();
    assert_eq!(status, 404);
    let body = body.unwrap();
    assert_eq!(body["status"], json!(404));
    assert!(body["error"].as_str().unwrap().contains("nope"));

    server.stop().await;
}

/// Undecodable bodies are rejected with 400 and nothing is stored.
#[tokio::test]
async fn test_invalid_body_is_bad_request() {
    let server = KvServer::start().await.unwrap();

    let resp = reqwest::Client::new()
        .post(server.url("/api/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let (status, _) = do_json("POST", &server.url("/api/"), Some(&json!({ "value": 1 })))
        .await
        .unwrap();
    assert_eq!(status, 400, "key is required");

    server.stop().await;
}

/// Unsupported methods on known routes are 405.
#[tokio::test]
async fn test_method_not_allowed() {
    let server = KvServer::start().await.unwrap();

    let resp = do_request("PUT", &server.url("/api/k"), Some(&json!(1)))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 405);

    server.stop().await;
}

/// Keys with `/` are reachable percent-encoded; the raw path gets a JSON 404.
#[tokio::test]
async fn test_slash_in_key() {
    let server = KvServer::start().await.unwrap();

    let (status, _) = do_json("POST", &server.url("/api/"), Some(&json!({ "key": "a/b", "value": 1 })))
        .await
        .unwrap();
    assert_eq!(status, 200);

    let (status, body) = do_json("GET", &server.url("/api/a%2Fb"), None).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body, Some(json!({ "a/b": 1 })));

    let (status, body) = do_json("GET", &server.url("/api/a/b"), None).await.unwrap();
    assert_eq!(status, 404);
    let body = body.expect("unmatched route must answer with a JSON body");
    assert_eq!(body["status"], json!(404));
    assert!(body["error"].as_str().unwrap().contains("/api/a/b"));

    server.stop().await;
}
