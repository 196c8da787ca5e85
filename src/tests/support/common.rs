// Common test utilities for end-to-end tests.

use serde_json::Value;
use std::time::Duration;

/// Makes an HTTP request with an optional JSON body.
pub async fn do_request(
    method: &str,
    url: &str,
    body: Option<&Value>,
) -> Result<reqwest::Response, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let mut request = match method {
        "GET" => client.get(url),
        "POST" => client.post(url),
        "PUT" => client.put(url),
        "DELETE" => client.delete(url),
        _ => panic!("unsupported method: {}", method),
    };

    if let Some(body) = body {
        request = request.json(body);
    }

    request.send().await
}

/// Makes an HTTP request and parses the JSON response body, if any.
pub async fn do_json(
    method: &str,
    url: &str,
    body: Option<&Value>,
) -> Result<(u16, Option<Value>), reqwest::Error> {
    let resp = do_request(method, url, body).await?;
    let status = resp.status().as_u16();
    let bytes = resp.bytes().await?;
    let parsed = serde_json::from_slice(&bytes).ok();
    Ok((status, parsed))
}

/// POSTs `{"key": key, "value": value}` to `/api/`.
pub async fn store(base: &str, key: &str, value: Value) -> (u16, Option<Value>) {
    let body = serde_json::json!({ "key": key, "value": value });
    do_json("POST", &format!("{}/api/", base), Some(&body))
        .await
        .expect("POST /api/ failed")
}

/// GETs `/api/{key}`.
pub async fn fetch(base: &str, key: &str) -> (u16, Option<Value>) {
    do_json("GET", &format!("{}/api/{}", base, key), None)
        .await
        .expect("GET /api/:key failed")
}

/// DELETEs `/api/{key}`.
pub async fn remove(base: &str, key: &str) -> (u16, Option<Value>) {
    do_json("DELETE", &format!("{}/api/{}", base, key), None)
        .await
        .expect("DELETE /api/:key failed")
}
