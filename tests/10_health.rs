mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::TestServer;

#[tokio::test]
async fn health_endpoint_is_public() -> Result<()> {
    let server = TestServer::with_sample_tools().await?;

    let res = server.get("/health").send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "ok");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_return_json_404() -> Result<()> {
    let server = TestServer::with_sample_tools().await?;

    let res = server.get("/api/nope").send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}
