#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use devops_control_plane::auth::{generate_jwt, Claims};
use devops_control_plane::config;
use devops_control_plane::database::models::NewTool;
use devops_control_plane::database::MemoryToolRepository;
use devops_control_plane::server::{app, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
    token: String,
}

impl TestServer {
    /// Starts the router on a free port, backed by an in-memory catalog.
    /// Each entry is a tool plus its creation offset in minutes.
    pub async fn start(tools: Vec<(NewTool, i64)>) -> Result<Self> {
        let repo = MemoryToolRepository::new();
        for (tool, minutes) in tools {
            repo.insert_at(tool, base_time() + Duration::minutes(minutes)).await?;
        }
        Self::serve(repo).await
    }

    pub async fn with_sample_tools() -> Result<Self> {
        Self::serve(MemoryToolRepository::with_sample_tools().await?).await
    }

    async fn serve(repo: MemoryToolRepository) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = config::config();
        let router = app(AppState::new(Arc::new(repo), config.query), &config.security);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let token = token_for("admin")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            token,
        })
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Request without credentials
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    pub fn authed_get(&self, path: &str) -> RequestBuilder {
        self.get(path).bearer_auth(&self.token)
    }

    /// Request with an admin bearer token
    pub fn admin(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path).bearer_auth(&self.token)
    }

    /// Request with a bearer token carrying `role`
    pub fn as_role(&self, role: &str, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.request(method, path).bearer_auth(token_for(role)?))
    }

    /// GET /api/tools with the given query pairs, returning status and JSON body
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<(StatusCode, Value)> {
        let res = self.authed_get("/api/tools").query(query).send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }
}

pub fn token_for(role: &str) -> Result<String> {
    Ok(generate_jwt(&Claims::access(format!("test-{}", role), role))?)
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn names(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
