#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use solar_panel_api::config::{AppConfig, StoreBackend};
use solar_panel_api::database::MemoryStore;
use solar_panel_api::{app, AppState};

pub const PASSWORD: &str = "secret123";

/// One in-process server with its own empty store
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;

        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;
        config.api.port = port;
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.security.hash_memory_kib = 1024;
        config.security.hash_iterations = 1;

        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register `email` (full name "Name <email>") and return the session body
    pub async fn register(&self, email: &str) -> Result<Session> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "full_name": format!("Name {}", email),
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "register {} failed: {}", email, res.status());

        let body: Value = res.json().await?;
        Ok(Session {
            token: body["data"]["access_token"].as_str().context("missing token")?.to_string(),
            id: body["data"]["user"]["id"].as_str().context("missing id")?.to_string(),
            role: body["data"]["user"]["role"].as_str().context("missing role")?.to_string(),
        })
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(token).json(&body).send().await?)
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        Ok(self.client.put(self.url(path)).bearer_auth(token).json(&body).send().await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub id: String,
    pub role: String,
}

/// Assert the status and return the parsed envelope
pub async fn expect(res: Response, status: StatusCode) -> Result<Value> {
    let actual = res.status();
    let body: Value = res.json().await?;
    anyhow::ensure!(actual == status, "expected {}, got {}: {}", status, actual, body);
    Ok(body)
}
