#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use invoice_dashboard::auth::SessionKeys;
use invoice_dashboard::config::AuthConfig;
use invoice_dashboard::database::MemoryInvoiceStore;
use invoice_dashboard::server::{router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_USER: &str = "user@nextmail.com";
pub const CUSTOMER_ID: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
pub const OTHER_CUSTOMER_ID: &str = "cc27c14a-0acf-4f4a-a6c9-d45682c144b9";

/// A dashboard served on a free local port, backed by an in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: MemoryInvoiceStore,
    pub sessions: SessionKeys,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let auth = AuthConfig {
            secret: TEST_SECRET.to_string(),
            ..AuthConfig::default()
        };
        let store = MemoryInvoiceStore::new();
        let state = AppState::new(Arc::new(store.clone()), &auth);
        let sessions = state.sessions.clone();

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        Ok(Self { port, base_url, store, sessions })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
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

    pub fn session_token(&self) -> Result<String> {
        Ok(self.sessions.issue(TEST_USER)?)
    }
}

/// Each test gets its own server; the listener lives on the test's runtime
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them
pub fn client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

pub fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
