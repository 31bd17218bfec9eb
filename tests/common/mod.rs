#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cartuner_api::auth::{Role, TokenAuthority, TokenSubject};
use reqwest::{redirect::Policy, StatusCode};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const JWT_ISSUER: &str = "cartuner-test";
pub const JWT_AUDIENCE: &str = "cartuner-test-web";
pub const COOKIE: &str = "auth-token";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cartuner-api"));
        cmd.env("APP_ENV", "development")
            .env("CARTUNER_PORT", port.to_string())
            .env("CARTUNER_BIND", "127.0.0.1")
            .env("SESSION_COOKIE_NAME", COOKIE)
            .env("JWT_SECRET", JWT_SECRET)
            .env("JWT_ISSUER", JWT_ISSUER)
            .env("JWT_AUDIENCE", JWT_AUDIENCE)
            .env_remove("PARTITION_TABLE_PATH")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("failed to build http client")
}

/// Token authority sharing the spawned server's signing settings
pub fn authority() -> TokenAuthority {
    TokenAuthority::new(JWT_SECRET, JWT_ISSUER, JWT_AUDIENCE, chrono::Duration::hours(1))
        .expect("test authority")
}

pub fn token_for(role: Role, id: &str) -> String {
    authority()
        .issue(&TokenSubject::new(id, role))
        .expect("failed to issue test token")
}

pub fn cookie(token: &str) -> String {
    format!("{}={}", COOKIE, token)
}
