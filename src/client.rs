use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::config::{Level, Session};
use crate::error::{Error, Result};

/// Read access to the puzzle site.
#[async_trait]
pub trait PuzzleSource: Send + Sync {
    /// Raw puzzle input for `level`.
    async fn input(&self, level: Level, session: &Session) -> Result<String>;

    /// HTML page describing `level`.
    async fn description(&self, level: Level, session: &Session) -> Result<String>;
}

pub struct HttpPuzzleSource {
    client: Client,
    base_url: String,
}

impl HttpPuzzleSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    async fn get(&self, url: String, session: &Session) -> Result<String> {
        debug!(%url, "fetching");
        let res = self
            .client
            .get(&url)
            .header(header::COOKIE, format!("session={}", session.as_str()))
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!(%url, %status, "puzzle site refused request");
            Err(Error::Fetch(body))
        }
    }
}

#[async_trait]
impl PuzzleSource for HttpPuzzleSource {
    async fn input(&self, level: Level, session: &Session) -> Result<String> {
        self.get(format!("{}/{}/input", self.base_url, level), session)
            .await
    }

    async fn description(&self, level: Level, session: &Session) -> Result<String> {
        self.get(format!("{}/{}", self.base_url, level), session).await
    }
}
