//! icanhazdadjoke.com joke source.
//!
//! One blocking GET per joke, asking for JSON.  The response body looks like
//! `{"id": "R7UfaahVfFd", "joke": "...", "status": 200}`; only `id` and
//! `joke` are read.

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use super::{JokeSource, RemoteJoke};
use crate::error::FetchError;

pub struct IcanhazSource {
    client: Client,
    pub endpoint: String,
}

impl IcanhazSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(
                "cheez-jokes/",
                env!("CARGO_PKG_VERSION"),
                " (terminal joke list)"
            ))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Parse one response body.  Pure, so tests need no network.
    pub fn parse_joke(body: &str) -> Result<RemoteJoke, FetchError> {
        Ok(serde_json::from_str(body)?)
    }
}

impl JokeSource for IcanhazSource {
    fn name(&self) -> &str {
        "icanhazdadjoke"
    }

    fn fetch_one(&self) -> Result<RemoteJoke, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        Self::parse_joke(&body)
    }
}
