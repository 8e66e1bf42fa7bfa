//! Executive summary of the current tickets, written by a hosted model.

use std::env;

use async_trait::async_trait;
use derive_more::{Display, From};
use itertools::Itertools as _;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{
    config,
    db::ticket::{Priority, Ticket},
};

pub const NOT_CONFIGURED: &str =
    "API key not configured. Set `summary.api_key` in config.toml or the \
     GEMINI_API_KEY environment variable.";

pub const EMPTY_RESPONSE: &str = "Failed to generate a summary.";

pub const UNAVAILABLE: &str =
    "Sorry, the AI assistant could not be reached to write the summary.";

const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// External text-generation service.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Debug, Display, From)]
pub enum GenerateError {
    #[display("request failed: {_0}")]
    #[from]
    Http(reqwest::Error),
    #[display("{_0}")]
    Rejected(String),
}

impl std::error::Error for GenerateError {}

pub struct Requester {
    generator: Option<Box<dyn Generator>>,
}

impl Requester {
    /// Talks to Gemini when an API key is available.
    pub fn new(config: config::Summary) -> Result<Self, reqwest::Error> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| env::var(API_KEY_ENV).ok())
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty());
        Ok(match api_key {
            Some(api_key) => {
                Self::with_generator(Gemini::new(config, api_key)?)
            }
            None => Self::disabled(),
        })
    }

    pub fn with_generator(generator: impl Generator + 'static) -> Self {
        Self {
            generator: Some(Box::new(generator)),
        }
    }

    /// Always answers with [`NOT_CONFIGURED`].
    pub fn disabled() -> Self {
        Self { generator: None }
    }

    /// Never fails: problems are reported as a readable message instead.
    pub async fn summarize(&self, tickets: &[Ticket]) -> String {
        let Some(generator) = &self.generator else {
            return NOT_CONFIGURED.to_owned();
        };
        match generator.generate(&prompt(tickets)).await {
            Ok(text) if text.trim().is_empty() => EMPTY_RESPONSE.to_owned(),
            Ok(text) => text,
            Err(e) => {
                error!("summary generation failed: {e}");
                UNAVAILABLE.to_owned()
            }
        }
    }
}

/// `- [STATUS] (PRIORITY!) company: issue (TYPE) by PIC on date`
pub fn line(ticket: &Ticket) -> String {
    let marker = match ticket.priority {
        Priority::High => " (PRIORITY!)",
        Priority::Normal => "",
    };
    format!(
        "- [{}]{marker} {}: {} ({}) by {} on {}",
        ticket.status,
        ticket.company,
        ticket.issue,
        ticket.kind,
        ticket.pic,
        ticket.date,
    )
}

pub fn prompt(tickets: &[Ticket]) -> String {
    let lines = tickets.iter().map(line).join("\n");
    format!(
        "Role: Act as a professional IT Supervisor.\n\
         Context: A report for the leadership of a group of companies.\n\
         Ticket data:\n\
         {lines}\n\
         \n\
         Task:\n\
         Write a short executive summary (at most 2 paragraphs) in formal, \
         polite Bahasa Indonesia.\n\
         1. Highlight high-priority issues that are not resolved yet.\n\
         2. Briefly acknowledge the work that has been completed.\n\
         3. Give short statistics (completed vs pending).\n\
         \n\
         Do not use elaborate markdown formatting, plain paragraphs only."
    )
}

/// Google Gemini `generateContent` client.
pub struct Gemini {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl Gemini {
    pub fn new(
        config: config::Summary,
        api_key: String,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            model: config.model,
            api_key,
        })
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[async_trait]
impl Generator for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint, self.model,
        );
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }],
                }],
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerateError::Rejected(format!(
                "model responded with {status}: {body}"
            )));
        }

        let resp = resp.json::<GenerateContentResponse>().await?;
        Ok(resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).join(""))
            .unwrap_or_default())
    }
}
