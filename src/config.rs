use std::{net, path::PathBuf, time};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: Storage,
    pub http: Http,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub summary: Summary,
}

/// Where the ticket collection and the theme preference are kept.
///
/// Without a `dir` everything lives in memory and is lost on restart.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Storage {
    pub dir: Option<PathBuf>,
}

#[derive(Deserialize)]
pub struct Http {
    pub server: Server,
    pub cors: Cors,
}

#[derive(Deserialize)]
pub struct Server {
    pub addr: net::SocketAddr,
}

#[derive(Deserialize)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Auth {
    pub passwords: Vec<String>,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            passwords: vec!["itadmin".to_owned(), "admin".to_owned()],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Summary {
    /// Falls back to the `GEMINI_API_KEY` environment variable.
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<time::Duration>,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            timeout: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_owned()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_owned()
}
