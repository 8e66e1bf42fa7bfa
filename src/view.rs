use std::fmt;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{config, db::Theme};

pub const WRONG_PASSWORD: &str = "Wrong password. Contact your supervisor.";

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Read-only monitor.
    #[default]
    #[display("public")]
    Public,
    #[display("login")]
    Login,
    /// Full create, edit and delete access.
    #[display("admin")]
    Admin,
}

/// Decides whether a secret grants admin access.
pub trait CredentialCheck: Send + Sync {
    fn verify(&self, secret: &str) -> bool;
}

/// Any one of a fixed set of shared passwords.
#[derive(Clone, Debug)]
pub struct SharedSecret {
    accepted: Vec<String>,
}

impl SharedSecret {
    pub fn new(accepted: Vec<String>) -> Self {
        Self { accepted }
    }
}

impl Default for SharedSecret {
    fn default() -> Self {
        Self::from(config::Auth::default())
    }
}

impl From<config::Auth> for SharedSecret {
    fn from(config: config::Auth) -> Self {
        Self::new(config.passwords)
    }
}

impl CredentialCheck for SharedSecret {
    fn verify(&self, secret: &str) -> bool {
        self.accepted.iter().any(|accepted| accepted == secret)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AuthError;

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(WRONG_PASSWORD)
    }
}

impl std::error::Error for AuthError {}

/// Session state of the single active dashboard.
pub struct Controller {
    credentials: Box<dyn CredentialCheck>,
    view: View,
    theme: Theme,
    login_error: Option<AuthError>,
    summary: Option<String>,
    generating_summary: bool,
}

impl Controller {
    pub fn new(
        credentials: impl CredentialCheck + 'static,
        theme: Theme,
    ) -> Self {
        Self {
            credentials: Box::new(credentials),
            view: View::Public,
            theme,
            login_error: None,
            summary: None,
            generating_summary: false,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_admin(&self) -> bool {
        self.view == View::Admin
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn login_error(&self) -> Option<AuthError> {
        self.login_error
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn is_generating_summary(&self) -> bool {
        self.generating_summary
    }

    pub fn open_login(&mut self) {
        if self.view == View::Public {
            self.view = View::Login;
        }
    }

    /// Leaves the login screen without signing in.
    pub fn back(&mut self) {
        if self.view == View::Login {
            self.view = View::Public;
            self.login_error = None;
        }
    }

    pub fn login(&mut self, secret: &str) -> Result<(), AuthError> {
        if self.credentials.verify(secret) {
            self.view = View::Admin;
            self.login_error = None;
            Ok(())
        } else {
            warn!("rejected admin login");
            self.view = View::Login;
            self.login_error = Some(AuthError);
            Err(AuthError)
        }
    }

    pub fn logout(&mut self) {
        self.view = View::Public;
    }

    /// Returns the new theme, which the caller is expected to persist.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Marks a summary as in progress. `false` if one already is.
    pub fn begin_summary(&mut self) -> bool {
        !std::mem::replace(&mut self.generating_summary, true)
    }

    pub fn finish_summary(&mut self, summary: String) {
        self.summary = Some(summary);
        self.generating_summary = false;
    }
}
