use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::{Client, Error};

/// Storage key of the theme preference.
pub const KEY: &str = "theme";

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[display("dark")]
    Dark,
    #[default]
    #[display("light")]
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl Client {
    /// Anything other than a stored `dark` reads as [`Theme::Light`].
    pub async fn get_theme(&self) -> Result<Theme, Error> {
        let raw = self.storage.read(KEY).await?;
        Ok(match raw.as_deref() {
            Some(b"dark") => Theme::Dark,
            _ => Theme::Light,
        })
    }

    pub async fn write_theme(&self, theme: Theme) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;
        self.storage
            .write(KEY, theme.to_string().as_bytes())
            .await
            .map_err(Error::from)
    }
}
