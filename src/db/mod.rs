pub mod storage;
pub mod theme;
pub mod ticket;

use std::{error::Error as StdError, io};

use derive_more::{Display, From};
use tokio::sync::Mutex;

use crate::config;

pub use self::{
    storage::{DirStorage, MemoryStorage, Storage},
    theme::Theme,
    ticket::Ticket,
};

pub async fn connect(config: config::Storage) -> Result<Client, Error> {
    Ok(match config.dir {
        Some(dir) => Client::new(DirStorage::open(dir).await?),
        None => Client::new(MemoryStorage::default()),
    })
}

/// Key-value store holding the ticket collection and the theme preference.
///
/// Every mutation rewrites the whole value under its key. Writers inside
/// this process are serialised, writers in other processes are not.
pub struct Client {
    storage: Box<dyn Storage>,
    write_lock: Mutex<()>,
}

impl Client {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            write_lock: Mutex::new(()),
        }
    }
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("storage I/O failed: {_0}")]
    Io(io::Error),
    #[display("failed to encode stored value: {_0}")]
    Json(serde_json::Error),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}
