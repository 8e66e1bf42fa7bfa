use std::{
    collections::HashMap,
    io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

/// Persistence backend: opaque bytes under string keys.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    async fn write(&self, key: &str, value: &[u8]) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage(Mutex<HashMap<String, Vec<u8>>>);

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let map = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let mut map = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}

/// One file per key inside a directory.
#[derive(Debug)]
pub struct DirStorage {
    dir: PathBuf,
}

impl DirStorage {
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl Storage for DirStorage {
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, key: &str, value: &[u8]) -> io::Result<()> {
        // Rename is atomic, so readers see either the old or the new value.
        // One temp file per write; concurrent writers of a key must not
        // share it.
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::now_v7()));
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, self.path(key)).await
    }
}
