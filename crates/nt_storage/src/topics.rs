//! File-backed list of tracked topics.
//!
//! The whole list lives in one JSON document (`{"jobs": [{"topic": ...}]}`).
//! Every access goes through an exclusive advisory lock on a sibling
//! `<config>.lock` file, so the HTTP handlers, the scheduler and other
//! processes sharing the file never interleave a read-modify-write.

use fs2::FileExt;
use nt_core::{Error, Result, TopicConfig, TopicSubscription};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Held for the duration of one config operation; unlocks on drop.
struct ConfigLock {
    file: File,
    path: PathBuf,
}

impl Drop for ConfigLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopicStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl TopicStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_path),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Reads the current config.
    pub async fn load(&self) -> Result<TopicConfig> {
        let _lock = self.lock().await?;
        self.read_config().await
    }

    /// Replaces the config file with `config`.
    pub async fn save(&self, config: &TopicConfig) -> Result<()> {
        let _lock = self.lock().await?;
        self.write_config(config).await
    }

    pub async fn list(&self) -> Result<Vec<TopicSubscription>> {
        Ok(self.load().await?.jobs)
    }

    /// Appends `topic` unless it is already tracked. Returns whether it was added.
    pub async fn add(&self, topic: &str) -> Result<bool> {
        let topic = validate_topic(topic)?;
        let _lock = self.lock().await?;
        let mut config = self.read_config().await?;
        if config.contains(topic) {
            return Ok(false);
        }
        config.jobs.push(TopicSubscription { topic: topic.to_string() });
        self.write_config(&config).await?;
        tracing::info!("➕ Added topic '{}'", topic);
        Ok(true)
    }

    /// Removes `topic`. Returns whether it was present; the file is left
    /// untouched when it was not.
    pub async fn remove(&self, topic: &str) -> Result<bool> {
        let topic = validate_topic(topic)?;
        let _lock = self.lock().await?;
        let mut config = self.read_config().await?;
        let original_count = config.jobs.len();
        config.jobs.retain(|job| job.topic != topic);
        if config.jobs.len() == original_count {
            return Ok(false);
        }
        self.write_config(&config).await?;
        tracing::info!("➖ Deleted topic '{}'", topic);
        Ok(true)
    }

    /// Writes an empty config if none exists yet. Returns whether one was created.
    pub async fn init_if_missing(&self) -> Result<bool> {
        let _lock = self.lock().await?;
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        self.write_config(&TopicConfig::default()).await?;
        tracing::info!("📝 Created empty topic config at {}", self.path.display());
        Ok(true)
    }

    async fn lock(&self) -> Result<ConfigLock> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)?;
        let contended = fs2::lock_contended_error().raw_os_error();
        let deadline = Instant::now() + self.lock_timeout;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(ConfigLock {
                        file,
                        path: self.lock_path.clone(),
                    })
                }
                Err(e) if e.raw_os_error() == contended => {}
                Err(e) => return Err(e.into()),
            }
            if Instant::now() >= deadline {
                return Err(Error::LockTimeout {
                    path: self.lock_path.clone(),
                    timeout: self.lock_timeout,
                });
            }
            tokio::time::sleep(LOCK_POLL_INTERVAL).await;
        }
    }

    async fn read_config(&self) -> Result<TopicConfig> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| Error::ConfigRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| Error::ConfigRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    async fn write_config(&self, config: &TopicConfig) -> Result<()> {
        let raw = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

fn validate_topic(topic: &str) -> Result<&str> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(Error::InvalidInput("Topic must not be empty".to_string()));
    }
    Ok(topic)
}
