use nt_core::{ArticleStorage, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;
pub mod topics;

pub use backends::*;
pub use topics::{TopicStore, DEFAULT_LOCK_TIMEOUT};

/// Which article repository to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Sqlite,
    Memory,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(Error::InvalidInput(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Connection settings for the relational backends.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub sqlite_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "news".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            host: "localhost".to_string(),
            port: 5432,
            sqlite_path: PathBuf::from("articles.db"),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sqlite_path", &self.sqlite_path)
            .finish()
    }
}

pub async fn create_storage(kind: StorageKind, config: &DatabaseConfig) -> Result<Arc<dyn ArticleStorage>> {
    let storage: Arc<dyn ArticleStorage> = match kind {
        #[cfg(feature = "postgres")]
        StorageKind::Postgres => Arc::new(PostgresStorage::new(config)),
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => Arc::new(SqliteStorage::new_with_path(&config.sqlite_path).await?),
        StorageKind::Memory => Arc::new(InMemoryStorage::new()),
        #[allow(unreachable_patterns)]
        other => {
            return Err(Error::InvalidInput(format!(
                "Storage backend {} was not compiled in",
                other
            )))
        }
    };
    tracing::debug!("Created {} storage", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::topics::TopicStore;
    pub use super::{create_storage, DatabaseConfig, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_from_str() {
        assert_eq!("Postgres".parse::<StorageKind>().unwrap(), StorageKind::Postgres);
        assert_eq!("sqlite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert!("mongo".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_database_config_redacts_password() {
        let config = DatabaseConfig {
            password: "hunter2".to_string(),
            ..DatabaseConfig::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[cfg(not(feature = "sqlite"))]
    #[tokio::test]
    async fn test_sqlite_backend_requires_feature() {
        let err = create_storage(StorageKind::Sqlite, &DatabaseConfig::default()).await.err().unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_postgres_backend_requires_feature() {
        let err = create_storage(StorageKind::Postgres, &DatabaseConfig::default()).await.err().unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_memory_backend_needs_no_driver() {
        let storage = create_storage(StorageKind::Memory, &DatabaseConfig::default()).await.unwrap();
        assert!(storage.latest_by_topic("go", 5).await.unwrap().is_empty());
    }
}
