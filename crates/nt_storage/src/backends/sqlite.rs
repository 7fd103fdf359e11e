use async_trait::async_trait;
use chrono::SecondsFormat;
use nt_core::{Article, ArticleStorage, Error, Result, StoreReport, StoredArticle};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT,
        source TEXT,
        published_date TEXT,
        summary TEXT,
        topic TEXT,
        url TEXT NOT NULL UNIQUE,
        fetched_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    // Add future migrations here
];

pub struct SqliteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to open {}: {}", db_path.display(), e)))?;

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    fn row_to_article(row: &SqliteRow) -> Result<StoredArticle> {
        let published: String = row.try_get("published_date").map_err(db_error)?;
        let published_at = chrono::DateTime::parse_from_rfc3339(&published)
            .map_err(|e| Error::Database(format!("Failed to parse date {}: {}", published, e)))?
            .with_timezone(&chrono::Utc);

        Ok(StoredArticle {
            id: row.try_get("id").map_err(db_error)?,
            title: row.try_get::<Option<String>, _>("title").map_err(db_error)?.unwrap_or_default(),
            source: row.try_get::<Option<String>, _>("source").map_err(db_error)?.unwrap_or_default(),
            published_at,
            summary: row.try_get("summary").map_err(db_error)?,
            topic: row.try_get::<Option<String>, _>("topic").map_err(db_error)?.unwrap_or_default(),
            url: row.try_get("url").map_err(db_error)?,
        })
    }
}

fn db_error(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}

#[async_trait]
impl ArticleStorage for SqliteStorage {
    async fn ensure_schema(&self) -> Result<()> {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }
        tracing::info!("🏦 SQLite schema ready at {}", self.db_path.display());
        Ok(())
    }

    async fn store_articles(&self, articles: &[Article]) -> Result<StoreReport> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        let mut report = StoreReport::default();

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO news_articles
                (title, source, published_date, summary, topic, url)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT (url) DO NOTHING
                "#,
            )
            .bind(&article.title)
            .bind(&article.source)
            .bind(article.published_at.to_rfc3339_opts(SecondsFormat::Secs, true))
            .bind(article.summary.as_deref())
            .bind(&article.topic)
            .bind(&article.url)
            .execute(&mut *conn)
            .await;

            match result {
                Ok(done) if done.rows_affected() == 0 => report.skipped += 1,
                Ok(_) => report.inserted += 1,
                Err(e) => {
                    tracing::error!("Error inserting article {}: {}", article.url, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn latest_by_topic(&self, topic: &str, limit: usize) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, source, published_date, summary, topic, url
            FROM news_articles
            WHERE instr(lower(topic), lower(?)) > 0
            ORDER BY published_date DESC
            LIMIT ?
            "#,
        )
        .bind(topic)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to load articles for {}: {}", topic, e)))?;

        rows.iter().map(Self::row_to_article).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn article(url: &str, topic: &str, age_hours: i64) -> Article {
        Article {
            url: url.to_string(),
            title: "Test Article".to_string(),
            source: "test".to_string(),
            published_at: Utc::now() - Duration::hours(age_hours),
            content: "Test content".to_string(),
            summary: Some("A summary".to_string()),
            topic: topic.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new_with_path(&db_path).await.unwrap();
        storage.ensure_schema().await.unwrap();
        // Running the migrations twice is harmless
        storage.ensure_schema().await.unwrap();

        let a = article("http://example.com/a", "tech", 2);
        let report = storage.store_articles(&[a.clone(), a.clone()]).await.unwrap();
        assert_eq!(report, StoreReport { inserted: 1, skipped: 1, failed: 0 });

        let report = storage.store_articles(&[a]).await.unwrap();
        assert_eq!(report.inserted, 0);

        let rows = storage.latest_by_topic("tech", 5).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].summary.as_deref(), Some("A summary"));
    }

    #[tokio::test]
    async fn test_sqlite_latest_by_topic() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(&temp_dir.path().join("news.db")).await.unwrap();
        storage.ensure_schema().await.unwrap();

        let articles: Vec<Article> = (0..7)
            .map(|i| article(&format!("http://example.com/{}", i), "tech", i))
            .chain(std::iter::once(article("http://example.com/golf", "sports", 0)))
            .collect();
        storage.store_articles(&articles).await.unwrap();

        let lower = storage.latest_by_topic("tech", 5).await.unwrap();
        let upper = storage.latest_by_topic("TECH", 5).await.unwrap();
        assert_eq!(lower.len(), 5);
        assert_eq!(lower, upper);
        assert_eq!(lower[0].url, "http://example.com/0");
        assert!(lower.windows(2).all(|w| w[0].published_at >= w[1].published_at));
    }
}
