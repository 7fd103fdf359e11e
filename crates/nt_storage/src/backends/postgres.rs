use async_trait::async_trait;
use chrono::NaiveDateTime;
use nt_core::{Article, ArticleStorage, Error, Result, StoreReport, StoredArticle};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use crate::DatabaseConfig;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news_articles (
        id BIGSERIAL PRIMARY KEY,
        title TEXT,
        source TEXT,
        published_date TIMESTAMP,
        summary TEXT,
        topic TEXT,
        url TEXT NOT NULL UNIQUE,
        fetched_at TIMESTAMP NOT NULL DEFAULT NOW()
    )
    "#,
];

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Article repository backed by PostgreSQL.
///
/// Tables created by older deployments use an `INT4` serial id and a
/// nullable `published_date`; reads cast and coalesce so both layouts
/// decode the same way.
///
/// The pool connects lazily, so an unreachable server only shows up as an
/// error on the operation that needed it.
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(options);
        Self { pool }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_article(row: &PgRow) -> Result<StoredArticle> {
        let published: NaiveDateTime = row.try_get("published_date").map_err(db_error)?;
        Ok(StoredArticle {
            id: row.try_get("id").map_err(db_error)?,
            title: row.try_get::<Option<String>, _>("title").map_err(db_error)?.unwrap_or_default(),
            source: row.try_get::<Option<String>, _>("source").map_err(db_error)?.unwrap_or_default(),
            published_at: published.and_utc(),
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
impl ArticleStorage for PostgresStorage {
    async fn ensure_schema(&self) -> Result<()> {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }
        tracing::info!("🏦 Database tables created successfully");
        Ok(())
    }

    async fn store_articles(&self, articles: &[Article]) -> Result<StoreReport> {
        let mut conn = self.pool.acquire().await
            .map_err(|e| Error::Database(format!("Database connection failed: {}", e)))?;
        let mut report = StoreReport::default();

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO news_articles
                (title, source, published_date, summary, topic, url)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (url) DO NOTHING
                "#,
            )
            .bind(&article.title)
            .bind(&article.source)
            .bind(article.published_at.naive_utc())
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
            SELECT id::BIGINT AS id, title, source,
                   COALESCE(published_date, fetched_at) AS published_date,
                   summary, topic, url
            FROM news_articles
            WHERE POSITION(LOWER($1) IN LOWER(topic)) > 0
            ORDER BY published_date DESC NULLS LAST
            LIMIT $2
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
