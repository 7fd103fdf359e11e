use anyhow::{Context, Result};
use clap::Parser;
use nt_core::{ArticleStorage, FetchOptions};
use nt_inference::models::create_model;
use nt_pipeline::{
    handle_command, init_logging, NewsApiSource, PipelineCommands, Scheduler, TopicPipeline,
};
use nt_storage::{create_storage, DatabaseConfig, StorageKind, TopicStore};
use nt_web::{create_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_number = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| format!("Duration is too large: {}", s))?;
                current_number.clear();
                has_number = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| format!("Duration is too large: {}", s))?;
            has_number = true;
        }

        if !has_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Tracks news topics: fetch, summarize, store and serve", long_about = None)]
struct Cli {
    /// Article repository: postgres, sqlite or memory
    #[arg(long, env = "NT_STORAGE", default_value = "postgres")]
    storage: StorageKind,
    /// Summarization model: openai or dummy
    #[arg(long, env = "NT_MODEL", default_value = "openai")]
    model: String,
    /// Override the chat model name
    #[arg(long, env = "NT_MODEL_NAME")]
    model_name: Option<String>,
    /// Override the chat completions base URL
    #[arg(long, env = "NT_MODEL_URL")]
    model_url: Option<String>,
    /// Topic subscription file
    #[arg(long, env = "NT_CONFIG", default_value = "config.json")]
    config: PathBuf,
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    newsapi_key: Option<String>,
    #[arg(long, env = "OPENAI_KEY", hide_env_values = true)]
    openai_key: Option<String>,
    #[arg(long, env = "DB_NAME", default_value = "news")]
    db_name: String,
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    db_user: String,
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    db_password: String,
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    db_host: String,
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    db_port: u16,
    /// Database file for --storage sqlite
    #[arg(long, env = "NT_SQLITE_PATH", default_value = "articles.db")]
    sqlite_path: PathBuf,
    #[arg(long, env = "NT_BIND", default_value = "0.0.0.0:5000")]
    bind: SocketAddr,
    /// Time between scheduled refreshes (e.g. 1h, 30m, 1h15m30s)
    #[arg(long, env = "NT_INTERVAL", default_value = "1h")]
    interval: HumanDuration,
    /// Articles requested from the news provider per fetch
    #[arg(long, env = "NT_PAGE_SIZE", default_value_t = 10)]
    page_size: u32,
    /// How long to wait for the topic config lock
    #[arg(long, env = "NT_LOCK_TIMEOUT", default_value = "5s")]
    lock_timeout: HumanDuration,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Commands {
    /// Start the scheduler and the HTTP API (default)
    Serve,
    #[command(flatten)]
    Pipeline(PipelineCommands),
    /// Manage topic subscriptions
    Topics {
        #[command(subcommand)]
        command: TopicCommands,
    },
}

#[derive(clap::Subcommand, Debug, Clone)]
enum TopicCommands {
    List,
    Add { topic: String },
    Remove { topic: String },
}

impl Cli {
    fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            host: self.db_host.clone(),
            port: self.db_port,
            sqlite_path: self.sqlite_path.clone(),
        }
    }

    fn topic_store(&self) -> TopicStore {
        TopicStore::new(self.config.clone()).with_lock_timeout(self.lock_timeout.0)
    }

    async fn pipeline(&self) -> Result<Arc<TopicPipeline>> {
        let storage: Arc<dyn ArticleStorage> = create_storage(self.storage, &self.database_config())
            .await
            .with_context(|| format!("failed to open {} storage", self.storage))?;
        storage
            .ensure_schema()
            .await
            .context("failed to prepare the articles table")?;
        info!("🏦 Storage initialized successfully (using {})", self.storage);

        let inference = create_model(&nt_inference::Config {
            provider: self.model.clone(),
            api_key: self.openai_key.clone(),
            model_name: self.model_name.clone(),
            base_url: self.model_url.clone(),
        })?;
        info!("🧠 Inference model initialized successfully (using {})", inference.name());

        if self.newsapi_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            warn!("⚠️ NewsAPI key is missing, fetches will return no articles");
        }
        let source = Arc::new(NewsApiSource::new(self.newsapi_key.clone()));

        let options = FetchOptions {
            page_size: self.page_size,
            ..FetchOptions::default()
        };
        Ok(Arc::new(TopicPipeline::new(source, inference, storage).with_options(options)))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown requested");
}

async fn serve(cli: &Cli) -> Result<()> {
    let topics = Arc::new(cli.topic_store());
    topics
        .init_if_missing()
        .await
        .with_context(|| format!("failed to prepare {}", topics.path().display()))?;
    let pipeline = cli.pipeline().await?;

    let scheduler = Scheduler::new(topics.clone(), pipeline.clone(), cli.interval.0).start();
    let app = create_app(AppState::new(topics, pipeline, scheduler.clone()));

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!("🌐 Listening on http://{}", cli.bind);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    scheduler.stop().await;
    served.context("HTTP server failed")
}

async fn topics(cli: &Cli, command: TopicCommands) -> Result<()> {
    let store = cli.topic_store();
    match command {
        TopicCommands::List => {
            for subscription in store.list().await? {
                println!("{}", subscription.topic);
            }
        }
        TopicCommands::Add { topic } => {
            if store.add(&topic).await? {
                println!("Added topic '{}'", topic.trim());
            } else {
                println!("Topic already exists");
            }
        }
        TopicCommands::Remove { topic } => {
            if store.remove(&topic).await? {
                println!("Deleted topic '{}'", topic.trim());
            } else {
                println!("Topic not found");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing so .env values feed the env fallbacks
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging("info");

    match cli.command.clone().unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli).await,
        Commands::Pipeline(command) => {
            let pipeline = cli.pipeline().await?;
            handle_command(command, &pipeline).await?;
            Ok(())
        }
        Commands::Topics { command } => topics(&cli, command).await,
    }
}
