//! Runs the pipeline for every tracked topic on a fixed interval.
//!
//! The topic list is re-read from the [`TopicStore`] on every tick, so
//! topics added or removed through the API are picked up on the next one.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nt_core::Result;
use nt_storage::TopicStore;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::pipeline::TopicPipeline;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulerStatus {
    #[serde(rename = "running")]
    Running,
    #[serde(rename = "not running")]
    NotRunning,
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::NotRunning => write!(f, "not running"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub topics: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub stored: usize,
}

pub struct Scheduler {
    topics: Arc<TopicStore>,
    pipeline: Arc<TopicPipeline>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(topics: Arc<TopicStore>, pipeline: Arc<TopicPipeline>, interval: Duration) -> Self {
        Self {
            topics,
            pipeline,
            interval,
        }
    }

    /// Runs the pipeline once for every configured topic.
    ///
    /// Fails only when the topic config cannot be read; a failing topic is
    /// logged and counted and the remaining topics still run.
    pub async fn tick(&self) -> Result<TickSummary> {
        let config = self.topics.load().await?;
        let mut summary = TickSummary {
            topics: config.jobs.len(),
            ..TickSummary::default()
        };

        for topic in config.topics() {
            match self.pipeline.run(topic).await {
                Ok(report) => {
                    summary.succeeded += 1;
                    summary.stored += report.inserted;
                }
                Err(e) => {
                    error!("Error running pipeline for {}: {}", topic, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Spawns the timer loop. The first tick happens one interval from now.
    pub fn start(self) -> SchedulerHandle {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());
        let interval = self.interval;

        let task = {
            let running = running.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + interval, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            info!("⏰ Starting scheduled tick");
                            match self.tick().await {
                                Ok(summary) => info!(
                                    "✨ Tick finished: {} topics, {} ok, {} failed, {} new articles",
                                    summary.topics, summary.succeeded, summary.failed, summary.stored
                                ),
                                Err(e) => error!("Error loading config: {}", e),
                            }
                        }
                        _ = shutdown.notified() => break,
                    }
                }
                running.store(false, Ordering::SeqCst);
                info!("🛑 Scheduler stopped");
            })
        };

        info!("⏰ Scheduler started, running every {}s", interval.as_secs());
        SchedulerHandle {
            running,
            shutdown,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }
}

/// Cloneable view of a started scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SchedulerHandle {
    /// A handle for a scheduler that was never started.
    pub fn not_started() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        if self.running.load(Ordering::SeqCst) {
            SchedulerStatus::Running
        } else {
            SchedulerStatus::NotRunning
        }
    }

    /// Stops the loop after the tick in progress, if any, and waits for it.
    pub async fn stop(&self) {
        self.shutdown.notify_one();
        let task = self.task.lock().ok().and_then(|mut task| task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("Scheduler task ended abnormally: {}", e);
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }
}
