use std::sync::Arc;
use nt_pipeline::{SchedulerHandle, TopicPipeline};
use nt_storage::TopicStore;

/// Dependencies shared by every handler, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub topics: Arc<TopicStore>,
    pub pipeline: Arc<TopicPipeline>,
    pub scheduler: SchedulerHandle,
}

impl AppState {
    pub fn new(topics: Arc<TopicStore>, pipeline: Arc<TopicPipeline>, scheduler: SchedulerHandle) -> Self {
        Self {
            topics,
            pipeline,
            scheduler,
        }
    }
}
