pub mod cli;
pub mod logging;
pub mod pipeline;
pub mod scheduler;
pub mod sources;

#[cfg(test)]
mod test_utils;

pub use cli::{handle_command, PipelineCommands};
pub use logging::init_logging;
pub use pipeline::TopicPipeline;
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerStatus, TickSummary, DEFAULT_INTERVAL};
pub use sources::{NewsApiSource, NewsSource};

pub mod prelude {
    pub use super::pipeline::TopicPipeline;
    pub use super::scheduler::{Scheduler, SchedulerHandle};
    pub use nt_core::{Article, Result, Error};
}
