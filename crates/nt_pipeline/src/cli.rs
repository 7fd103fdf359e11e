use clap::Subcommand;
use nt_core::Result;
use crate::pipeline::TopicPipeline;

#[derive(Subcommand, Debug, Clone)]
pub enum PipelineCommands {
    /// Fetch, summarize and store articles for a topic once
    Fetch {
        topic: String,
    },
    /// Print the latest stored articles for a topic, fetching if too few
    Report {
        topic: String,
    },
    /// Print a trend analysis for a topic
    Trend {
        topic: String,
    },
}

pub async fn handle_command(command: PipelineCommands, pipeline: &TopicPipeline) -> Result<()> {
    match command {
        PipelineCommands::Fetch { topic } => {
            let report = pipeline.run(&topic).await?;
            println!(
                "🆕 {} new, ⏭️ {} already stored, ❌ {} failed",
                report.inserted, report.skipped, report.failed
            );
        }
        PipelineCommands::Report { topic } => {
            let topic = topic.to_lowercase();
            let articles = pipeline.formatted_report(&topic).await?;
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
        PipelineCommands::Trend { topic } => {
            let topic = topic.to_lowercase();
            let trend = pipeline.trend(&topic).await?;
            match trend.trend_analysis {
                Some(analysis) => println!("{}", analysis),
                None => println!("No trend analysis available for {}", trend.topic),
            }
        }
    }
    Ok(())
}
