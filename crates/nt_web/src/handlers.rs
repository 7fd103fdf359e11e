use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use nt_core::{ReportEntry, TopicSubscription, TrendReport};
use nt_pipeline::SchedulerStatus;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    pub topic: Option<String>,
}

/// Body of the topic mutation endpoints: `{"class": "go"}`.
#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    #[serde(alias = "topic")]
    pub class: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub topic: String,
    pub count: usize,
    pub articles: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
pub struct SchedulerResponse {
    pub scheduler_status: SchedulerStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn query_topic(query: TopicQuery) -> Result<String, ApiError> {
    query.topic
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing 'topic' query parameter".to_string()))
}

fn body_topic(body: Result<Json<TopicRequest>, JsonRejection>) -> Result<String, ApiError> {
    body.ok()
        .and_then(|Json(request)| request.class)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing topic".to_string()))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let topic = query_topic(query)?;
    let articles = state.pipeline.formatted_report(&topic).await.unwrap_or_else(|e| {
        error!("Error loading articles for {}: {}", topic, e);
        Vec::new()
    });
    Ok(Json(SearchResponse {
        count: articles.len(),
        topic,
        articles,
    }))
}

pub async fn trend(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> Result<Json<TrendReport>, ApiError> {
    let topic = query_topic(query)?;
    let report = match state.pipeline.trend(&topic).await {
        Ok(report) => report,
        Err(e) => {
            error!("Error analyzing trend for {}: {}", topic, e);
            TrendReport {
                topic,
                trend_analysis: None,
            }
        }
    };
    Ok(Json(report))
}

pub async fn scheduler_status(State(state): State<AppState>) -> Json<SchedulerResponse> {
    Json(SchedulerResponse {
        scheduler_status: state.scheduler.status(),
    })
}

pub async fn list_topics(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopicSubscription>>, ApiError> {
    Ok(Json(state.topics.list().await?))
}

pub async fn add_topic(
    State(state): State<AppState>,
    body: Result<Json<TopicRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let topic = body_topic(body)?;
    if !state.topics.add(&topic).await? {
        return Err(ApiError::Conflict("Topic already exists".to_string()));
    }
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Added topic '{}'", topic),
        }),
    ))
}

pub async fn delete_topic(
    State(state): State<AppState>,
    body: Result<Json<TopicRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let topic = body_topic(body)?;
    if !state.topics.remove(&topic).await? {
        return Err(ApiError::NotFound("Topic not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: format!("Deleted topic '{}'", topic),
    }))
}
