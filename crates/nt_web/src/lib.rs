use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/search", get(handlers::search))
        .route("/trend", get(handlers::trend))
        .route("/scheduler", get(handlers::scheduler_status))
        .route("/topics", get(handlers::list_topics).post(handlers::add_topic))
        .route("/topics-delete", delete(handlers::delete_topic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub mod prelude {
    pub use nt_core::{Result, Error};
    pub use crate::{create_app, AppState};
}
