pub mod models;
pub mod error;
pub mod sources;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::InferenceModel;
pub use sources::NewsSource;
pub use storage::{ArticleStorage, DEFAULT_REPORT_SIZE};
pub use types::{
    Article, FetchOptions, RawArticle, ReportEntry, StoreReport, StoredArticle, TopicConfig,
    TopicSubscription, TrendReport,
};
