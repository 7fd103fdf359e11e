pub mod newsapi;

pub use newsapi::NewsApiSource;
pub use nt_core::NewsSource;
