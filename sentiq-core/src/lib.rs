pub mod config;
pub mod language;
pub mod models;
pub mod store;

pub use config::SentiqConfig;
pub use language::{LanguageClient, LanguageError};
pub use models::{EntityRecord, MentionRecord, SentenceAnalysis, SentenceRecord, Sentiment};
pub use store::{CollectionStats, RecordStore, StoreError};
