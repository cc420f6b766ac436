pub mod db;
pub mod insights_llm;
pub mod memory;
pub mod offline;
pub mod sentiment_llm;

pub use db::DbAdapter;
pub use insights_llm::OpenAiInsightsAdapter;
pub use memory::MemoryAdapter;
pub use offline::{FixedSentimentAdapter, OfflineInsightsModel};
pub use sentiment_llm::OpenAiSentimentAdapter;
