pub mod agent;
pub mod cache;
pub mod fetch;
pub mod ranker;
pub mod response;
pub mod rule_filter;
pub mod scorer;
pub mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use agent::Agent;
pub use cache::ResultCache;
pub use fetch::FetchOrchestrator;
pub use ranker::AiRanker;
pub use rule_filter::RuleFilter;
pub use scorer::AiScorer;
pub use traits::{Clock, GenerativeModel, SourceFetcher, SystemClock};
