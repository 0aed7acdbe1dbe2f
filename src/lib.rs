//! Reconciles eduGAIN federation organization records against the ROR
//! registry, producing confidence-scored matches.

pub mod config;
pub mod matching;
pub mod models;
pub mod ror;
pub mod utils;

pub use config::MatcherConfig;
pub use models::matching::{MatchCandidate, MatchInfo, MatchMap, MatchTag};
pub use models::records::{InputRecord, OutputRecord, RowSchema};
pub use ror::RorClient;
pub use utils::rate_limit::SlidingWindowLimiter;
