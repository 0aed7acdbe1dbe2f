pub mod client;
pub mod response;

pub use client::RorClient;
pub use response::CandidateRecord;
