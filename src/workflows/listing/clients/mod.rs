//! Reqwest-backed implementations of the collaborator traits. Each client is
//! a thin, stateless wrapper over one third-party API; everything with
//! algorithmic content lives in the analyzers, not here.

mod anthropic;
mod apify;
mod streetview;

pub use anthropic::{ClaudeTextClient, ClaudeVisionClient};
pub use apify::ApifyScraperClient;
pub use streetview::StreetViewClient;
