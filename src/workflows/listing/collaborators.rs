use std::future::Future;

use serde::{Deserialize, Serialize};

use super::domain::{Listing, RiskLevel, TextAnalysis};
use super::url::ListingUrl;

/// Raw vision-model verdict on a listing photo versus a reference image.
/// The orchestrator attaches the compared photo references when it folds
/// this into the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageComparison {
    pub confidence: u8,
    #[serde(rename = "riskLevel")]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub discrepancies: Vec<String>,
    pub verdict: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("listing source returned {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("no data returned for this listing")]
    EmptyResult,
    #[error("scraper is not configured")]
    NotConfigured,
    #[error("scrape request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StreetImageryError {
    #[error("street-level imagery not available for this address")]
    NotAvailable,
    #[error("street imagery service is not configured")]
    NotConfigured,
    #[error("street imagery request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("vision model returned an unparseable reply: {0}")]
    MalformedReply(String),
    #[error("vision model is not configured")]
    NotConfigured,
    #[error("could not load image for comparison: {0}")]
    ImageFetch(String),
    #[error("vision request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TextModelError {
    #[error("text model returned an unparseable reply: {0}")]
    MalformedReply(String),
    #[error("text model is not configured")]
    NotConfigured,
    #[error("text analysis request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fetches and normalizes a listing from the source site.
pub trait ListingScraper {
    fn scrape(
        &self,
        url: &ListingUrl,
    ) -> impl Future<Output = Result<Listing, ScrapeError>> + Send;
}

/// Resolves a geocoded street-level reference image for an address.
pub trait StreetImageryGateway {
    fn resolve(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<String, StreetImageryError>> + Send;
}

/// Diffs a listing exterior photo against a street-level reference image.
pub trait VisionGateway {
    fn compare(
        &self,
        listing_photo: &str,
        reference_photo: &str,
    ) -> impl Future<Output = Result<ImageComparison, VisionError>> + Send;
}

/// Flags misleading language in the free-text description.
pub trait TextAnalysisGateway {
    fn analyze(
        &self,
        description: &str,
    ) -> impl Future<Output = Result<TextAnalysis, TextModelError>> + Send;
}
