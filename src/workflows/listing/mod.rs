//! Listing trust analysis: turn a scraped listing into a composite risk
//! report by combining exterior-photo consistency, price-history volatility,
//! and misleading-language detection.
//!
//! The analyzers in [`price`], [`redflags`], and [`aggregate`] are pure; the
//! [`service`] module owns the collaborator calls and the degrade-gracefully
//! policy around them.

pub mod aggregate;
pub mod clients;
pub mod collaborators;
pub mod domain;
pub mod price;
pub mod redflags;
pub mod service;
pub mod url;

pub use aggregate::{build_recommendations, overall_risk};
pub use collaborators::{
    ImageComparison, ListingScraper, ScrapeError, StreetImageryError, StreetImageryGateway,
    TextAnalysisGateway, TextModelError, VisionError, VisionGateway,
};
pub use domain::{
    AnalysisReport, ImageAnalysis, Listing, ListingSummary, OverallRisk, PriceAnalysis,
    PricePoint, RedFlag, RiskLevel, TextAnalysis,
};
pub use price::analyze_price_history;
pub use redflags::{extract_red_flags, fallback_text_analysis};
pub use service::{AnalysisError, ListingAnalysisService};
pub use url::{ListingUrl, UrlValidationError};
