use tracing::{info, warn};

use super::aggregate::{build_recommendations, overall_risk};
use super::collaborators::{
    ListingScraper, ScrapeError, StreetImageryGateway, TextAnalysisGateway, TextModelError,
    VisionGateway,
};
use super::domain::{AnalysisReport, ImageAnalysis, Listing, ListingSummary, TextAnalysis};
use super::price::analyze_price_history;
use super::redflags::fallback_text_analysis;
use super::url::{ListingUrl, UrlValidationError};

const SKIP_NO_IMAGERY: &str = "street-level reference imagery not available for this address";
const SKIP_NO_PHOTO: &str = "no exterior photo available in listing";

/// Fatal pipeline failures. Everything else degrades in place: the street
/// imagery, vision, and text collaborators are each substituted with a
/// well-formed placeholder at their own stage, so no collaborator error
/// ever reaches the aggregator.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] UrlValidationError),
    #[error("could not retrieve the listing: {0}")]
    Scrape(#[from] ScrapeError),
    #[error("Could not extract listing data. Please check the URL and try again.")]
    MissingAddress,
}

impl AnalysisError {
    /// Validation and missing-address failures are the caller's to fix;
    /// a scrape failure is the upstream source misbehaving.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            AnalysisError::Validation(_) | AnalysisError::MissingAddress
        )
    }
}

/// Sequences the analysis pipeline over the four external collaborators and
/// owns the degrade-gracefully policy. Stages run strictly in order: the
/// street-imagery result gates the vision call, and each failure is consumed
/// at its own stage boundary before the next stage runs.
pub struct ListingAnalysisService<S, G, V, T> {
    scraper: S,
    imagery: G,
    vision: V,
    text: T,
}

impl<S, G, V, T> ListingAnalysisService<S, G, V, T>
where
    S: ListingScraper + Send + Sync,
    G: StreetImageryGateway + Send + Sync,
    V: VisionGateway + Send + Sync,
    T: TextAnalysisGateway + Send + Sync,
{
    pub fn new(scraper: S, imagery: G, vision: V, text: T) -> Self {
        Self {
            scraper,
            imagery,
            vision,
            text,
        }
    }

    /// Run the full pipeline for one listing URL. The URL is validated
    /// locally before any network call.
    pub async fn analyze(&self, raw_url: &str) -> Result<AnalysisReport, AnalysisError> {
        let url = ListingUrl::parse(raw_url)?;

        let listing = self.scraper.scrape(&url).await?;
        if !listing.has_address() {
            return Err(AnalysisError::MissingAddress);
        }

        let address = listing.full_address();
        info!(%address, photos = listing.photos.len(), "listing scraped");

        let image_analysis = self.compare_exterior(&listing, &address).await;
        let price_analysis =
            analyze_price_history(&listing.price_history, listing.price, listing.days_on_market);
        let text_analysis = self.analyze_description(&listing).await;

        let overall = overall_risk(&image_analysis, &price_analysis, &text_analysis);
        let recommendations =
            build_recommendations(&image_analysis, &price_analysis, &text_analysis);

        info!(
            score = overall.score,
            level = overall.level.label(),
            flags = overall.flag_count,
            "analysis complete"
        );

        Ok(AnalysisReport {
            overall_risk: overall,
            image_analysis,
            price_analysis,
            text_analysis,
            recommendations,
            listing: ListingSummary {
                address,
                price: listing.price,
            },
        })
    }

    async fn compare_exterior(&self, listing: &Listing, address: &str) -> ImageAnalysis {
        let reference_photo = match self.imagery.resolve(address).await {
            Ok(url) => url,
            Err(err) => {
                warn!(%address, error = %err, "street imagery lookup failed; skipping photo comparison");
                return ImageAnalysis::skipped(SKIP_NO_IMAGERY);
            }
        };

        let Some(listing_photo) = listing.photos.first() else {
            return ImageAnalysis::skipped(SKIP_NO_PHOTO);
        };

        match self.vision.compare(listing_photo, &reference_photo).await {
            Ok(comparison) => ImageAnalysis::Completed {
                confidence: comparison.confidence,
                risk_level: comparison.risk_level,
                discrepancies: comparison.discrepancies,
                verdict: comparison.verdict,
                listing_photo: listing_photo.clone(),
                reference_photo,
            },
            Err(err) => {
                warn!(error = %err, "photo comparison failed; skipping");
                ImageAnalysis::skipped(format!("photo comparison unavailable: {err}"))
            }
        }
    }

    async fn analyze_description(&self, listing: &Listing) -> TextAnalysis {
        let description = listing.description.trim();
        if description.is_empty() {
            return TextAnalysis::unavailable();
        }

        match self.text.analyze(description).await {
            Ok(analysis) => analysis,
            // No model configured at all: the local red-flag matcher stands
            // in. An actual call failure degrades to the zero-confidence
            // placeholder instead.
            Err(TextModelError::NotConfigured) => {
                info!("text model not configured; using local red-flag matcher");
                fallback_text_analysis(description)
            }
            Err(err) => {
                warn!(error = %err, "text analysis failed; substituting empty analysis");
                TextAnalysis::unavailable()
            }
        }
    }
}
