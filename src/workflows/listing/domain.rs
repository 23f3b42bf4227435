use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Banded severity shared by every analysis record and the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Single banding rule for all confidences: low <= 40, medium 41-70,
    /// high >= 71. Every record that carries a confidence derives its level
    /// through here so the bands cannot drift apart between analyzers.
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            0..=40 => RiskLevel::Low,
            41..=70 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// One point in a listing's price timeline, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: u64,
    /// Event label from the scraper payload ("Listed for sale", "Price
    /// change", ...), echoed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: u64) -> Self {
        Self {
            timestamp,
            price,
            event: None,
        }
    }
}

/// Scraped facts about a unit. Produced by the scraping collaborator and
/// consumed read-only by the analysis pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub days_on_market: u32,
    #[serde(default)]
    pub bedrooms: u8,
    #[serde(default)]
    pub bathrooms: f32,
    #[serde(default)]
    pub year_built: Option<u16>,
}

impl Listing {
    /// Prefer the already-combined address string; otherwise join the
    /// structured parts with ", ", dropping empty segments.
    pub fn full_address(&self) -> String {
        let parts: Vec<&str> = [
            self.address.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zipcode.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect();

        parts.join(", ")
    }

    pub fn has_address(&self) -> bool {
        !self.full_address().is_empty()
    }
}

/// Price-history verdict: drop counting plus the fixed three-tier banding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAnalysis {
    pub confidence: u8,
    pub risk_level: RiskLevel,
    pub drop_count: u32,
    /// Sum of per-pair percentage decreases, rounded once after
    /// accumulation. Can exceed 100 for long histories; preserved from the
    /// source behavior.
    pub total_decrease: i64,
    pub days_on_market: u32,
    pub timeline: Vec<PricePoint>,
    pub explanation: &'static str,
}

/// Exterior-photo comparison outcome. `Skipped` carries the reason the
/// comparison never happened; the aggregator treats it as a zero
/// contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageAnalysis {
    Skipped {
        reason: String,
    },
    Completed {
        confidence: u8,
        risk_level: RiskLevel,
        discrepancies: Vec<String>,
        verdict: String,
        listing_photo: String,
        reference_photo: String,
    },
}

impl ImageAnalysis {
    pub fn skipped(reason: impl Into<String>) -> Self {
        ImageAnalysis::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ImageAnalysis::Skipped { .. })
    }

    pub fn discrepancies(&self) -> &[String] {
        match self {
            ImageAnalysis::Skipped { .. } => &[],
            ImageAnalysis::Completed { discrepancies, .. } => discrepancies,
        }
    }
}

/// A euphemistic phrase paired with its honest-meaning translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedFlag {
    pub phrase: String,
    pub translation: String,
}

/// Misleading-language verdict for the free-text description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub confidence: u8,
    pub risk_level: RiskLevel,
    pub red_flags: Vec<RedFlag>,
    pub recommendations: Vec<String>,
}

impl TextAnalysis {
    /// Placeholder substituted when the description is empty or the text
    /// collaborator fails: zero confidence, no evidence.
    pub fn unavailable() -> Self {
        Self {
            confidence: 0,
            risk_level: RiskLevel::Low,
            red_flags: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Weighted composite of the three partial analyses. Derived per request,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallRisk {
    pub score: u8,
    pub level: RiskLevel,
    pub flag_count: usize,
}

/// Address and asking price echoed back alongside the analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub address: String,
    pub price: Option<u64>,
}

/// Full per-request output of the analysis pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub overall_risk: OverallRisk,
    pub image_analysis: ImageAnalysis,
    pub price_analysis: PriceAnalysis,
    pub text_analysis: TextAnalysis,
    pub recommendations: Vec<String>,
    pub listing: ListingSummary,
}
