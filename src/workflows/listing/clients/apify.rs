use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};

use crate::workflows::listing::collaborators::{ListingScraper, ScrapeError};
use crate::workflows::listing::domain::{Listing, PricePoint};
use crate::workflows::listing::url::ListingUrl;

const DETAIL_ACTOR: &str = "maxcopell~zillow-detail-scraper";

/// Scraper backed by the Apify Zillow detail actor. The actor's payload is
/// loosely shaped (fields move between runs), so normalization works over
/// `serde_json::Value` and falls back across the known field spellings.
pub struct ApifyScraperClient {
    client: Client,
    endpoint: Option<String>,
    token: Option<String>,
}

impl ApifyScraperClient {
    pub fn new(token: Option<String>, endpoint: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            token,
        }
    }

    /// A custom endpoint (a relay worker in front of the actor) needs no
    /// token; direct actor access does.
    fn run_url(&self) -> Result<String, ScrapeError> {
        match (&self.endpoint, self.token.as_deref()) {
            (Some(endpoint), _) => Ok(endpoint.clone()),
            (None, Some(token)) => Ok(format!(
                "https://api.apify.com/v2/acts/{DETAIL_ACTOR}/run-sync-get-dataset-items?token={token}&timeout=120"
            )),
            (None, None) => Err(ScrapeError::NotConfigured),
        }
    }
}

impl ListingScraper for ApifyScraperClient {
    async fn scrape(&self, url: &ListingUrl) -> Result<Listing, ScrapeError> {
        let response = self
            .client
            .post(self.run_url()?)
            .json(&json!({ "startUrls": [{ "url": url.as_str() }] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let items: Vec<Value> = response.json().await?;
        let raw = items.into_iter().next().ok_or(ScrapeError::EmptyResult)?;
        Ok(normalize_listing(&raw))
    }
}

fn normalize_listing(raw: &Value) -> Listing {
    let address_obj = raw.get("address").filter(|v| v.is_object());

    let pick = |key: &str| -> String {
        address_obj
            .and_then(|obj| obj.get(key))
            .or_else(|| raw.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let address = address_obj
        .and_then(|obj| obj.get("streetAddress"))
        .or_else(|| raw.get("streetAddress"))
        .or_else(|| raw.get("address").filter(|v| v.is_string()))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Listing {
        address,
        city: pick("city"),
        state: pick("state"),
        zipcode: pick("zipcode"),
        price: raw.get("price").and_then(Value::as_u64),
        price_history: normalize_price_history(raw.get("priceHistory")),
        description: raw
            .get("description")
            .or_else(|| raw.get("homeDescription"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        photos: normalize_photos(raw),
        days_on_market: raw
            .get("daysOnZillow")
            .or_else(|| raw.get("timeOnZillow"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32,
        bedrooms: raw.get("bedrooms").and_then(Value::as_u64).unwrap_or(0) as u8,
        bathrooms: raw.get("bathrooms").and_then(Value::as_f64).unwrap_or(0.0) as f32,
        year_built: raw
            .get("yearBuilt")
            .and_then(Value::as_u64)
            .map(|year| year as u16),
    }
}

fn normalize_price_history(history: Option<&Value>) -> Vec<PricePoint> {
    let Some(items) = history.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let price = match item.get("price") {
                Some(Value::Number(n)) => n.as_u64()?,
                Some(Value::String(s)) => {
                    let cleaned: String =
                        s.chars().filter(|c| c.is_ascii_digit()).collect();
                    cleaned.parse().ok()?
                }
                _ => return None,
            };

            let timestamp = item
                .get("date")
                .or_else(|| item.get("time"))
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now);

            let event = item
                .get("event")
                .or_else(|| item.get("priceChangeRate"))
                .and_then(Value::as_str)
                .map(str::to_string);

            Some(PricePoint {
                timestamp,
                price,
                event,
            })
        })
        .collect()
}

/// Photo URLs live in `responsivePhotos[].mixedSources.jpeg` (largest entry
/// last), the flat `photos` list, or a single `imgSrc`, in that order of
/// preference.
fn normalize_photos(raw: &Value) -> Vec<String> {
    if let Some(photos) = raw.get("responsivePhotos").and_then(Value::as_array) {
        let urls: Vec<String> = photos
            .iter()
            .filter_map(|photo| {
                photo
                    .pointer("/mixedSources/jpeg")
                    .and_then(Value::as_array)
                    .and_then(|sizes| sizes.last())
                    .and_then(|largest| largest.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect();
        if !urls.is_empty() {
            return urls;
        }
    }

    if let Some(photos) = raw.get("photos").and_then(Value::as_array) {
        let urls: Vec<String> = photos
            .iter()
            .filter_map(|photo| {
                photo
                    .get("url")
                    .and_then(Value::as_str)
                    .or_else(|| photo.as_str())
                    .map(str::to_string)
            })
            .collect();
        if !urls.is_empty() {
            return urls;
        }
    }

    raw.get("imgSrc")
        .and_then(Value::as_str)
        .map(|url| vec![url.to_string()])
        .unwrap_or_default()
}
