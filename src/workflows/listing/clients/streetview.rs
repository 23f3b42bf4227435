use reqwest::Client;
use serde::Deserialize;

use crate::workflows::listing::collaborators::{StreetImageryError, StreetImageryGateway};

const METADATA_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/streetview/metadata";
const IMAGE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/streetview";

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    status: String,
}

/// Street-level reference imagery via the Google Street View Static API.
/// The metadata endpoint is probed first; only a "OK" status means a real
/// panorama exists at the geocoded address.
pub struct StreetViewClient {
    client: Client,
    api_key: Option<String>,
}

impl StreetViewClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

impl StreetImageryGateway for StreetViewClient {
    async fn resolve(&self, address: &str) -> Result<String, StreetImageryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(StreetImageryError::NotConfigured)?;

        let metadata: MetadataResponse = self
            .client
            .get(METADATA_ENDPOINT)
            .query(&[("location", address), ("key", api_key)])
            .send()
            .await?
            .json()
            .await?;

        if metadata.status != "OK" {
            return Err(StreetImageryError::NotAvailable);
        }

        let image_url = reqwest::Url::parse_with_params(
            IMAGE_ENDPOINT,
            &[("size", "600x400"), ("location", address), ("key", api_key)],
        )
        .map_err(|_| StreetImageryError::NotAvailable)?;

        Ok(image_url.to_string())
    }
}
