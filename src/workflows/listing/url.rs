use reqwest::Url;

/// A listing URL that has passed local validation: well-formed, on the
/// listing site's domain, and pointing at a single-property detail page.
/// Constructing one is the precondition for calling the scraper, so no
/// network call can happen on an unvalidated URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingUrl(Url);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Please enter a URL")]
    Empty,
    #[error("Invalid URL format")]
    Malformed,
    #[error("Must be a Zillow URL")]
    WrongHost,
    #[error("Must be a property listing URL")]
    NotDetailPage,
}

impl ListingUrl {
    pub fn parse(raw: &str) -> Result<Self, UrlValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UrlValidationError::Empty);
        }

        let url = Url::parse(trimmed).map_err(|_| UrlValidationError::Malformed)?;

        let host_ok = url
            .host_str()
            .map(|host| host.contains("zillow.com"))
            .unwrap_or(false);
        if !host_ok {
            return Err(UrlValidationError::WrongHost);
        }

        // Detail pages live under /homedetails/; /b/ covers building pages.
        // Search and browse pages match neither.
        let path = url.path();
        if !path.contains("homedetails") && !path.contains("b/") {
            return Err(UrlValidationError::NotDetailPage);
        }

        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ListingUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
