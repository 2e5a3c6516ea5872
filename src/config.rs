use std::time::Duration;

use crate::simplify::DEFAULT_TOLERANCE;

/// Environment variable holding the microservice base URL.
pub const BASE_URL_ENV: &str = "TERRAGEO_URL";

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Deployment settings for talking to the microservice.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Cache window for region/municipality name lists and boundaries.
    pub list_ttl: Duration,
    /// Cache window for parcel and settlement geometry.
    pub geometry_ttl: Duration,
    /// Simplification tolerance (degrees) for rendering and settlement queries.
    pub tolerance: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_ttl: Duration::from_secs(60 * 60),
            geometry_ttl: Duration::from_secs(5 * 60),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ServiceConfig {
    /// Defaults, with the base URL taken from `TERRAGEO_URL` when set and non-empty.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV).ok();
        Self::default().with_base_url(base_url.as_deref())
    }

    /// Override the base URL; `None` or blank keeps the current one.
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Override the simplification tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_loopback() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert!(config.list_ttl > config.geometry_ttl);
        assert_eq!(config.tolerance, 0.001);
    }

    #[test]
    fn base_url_override_trims_trailing_slash() {
        let config = ServiceConfig::default().with_base_url(Some("https://terrageo.example.org/api/"));
        assert_eq!(config.base_url, "https://terrageo.example.org/api");
    }

    #[test]
    fn blank_override_is_ignored() {
        let config = ServiceConfig::default().with_base_url(Some("  ")).with_base_url(None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
