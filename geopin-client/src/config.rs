//! Client configuration

use shared::LngLat;

/// How overlapping responses from the same component are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrdering {
    /// Discard a response once a newer request's response has been applied
    #[default]
    LatestRequest,
    /// Apply every response as it lands; the last one to land wins
    CompletionOrder,
}

impl std::str::FromStr for ResponseOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" | "latest_request" | "latest-request" => Ok(Self::LatestRequest),
            "completion" | "completion_order" | "completion-order" => Ok(Self::CompletionOrder),
            other => Err(format!("unknown response ordering '{other}'")),
        }
    }
}

/// Client configuration for a map session
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | GEOPIN_ENDPOINT | http://localhost:3000/api/markers | markers endpoint URL |
/// | GEOPIN_USER_ID | 0 | viewer id, 0 = anonymous |
/// | GEOPIN_TIMEOUT_SECS | 30 | request timeout |
/// | GEOPIN_RESPONSE_ORDERING | latest | `latest` or `completion` |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Markers endpoint URL
    pub endpoint: String,

    /// Current viewer; `0` means not signed in
    pub user_id: u64,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Initial map center
    pub center: LngLat,

    /// Initial map zoom
    pub zoom: f64,

    pub ordering: ResponseOrdering,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_id: 0,
            timeout: 30,
            center: LngLat::new(13.405, 52.52),
            zoom: 13.0,
            ordering: ResponseOrdering::LatestRequest,
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("GEOPIN_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:3000/api/markers".into()),
        );
        config.user_id = std::env::var("GEOPIN_USER_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        config.timeout = std::env::var("GEOPIN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        config.ordering = std::env::var("GEOPIN_RESPONSE_ORDERING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        config
    }

    /// Set the viewer id
    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the initial map view
    pub fn with_view(mut self, center: LngLat, zoom: f64) -> Self {
        self.center = center;
        self.zoom = zoom;
        self
    }

    pub fn with_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Whether the viewer may place markers
    pub fn is_signed_in(&self) -> bool {
        self.user_id > 0
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000/api/markers")
    }
}
