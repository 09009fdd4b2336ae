/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_HOST | 0.0.0.0 | bind address |
/// | HTTP_PORT | 3000 | HTTP port |
/// | API_PREFIX | /api | path prefix of every route |
/// | LOG_LEVEL | info | log filter when `RUST_LOG` is unset |
/// | LOG_DIR | (unset) | daily-rolled log files go here when set |
/// | MARKERS_PAGE_SIZE | (unset) | cap on markers per listing, unlimited when unset |
/// | SEED_TAGS | true | create the initial tag set on startup |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=8080 MARKERS_PAGE_SIZE=10 cargo run -p geopin-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    /// Prefix such as `/api`; the markers route is `<prefix>/markers`
    pub api_prefix: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub markers_page_size: Option<usize>,
    pub seed_tags: bool,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            api_prefix: lookup("API_PREFIX")
                .map(|p| normalize_prefix(&p))
                .unwrap_or_else(|| "/api".into()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR").filter(|d| !d.is_empty()),
            markers_page_size: lookup("MARKERS_PAGE_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0),
            seed_tags: lookup("SEED_TAGS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Override host and port, keeping the rest
    ///
    /// Common in tests, which bind `127.0.0.1:0`
    pub fn with_overrides(http_host: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_lookup(|_| None);
        config.http_host = http_host.into();
        config.http_port = http_port;
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Path of the markers endpoint
    pub fn markers_path(&self) -> String {
        format!("{}/markers", self.api_prefix)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// `api/` and `/api/` become `/api`; an empty prefix stays empty
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
