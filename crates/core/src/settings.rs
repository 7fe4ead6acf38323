//! Service settings
//!
//! Immutable profile and region selection shared by every service instance.
//! Regions are validated against an allow-list when the value is built.

use url::Url;

use crate::error::{Error, Result};

/// Regions services may be bound to
pub const ALLOWED_REGIONS: &[&str] = &["us-east-2"];

/// Region used when neither the caller nor `AWS_REGION` supplies one
pub const DEFAULT_REGION: &str = "us-east-2";

/// Environment variable consulted for the default region
pub const REGION_ENV: &str = "AWS_REGION";

/// Profile and region a service authenticates with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    profile: Option<String>,
    region: String,
    endpoint: Option<Url>,
    suppress_insecure_warnings: bool,
    show_progress: bool,
}

impl Settings {
    /// Build settings, defaulting the region from the environment
    pub fn new(profile: Option<String>, region: Option<String>) -> Result<Self> {
        let region = region.unwrap_or_else(default_region);

        if !ALLOWED_REGIONS.contains(&region.as_str()) {
            tracing::error!("Received invalid AWS region specification: {region}");
            return Err(Error::InvalidConfiguration(format!(
                "Invalid region provided: {region}. Valid region(s): {}",
                serde_json::to_string(ALLOWED_REGIONS)?
            )));
        }

        Ok(Self {
            profile: profile.filter(|p| !p.is_empty()),
            region,
            endpoint: None,
            suppress_insecure_warnings: false,
            show_progress: true,
        })
    }

    /// Route requests to a custom endpoint (e.g. an internal gateway)
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfiguration(format!(
                "Unsupported endpoint scheme: {}",
                url.scheme()
            )));
        }
        self.endpoint = Some(url);
        Ok(self)
    }

    /// Silence the insecure-transport warning emitted for plain HTTP endpoints
    pub fn with_insecure_warnings_suppressed(mut self, suppress: bool) -> Self {
        self.suppress_insecure_warnings = suppress;
        self
    }

    /// Draw transfer progress when the terminal allows it
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Named profile, `None` for the SDK default chain
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Profile name used for credential file sections
    pub fn profile_or_default(&self) -> &str {
        self.profile.as_deref().unwrap_or("default")
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Whether requests travel over unencrypted transport
    pub fn is_insecure_transport(&self) -> bool {
        self.endpoint.as_ref().is_some_and(|u| u.scheme() == "http")
    }

    pub fn suppress_insecure_warnings(&self) -> bool {
        self.suppress_insecure_warnings
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }
}

impl Default for Settings {
    /// Settings with no profile and the built-in default region
    fn default() -> Self {
        Self {
            profile: None,
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            suppress_insecure_warnings: false,
            show_progress: true,
        }
    }
}

fn default_region() -> String {
    std::env::var(REGION_ENV)
        .ok()
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}
