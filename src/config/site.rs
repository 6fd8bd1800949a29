//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,

    // URL
    pub url: String,
    pub root: String,

    // Languages
    pub locales: Vec<String>,
    pub default_locale: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Writing
    pub render_drafts: bool,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub contact: ContactLimits,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "ANAE".to_string(),
            description: String::new(),

            url: "https://asociacionanae.org".to_string(),
            root: "/".to_string(),

            // Arabic first, it is the RTL locale
            locales: vec![
                "ar".to_string(),
                "es".to_string(),
                "fr".to_string(),
                "en".to_string(),
            ],
            default_locale: "es".to_string(),

            content_dir: "content/blog".to_string(),
            public_dir: "public".to_string(),

            render_drafts: false,

            rate_limit: RateLimitConfig::default(),
            contact: ContactLimits::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SITE_URL") {
            if !url.trim().is_empty() {
                tracing::debug!("Site URL overridden from SITE_URL: {}", url);
                self.url = url.trim().to_string();
            }
        }
    }

    /// Whether `locale` is one of the configured locales
    pub fn supports_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }
}

/// Fixed-window rate limit settings for form submissions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests accepted per key within one window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
    /// How often expired entries are swept, in milliseconds
    pub sweep_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_ms: 15 * 60 * 1000,
            sweep_interval_ms: 5 * 60 * 1000,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Maximum field lengths (in characters) for contact submissions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactLimits {
    pub name_max: usize,
    pub email_max: usize,
    pub subject_max: usize,
    pub message_max: usize,
}

impl Default for ContactLimits {
    fn default() -> Self {
        Self {
            name_max: 100,
            email_max: 254,
            subject_max: 200,
            message_max: 5000,
        }
    }
}
