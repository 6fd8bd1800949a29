//! anae-site: content and contact backend for the ANAE association website
//!
//! Blog entries live on disk as `<content_dir>/<slug>/<locale>/index.md(x)`
//! and are resolved on every request. Contact submissions are guarded by a
//! process-local fixed-window rate limiter.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod helpers;
pub mod i18n;
pub mod ratelimit;
pub mod server;
pub mod sitemap;

use anyhow::Result;
use std::path::Path;

/// The site: configuration plus resolved directories
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Blog content root
    pub content_dir: std::path::PathBuf,
    /// Static files served as-is
    pub public_dir: std::path::PathBuf,
}

impl Site {
    /// Open a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        if !config.supports_locale(&config.default_locale) {
            anyhow::bail!(
                "default_locale `{}` is not listed in locales {:?}",
                config.default_locale,
                config.locales
            );
        }

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        })
    }

    /// Content resolver over this site's blog directory
    pub fn resolver(&self) -> content::ContentResolver {
        content::ContentResolver::new(&self.content_dir)
    }

    /// Sitemap XML for the current content
    pub fn sitemap(&self) -> String {
        let entries = sitemap::build(&self.config, &self.resolver(), chrono::Local::now());
        sitemap::render_xml(&entries)
    }
}
