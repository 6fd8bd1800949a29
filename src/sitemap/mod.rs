//! Sitemap generation: localized static pages plus every blog entry

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write;

use crate::config::SiteConfig;
use crate::content::ContentResolver;
use crate::helpers::{full_url_for, html_escape, locale_path, post_path};

/// How often a page is expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
        }
    }
}

/// Static pages present in every locale: (path, priority, change frequency)
pub const STATIC_PAGES: [(&str, f32, ChangeFrequency); 8] = [
    ("", 1.0, ChangeFrequency::Daily),
    ("/about", 0.9, ChangeFrequency::Monthly),
    ("/about/gallery", 0.8, ChangeFrequency::Weekly),
    ("/blog", 0.9, ChangeFrequency::Daily),
    ("/contact", 0.8, ChangeFrequency::Monthly),
    ("/faq", 0.7, ChangeFrequency::Monthly),
    ("/privacy", 0.5, ChangeFrequency::Yearly),
    ("/cookies", 0.5, ChangeFrequency::Yearly),
];

const POST_PRIORITY: f32 = 0.7;

/// One `<url>` of the sitemap
#[derive(Debug, Clone, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: String,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
    /// hreflang -> URL
    pub alternates: IndexMap<String, String>,
}

/// Build all sitemap entries, stamped with `now`
pub fn build(config: &SiteConfig, resolver: &ContentResolver, now: DateTime<Local>) -> Vec<SitemapEntry> {
    let last_modified = now.format("%Y-%m-%d").to_string();
    let mut entries = Vec::new();

    for locale in &config.locales {
        for (page, priority, change_frequency) in STATIC_PAGES {
            let alternates = config
                .locales
                .iter()
                .map(|alt| (alt.clone(), full_url_for(config, &locale_path(alt, page))))
                .collect();

            entries.push(SitemapEntry {
                loc: full_url_for(config, &locale_path(locale, page)),
                last_modified: last_modified.clone(),
                change_frequency,
                priority,
                alternates,
            });
        }

        for slug in resolver.list_slugs(locale) {
            let alternates = resolver
                .available_locales(&slug, &config.locales)
                .into_iter()
                .map(|alt| (alt.to_string(), full_url_for(config, &post_path(alt, &slug))))
                .collect();

            entries.push(SitemapEntry {
                loc: full_url_for(config, &post_path(locale, &slug)),
                last_modified: last_modified.clone(),
                change_frequency: ChangeFrequency::Monthly,
                priority: POST_PRIORITY,
                alternates,
            });
        }
    }

    tracing::debug!("Built sitemap with {} entries", entries.len());
    entries
}

/// Render entries as a sitemap XML document with hreflang alternates
pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );

    for entry in entries {
        // writing to a String cannot fail
        let _ = writeln!(xml, "  <url>");
        let _ = writeln!(xml, "    <loc>{}</loc>", html_escape(&entry.loc));
        for (lang, href) in &entry.alternates {
            let _ = writeln!(
                xml,
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>",
                html_escape(lang),
                html_escape(href)
            );
        }
        let _ = writeln!(xml, "    <lastmod>{}</lastmod>", entry.last_modified);
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.change_frequency.as_str());
        let _ = writeln!(xml, "    <priority>{:.1}</priority>", entry.priority);
        let _ = writeln!(xml, "  </url>");
    }

    xml.push_str("</urlset>\n");
    xml
}
