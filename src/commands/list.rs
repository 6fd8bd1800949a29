//! List site content

use anyhow::Result;

use crate::helpers::truncate;
use crate::Site;

/// List site content by type for one locale
pub fn run(site: &Site, content_type: &str, locale: &str, drafts: bool) -> Result<()> {
    if !site.config.supports_locale(locale) {
        anyhow::bail!(
            "Unknown locale `{}` (configured: {})",
            locale,
            site.config.locales.join(", ")
        );
    }

    let resolver = site.resolver();

    match content_type {
        "post" | "posts" => {
            let posts = resolver.list_entries(locale, drafts);
            println!("Posts [{}] ({}):", locale, posts.len());
            for post in posts {
                let date = post
                    .published
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!(
                    "  {} - {} ({} min) [{}]",
                    date,
                    truncate(&post.title, 60, None),
                    post.reading_time,
                    post.slug
                );
            }
        }
        "tag" | "tags" => {
            let tags = resolver.list_tags(locale);
            println!("Tags [{}] ({}):", locale, tags.len());
            for tag in tags {
                let count = resolver.list_entries_by_tag(&tag, locale).len();
                println!("  {} ({})", tag, count);
            }
        }
        "slug" | "slugs" => {
            let slugs = resolver.list_slugs(locale);
            println!("Slugs [{}] ({}):", locale, slugs.len());
            for slug in slugs {
                println!("  {}", slug);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown content type: {}. Use: post, tag, slug",
                content_type
            );
        }
    }

    Ok(())
}
