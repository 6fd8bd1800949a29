//! Blog entry models

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::frontmatter::Metadata;

/// Average reading speed used for reading-time estimates
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated reading time of a body, in whole minutes (at least 1)
pub fn reading_time(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// A blog entry in one locale, with its body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Directory name of the entry
    pub slug: String,

    /// Locale of this variant
    pub locale: String,

    /// Post title
    pub title: String,

    pub description: String,

    /// Publication date as written in the front-matter
    pub date: String,

    /// Parsed publication date, if the front-matter date could be read
    pub published: Option<DateTime<Local>>,

    pub author: String,

    /// Cover image, absolute or root-relative
    pub image: Option<String>,

    /// Post tags
    pub tags: Vec<String>,

    pub draft: bool,

    /// Raw markdown content
    pub content: String,

    /// Minutes
    pub reading_time: u32,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,
}

impl BlogPost {
    pub(crate) fn from_parts(
        slug: &str,
        locale: &str,
        meta: Metadata,
        published: Option<DateTime<Local>>,
        body: &str,
        full_source: PathBuf,
    ) -> Self {
        Self {
            slug: slug.to_string(),
            locale: locale.to_string(),
            title: meta.title,
            description: meta.description,
            date: meta.date,
            published,
            author: meta.author,
            image: meta.image,
            tags: meta.tags,
            draft: meta.draft,
            content: body.to_string(),
            reading_time: reading_time(body),
            full_source,
        }
    }

    /// Listing view of this entry
    pub fn summary(&self) -> BlogPostSummary {
        BlogPostSummary {
            slug: self.slug.clone(),
            locale: self.locale.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
            published: self.published,
            author: self.author.clone(),
            image: self.image.clone(),
            tags: self.tags.clone(),
            reading_time: self.reading_time,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A blog entry as shown in listings (no body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostSummary {
    pub slug: String,
    pub locale: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub published: Option<DateTime<Local>>,
    pub author: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub reading_time: u32,
}

impl BlogPostSummary {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_reading_time_minimum() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("   \n\t "), 1);
        assert_eq!(reading_time("one"), 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_time(&words(200)), 1);
        assert_eq!(reading_time(&words(201)), 2);
        assert_eq!(reading_time(&words(400)), 2);
        assert_eq!(reading_time(&words(1000)), 5);
    }

    #[test]
    fn test_reading_time_monotonic_when_doubling() {
        for n in [0, 1, 150, 199, 200, 201, 333, 999, 4000] {
            let body = words(n);
            let doubled = format!("{} {}", body, body);
            assert!(reading_time(&doubled) >= reading_time(&body), "n = {}", n);
        }
    }

    #[test]
    fn test_reading_time_counts_any_whitespace() {
        let body = "uno\ndos\tthree  quatre\r\nخمسة";
        assert_eq!(body.split_whitespace().count(), 5);
        assert_eq!(reading_time(body), 1);
    }
}
