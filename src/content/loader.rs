//! Content resolver - reads locale-partitioned blog entries from the content store
//!
//! Layout: `<root>/<slug>/<locale>/index.{mdx,md,markdown}`. Nothing is cached;
//! every call walks the store again.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::error::ContentError;
use super::frontmatter::{FrontMatterParser, StandardParser};
use super::post::{BlogPost, BlogPostSummary};

/// Candidate file names inside a locale directory, in precedence order
pub const ENTRY_FILES: [&str; 3] = ["index.mdx", "index.md", "index.markdown"];

/// Resolves blog entries from the content store
#[derive(Clone)]
pub struct ContentResolver {
    root: PathBuf,
    parser: Arc<dyn FrontMatterParser>,
}

impl ContentResolver {
    /// Create a resolver over `root` using the standard front-matter parser
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_parser(root, StandardParser)
    }

    /// Create a resolver with a custom front-matter parser
    pub fn with_parser<P: AsRef<Path>, F: FrontMatterParser + 'static>(root: P, parser: F) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            parser: Arc::new(parser),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Slugs that have a resolvable file for `locale`, sorted by name
    pub fn list_slugs(&self, locale: &str) -> Vec<String> {
        if !is_safe_component(locale) {
            return Vec::new();
        }

        self.entry_dirs()
            .into_iter()
            .filter(|(_, dir)| resolve_file(&dir.join(locale)).is_some())
            .map(|(slug, _)| slug)
            .collect()
    }

    /// Entry summaries for `locale`, newest first
    ///
    /// Entries with malformed front-matter are logged and skipped.
    pub fn list_entries(&self, locale: &str, include_drafts: bool) -> Vec<BlogPostSummary> {
        let mut posts: Vec<BlogPost> = self
            .list_slugs(locale)
            .iter()
            .filter_map(|slug| match self.get_entry(slug, locale) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("Skipping blog entry: {}", e);
                    None
                }
            })
            .filter(|post| include_drafts || !post.draft)
            .collect();

        posts.sort_by(compare_newest_first);

        posts.iter().map(BlogPost::summary).collect()
    }

    /// A single entry with its body
    ///
    /// Returns `Ok(None)` when the pair has no resolvable file.
    pub fn get_entry(&self, slug: &str, locale: &str) -> Result<Option<BlogPost>, ContentError> {
        if !is_safe_component(slug) || !is_safe_component(locale) {
            return Ok(None);
        }

        let locale_dir = self.root.join(slug).join(locale);
        let Some(path) = resolve_file(&locale_dir) else {
            return Ok(None);
        };

        self.load_entry(slug, locale, path).map(Some)
    }

    /// Sorted, deduplicated tags of all published entries in `locale`
    pub fn list_tags(&self, locale: &str) -> Vec<String> {
        let tags: BTreeSet<String> = self
            .list_entries(locale, false)
            .into_iter()
            .flat_map(|post| post.tags)
            .collect();

        tags.into_iter().collect()
    }

    /// Published entries in `locale` carrying `tag`, newest first
    pub fn list_entries_by_tag(&self, tag: &str, locale: &str) -> Vec<BlogPostSummary> {
        self.list_entries(locale, false)
            .into_iter()
            .filter(|post| post.has_tag(tag))
            .collect()
    }

    /// The `limit` most recent published entries in `locale`
    pub fn recent_entries(&self, locale: &str, limit: usize) -> Vec<BlogPostSummary> {
        let mut posts = self.list_entries(locale, false);
        posts.truncate(limit);
        posts
    }

    /// Which of `locales` have a resolvable file for `slug`
    pub fn available_locales<'a>(&self, slug: &str, locales: &'a [String]) -> Vec<&'a str> {
        if !is_safe_component(slug) {
            return Vec::new();
        }

        let entry_dir = self.root.join(slug);
        locales
            .iter()
            .filter(|locale| is_safe_component(locale))
            .filter(|locale| resolve_file(&entry_dir.join(locale.as_str())).is_some())
            .map(String::as_str)
            .collect()
    }

    /// Top-level entry directories as (slug, path), sorted by slug
    fn entry_dirs(&self) -> Vec<(String, PathBuf)> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let mut dirs: Vec<(String, PathBuf)> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| {
                let slug = e.file_name().to_str()?.to_string();
                if slug.starts_with('.') {
                    return None;
                }
                Some((slug, e.into_path()))
            })
            .collect();

        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        dirs
    }

    fn load_entry(&self, slug: &str, locale: &str, path: PathBuf) -> Result<BlogPost, ContentError> {
        let raw = fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;

        let (fm, body) = self
            .parser
            .parse(&raw)
            .map_err(|source| ContentError::Malformed {
                path: path.clone(),
                source,
            })?;

        let published = fm.parse_date();
        if published.is_none() {
            tracing::debug!("Entry {:?} has no usable date, ordering it last", path);
        }

        let meta = fm.into_metadata().map_err(|source| ContentError::Malformed {
            path: path.clone(),
            source,
        })?;

        Ok(BlogPost::from_parts(slug, locale, meta, published, body, path))
    }
}

/// First existing entry file in a locale directory
fn resolve_file(locale_dir: &Path) -> Option<PathBuf> {
    if !locale_dir.is_dir() {
        return None;
    }

    ENTRY_FILES
        .iter()
        .map(|name| locale_dir.join(name))
        .find(|path| path.is_file())
}

/// A slug or locale must be exactly one normal path component
fn is_safe_component(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Newest first; undated entries last; ties by slug
fn compare_newest_first(a: &BlogPost, b: &BlogPost) -> Ordering {
    match (&a.published, &b.published) {
        (Some(da), Some(db)) => db.cmp(da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug.cmp(&b.slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use crate::content::FrontMatterError;
    use tempfile::TempDir;

    fn write_entry(root: &Path, slug: &str, locale: &str, file: &str, content: &str) {
        let dir = root.join(slug).join(locale);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), content).unwrap();
    }

    fn post(title: &str, date: &str, tags: &[&str], draft: bool, body: &str) -> String {
        let tags = tags
            .iter()
            .map(|t| format!("  - {}\n", t))
            .collect::<String>();
        format!(
            "---\ntitle: {}\ndescription: About {}\ndate: {}\nauthor: ANAE\ntags:\n{}draft: {}\n---\n{}\n",
            title, title, date, tags, draft, body
        )
    }

    fn fixture() -> (TempDir, ContentResolver) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content/blog");

        write_entry(
            &root,
            "iftar-2024",
            "es",
            "index.md",
            &post("Iftar 2024", "2024-03-20", &["ramadan", "community"], false, "Cena solidaria."),
        );
        write_entry(
            &root,
            "iftar-2024",
            "fr",
            "index.md",
            &post("Iftar 2024", "2024-03-20", &["ramadan"], false, "Dîner solidaire."),
        );
        write_entry(
            &root,
            "cultural-week",
            "es",
            "index.mdx",
            &post("Semana cultural", "2024-06-01", &["culture", "community"], false, "Música."),
        );
        write_entry(
            &root,
            "draft-news",
            "es",
            "index.md",
            &post("Borrador", "2024-07-01", &["secret"], true, "Todavía no."),
        );
        write_entry(
            &root,
            "old-undated",
            "es",
            "index.md",
            &post("Sin fecha", "someday", &["archive"], false, "Antiguo."),
        );
        // locale dir without a resolvable file
        fs::create_dir_all(root.join("empty-entry").join("es")).unwrap();
        // stray file at the top level
        fs::write(root.join("README.txt"), "not an entry").unwrap();

        let resolver = ContentResolver::new(&root);
        (tmp, resolver)
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let resolver = ContentResolver::new(tmp.path().join("nope"));
        assert!(resolver.list_slugs("es").is_empty());
        assert!(resolver.list_entries("es", true).is_empty());
        assert!(resolver.list_tags("es").is_empty());
        assert!(resolver.get_entry("anything", "es").unwrap().is_none());
    }

    #[test]
    fn test_list_slugs() {
        let (_tmp, resolver) = fixture();
        assert_eq!(
            resolver.list_slugs("es"),
            vec!["cultural-week", "draft-news", "iftar-2024", "old-undated"]
        );
        assert_eq!(resolver.list_slugs("fr"), vec!["iftar-2024"]);
        assert!(resolver.list_slugs("ar").is_empty());
    }

    #[test]
    fn test_get_entry() {
        let (_tmp, resolver) = fixture();
        let post = resolver.get_entry("iftar-2024", "es").unwrap().unwrap();
        assert_eq!(post.slug, "iftar-2024");
        assert_eq!(post.locale, "es");
        assert_eq!(post.title, "Iftar 2024");
        assert_eq!(post.description, "About Iftar 2024");
        assert_eq!(post.date, "2024-03-20");
        assert_eq!(post.author, "ANAE");
        assert_eq!(post.tags, vec!["ramadan", "community"]);
        assert!(!post.draft);
        assert!(post.content.contains("Cena solidaria."));
        assert!(post.reading_time >= 1);
        assert!(post.published.is_some());
    }

    #[test]
    fn test_get_entry_not_found() {
        let (_tmp, resolver) = fixture();
        assert!(resolver.get_entry("iftar-2024", "ar").unwrap().is_none());
        assert!(resolver.get_entry("no-such-post", "es").unwrap().is_none());
        assert!(resolver.get_entry("empty-entry", "es").unwrap().is_none());
    }

    #[test]
    fn test_get_entry_rejects_traversal() {
        let (tmp, resolver) = fixture();
        // a file that would be reachable through ../
        write_entry(tmp.path(), "content", "es", "index.md", &post("x", "2024-01-01", &[], false, "x"));
        assert!(resolver.get_entry("..", "es").unwrap().is_none());
        assert!(resolver.get_entry("../content", "es").unwrap().is_none());
        assert!(resolver.get_entry("iftar-2024", "../fr").unwrap().is_none());
        assert!(resolver.get_entry("", "es").unwrap().is_none());
        assert!(resolver.list_slugs("..").is_empty());
    }

    #[test]
    fn test_drafts_excluded_by_default() {
        let (_tmp, resolver) = fixture();
        let published = resolver.list_entries("es", false);
        assert!(published.iter().all(|p| p.slug != "draft-news"));

        let all = resolver.list_entries("es", true);
        assert!(all.iter().any(|p| p.slug == "draft-news"));
        assert_eq!(all.len(), published.len() + 1);
    }

    #[test]
    fn test_get_entry_returns_drafts() {
        let (_tmp, resolver) = fixture();
        let post = resolver.get_entry("draft-news", "es").unwrap().unwrap();
        assert!(post.draft);
    }

    #[test]
    fn test_list_entries_sorted_newest_first() {
        let (_tmp, resolver) = fixture();
        let posts = resolver.list_entries("es", true);
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec!["draft-news", "cultural-week", "iftar-2024", "old-undated"]
        );

        for pair in posts.windows(2) {
            match (pair[0].published, pair[1].published) {
                (Some(a), Some(b)) => assert!(a >= b),
                (Some(_), None) | (None, None) => {}
                (None, Some(_)) => panic!("undated entry sorted before a dated one"),
            }
        }
    }

    #[test]
    fn test_mdx_wins_over_md() {
        let (tmp, resolver) = fixture();
        let root = tmp.path().join("content/blog");
        write_entry(
            &root,
            "cultural-week",
            "es",
            "index.md",
            &post("Plain version", "2024-06-01", &[], false, "plain"),
        );

        let post = resolver.get_entry("cultural-week", "es").unwrap().unwrap();
        assert_eq!(post.title, "Semana cultural");
        assert!(post.full_source.ends_with("index.mdx"));
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let (tmp, resolver) = fixture();
        let root = tmp.path().join("content/blog");
        write_entry(&root, "broken", "es", "index.md", "---\ntitle: [oops\n---\nbody");
        write_entry(&root, "no-author", "es", "index.md", "---\ntitle: T\ndescription: D\n---\nbody");

        let posts = resolver.list_entries("es", false);
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| p.slug != "broken" && p.slug != "no-author"));

        // the slug itself still resolves to a file
        assert!(resolver.list_slugs("es").contains(&"broken".to_string()));
        assert!(matches!(
            resolver.get_entry("broken", "es"),
            Err(ContentError::Malformed { .. })
        ));
    }

    #[test]
    fn test_list_tags_sorted_unique_and_published_only() {
        let (_tmp, resolver) = fixture();
        let tags = resolver.list_tags("es");
        assert_eq!(tags, vec!["archive", "community", "culture", "ramadan"]);

        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(tags, sorted);
    }

    #[test]
    fn test_list_entries_by_tag() {
        let (_tmp, resolver) = fixture();
        let posts = resolver.list_entries_by_tag("community", "es");
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["cultural-week", "iftar-2024"]);

        assert!(resolver.list_entries_by_tag("secret", "es").is_empty());
        assert!(resolver.list_entries_by_tag("Community", "es").is_empty());
    }

    #[test]
    fn test_recent_entries() {
        let (_tmp, resolver) = fixture();
        let recent = resolver.recent_entries("es", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].slug, "cultural-week");
        assert_eq!(resolver.recent_entries("es", 10).len(), 3);
    }

    #[test]
    fn test_available_locales() {
        let (_tmp, resolver) = fixture();
        let locales: Vec<String> = ["ar", "es", "fr", "en"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resolver.available_locales("iftar-2024", &locales), vec!["es", "fr"]);
        assert!(resolver.available_locales("..", &locales).is_empty());
    }

    #[test]
    fn test_unicode_slug() {
        let tmp = TempDir::new().unwrap();
        write_entry(
            tmp.path(),
            "إفطار-رمضان",
            "ar",
            "index.md",
            &post("إفطار", "2024-03-20", &["رمضان"], false, "نص"),
        );
        let resolver = ContentResolver::new(tmp.path());
        assert_eq!(resolver.list_slugs("ar"), vec!["إفطار-رمضان"]);
        assert!(resolver.get_entry("إفطار-رمضان", "ar").unwrap().is_some());
    }

    struct TitleOnly;

    impl FrontMatterParser for TitleOnly {
        fn parse<'a>(&self, raw: &'a str) -> Result<(FrontMatter, &'a str), FrontMatterError> {
            let (title, body) = raw.split_once('\n').ok_or(FrontMatterError::Missing)?;
            let fm = FrontMatter {
                title: Some(title.to_string()),
                description: Some(String::from("-")),
                author: Some(String::from("-")),
                ..Default::default()
            };
            Ok((fm, body))
        }
    }

    #[test]
    fn test_custom_parser() {
        let tmp = TempDir::new().unwrap();
        write_entry(tmp.path(), "plain", "en", "index.md", "Plain title\nbody text here");
        let resolver = ContentResolver::with_parser(tmp.path(), TitleOnly);
        let post = resolver.get_entry("plain", "en").unwrap().unwrap();
        assert_eq!(post.title, "Plain title");
        assert_eq!(post.content, "body text here");
        assert!(post.published.is_none());
    }
}
