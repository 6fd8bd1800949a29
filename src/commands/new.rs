//! Scaffold a new blog entry

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Create `<content_dir>/<slug>/<locale>/index.md` with draft front-matter
///
/// The slug defaults to the slugified title. Existing files are never
/// overwritten.
pub fn create_post(site: &Site, title: &str, locale: &str, slug: Option<&str>) -> Result<PathBuf> {
    if !site.config.supports_locale(locale) {
        anyhow::bail!("Unknown locale `{}`", locale);
    }

    let slug = match slug {
        Some(s) => s.trim().to_string(),
        None => slug::slugify(title),
    };
    if slug.is_empty() || slug.starts_with('.') || slug.contains(['/', '\\']) {
        anyhow::bail!("Invalid slug: {:?}", slug);
    }

    let target_dir = site.content_dir.join(&slug).join(locale);
    let file_path = target_dir.join("index.md");

    // Check if an entry already exists for this locale
    if let Some(existing) = crate::content::ENTRY_FILES
        .iter()
        .map(|name| target_dir.join(name))
        .find(|path| path.exists())
    {
        anyhow::bail!("File already exists: {:?}", existing);
    }

    fs::create_dir_all(&target_dir)?;

    let now = chrono::Local::now();
    let content = format!(
        "---\ntitle: {}\ndescription: {}\ndate: {}\nauthor: {}\ntags: []\ndraft: true\n---\n\n",
        yaml_quote(title),
        yaml_quote(title),
        now.format("%Y-%m-%d"),
        yaml_quote(&site.config.title)
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

fn yaml_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
