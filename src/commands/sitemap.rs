//! Write the sitemap

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Site;

/// Print the sitemap, or write it to `output`
pub fn run(site: &Site, output: Option<&Path>) -> Result<()> {
    let xml = site.sitemap();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, xml)?;
            tracing::info!("Sitemap written to {:?}", path);
        }
        None => print!("{}", xml),
    }

    Ok(())
}
