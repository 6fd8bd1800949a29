//! Content module - blog entries, front-matter and body rendering

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use error::{ContentError, FrontMatterError};
pub use frontmatter::{parse_date_string, FrontMatter, FrontMatterParser, Metadata, StandardParser};
pub use loader::{ContentResolver, ENTRY_FILES};
pub use markdown::{heading_id, MarkdownRenderer};
pub use post::{reading_time, BlogPost, BlogPostSummary, WORDS_PER_MINUTE};
