//! Helper functions for URLs and HTML text

mod html;
mod url;

pub use html::*;
pub use url::*;
