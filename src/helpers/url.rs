//! URL helper functions

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left alone when encoding a single path segment
/// (the unreserved set of `encodeURIComponent`)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/es/blog") // -> "/es/blog"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/es/about") // -> "https://asociacionanae.org/es/about"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of a page under a locale prefix, e.g. `("fr", "/faq")` -> `/fr/faq`
pub fn locale_path(locale: &str, page: &str) -> String {
    let page = page.trim_start_matches('/');
    if page.is_empty() {
        format!("/{}", locale)
    } else {
        format!("/{}/{}", locale, page)
    }
}

/// Path of a blog entry, with the slug percent-encoded
pub fn post_path(locale: &str, slug: &str) -> String {
    format!("/{}/blog/{}", locale, encode_slug(slug))
}

/// Percent-encode a slug for use as one URL path segment
pub fn encode_slug(slug: &str) -> String {
    utf8_percent_encode(slug, SEGMENT).to_string()
}

/// Decode a slug taken from a URL; invalid encodings are returned unchanged
pub fn decode_slug(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Make an image or link reference absolute against the site URL
pub fn absolute_url(config: &SiteConfig, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else {
        full_url_for(config, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.org/".to_string(),
            root: "/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/es/blog"), "/es/blog");
        assert_eq!(url_for(&config, ""), "/");

        let nested = SiteConfig {
            root: "/site/".to_string(),
            ..test_config()
        };
        assert_eq!(url_for(&nested, "fr/faq"), "/site/fr/faq");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/fr/about"),
            "https://example.org/fr/about"
        );
    }

    #[test]
    fn test_locale_path() {
        assert_eq!(locale_path("es", ""), "/es");
        assert_eq!(locale_path("fr", "/about/gallery"), "/fr/about/gallery");
    }

    #[test]
    fn test_encode_and_decode_slug() {
        assert_eq!(encode_slug("iftar-2024"), "iftar-2024");
        assert_eq!(encode_slug("a b"), "a%20b");
        let arabic = "إفطار";
        let encoded = encode_slug(arabic);
        assert!(encoded.starts_with('%'));
        assert_eq!(decode_slug(&encoded), arabic);
        assert_eq!(decode_slug(arabic), arabic);
        // not valid UTF-8 once decoded
        assert_eq!(decode_slug("%FF%FE"), "%FF%FE");
        assert_eq!(post_path("ar", "a/b"), "/ar/blog/a%2Fb");
    }

    #[test]
    fn test_absolute_url() {
        let config = test_config();
        assert_eq!(
            absolute_url(&config, "/images/iftar.jpg"),
            "https://example.org/images/iftar.jpg"
        );
        assert_eq!(
            absolute_url(&config, "images/iftar.jpg"),
            "https://example.org/images/iftar.jpg"
        );
        assert_eq!(
            absolute_url(&config, "https://cdn.example.com/x.png"),
            "https://cdn.example.com/x.png"
        );
    }
}
