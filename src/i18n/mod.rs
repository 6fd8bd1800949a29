//! Locale helpers: Accept-Language negotiation and per-locale metadata

/// Locales written right-to-left
const RTL_LOCALES: [&str; 1] = ["ar"];

/// One entry of an Accept-Language header
#[derive(Debug, Clone, PartialEq)]
struct LanguageRange {
    /// Primary subtag, lowercased (`fr-FR` -> `fr`)
    code: String,
    quality: f32,
}

/// Parse an Accept-Language header, highest quality first
///
/// Entries keep header order when their quality is equal.
fn parse_accept_language(header: &str) -> Vec<LanguageRange> {
    let mut ranges: Vec<LanguageRange> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() {
                return None;
            }

            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            let code = tag.split('-').next().unwrap_or(tag).to_lowercase();
            Some(LanguageRange { code, quality })
        })
        .collect();

    // stable sort keeps header order for equal qualities
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Pick the best supported locale for an Accept-Language header
///
/// Falls back to `default` when the header is absent or nothing matches.
pub fn negotiate(accept_language: Option<&str>, supported: &[String], default: &str) -> String {
    let Some(header) = accept_language else {
        return default.to_string();
    };

    parse_accept_language(header)
        .into_iter()
        .filter(|range| range.quality > 0.0)
        .find(|range| supported.iter().any(|s| *s == range.code))
        .map(|range| range.code)
        .unwrap_or_else(|| default.to_string())
}

/// Whether a locale is written right-to-left
pub fn is_rtl(locale: &str) -> bool {
    RTL_LOCALES.contains(&locale)
}

/// `dir` attribute value for a locale
pub fn text_direction(locale: &str) -> &'static str {
    if is_rtl(locale) {
        "rtl"
    } else {
        "ltr"
    }
}

/// Open Graph locale for a site locale
pub fn og_locale(locale: &str) -> &'static str {
    match locale {
        "ar" => "ar_DZ",
        "es" => "es_ES",
        "fr" => "fr_FR",
        _ => "en_US",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Vec<String> {
        ["ar", "es", "fr", "en"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_negotiate_without_header() {
        assert_eq!(negotiate(None, &supported(), "es"), "es");
    }

    #[test]
    fn test_negotiate_quality_order() {
        let header = "de-DE,de;q=0.9,en;q=0.7,fr;q=0.8";
        assert_eq!(negotiate(Some(header), &supported(), "es"), "fr");
    }

    #[test]
    fn test_negotiate_region_subtag() {
        assert_eq!(negotiate(Some("fr-FR"), &supported(), "es"), "fr");
        assert_eq!(negotiate(Some("AR-dz,en;q=0.5"), &supported(), "es"), "ar");
    }

    #[test]
    fn test_negotiate_equal_quality_keeps_header_order() {
        assert_eq!(negotiate(Some("en, fr"), &supported(), "es"), "en");
    }

    #[test]
    fn test_negotiate_no_match_falls_back() {
        assert_eq!(negotiate(Some("de,it;q=0.5"), &supported(), "es"), "es");
        assert_eq!(negotiate(Some(""), &supported(), "es"), "es");
        assert_eq!(negotiate(Some("fr;q=0"), &supported(), "es"), "es");
    }

    #[test]
    fn test_locale_metadata() {
        assert!(is_rtl("ar"));
        assert!(!is_rtl("fr"));
        assert_eq!(text_direction("ar"), "rtl");
        assert_eq!(text_direction("es"), "ltr");
        assert_eq!(og_locale("ar"), "ar_DZ");
        assert_eq!(og_locale("es"), "es_ES");
        assert_eq!(og_locale("fr"), "fr_FR");
        assert_eq!(og_locale("en"), "en_US");
    }
}
