//! HTML text helpers

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Trim a user-supplied value and cut it to at most `max_chars` characters
pub fn clip(s: &str, max_chars: usize) -> String {
    let trimmed = s.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => trimmed[..byte_pos].to_string(),
        None => trimmed.to_string(),
    }
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#039;y&#039;&lt;/script&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("  hello  ", 10), "hello");
        assert_eq!(clip("hello world", 5), "hello");
        assert_eq!(clip("مرحبا بكم", 5), "مرحبا");
        assert_eq!(clip("", 5), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 20, None), "Hello World");
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hello World", 6, Some("…")), "Hello…");
    }
}
