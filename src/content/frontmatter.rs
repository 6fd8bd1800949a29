//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::FrontMatterError;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter fields of a blog entry, as written in the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub draft: Option<bool>,
}

/// Front-matter after required fields have been checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    /// Date as written; may be empty or unparsable
    pub date: String,
    pub author: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
}

impl FrontMatter {
    /// Check required fields and produce entry metadata
    pub fn into_metadata(self) -> Result<Metadata, FrontMatterError> {
        let title = required(self.title, "title")?;
        let description = required(self.description, "description")?;
        let author = required(self.author, "author")?;

        Ok(Metadata {
            title,
            description,
            date: self.date.unwrap_or_default(),
            author,
            image: self.image.filter(|i| !i.trim().is_empty()),
            tags: self.tags,
            draft: self.draft.unwrap_or(false),
        })
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, FrontMatterError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(FrontMatterError::MissingField(field)),
    }
}

/// Splits a raw content file into front-matter fields and body.
///
/// Implementations must not touch the filesystem; the resolver hands them
/// the whole file and keeps the returned body slice.
pub trait FrontMatterParser: Send + Sync {
    fn parse<'a>(&self, raw: &'a str) -> Result<(FrontMatter, &'a str), FrontMatterError>;
}

/// YAML between `---` fences, or JSON introduced by `;;;` or `{`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardParser;

impl FrontMatterParser for StandardParser {
    fn parse<'a>(&self, raw: &'a str) -> Result<(FrontMatter, &'a str), FrontMatterError> {
        let content = raw.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return parse_yaml(content);
        }

        if content.starts_with(";;;") || content.starts_with('{') {
            return parse_json(content);
        }

        Err(FrontMatterError::Missing)
    }
}

fn parse_yaml(content: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    // Skip opening ---
    let rest = &content[3..];
    let rest = rest.trim_start_matches(['\n', '\r']);

    // An empty block closes immediately
    let (yaml_content, remaining) = if let Some(after) = rest.strip_prefix("---") {
        ("", after)
    } else {
        let end_pos = rest.find("\n---").ok_or(FrontMatterError::Unterminated)?;
        (&rest[..end_pos], &rest[end_pos + 4..])
    };
    let remaining = remaining.trim_start_matches(['\n', '\r']);

    if yaml_content.trim().is_empty() {
        return Ok((FrontMatter::default(), remaining));
    }

    let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)?;
    Ok((fm, remaining))
}

fn parse_json(content: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    // JSON front-matter ends with ;;;
    if let Some(rest) = content.strip_prefix(";;;") {
        let end_pos = rest.find(";;;").ok_or(FrontMatterError::Unterminated)?;
        let json_content = &rest[..end_pos];
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        let fm: FrontMatter = serde_json::from_str(json_content)?;
        return Ok((fm, remaining));
    }

    // Otherwise a bare object at the start; find the matching closing brace
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut end_pos = None;
    for (i, c) in content.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end_pos = Some(i + 1);
                    break;
                }
            }
            _ => {}
        }
    }

    let end_pos = end_pos.ok_or(FrontMatterError::Unterminated)?;
    let fm: FrontMatter = serde_json::from_str(&content[..end_pos])?;
    let remaining = content[end_pos..].trim_start_matches(['\n', '\r']);
    Ok((fm, remaining))
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    None
}
