//! Regular-expression patterns as they appear in rule and cache-group configuration.
//!
//! A [`Pattern`] keeps the source text it was written with so that configurations
//! serialize back to exactly what the user declared. Patterns written in JavaScript
//! literal style (`/\.js$/`) are accepted: the surrounding slashes and trailing flags
//! are stripped, and `\/` is unescaped.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern from its source text.
    ///
    /// ```
    /// use weft_config::Pattern;
    ///
    /// let js = Pattern::new(r"\.js$").unwrap();
    /// assert!(js.is_match("src/js/index.js"));
    ///
    /// let literal = Pattern::new(r"/\.(s*)css$/").unwrap();
    /// assert_eq!(literal.as_str(), r"\.(s*)css$");
    /// ```
    pub fn new(source: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = source.into();
        let normalized = normalize_literal(&raw);
        let regex = Regex::new(&normalized).map_err(|e| ConfigError::InvalidPattern {
            pattern: raw.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: normalized,
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

/// Strip JavaScript regex literal syntax (`/body/flags`) down to the body.
///
/// The `i` flag is kept as an inline `(?i)` group; `g`, `m`, `u`, `y` have no
/// effect on a single `is_match` call and are dropped.
fn normalize_literal(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return trimmed.to_string();
    };
    let Some(end) = rest.rfind('/') else {
        return trimmed.to_string();
    };
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    if !flags.chars().all(|c| "gimsuy".contains(c)) {
        return trimmed.to_string();
    }

    let body = body.replace(r"\/", "/");
    if flags.contains('i') {
        format!("(?i){body}")
    } else {
        body
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Pattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::new(s)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(source).map_err(serde::de::Error::custom)
    }
}
