use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named refresh operation plus the query string the phase supplies for it,
/// written as `name?query` (e.g. `fixtures?mode=live`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointDescriptor {
    name: String,
    query: Option<String>,
}

impl EndpointDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: None,
        }
    }

    pub fn with_query(name: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            name: name.into(),
            query: (!query.is_empty()).then_some(query),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Percent-decoded `key=value` pairs of the phase-supplied query. A bare key maps to
    /// an empty value.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .unwrap_or_default()
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (decode_component(key), decode_component(value)),
                None => (decode_component(part), String::new()),
            })
            .collect()
    }
}

/// Form-style decoding: `+` is a space, `%XX` a byte. Sequences that do not decode to
/// UTF-8 are kept as written.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.name, query),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for EndpointDescriptor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (name, query) = match raw.split_once('?') {
            Some((name, query)) => (name, query),
            None => (raw, ""),
        };

        let name_is_valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !name_is_valid || query.chars().any(char::is_whitespace) {
            return Err(AppError::invalid_endpoint(s));
        }

        Ok(Self::with_query(name, query))
    }
}

impl TryFrom<String> for EndpointDescriptor {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EndpointDescriptor> for String {
    fn from(descriptor: EndpointDescriptor) -> Self {
        descriptor.to_string()
    }
}
