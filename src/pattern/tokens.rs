use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// Token holding the nominal acquisition time.
pub const TIME: &str = "time";
/// Token holding the area name.
pub const AREANAME: &str = "areaname";
/// Token holding the platform (satellite) name.
pub const PLATFORM_NAME: &str = "platform_name";
/// Token holding the satellite location / receiving station.
pub const SAT_LOC: &str = "sat_loc";
/// Token holding the composite (product) name.
pub const COMPOSITE: &str = "composite";
/// Token holding the output variant tag.
pub const TAG: &str = "tag";

/// A single value bound to a filename token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenValue {
    /// Plain text.
    Str(String),
    /// Integer parsed from a `d` field.
    Int(i64),
    /// Timestamp parsed from a strftime field.
    Time(NaiveDateTime),
    /// Glob wildcard; always composes to `*`.
    Wildcard,
}

impl TokenValue {
    /// Text view of string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp view of time values.
    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<&str> for TokenValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for TokenValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<NaiveDateTime> for TokenValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::Time(v)
    }
}

/// Mapping from token name to value, parsed from or composed into file names.
///
/// Scoped to a single notification; later steps overwrite individual tokens (e.g. `tag` per
/// output size) on their own copies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilenameTokens {
    values: BTreeMap<String, TokenValue>,
}

impl FilenameTokens {
    /// Empty token set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup a token.
    pub fn get(&self, name: &str) -> Option<&TokenValue> {
        self.values.get(name)
    }

    /// Lookup a token as text.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(TokenValue::as_str)
    }

    /// Whether a token is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Bind (or overwrite) a token.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TokenValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Bind a token to the glob wildcard.
    pub fn insert_wildcard(&mut self, name: impl Into<String>) {
        self.values.insert(name.into(), TokenValue::Wildcard);
    }

    /// Remove a token, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<TokenValue> {
        self.values.remove(name)
    }

    /// Copy of `self` with one token overwritten.
    pub fn with(&self, name: impl Into<String>, value: impl Into<TokenValue>) -> Self {
        let mut out = self.clone();
        out.insert(name, value);
        out
    }

    /// Number of bound tokens.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no token is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate tokens in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<TokenValue>> FromIterator<(K, V)> for FilenameTokens {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}
