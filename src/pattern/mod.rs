//! Filename pattern language.
//!
//! Patterns are plain text with named placeholders: `{name}` or `{name:format}`. A format
//! containing `%` is a strftime timestamp (`{time:%Y%m%d_%H%M}`), anything else follows the
//! `[[fill]align][0][width][s|d]` mini-language (`{orbit:05d}`, `{tag:>4s}`). Literal braces are
//! written `{{` and `}}`.
//!
//! A [`Pattern`] both parses concrete file names into [`FilenameTokens`] and composes file names
//! back from tokens; composing the tokens produced by a parse yields the same file name.

mod format;
/// Token names and the token map.
pub mod tokens;

use format::FieldFormat;
pub use tokens::{FilenameTokens, TokenValue};

use crate::foundation::error::{SwathError, SwathResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { name: String, format: FieldFormat },
}

/// Compiled filename pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a pattern string.
    pub fn new(source: &str) -> SwathResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(SwathError::pattern(format!(
                            "unterminated placeholder in '{source}'"
                        )));
                    }
                    let (name, spec) = body.split_once(':').unwrap_or((body.as_str(), ""));
                    if name.is_empty() {
                        return Err(SwathError::pattern(format!(
                            "empty placeholder name in '{source}'"
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field {
                        name: name.to_string(),
                        format: FieldFormat::parse(spec)?,
                    });
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(SwathError::pattern(format!(
                        "unmatched '}}' in '{source}'"
                    )));
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The source string this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the pattern has a placeholder called `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_names().any(|n| n == name)
    }

    /// Compose a concrete string; every placeholder must have a token.
    pub fn compose(&self, tokens: &FilenameTokens) -> SwathResult<String> {
        self.compose_with(tokens, str::to_string)
    }

    /// Compose a glob expression: literal text is escaped, [`TokenValue::Wildcard`] becomes `*`.
    pub fn compose_glob(&self, tokens: &FilenameTokens) -> SwathResult<String> {
        self.compose_with(tokens, glob::Pattern::escape)
    }

    fn compose_with(
        &self,
        tokens: &FilenameTokens,
        escape: impl Fn(&str) -> String,
    ) -> SwathResult<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(&escape(text)),
                Segment::Field { name, format } => {
                    let value = tokens.get(name).ok_or_else(|| {
                        SwathError::pattern(format!(
                            "missing token '{name}' for pattern '{}'",
                            self.source
                        ))
                    })?;
                    match value {
                        TokenValue::Wildcard => out.push('*'),
                        value => out.push_str(&escape(&format.render(name, value)?)),
                    }
                }
            }
        }
        Ok(out)
    }

    /// Parse a concrete string into tokens. The whole input must match.
    pub fn parse(&self, input: &str) -> SwathResult<FilenameTokens> {
        let mut bound = Vec::new();
        if self.match_from(0, input, &mut bound) {
            Ok(bound.into_iter().collect())
        } else {
            Err(SwathError::pattern(format!(
                "'{input}' does not match pattern '{}'",
                self.source
            )))
        }
    }

    /// Backtracking matcher; variable-width fields try the shortest candidate first.
    fn match_from(&self, index: usize, rest: &str, bound: &mut Vec<(String, TokenValue)>) -> bool {
        let Some(segment) = self.segments.get(index) else {
            return rest.is_empty();
        };

        let (name, format) = match segment {
            Segment::Literal(text) => {
                return rest
                    .strip_prefix(text.as_str())
                    .is_some_and(|tail| self.match_from(index + 1, tail, bound));
            }
            Segment::Field { name, format } => (name, format),
        };

        let boundaries = rest
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(rest.len()));
        let candidates: Vec<usize> = match format.fixed_width() {
            Some(width) => boundaries.clone().nth(width).into_iter().collect(),
            None => boundaries.filter(|end| *end > 0).collect(),
        };
        let next_literal = match self.segments.get(index + 1) {
            Some(Segment::Literal(text)) => Some(text.as_str()),
            _ => None,
        };

        for end in candidates {
            let tail = &rest[end..];
            if next_literal.is_some_and(|lit| !tail.starts_with(lit)) {
                continue;
            }
            let Some(value) = format.decode(&rest[..end]) else {
                continue;
            };
            if bound.iter().any(|(n, v)| n == name && *v != value) {
                continue;
            }
            bound.push((name.clone(), value));
            if self.match_from(index + 1, tail, bound) {
                return true;
            }
            bound.pop();
        }
        false
    }
}

impl std::str::FromStr for Pattern {
    type Err = SwathError;

    fn from_str(s: &str) -> SwathResult<Self> {
        Self::new(s)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/pattern.rs"]
mod tests;
