use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime, format::Item, format::StrftimeItems};

use crate::{
    foundation::error::{SwathError, SwathResult},
    pattern::tokens::TokenValue,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Str,
    Int,
}

/// Format attached to a `{name:format}` placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FieldFormat {
    /// `{name}`: free text of at least one character.
    Plain,
    /// `{name:%Y%m%d}`: strftime timestamp, fixed width when every directive is.
    Time { fmt: String, width: Option<usize> },
    /// `{name:[[fill]align][0][width][s|d]}`.
    Text {
        fill: char,
        align: Align,
        width: Option<usize>,
        kind: FieldKind,
    },
}

impl FieldFormat {
    pub(crate) fn parse(spec: &str) -> SwathResult<Self> {
        if spec.is_empty() {
            return Ok(Self::Plain);
        }
        if spec.contains('%') {
            if StrftimeItems::new(spec).any(|item| matches!(item, Item::Error)) {
                return Err(SwathError::pattern(format!(
                    "invalid time format '{spec}'"
                )));
            }
            return Ok(Self::Time {
                fmt: spec.to_string(),
                width: strftime_width(spec),
            });
        }

        let bad = || SwathError::pattern(format!("unsupported field format '{spec}'"));
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0usize;
        let mut fill = ' ';
        let mut align = None;
        if chars.len() >= 2 && align_of(chars[1]).is_some() {
            fill = chars[0];
            align = align_of(chars[1]);
            i = 2;
        } else if let Some(a) = align_of(chars[0]) {
            align = Some(a);
            i = 1;
        }

        let mut zero = false;
        if chars.get(i) == Some(&'0') {
            zero = true;
            i += 1;
        }

        let digits_start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        let width = if i > digits_start {
            let digits: String = chars[digits_start..i].iter().collect();
            Some(digits.parse::<usize>().map_err(|_| bad())?)
        } else {
            None
        };

        let kind = match chars.get(i) {
            None => FieldKind::Str,
            Some('s') => FieldKind::Str,
            Some('d') => FieldKind::Int,
            Some(_) => return Err(bad()),
        };
        if chars.get(i).is_some() {
            i += 1;
        }
        if i != chars.len() {
            return Err(bad());
        }

        if zero && align.is_none() {
            fill = '0';
            align = Some(Align::Right);
        }
        let align = align.unwrap_or(match kind {
            FieldKind::Str => Align::Left,
            FieldKind::Int => Align::Right,
        });

        Ok(Self::Text {
            fill,
            align,
            width,
            kind,
        })
    }

    /// Width in characters when every rendering of this field has the same length.
    pub(crate) fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Plain => None,
            Self::Time { width, .. } | Self::Text { width, .. } => *width,
        }
    }

    pub(crate) fn render(&self, name: &str, value: &TokenValue) -> SwathResult<String> {
        let mismatch = || {
            SwathError::pattern(format!(
                "token '{name}' value {value:?} does not fit format {self:?}"
            ))
        };
        match (self, value) {
            (_, TokenValue::Wildcard) => Ok("*".to_string()),
            (Self::Plain, TokenValue::Str(s)) => Ok(s.clone()),
            (Self::Plain, TokenValue::Int(v)) => Ok(v.to_string()),
            (Self::Plain, TokenValue::Time(t)) => Ok(t.format("%Y-%m-%d %H:%M:%S").to_string()),
            (Self::Time { fmt, .. }, TokenValue::Time(t)) => {
                let mut out = String::new();
                write!(out, "{}", t.format(fmt)).map_err(|_| mismatch())?;
                Ok(out)
            }
            (Self::Time { .. }, _) => Err(mismatch()),
            (Self::Text { .. }, TokenValue::Time(_)) => Err(mismatch()),
            (
                Self::Text {
                    fill, align, width, ..
                },
                TokenValue::Int(v),
            ) => Ok(pad(&v.to_string(), *fill, *align, *width)),
            (
                Self::Text {
                    fill,
                    align,
                    width,
                    kind,
                },
                TokenValue::Str(s),
            ) => {
                let text = match kind {
                    FieldKind::Int => s.trim().parse::<i64>().map_err(|_| mismatch())?.to_string(),
                    FieldKind::Str => s.clone(),
                };
                Ok(pad(&text, *fill, *align, *width))
            }
        }
    }

    /// Decode one candidate substring; `None` means "does not match here".
    pub(crate) fn decode(&self, raw: &str) -> Option<TokenValue> {
        match self {
            Self::Plain => (!raw.is_empty()).then(|| TokenValue::Str(raw.to_string())),
            Self::Time { fmt, .. } => NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, fmt)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(TokenValue::Time),
            Self::Text {
                fill, align, kind, ..
            } => {
                let trimmed = match align {
                    Align::Left => raw.trim_end_matches(*fill),
                    Align::Right => raw.trim_start_matches(*fill),
                    Align::Center => raw.trim_matches(*fill),
                };
                match kind {
                    FieldKind::Str => (!raw.is_empty()).then(|| TokenValue::Str(trimmed.to_string())),
                    FieldKind::Int if trimmed.is_empty() && !raw.is_empty() && *fill == '0' => {
                        Some(TokenValue::Int(0))
                    }
                    FieldKind::Int => trimmed.parse::<i64>().ok().map(TokenValue::Int),
                }
            }
        }
    }
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        _ => None,
    }
}

fn pad(text: &str, fill: char, align: Align, width: Option<usize>) -> String {
    let len = text.chars().count();
    let Some(width) = width.filter(|w| *w > len) else {
        return text.to_string();
    };
    let missing = width - len;
    let (left, right) = match align {
        Align::Left => (0, missing),
        Align::Right => (missing, 0),
        Align::Center => (missing / 2, missing - missing / 2),
    };
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(text);
    out.extend(std::iter::repeat_n(fill, right));
    out
}

/// Rendered width of a strftime format, if constant.
fn strftime_width(fmt: &str) -> Option<usize> {
    let mut width = 0usize;
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            width += 1;
            continue;
        }
        width += match chars.next()? {
            'Y' => 4,
            'm' | 'd' | 'H' | 'M' | 'S' | 'y' | 'C' | 'I' | 'U' | 'W' | 'V' | 'g' => 2,
            'j' => 3,
            'b' | 'a' => 3,
            'p' => 2,
            'u' | 'w' | '%' => 1,
            _ => return None,
        };
    }
    Some(width)
}
