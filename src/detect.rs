//! Duplicate/update detection: search the timeliness window for an existing product.

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

use crate::{
    config::{BackupPolicy, Profile},
    foundation::error::{SwathError, SwathResult},
    pattern::{FilenameTokens, TokenValue, tokens},
};

/// Outcome of the window search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExistingProduct {
    /// Nothing matched: create a new product.
    NoneFound,
    /// A file matched but does not parse against the output pattern.
    Unparsed {
        /// First matching file.
        path: PathBuf,
    },
    /// A file matched and parsed.
    Found {
        /// First matching file.
        path: PathBuf,
        /// Its tokens, with `composite` (and outside backup mode `platform_name`) taken from the
        /// current message.
        tokens: FilenameTokens,
    },
}

impl ExistingProduct {
    /// Whether a prior product exists at all.
    pub fn exists(&self) -> bool {
        !matches!(self, Self::NoneFound)
    }

    /// Tokens of a parsed match; empty for an unparsed one.
    pub fn tokens(&self) -> Option<FilenameTokens> {
        match self {
            Self::NoneFound => None,
            Self::Unparsed { .. } => Some(FilenameTokens::new()),
            Self::Found { tokens, .. } => Some(tokens.clone()),
        }
    }
}

/// What to do with the current message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Detection {
    /// Backup mode and a product already exists: produce nothing.
    Skip {
        /// The file that made the message redundant.
        path: PathBuf,
    },
    /// Go ahead, updating the existing product if there is one.
    Proceed(ExistingProduct),
}

/// Scan minute offsets `0..=2*timeliness` from `start_time - timeliness`; the earliest minute with
/// any match decides.
pub fn check_existing(
    profile: &Profile,
    current: &FilenameTokens,
    start_time: NaiveDateTime,
) -> SwathResult<Detection> {
    let window = i64::from(profile.timeliness);
    let first = start_time - Duration::minutes(window);

    let mut query = current.clone();
    query.insert(tokens::TAG, profile.first_tag());
    query.insert_wildcard(tokens::COMPOSITE);
    if profile.is_backup {
        query.insert_wildcard(tokens::PLATFORM_NAME);
        query.insert_wildcard(tokens::SAT_LOC);
    }

    let mut found = ExistingProduct::NoneFound;
    for i in 0..=2 * window {
        query.insert(tokens::TIME, first + Duration::minutes(i));
        let expr = profile.out_pattern.compose_glob(&query)?;
        let Some(path) = first_match(&expr)? else {
            continue;
        };
        debug!(path = %path.display(), "found existing product");
        found = parse_match(profile, current, path);
        break;
    }

    if profile.is_backup {
        let skip = match (&found, profile.backup_policy) {
            (ExistingProduct::NoneFound, _) => None,
            (ExistingProduct::Unparsed { .. }, BackupPolicy::ParsedMatch) => None,
            (ExistingProduct::Unparsed { path } | ExistingProduct::Found { path, .. }, _) => {
                Some(path.clone())
            }
        };
        if let Some(path) = skip {
            info!(path = %path.display(), "file already exists, no backup needed");
            return Ok(Detection::Skip { path });
        }
    }
    Ok(Detection::Proceed(found))
}

fn first_match(expr: &str) -> SwathResult<Option<PathBuf>> {
    let paths = glob::glob(expr)
        .map_err(|e| SwathError::pattern(format!("invalid glob '{expr}': {e}")))?;
    let mut hits: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    hits.sort();
    Ok(hits.into_iter().next())
}

fn parse_match(profile: &Profile, current: &FilenameTokens, path: PathBuf) -> ExistingProduct {
    let parsed = path
        .to_str()
        .ok_or_else(|| SwathError::pattern(format!("non-UTF-8 path '{}'", path.display())))
        .and_then(|s| profile.out_pattern.parse(s));
    let mut found = match parsed {
        Ok(t) => t,
        Err(err) => {
            debug!(
                path = %path.display(),
                pattern = %profile.out_pattern,
                %err,
                "existing product does not parse"
            );
            return ExistingProduct::Unparsed { path };
        }
    };

    carry_over(&mut found, current, tokens::COMPOSITE);
    if !profile.is_backup {
        carry_over(&mut found, current, tokens::PLATFORM_NAME);
    }
    ExistingProduct::Found {
        path,
        tokens: found,
    }
}

fn carry_over(tokens: &mut FilenameTokens, current: &FilenameTokens, name: &str) {
    if let Some(value) = current.get(name).filter(|v| **v != TokenValue::Wildcard) {
        tokens.insert(name, value.clone());
    }
}

#[cfg(test)]
#[path = "../tests/unit/detect.rs"]
mod tests;
