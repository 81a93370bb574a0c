use std::{path::PathBuf, str::FromStr};

use tracing::warn;

use crate::{
    config::{profile::BackupPolicy, store::ConfigError, text::TextLocation},
    foundation::core::{CropRect, Rgb8, Size},
};

/// Raw, option-typed view of one topic section.
///
/// Every field is `None` when the option is absent. Malformed optional values are logged and
/// dropped here; malformed required values (`sizes`, `tags`, `areaname`, `in_pattern`,
/// `out_pattern`) are errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicConfig {
    /// Section name.
    pub topic: String,
    /// `out_dir`.
    pub out_dir: Option<String>,
    /// `update_existing`.
    pub update_existing: Option<bool>,
    /// `only_backup`.
    pub only_backup: Option<bool>,
    /// `crops`; one entry per listed crop, `None` meaning no cropping.
    pub crops: Option<Vec<Option<CropRect>>>,
    /// `sizes`.
    pub sizes: Option<Vec<Size>>,
    /// `tags`.
    pub tags: Option<Vec<String>>,
    /// `timeliness`, minutes.
    pub timeliness: Option<u32>,
    /// `latest_composite_image`.
    pub latest_composite_image: Option<String>,
    /// `areaname`.
    pub areaname: Option<String>,
    /// `in_pattern`, before area name substitution.
    pub in_pattern: Option<String>,
    /// `out_pattern`, relative to `out_dir`.
    pub out_pattern: Option<String>,
    /// `text`.
    pub text: Option<String>,
    /// `text_location`.
    pub text_location: Option<TextLocation>,
    /// `font`.
    pub font: Option<PathBuf>,
    /// `font_size`.
    pub font_size: Option<u32>,
    /// `text_color`.
    pub text_color: Option<Rgb8>,
    /// `text_bg_color`.
    pub text_bg_color: Option<Rgb8>,
    /// `x_marginal`.
    pub x_marginal: Option<u32>,
    /// `y_marginal`.
    pub y_marginal: Option<u32>,
    /// `bg_extra_width`.
    pub bg_extra_width: Option<u32>,
    /// `overlay_config`.
    pub overlay_config: Option<String>,
    /// `use_platform_name_hack`.
    pub use_platform_name_hack: Option<bool>,
    /// `backup_skip_on`.
    pub backup_skip_on: Option<BackupPolicy>,
}

impl TopicConfig {
    /// Read a section through `get`, which looks up one option by name.
    pub fn from_section<'a>(
        topic: &str,
        get: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<Self, ConfigError> {
        let reader = SectionReader { topic, get: &get };

        Ok(Self {
            topic: topic.to_string(),
            out_dir: reader.string("out_dir"),
            update_existing: reader.optional("update_existing", parse_bool),
            only_backup: reader.optional("only_backup", parse_bool),
            crops: reader
                .string("crops")
                .map(|v| v.split(',').map(|c| reader.crop(c)).collect()),
            sizes: reader.required_list("sizes", |s| Size::from_str(s).ok())?,
            tags: reader.required_list("tags", |s| Some(s.to_string()))?,
            timeliness: reader.optional("timeliness", |v| v.parse().ok()),
            latest_composite_image: reader.string("latest_composite_image"),
            areaname: reader.string("areaname"),
            in_pattern: reader.string("in_pattern"),
            out_pattern: reader.string("out_pattern"),
            text: reader.string("text"),
            text_location: reader.optional("text_location", |v| TextLocation::from_str(v).ok()),
            font: reader.string("font").map(PathBuf::from),
            font_size: reader.optional("font_size", |v| v.parse().ok()),
            text_color: reader.optional("text_color", |v| Rgb8::from_str(v).ok()),
            text_bg_color: reader.optional("text_bg_color", |v| Rgb8::from_str(v).ok()),
            x_marginal: reader.optional("x_marginal", |v| v.parse().ok()),
            y_marginal: reader.optional("y_marginal", |v| v.parse().ok()),
            bg_extra_width: reader.optional("bg_extra_width", |v| v.parse().ok()),
            overlay_config: reader.string("overlay_config"),
            use_platform_name_hack: reader.optional("use_platform_name_hack", parse_bool),
            backup_skip_on: reader.optional("backup_skip_on", |v| BackupPolicy::from_str(v).ok()),
        })
    }
}

struct SectionReader<'s, 'a, F: Fn(&str) -> Option<&'a str>> {
    topic: &'s str,
    get: &'s F,
}

impl<'a, F: Fn(&str) -> Option<&'a str>> SectionReader<'_, 'a, F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.get)(key).map(|v| v.trim().to_string())
    }

    fn optional<T>(&self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = (self.get)(key)?.trim();
        let parsed = parse(raw);
        if parsed.is_none() {
            warn!(topic = self.topic, key, value = raw, "malformed option, using default");
        }
        parsed
    }

    /// Comma separated list; absent is `None`, any malformed entry is an error.
    fn required_list<T>(
        &self,
        key: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<Vec<T>>, ConfigError> {
        let Some(raw) = (self.get)(key) else {
            return Ok(None);
        };
        raw.split(',')
            .map(|item| {
                let item = item.trim();
                if item.is_empty() {
                    return Err(self.invalid(key, raw, "empty list entry"));
                }
                parse(item).ok_or_else(|| self.invalid(key, raw, &format!("bad entry '{item}'")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Entries without both `x` and `+` mean "no crop".
    fn crop(&self, entry: &str) -> Option<CropRect> {
        let entry = entry.trim();
        if !(entry.contains('x') && entry.contains('+')) {
            return None;
        }
        match CropRect::from_str(entry) {
            Ok(rect) => Some(rect),
            Err(err) => {
                warn!(topic = self.topic, entry, %err, "malformed crop, not cropping");
                None
            }
        }
    }

    fn invalid(&self, key: &str, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            section: self.topic.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// `true/false/yes/no/on/off/1/0`, case-insensitive.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
