use std::{fmt::Debug, path::PathBuf, str::FromStr};

use tracing::{debug, warn};

use crate::{
    area::{AreaDefinition, AreaRegistry},
    config::{
        store::ConfigError,
        text::{TextAnnotation, TextSettings},
        topic::TopicConfig,
    },
    foundation::core::{CropRect, Size},
    pattern::Pattern,
};

/// Default timeliness window, minutes either side of the start time.
pub const DEFAULT_TIMELINESS: u32 = 10;

/// What counts as "already exists" in backup mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackupPolicy {
    /// Any file matching the glob suppresses output.
    #[default]
    AnyMatch,
    /// Only a match that parses against the output pattern suppresses output.
    ParsedMatch,
}

impl FromStr for BackupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any_match" => Ok(Self::AnyMatch),
            "parsed_match" => Ok(Self::ParsedMatch),
            other => Err(format!("unknown backup policy '{other}'")),
        }
    }
}

/// One configured output: target size, optional crop and tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputVariant {
    /// Target dimensions.
    pub size: Size,
    /// Crop applied before resizing.
    pub crop: Option<CropRect>,
    /// Tag distinguishing this output from its siblings.
    pub tag: String,
}

/// Fully resolved processing profile for one topic.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    /// Topic this profile belongs to.
    pub topic: String,
    /// Output directory; empty means the working directory.
    pub out_dir: PathBuf,
    /// Merge into an existing product instead of writing a new one.
    pub update_existing: bool,
    /// Backup mode: suppress output once a matching product exists.
    pub is_backup: bool,
    /// Backup skip rule.
    pub backup_policy: BackupPolicy,
    /// Crops, sizes and tags zipped by index. Never empty.
    pub outputs: Vec<OutputVariant>,
    /// Minutes either side of the start time searched for existing products.
    pub timeliness: u32,
    /// Latest composite path pattern, joined onto `out_dir`.
    pub latest_composite: Option<Pattern>,
    /// Area name.
    pub areaname: String,
    /// Input filename pattern with `{areaname}` substituted.
    pub in_pattern: Pattern,
    /// Output path pattern, joined onto `out_dir`.
    pub out_pattern: Pattern,
    /// Text annotation, if configured.
    pub text: Option<TextAnnotation>,
    /// Area definition from the registry.
    pub area_def: Option<AreaDefinition>,
    /// Overlay configuration reference.
    pub overlay_config: Option<String>,
    /// Strip `-` from the parsed platform name.
    pub use_platform_name_hack: bool,
}

impl Profile {
    /// Apply defaults and validate a raw topic section.
    pub fn resolve(cfg: TopicConfig, areas: &dyn AreaRegistry) -> Result<Self, ConfigError> {
        let topic = cfg.topic.clone();
        let missing = |key: &str| ConfigError::Missing {
            section: topic.clone(),
            key: key.to_string(),
        };
        let invalid = |key: &str, value: &str, reason: String| ConfigError::InvalidValue {
            section: topic.clone(),
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        let sizes = cfg.sizes.ok_or_else(|| missing("sizes"))?;
        let tags = cfg.tags.ok_or_else(|| missing("tags"))?;
        if sizes.len() != tags.len() {
            return Err(invalid(
                "tags",
                &tags.join(","),
                format!("{} tags for {} sizes", tags.len(), sizes.len()),
            ));
        }
        let mut crops = cfg.crops.unwrap_or_default();
        if crops.len() > sizes.len() {
            warn!(topic = %topic, crops = crops.len(), sizes = sizes.len(), "extra crops ignored");
        }
        crops.resize(sizes.len(), None);
        let outputs = sizes
            .into_iter()
            .zip(tags)
            .zip(crops)
            .map(|((size, tag), crop)| OutputVariant { size, crop, tag })
            .collect();

        let areaname = cfg.areaname.ok_or_else(|| missing("areaname"))?;
        let raw_in = cfg.in_pattern.ok_or_else(|| missing("in_pattern"))?;
        let raw_out = cfg.out_pattern.ok_or_else(|| missing("out_pattern"))?;

        let out_dir = PathBuf::from(defaulted(&topic, "out_dir", cfg.out_dir, String::new()));
        let compile = |key: &str, source: &str| {
            Pattern::new(source).map_err(|e| invalid(key, source, e.to_string()))
        };
        let in_pattern = compile("in_pattern", &raw_in.replace("{areaname}", &areaname))?;
        let out_pattern = compile("out_pattern", &join_dir(&out_dir, &raw_out))?;
        let latest_composite = match cfg.latest_composite_image {
            Some(raw) => {
                optional_pattern(&topic, "latest_composite_image", &join_dir(&out_dir, &raw))
            }
            None => {
                debug!(topic = %topic, "no latest composite configured");
                None
            }
        };

        let text = match cfg.text.and_then(|raw| optional_pattern(&topic, "text", &raw)) {
            Some(pattern) => {
                let base = TextSettings::default();
                let settings = TextSettings {
                    location: defaulted(&topic, "text_location", cfg.text_location, base.location),
                    font: cfg.font,
                    font_size: defaulted(&topic, "font_size", cfg.font_size, base.font_size),
                    text_color: defaulted(&topic, "text_color", cfg.text_color, base.text_color),
                    bg_color: defaulted(&topic, "text_bg_color", cfg.text_bg_color, base.bg_color),
                    x_margin: defaulted(&topic, "x_marginal", cfg.x_marginal, base.x_margin),
                    y_margin: defaulted(&topic, "y_marginal", cfg.y_marginal, base.y_margin),
                    bg_extra_width: cfg.bg_extra_width,
                };
                Some(TextAnnotation { pattern, settings })
            }
            None => {
                debug!(topic = %topic, "no text annotation configured");
                None
            }
        };

        let area_def = areas.lookup(&areaname);
        if area_def.is_none() && cfg.overlay_config.is_some() {
            warn!(topic = %topic, areaname = %areaname, "no area definition found, overlays disabled");
        } else if area_def.is_none() {
            debug!(topic = %topic, areaname = %areaname, "no area definition found");
        }

        Ok(Self {
            update_existing: defaulted(&topic, "update_existing", cfg.update_existing, false),
            is_backup: defaulted(&topic, "only_backup", cfg.only_backup, false),
            backup_policy: defaulted(
                &topic,
                "backup_skip_on",
                cfg.backup_skip_on,
                BackupPolicy::default(),
            ),
            timeliness: defaulted(&topic, "timeliness", cfg.timeliness, DEFAULT_TIMELINESS),
            use_platform_name_hack: defaulted(
                &topic,
                "use_platform_name_hack",
                cfg.use_platform_name_hack,
                false,
            ),
            overlay_config: cfg.overlay_config,
            topic,
            out_dir,
            outputs,
            latest_composite,
            areaname,
            in_pattern,
            out_pattern,
            text,
            area_def,
        })
    }

    /// Tag of the first output, used when searching for existing products.
    pub fn first_tag(&self) -> &str {
        self.outputs.first().map_or("", |o| o.tag.as_str())
    }
}

fn defaulted<T: Debug>(topic: &str, key: &str, value: Option<T>, default: T) -> T {
    value.unwrap_or_else(|| {
        debug!(topic, key, ?default, "option not given, using default");
        default
    })
}

/// Optional patterns degrade to "not configured" instead of failing the topic.
fn optional_pattern(topic: &str, key: &str, source: &str) -> Option<Pattern> {
    Pattern::new(source)
        .inspect_err(|err| {
            warn!(topic, key, value = source, %err, "malformed pattern, option disabled");
        })
        .ok()
}

fn join_dir(dir: &std::path::Path, pattern: &str) -> String {
    if dir.as_os_str().is_empty() {
        pattern.to_string()
    } else {
        dir.join(pattern).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/profile.rs"]
mod tests;
