//! Per-message transform pipeline: crop, resize, overlay, annotate and merge, once per output.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::{
    annotate,
    config::{OutputVariant, Profile},
    detect::ExistingProduct,
    fonts::FontBook,
    foundation::error::{SwathError, SwathResult},
    overlay::{OverlayCache, OverlayRenderer},
    pattern::{FilenameTokens, tokens},
    raster::{Raster, merge, ops},
};

/// Everything one notification needs, built fresh per message.
#[derive(Clone, Debug)]
pub struct MessageContext {
    /// Profile resolved for the message topic.
    pub profile: Profile,
    /// Source raster path.
    pub source_path: PathBuf,
    /// Nominal acquisition time.
    pub start_time: NaiveDateTime,
    /// Tokens of the source file name.
    pub tokens: FilenameTokens,
    /// Prior product found by the detector.
    pub existing: ExistingProduct,
    /// Decoded source raster.
    pub source: Raster,
}

/// Tokens for an input file: parsed from its base name, falling back to `areaname` and `time`.
pub fn input_tokens(profile: &Profile, path: &Path, start_time: NaiveDateTime) -> FilenameTokens {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let mut parsed = match profile.in_pattern.parse(name) {
        Ok(t) => t,
        Err(err) => {
            info!(file = name, %err, "file pattern doesn't match, using defaults");
            FilenameTokens::new()
        }
    };

    parsed.insert(tokens::AREANAME, profile.areaname.as_str());
    if !parsed.contains(tokens::TIME) {
        parsed.insert(tokens::TIME, start_time);
    }
    if profile.use_platform_name_hack
        && let Some(name) = parsed.get_str(tokens::PLATFORM_NAME)
    {
        let stripped = name.replace('-', "");
        parsed.insert(tokens::PLATFORM_NAME, stripped);
    }
    parsed
}

/// Shared collaborators used while transforming.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    /// Overlay cache keyed by topic.
    pub overlays: &'a OverlayCache,
    /// Renderer used on overlay cache misses.
    pub renderer: &'a dyn OverlayRenderer,
    /// Font databases for annotation.
    pub fonts: &'a FontBook,
}

/// Run every configured output. Failed outputs are logged and skipped; written paths returned.
pub fn save_images(ctx: &MessageContext, services: Services<'_>) -> Vec<PathBuf> {
    let profile = &ctx.profile;
    let skip_products = match &ctx.existing {
        ExistingProduct::Unparsed { path } if profile.update_existing => {
            warn!(
                path = %path.display(),
                pattern = %profile.out_pattern,
                "existing product name does not parse, not updating products"
            );
            true
        }
        _ => false,
    };

    let mut written = Vec::new();
    for (index, variant) in profile.outputs.iter().enumerate() {
        if let Err(err) = save_variant(ctx, variant, services, skip_products, &mut written) {
            warn!(
                index,
                tag = %variant.tag,
                %err,
                "failed to produce output, continuing with next size"
            );
        }
    }
    written
}

fn save_variant(
    ctx: &MessageContext,
    variant: &OutputVariant,
    services: Services<'_>,
    skip_product: bool,
    written: &mut Vec<PathBuf>,
) -> SwathResult<()> {
    let profile = &ctx.profile;
    let mut img = ops::resize(&ops::crop(&ctx.source, variant.crop), variant.size);
    add_overlay(ctx, variant, services, &mut img)?;
    let current = ctx.tokens.with(tokens::TAG, variant.tag.as_str());

    if !skip_product {
        written.push(save_product(ctx, variant, &img, &current, services.fonts)?);
    }

    if let Some(pattern) = &profile.latest_composite {
        let latest = pattern.compose(&current).and_then(|path| {
            let path = PathBuf::from(path);
            let merged = merge::update_existing_image(&path, &img)?;
            add_text(profile, merged, &current, services.fonts)?.save(&path)?;
            Ok(path)
        });
        match latest {
            Ok(path) => {
                info!(path = %path.display(), "updated latest composite image");
                written.push(path);
            }
            Err(err) => warn!(tag = %variant.tag, %err, "failed to update latest composite image"),
        }
    }
    Ok(())
}

fn save_product(
    ctx: &MessageContext,
    variant: &OutputVariant,
    img: &Raster,
    current: &FilenameTokens,
    fonts: &FontBook,
) -> SwathResult<PathBuf> {
    let profile = &ctx.profile;
    let (path, out) = match ctx.existing.tokens() {
        Some(existing) if profile.update_existing => {
            let existing = existing.with(tokens::TAG, variant.tag.as_str());
            let path = PathBuf::from(profile.out_pattern.compose(&existing)?);
            info!(path = %path.display(), source = %ctx.source_path.display(), "updating image");
            let merged = merge::update_existing_image(&path, img)?;
            (path, add_text(profile, merged, &existing, fonts)?)
        }
        _ => {
            let path = PathBuf::from(profile.out_pattern.compose(current)?);
            (path, add_text(profile, img.clone(), current, fonts)?)
        }
    };
    out.save(&path)?;
    info!(path = %path.display(), "saved image");
    Ok(path)
}

fn add_overlay(
    ctx: &MessageContext,
    variant: &OutputVariant,
    services: Services<'_>,
    img: &mut Raster,
) -> SwathResult<()> {
    let profile = &ctx.profile;
    let Some(overlay_config) = profile.overlay_config.as_deref() else {
        return Ok(());
    };
    let Some(area) = profile.area_def.as_ref() else {
        debug!(topic = %profile.topic, "no area definition, skipping overlay");
        return Ok(());
    };

    let overlay =
        services
            .overlays
            .get_or_render(&profile.topic, overlay_config, area, services.renderer)?;
    if overlay.dimensions() != ctx.source.dimensions() {
        warn!(
            overlay = ?overlay.dimensions(),
            image = ?ctx.source.dimensions(),
            "overlay and source sizes differ, overlay may be misregistered"
        );
    }
    info!("adding overlays");
    overlay.fitted(variant.crop, variant.size).apply(img)
}

fn add_text(
    profile: &Profile,
    img: Raster,
    tokens: &FilenameTokens,
    fonts: &FontBook,
) -> SwathResult<Raster> {
    let Some(text) = &profile.text else {
        return Ok(img);
    };
    let line = text
        .pattern
        .compose(tokens)
        .map_err(|e| SwathError::pattern(format!("text annotation: {e}")))?;
    annotate::add_text(img, &line, &text.settings, fonts)
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
