//! Geographic overlays: pre-drawn graphics pasted onto area images through their alpha mask.

/// Populate-once overlay cache.
pub mod cache;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use image::RgbaImage;
use tracing::debug;
use usvg::fontdb::Database;

use crate::{
    area::AreaDefinition,
    fonts::FontBook,
    foundation::{
        core::{CropRect, Size},
        error::{SwathError, SwathResult},
    },
    raster::{Raster, blend, ops, svg},
};

pub use cache::OverlayCache;

/// Rendered overlay at an area's pixel size. Alpha is the paste mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    image: RgbaImage,
}

impl Overlay {
    /// Wrap an RGBA image.
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// The overlay pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The overlay put through the same crop and resize as an image, so it stays registered.
    pub fn fitted(&self, crop: Option<CropRect>, size: Size) -> Overlay {
        let raster = ops::resize(&ops::crop(&Raster::Rgba(self.image.clone()), crop), size);
        Overlay {
            image: raster.into_rgba8(),
        }
    }

    /// Paste onto `raster` through the overlay alpha.
    pub fn apply(&self, raster: &mut Raster) -> SwathResult<()> {
        blend::blend_masked(raster, &self.image)
    }
}

/// Renders the overlay described by a configuration reference for an area.
pub trait OverlayRenderer: Send + Sync {
    /// Render `overlay_config` at the pixel size of `area`.
    fn render(&self, overlay_config: &str, area: &AreaDefinition) -> SwathResult<Overlay>;
}

/// Renders overlay files: SVG documents are rasterized, anything else is decoded as an image.
/// Either way the result is scaled to the area's grid.
#[derive(Clone, Debug, Default)]
pub struct SvgOverlayRenderer {
    fonts: Arc<FontBook>,
}

impl SvgOverlayRenderer {
    /// Renderer using its own font book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer sharing `fonts` for text inside SVG overlays.
    pub fn with_fonts(fonts: Arc<FontBook>) -> Self {
        Self { fonts }
    }
}

impl OverlayRenderer for SvgOverlayRenderer {
    fn render(&self, overlay_config: &str, area: &AreaDefinition) -> SwathResult<Overlay> {
        let path = Path::new(overlay_config);
        let size = Size::new(area.width, area.height).map_err(|e| {
            SwathError::overlay(format!("area '{}' has no pixels: {e}", area.area_id))
        })?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read overlay '{}'", path.display()))?;

        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        let image = if is_svg {
            debug!(overlay = %path.display(), area = %area.area_id, "rasterizing svg overlay");
            let fontdb = self
                .fonts
                .system_db()
                .unwrap_or_else(|| Arc::new(Database::new()));
            let tree = svg::parse_svg(&bytes, path.parent(), fontdb)?;
            let premul = svg::rasterize_svg_to_premul_rgba8(&tree, size.width, size.height)?;
            let straight: Vec<u8> = premul
                .chunks_exact(4)
                .flat_map(|px| blend::unpremultiply([px[0], px[1], px[2], px[3]]))
                .collect();
            RgbaImage::from_raw(size.width, size.height, straight)
                .ok_or_else(|| SwathError::overlay("svg overlay buffer has wrong length"))?
        } else {
            debug!(overlay = %path.display(), area = %area.area_id, "decoding raster overlay");
            let decoded = image::load_from_memory(&bytes).context("decode overlay image")?;
            ops::resize(&Raster::Rgba(decoded.to_rgba8()), size).into_rgba8()
        };
        Ok(Overlay::new(image))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/overlay.rs"]
mod tests;
