use image::imageops::FilterType;
use tracing::debug;

use crate::{
    foundation::core::{CropRect, Size},
    raster::Raster,
};

/// Resampling filter used for every resize.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Crop to `rect` clamped into the raster bounds.
///
/// `None` and rectangles that clamp to nothing return the raster unchanged.
pub fn crop(raster: &Raster, rect: Option<CropRect>) -> Raster {
    let Some(rect) = rect else {
        return raster.clone();
    };
    let (w, h) = raster.dimensions();
    let Some(px) = rect.clamp_to(w, h) else {
        debug!(?rect, w, h, "crop rectangle empty after clamping, not cropping");
        return raster.clone();
    };
    if (px.x, px.y, px.width, px.height) == (0, 0, w, h) {
        return raster.clone();
    }
    Raster::from_dynamic(
        raster
            .to_dynamic()
            .crop_imm(px.x, px.y, px.width, px.height),
    )
}

/// Resample to exactly `size`; a no-op when the dimensions already match.
pub fn resize(raster: &Raster, size: Size) -> Raster {
    if raster.dimensions() == (size.width, size.height) {
        return raster.clone();
    }
    Raster::from_dynamic(
        raster
            .to_dynamic()
            .resize_exact(size.width, size.height, RESIZE_FILTER),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/raster/ops.rs"]
mod tests;
