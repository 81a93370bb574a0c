use std::path::Path;

use image::{ImageBuffer, Pixel};
use tracing::{debug, info, warn};

use crate::{
    foundation::error::{SwathError, SwathResult},
    raster::Raster,
};

/// A pixel carries data when any channel, alpha included, is non-zero.
pub fn is_valid<P: Pixel<Subpixel = u8>>(px: &P) -> bool {
    px.channels().iter().any(|c| *c > 0)
}

/// Fold `new` into `existing`: valid new pixels replace, invalid ones keep the existing pixel.
///
/// `existing` is converted to the color mode of `new` first; the result has the mode of `new`.
pub fn merge_valid_pixels(existing: &Raster, new: &Raster) -> SwathResult<Raster> {
    if existing.dimensions() != new.dimensions() {
        return Err(SwathError::raster(format!(
            "cannot merge {:?} raster into existing {:?} raster",
            new.dimensions(),
            existing.dimensions()
        )));
    }

    let merged = match (existing.convert(new.mode()), new) {
        (Raster::Luma(mut old), Raster::Luma(new)) => {
            merge_into(&mut old, new);
            Raster::Luma(old)
        }
        (Raster::LumaA(mut old), Raster::LumaA(new)) => {
            merge_into(&mut old, new);
            Raster::LumaA(old)
        }
        (Raster::Rgb(mut old), Raster::Rgb(new)) => {
            merge_into(&mut old, new);
            Raster::Rgb(old)
        }
        (Raster::Rgba(mut old), Raster::Rgba(new)) => {
            merge_into(&mut old, new);
            Raster::Rgba(old)
        }
        (old, new) => {
            return Err(SwathError::raster(format!(
                "color mode mismatch after conversion: {:?} vs {:?}",
                old.mode(),
                new.mode()
            )));
        }
    };
    Ok(merged)
}

fn merge_into<P: Pixel<Subpixel = u8>>(
    old: &mut ImageBuffer<P, Vec<u8>>,
    new: &ImageBuffer<P, Vec<u8>>,
) {
    for (dst, src) in old.pixels_mut().zip(new.pixels()) {
        if is_valid(src) {
            *dst = *src;
        }
    }
}

/// Merge `new` into the raster stored at `path`.
///
/// A missing or unreadable file is not an error: `new` is returned unchanged.
pub fn update_existing_image(path: &Path, new: &Raster) -> SwathResult<Raster> {
    if !path.exists() {
        debug!(path = %path.display(), "no existing raster, using new data as is");
        return Ok(new.clone());
    }
    let existing = match Raster::open(path) {
        Ok(r) => r,
        Err(err) => {
            warn!(path = %path.display(), %err, "existing raster unreadable, replacing it");
            return Ok(new.clone());
        }
    };
    info!(path = %path.display(), "updating existing raster");
    merge_valid_pixels(&existing, new)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/merge.rs"]
mod tests;
