use image::{ImageBuffer, Pixel, Rgba, RgbaImage};

use crate::{
    foundation::error::{SwathError, SwathResult},
    raster::Raster,
};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Straight to premultiplied alpha.
pub fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

/// Premultiplied to straight alpha.
pub fn unpremultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// Composite a premultiplied RGBA8 buffer of `width x height` onto `base` at `(x, y)`.
///
/// Only RGB and RGBA rasters are accepted; parts falling outside `base` are dropped.
pub fn composite_premul(
    base: &mut Raster,
    src: &[u8],
    width: u32,
    height: u32,
    x: i64,
    y: i64,
) -> SwathResult<()> {
    if src.len() != width as usize * height as usize * 4 {
        return Err(SwathError::raster(
            "composite_premul expects a width*height rgba8 buffer",
        ));
    }
    let (bw, bh) = base.dimensions();
    let src_px = |sx: u32, sy: u32| -> PremulRgba8 {
        let i = (sy as usize * width as usize + sx as usize) * 4;
        [src[i], src[i + 1], src[i + 2], src[i + 3]]
    };
    let placements = (0..height).flat_map(|sy| (0..width).map(move |sx| (sx, sy)));

    match base {
        Raster::Rgb(img) => {
            for (sx, sy) in placements {
                let Some((dx, dy)) = target(x, y, sx, sy, bw, bh) else {
                    continue;
                };
                let d = img.get_pixel_mut(dx, dy);
                let out = over([d[0], d[1], d[2], 255], src_px(sx, sy));
                d.0 = [out[0], out[1], out[2]];
            }
        }
        Raster::Rgba(img) => {
            for (sx, sy) in placements {
                let Some((dx, dy)) = target(x, y, sx, sy, bw, bh) else {
                    continue;
                };
                let d = img.get_pixel_mut(dx, dy);
                d.0 = unpremultiply(over(premultiply(d.0), src_px(sx, sy)));
            }
        }
        other => {
            return Err(SwathError::raster(format!(
                "cannot composite color onto {:?} raster",
                other.mode()
            )));
        }
    }
    Ok(())
}

fn target(x: i64, y: i64, sx: u32, sy: u32, bw: u32, bh: u32) -> Option<(u32, u32)> {
    let dx = u32::try_from(x + i64::from(sx)).ok()?;
    let dy = u32::try_from(y + i64::from(sy)).ok()?;
    (dx < bw && dy < bh).then_some((dx, dy))
}

/// Paste `overlay` onto `base` using the overlay's own alpha as the mask.
///
/// Every channel of `base`, alpha included, becomes `(o*m + b*(255-m)) / 255` with the overlay
/// pixel converted to the base color mode first.
pub fn blend_masked(base: &mut Raster, overlay: &RgbaImage) -> SwathResult<()> {
    if base.dimensions() != overlay.dimensions() {
        return Err(SwathError::overlay(format!(
            "overlay is {:?} but image is {:?}",
            overlay.dimensions(),
            base.dimensions()
        )));
    }
    match base {
        Raster::Luma(img) => blend_buf(img, overlay, |p| p.to_luma()),
        Raster::LumaA(img) => blend_buf(img, overlay, |p| p.to_luma_alpha()),
        Raster::Rgb(img) => blend_buf(img, overlay, |p| p.to_rgb()),
        Raster::Rgba(img) => blend_buf(img, overlay, |p| *p),
    }
    Ok(())
}

fn blend_buf<P: Pixel<Subpixel = u8>>(
    dst: &mut ImageBuffer<P, Vec<u8>>,
    overlay: &RgbaImage,
    convert: impl Fn(&Rgba<u8>) -> P,
) {
    for (d, o) in dst.pixels_mut().zip(overlay.pixels()) {
        let m = u16::from(o[3]);
        if m == 0 {
            continue;
        }
        let src = convert(o);
        let inv = 255 - m;
        for (dc, sc) in d.channels_mut().iter_mut().zip(src.channels()) {
            *dc = ((u32::from(*sc) * u32::from(m) + u32::from(*dc) * u32::from(inv) + 127) / 255)
                as u8;
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/raster/blend.rs"]
mod tests;
