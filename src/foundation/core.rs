use std::str::FromStr;

use crate::foundation::error::{SwathError, SwathResult};

/// Target output dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Construct a size, rejecting zero-area dimensions.
    pub fn new(width: u32, height: u32) -> SwathResult<Self> {
        if width == 0 || height == 0 {
            return Err(SwathError::config(format!(
                "size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl FromStr for Size {
    type Err = SwathError;

    /// Parse `<width>x<height>`, e.g. `1024x768`.
    fn from_str(s: &str) -> SwathResult<Self> {
        let (w, h) = s
            .trim()
            .split_once('x')
            .ok_or_else(|| SwathError::config(format!("invalid size '{s}', expected WxH")))?;
        let w = w
            .trim()
            .parse::<u32>()
            .map_err(|e| SwathError::config(format!("invalid size width in '{s}': {e}")))?;
        let h = h
            .trim()
            .parse::<u32>()
            .map_err(|e| SwathError::config(format!("invalid size height in '{s}': {e}")))?;
        Self::new(w, h)
    }
}

/// Absolute crop rectangle `(x0, y0) .. (x1, y1)` with the origin at the top-left corner.
///
/// Coordinates are signed so that configured rectangles reaching outside the image survive until
/// they are clamped against a concrete raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CropRect {
    /// Left edge (inclusive).
    pub x0: i64,
    /// Top edge (inclusive).
    pub y0: i64,
    /// Right edge (exclusive).
    pub x1: i64,
    /// Bottom edge (exclusive).
    pub y1: i64,
}

/// A crop rectangle clamped into raster bounds, in `(x, y, width, height)` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels, always > 0.
    pub width: u32,
    /// Height in pixels, always > 0.
    pub height: u32,
}

impl CropRect {
    /// Build from the origin and extent of a `<w>x<h>+<x>+<y>` crop string.
    pub fn from_origin_size(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(w),
            y1: y.saturating_add(h),
        }
    }

    /// Clamp into `[0, width] x [0, height]`.
    ///
    /// Returns `None` when nothing of the rectangle survives clamping.
    pub fn clamp_to(self, width: u32, height: u32) -> Option<PixelRect> {
        let (w, h) = (i64::from(width), i64::from(height));
        let x0 = self.x0.clamp(0, w);
        let y0 = self.y0.clamp(0, h);
        let x1 = self.x1.clamp(0, w);
        let y1 = self.y1.clamp(0, h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect {
            x: u32::try_from(x0).ok()?,
            y: u32::try_from(y0).ok()?,
            width: u32::try_from(x1 - x0).ok()?,
            height: u32::try_from(y1 - y0).ok()?,
        })
    }
}

impl FromStr for CropRect {
    type Err = SwathError;

    /// Parse `<w>x<h>+<x>+<y>`, e.g. `1000x300+103+200`.
    fn from_str(s: &str) -> SwathResult<Self> {
        let bad = || SwathError::config(format!("invalid crop '{s}', expected WxH+X+Y"));
        let mut parts = s.trim().split('+');
        let extent = parts.next().ok_or_else(bad)?;
        let x = parts.next().ok_or_else(bad)?;
        let y = parts.next().ok_or_else(bad)?;
        if parts.next().is_some() {
            return Err(bad());
        }
        let (w, h) = extent.split_once('x').ok_or_else(bad)?;
        let num = |v: &str| v.trim().parse::<i64>().map_err(|_| bad());
        Ok(Self::from_origin_size(num(x)?, num(y)?, num(w)?, num(h)?))
    }
}

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb8(pub [u8; 3]);

impl Rgb8 {
    /// Black.
    pub const BLACK: Self = Self([0, 0, 0]);
    /// White.
    pub const WHITE: Self = Self([255, 255, 255]);

    /// CSS hex form, e.g. `#ff8000`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for Rgb8 {
    type Err = SwathError;

    /// Parse a comma separated `r,g,b` triple.
    fn from_str(s: &str) -> SwathResult<Self> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SwathError::config(format!("invalid color '{s}': {e}")))?;
        match values.as_slice() {
            [r, g, b] => Ok(Self([*r, *g, *b])),
            _ => Err(SwathError::config(format!(
                "invalid color '{s}', expected r,g,b"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
