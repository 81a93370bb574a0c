//! 8-bit rasters over the closed set of color modes the pipeline handles.

use std::{fs, path::Path};

use anyhow::Context;
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use crate::foundation::error::{SwathError, SwathResult};

/// Alpha-mask blending and premultiplied compositing.
pub mod blend;
/// Replace-if-valid merging into existing rasters.
pub mod merge;
/// Crop and resize.
pub mod ops;
/// SVG parsing and rasterization.
pub mod svg;

/// Color mode of a [`Raster`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Grayscale.
    L,
    /// Grayscale with alpha.
    LA,
    /// RGB.
    Rgb,
    /// RGB with alpha.
    Rgba,
}

impl ColorMode {
    /// Whether the mode carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::LA | Self::Rgba)
    }

    /// Whether the mode is grayscale.
    pub fn is_luma(self) -> bool {
        matches!(self, Self::L | Self::LA)
    }
}

/// Decoded 8-bit raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Raster {
    /// Grayscale.
    Luma(GrayImage),
    /// Grayscale with alpha.
    LumaA(GrayAlphaImage),
    /// RGB.
    Rgb(RgbImage),
    /// RGB with alpha.
    Rgba(RgbaImage),
}

impl Raster {
    /// Narrow a decoded image to an 8-bit raster, keeping its channel layout.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(i) => Self::Luma(i),
            DynamicImage::ImageLumaA8(i) => Self::LumaA(i),
            DynamicImage::ImageRgb8(i) => Self::Rgb(i),
            DynamicImage::ImageRgba8(i) => Self::Rgba(i),
            DynamicImage::ImageLuma16(_) => Self::Luma(img.to_luma8()),
            DynamicImage::ImageLumaA16(_) => Self::LumaA(img.to_luma_alpha8()),
            DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_) => {
                Self::Rgb(img.to_rgb8())
            }
            other => Self::Rgba(other.to_rgba8()),
        }
    }

    /// Owned [`DynamicImage`] copy, for codec and resampling calls.
    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Self::Luma(i) => DynamicImage::ImageLuma8(i.clone()),
            Self::LumaA(i) => DynamicImage::ImageLumaA8(i.clone()),
            Self::Rgb(i) => DynamicImage::ImageRgb8(i.clone()),
            Self::Rgba(i) => DynamicImage::ImageRgba8(i.clone()),
        }
    }

    /// Decode a raster file; the format comes from the content.
    pub fn open(path: &Path) -> SwathResult<Self> {
        let img = image::ImageReader::open(path)
            .with_context(|| format!("open raster '{}'", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("detect raster format of '{}'", path.display()))?
            .decode()
            .with_context(|| format!("decode raster '{}'", path.display()))?;
        Ok(Self::from_dynamic(img))
    }

    /// Encode to `path`, format from the extension. Parent directories are created.
    ///
    /// JPEG cannot carry alpha, so alpha is dropped for `.jpg`/`.jpeg` targets.
    pub fn save(&self, path: &Path) -> SwathResult<()> {
        let format = ImageFormat::from_path(path).map_err(|e| {
            SwathError::raster(format!("unsupported output '{}': {e}", path.display()))
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output directory '{}'", parent.display()))?;
        }

        let img = match (format, self.mode()) {
            (ImageFormat::Jpeg, ColorMode::LA) => {
                DynamicImage::ImageLuma8(self.to_dynamic().to_luma8())
            }
            (ImageFormat::Jpeg, ColorMode::Rgba) => {
                DynamicImage::ImageRgb8(self.to_dynamic().to_rgb8())
            }
            _ => self.to_dynamic(),
        };
        img.save_with_format(path, format)
            .with_context(|| format!("write raster '{}'", path.display()))?;
        Ok(())
    }

    /// Color mode.
    pub fn mode(&self) -> ColorMode {
        match self {
            Self::Luma(_) => ColorMode::L,
            Self::LumaA(_) => ColorMode::LA,
            Self::Rgb(_) => ColorMode::Rgb,
            Self::Rgba(_) => ColorMode::Rgba,
        }
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Luma(i) => i.dimensions(),
            Self::LumaA(i) => i.dimensions(),
            Self::Rgb(i) => i.dimensions(),
            Self::Rgba(i) => i.dimensions(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Consume into an RGBA image, converting when needed.
    pub fn into_rgba8(self) -> RgbaImage {
        match self {
            Self::Rgba(img) => img,
            other => other.to_dynamic().to_rgba8(),
        }
    }

    /// Copy converted to `mode`; a no-op clone when the mode already matches.
    pub fn convert(&self, mode: ColorMode) -> Self {
        if self.mode() == mode {
            return self.clone();
        }
        let img = self.to_dynamic();
        match mode {
            ColorMode::L => Self::Luma(img.to_luma8()),
            ColorMode::LA => Self::LumaA(img.to_luma_alpha8()),
            ColorMode::Rgb => Self::Rgb(img.to_rgb8()),
            ColorMode::Rgba => Self::Rgba(img.to_rgba8()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/raster.rs"]
mod tests;
