//! Text annotation: a solid background bar plus one line of text.
//!
//! Grayscale rasters are promoted to color before drawing. Text is set through an SVG document
//! rasterized with `resvg`; when no outline font is usable the built-in bitmap font is used.

/// Built-in bitmap font.
pub mod bitmap;
/// Text and background placement.
pub mod layout;

use std::sync::Arc;

use tracing::{debug, warn};
use usvg::fontdb::Database;

use crate::{
    config::text::TextSettings,
    fonts::{FontBook, FontChoice},
    foundation::{
        core::Rgb8,
        error::{SwathError, SwathResult},
    },
    raster::{ColorMode, Raster, blend::composite_premul, svg},
};

/// A rendered line of text, tightly cropped, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixels, row-major.
    pub premul_rgba8: Vec<u8>,
}

/// Draw `text` onto `raster` as configured by `settings`.
pub fn add_text(
    raster: Raster,
    text: &str,
    settings: &TextSettings,
    fonts: &FontBook,
) -> SwathResult<Raster> {
    let mut raster = match raster.mode() {
        ColorMode::L => {
            debug!("converting to RGB for text");
            raster.convert(ColorMode::Rgb)
        }
        ColorMode::LA => {
            debug!("converting to RGBA for text");
            raster.convert(ColorMode::Rgba)
        }
        _ => raster,
    };

    let glyphs = render_text(text, settings, fonts)?;
    let (w, h) = raster.dimensions();
    let placed = layout::place(settings, glyphs.width, glyphs.height, w, h);

    fill_rect(&mut raster, placed.bg, settings.bg_color)?;
    composite_premul(
        &mut raster,
        &glyphs.premul_rgba8,
        glyphs.width,
        glyphs.height,
        i64::from(placed.text_x),
        i64::from(placed.text_y),
    )?;
    Ok(raster)
}

/// Render one line of text with the first usable font of the cascade.
pub fn render_text(
    text: &str,
    settings: &TextSettings,
    fonts: &FontBook,
) -> SwathResult<TextBitmap> {
    if let FontChoice::Outline { db, family } = fonts.select(settings.font.as_deref()) {
        match render_outline(text, &family, settings.font_size, settings.text_color, db) {
            Ok(Some(bitmap)) => return Ok(bitmap),
            Ok(None) => warn!(family = %family, "no glyphs produced, falling back to bitmap font"),
            Err(err) => {
                warn!(family = %family, %err, "svg text failed, falling back to bitmap font")
            }
        }
    }
    Ok(bitmap::render(text, settings.font_size, settings.text_color))
}

fn render_outline(
    text: &str,
    family: &str,
    font_size: u32,
    color: Rgb8,
    db: Arc<Database>,
) -> SwathResult<Option<TextBitmap>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let size = font_size.max(1);
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    let canvas_w = chars.saturating_add(2).saturating_mul(size).saturating_mul(2);
    let canvas_h = size.saturating_mul(3);
    let doc = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{canvas_w}" height="{canvas_h}"><text x="0" y="{baseline}" font-family="{family}" font-size="{size}" fill="{fill}" xml:space="preserve">{body}</text></svg>"#,
        baseline = size.saturating_mul(2),
        family = xml_escape(family),
        fill = color.to_hex(),
        body = xml_escape(text),
    );

    let tree = svg::parse_svg(doc.as_bytes(), None, db)?;
    if tree.root().children().is_empty() {
        return Ok(None);
    }

    let bbox = tree.root().bounding_box();
    let width = bbox.width().ceil() as u32;
    let height = bbox.height().ceil() as u32;
    if width == 0 || height == 0 {
        return Ok(None);
    }
    let premul_rgba8 = svg::render_with(
        &tree,
        width,
        height,
        resvg::tiny_skia::Transform::from_translate(-bbox.x(), -bbox.y()),
    )?;
    Ok(Some(TextBitmap {
        width,
        height,
        premul_rgba8,
    }))
}

fn fill_rect(raster: &mut Raster, rect: (u32, u32, u32, u32), color: Rgb8) -> SwathResult<()> {
    let (x0, y0, x1, y1) = rect;
    let [r, g, b] = color.0;
    let cells = (y0..y1).flat_map(|y| (x0..x1).map(move |x| (x, y)));
    match raster {
        Raster::Rgb(img) => cells.for_each(|(x, y)| img.put_pixel(x, y, image::Rgb([r, g, b]))),
        Raster::Rgba(img) => {
            cells.for_each(|(x, y)| img.put_pixel(x, y, image::Rgba([r, g, b, 255])))
        }
        other => {
            return Err(SwathError::raster(format!(
                "cannot fill {:?} raster with color",
                other.mode()
            )));
        }
    }
    Ok(())
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/annotate.rs"]
mod tests;
