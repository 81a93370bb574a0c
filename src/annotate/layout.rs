use crate::config::text::{HorizontalAnchor, TextSettings, VerticalAnchor};

/// Where the text and its background bar land on an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextLayout {
    /// Top-left corner of the text.
    pub text_x: u32,
    /// Top-left corner of the text.
    pub text_y: u32,
    /// Background box `(x0, y0, x1, y1)`, end-exclusive, within the image.
    pub bg: (u32, u32, u32, u32),
}

/// Place text of `text_w x text_h` on an `img_w x img_h` image.
///
/// Northern east and center placements sit flush with the top edge; every other placement keeps
/// `y_margin` of padding. All coordinates are clamped into the image.
pub fn place(
    settings: &TextSettings,
    text_w: u32,
    text_h: u32,
    img_w: u32,
    img_h: u32,
) -> TextLayout {
    let (tw, th) = (i64::from(text_w), i64::from(text_h));
    let (w, h) = (i64::from(img_w), i64::from(img_h));
    let xm = i64::from(settings.x_margin);
    let ym = i64::from(settings.y_margin);
    let loc = settings.location;

    let x = match loc.horizontal {
        HorizontalAnchor::West => xm,
        HorizontalAnchor::East => w - tw - xm,
        HorizontalAnchor::Center => (w - tw) / 2,
    };
    let (y, box_y0, box_y1) = match loc.vertical {
        VerticalAnchor::South => (h - th - 2 * ym, h - th - 2 * ym, h),
        VerticalAnchor::North => {
            let y = match loc.horizontal {
                HorizontalAnchor::West => ym,
                _ => 0,
            };
            (y, 0, th + 2 * ym)
        }
    };
    let (box_x0, box_x1) = match settings.bg_extra_width {
        Some(e) => (x - i64::from(e), x + tw + i64::from(e)),
        None => (0, w),
    };

    let clamp = |v: i64, hi: i64| u32::try_from(v.clamp(0, hi.max(0))).unwrap_or(0);
    TextLayout {
        text_x: clamp(x, w - tw),
        text_y: clamp(y, h - th),
        bg: (
            clamp(box_x0, w),
            clamp(box_y0, h),
            clamp(box_x1, w),
            clamp(box_y1, h),
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/layout.rs"]
mod tests;
