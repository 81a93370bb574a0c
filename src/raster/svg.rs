use std::{path::Path, sync::Arc};

use anyhow::Context;
use usvg::fontdb::Database;

use crate::{
    fonts::make_svg_font_resolver,
    foundation::error::{SwathError, SwathResult},
};

/// Parse an SVG document with text resolved against `fontdb`.
pub fn parse_svg(
    bytes: &[u8],
    resources_dir: Option<&Path>,
    fontdb: Arc<Database>,
) -> SwathResult<usvg::Tree> {
    let opts = usvg::Options {
        resources_dir: resources_dir.map(Path::to_path_buf),
        fontdb,
        font_resolver: make_svg_font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Render `tree` scaled to fill `width x height`; premultiplied RGBA8 out.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> SwathResult<Vec<u8>> {
    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    render_with(tree, width, height, resvg::tiny_skia::Transform::from_scale(sx, sy))
}

/// Render `tree` into a `width x height` pixmap under `transform`; premultiplied RGBA8 out.
pub fn render_with(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
    transform: resvg::tiny_skia::Transform,
) -> SwathResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SwathError::raster(format!("failed to allocate {width}x{height} pixmap")))?;
    resvg::render(tree, transform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}
