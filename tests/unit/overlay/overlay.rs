use image::{Rgb, RgbImage, Rgba};

use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "swathscale_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn area(w: u32, h: u32) -> AreaDefinition {
    AreaDefinition {
        area_id: "eurol".into(),
        description: String::new(),
        projection: String::new(),
        width: w,
        height: h,
        area_extent: [0.0; 4],
    }
}

#[test]
fn svg_overlay_is_rasterized_at_area_size() {
    let tmp = temp_dir("overlay_svg");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("coasts.svg");
    std::fs::write(
        &path,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
            <rect x="0" y="0" width="5" height="10" fill="#ff0000"/>
        </svg>"##,
    )
    .unwrap();

    let overlay = SvgOverlayRenderer::new()
        .render(path.to_str().unwrap(), &area(20, 20))
        .unwrap();
    assert_eq!(overlay.dimensions(), (20, 20));
    assert_eq!(overlay.image().get_pixel(2, 10).0, [255, 0, 0, 255]);
    assert_eq!(overlay.image().get_pixel(18, 10).0[3], 0);
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn png_overlay_is_scaled_to_area_size() {
    let tmp = temp_dir("overlay_png");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("coasts.png");
    RgbaImage::from_pixel(5, 5, Rgba([0, 255, 0, 255]))
        .save(&path)
        .unwrap();
    let overlay = SvgOverlayRenderer::new()
        .render(path.to_str().unwrap(), &area(10, 8))
        .unwrap();
    assert_eq!(overlay.dimensions(), (10, 8));
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_overlay_file_is_an_error() {
    assert!(
        SvgOverlayRenderer::new()
            .render("/nonexistent/overlay.svg", &area(4, 4))
            .is_err()
    );
}

#[test]
fn fitted_overlay_tracks_crop_and_resize() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(9, 9, Rgba([1, 2, 3, 255]));
    let overlay = Overlay::new(img);
    let fitted = overlay.fitted(Some(CropRect::from_origin_size(5, 5, 5, 5)), Size::new(5, 5).unwrap());
    assert_eq!(fitted.dimensions(), (5, 5));
    assert_eq!(fitted.image().get_pixel(4, 4).0, [1, 2, 3, 255]);
}

#[test]
fn apply_pastes_through_alpha() {
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
    let overlay = Overlay::new(img);
    let mut raster = Raster::Rgb(RgbImage::from_pixel(2, 1, Rgb([10, 10, 10])));
    overlay.apply(&mut raster).unwrap();
    let Raster::Rgb(out) = raster else {
        panic!("expected rgb");
    };
    assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(out.get_pixel(1, 0).0, [10, 10, 10]);
}
