use super::*;
use image::{GrayAlphaImage, GrayImage, Luma, LumaA};

fn settings() -> TextSettings {
    TextSettings {
        font: Some("/nonexistent/font.ttf".into()),
        bg_color: Rgb8([0, 0, 255]),
        text_color: Rgb8([255, 255, 0]),
        ..TextSettings::default()
    }
}

#[test]
fn grayscale_is_promoted_before_drawing() {
    let fonts = FontBook::new();
    let out = add_text(
        Raster::Luma(GrayImage::from_pixel(120, 60, Luma([50]))),
        "12:00 test",
        &settings(),
        &fonts,
    )
    .unwrap();
    assert_eq!(out.mode(), ColorMode::Rgb);
    let out = add_text(
        Raster::LumaA(GrayAlphaImage::from_pixel(120, 60, LumaA([50, 10]))),
        "12:00 test",
        &settings(),
        &fonts,
    )
    .unwrap();
    assert_eq!(out.mode(), ColorMode::Rgba);
}

#[test]
fn southern_bar_covers_bottom_rows_and_leaves_top_alone() {
    let fonts = FontBook::new();
    let out = add_text(
        Raster::Luma(GrayImage::from_pixel(120, 60, Luma([50]))),
        "12:00 test",
        &settings(),
        &fonts,
    )
    .unwrap();
    let Raster::Rgb(img) = out else {
        panic!("expected rgb");
    };
    assert_eq!(img.get_pixel(0, 59).0, [0, 0, 255]);
    assert_eq!(img.get_pixel(119, 59).0, [0, 0, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [50, 50, 50]);
}

#[test]
fn text_pixels_are_drawn_inside_the_bar() {
    let fonts = FontBook::new();
    let Raster::Rgb(img) = add_text(
        Raster::Rgb(image::RgbImage::new(200, 80)),
        "HELLO",
        &settings(),
        &fonts,
    )
    .unwrap() else {
        panic!("expected rgb");
    };
    let yellowish = img
        .pixels()
        .filter(|p| p.0[0] > 128 && p.0[1] > 128 && p.0[2] < 128)
        .count();
    assert!(yellowish > 0);
}

#[test]
fn xml_special_characters_are_escaped() {
    assert_eq!(xml_escape(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
}
