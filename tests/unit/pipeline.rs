use chrono::NaiveDate;
use image::{Rgb, RgbImage};

use super::*;
use crate::{area::StaticAreaRegistry, config::ConfigStore, overlay::SvgOverlayRenderer};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "swathscale_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn profile(out_dir: &Path, extra: &str) -> Profile {
    let ini = format!(
        "[topic]\n\
         out_dir = {}\n\
         sizes = 8x8,4x4\n\
         tags = big,small\n\
         areaname = eurol\n\
         in_pattern = {{time:%Y%m%d_%H%M}}_{{platform_name}}_{{areaname}}_{{composite}}.png\n\
         out_pattern = {{time:%Y%m%d_%H%M}}_{{platform_name}}_{{areaname}}_{{composite}}_{{tag}}.png\n\
         {extra}",
        out_dir.display()
    );
    ConfigStore::from_ini_str(&ini)
        .unwrap()
        .resolve_profile("topic", &StaticAreaRegistry::default())
        .unwrap()
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn input_tokens_parse_the_base_name() {
    let p = profile(Path::new("/out"), "use_platform_name_hack = true\n");
    let t = input_tokens(
        &p,
        Path::new("/in/20240501_1200_NOAA-19_eurol_overview.png"),
        noon(),
    );
    assert_eq!(t.get_str("platform_name"), Some("NOAA19"));
    assert_eq!(t.get_str("composite"), Some("overview"));
    assert_eq!(t.get("time").unwrap().as_time(), Some(noon()));
}

#[test]
fn unmatched_input_name_falls_back_to_areaname_and_start_time() {
    let p = profile(Path::new("/out"), "");
    let t = input_tokens(&p, Path::new("/in/whatever.png"), noon());
    assert_eq!(t.len(), 2);
    assert_eq!(t.get_str("areaname"), Some("eurol"));
    assert_eq!(t.get("time").unwrap().as_time(), Some(noon()));
}

#[test]
fn every_size_is_written_from_the_source() {
    let tmp = temp_dir("pipeline_sizes");
    let p = profile(&tmp, "latest_composite_image = latest_{tag}.png\n");
    let source_path = PathBuf::from("/in/20240501_1200_NOAA19_eurol_overview.png");
    let ctx = MessageContext {
        tokens: input_tokens(&p, &source_path, noon()),
        profile: p,
        source_path,
        start_time: noon(),
        existing: ExistingProduct::NoneFound,
        source: Raster::Rgb(RgbImage::from_pixel(16, 16, Rgb([200, 100, 50]))),
    };
    let overlays = OverlayCache::new();
    let renderer = SvgOverlayRenderer::new();
    let fonts = FontBook::new();
    let written = save_images(
        &ctx,
        Services {
            overlays: &overlays,
            renderer: &renderer,
            fonts: &fonts,
        },
    );
    assert_eq!(
        written,
        vec![
            tmp.join("20240501_1200_NOAA19_eurol_overview_big.png"),
            tmp.join("latest_big.png"),
            tmp.join("20240501_1200_NOAA19_eurol_overview_small.png"),
            tmp.join("latest_small.png"),
        ]
    );
    assert_eq!(Raster::open(&written[0]).unwrap().dimensions(), (8, 8));
    assert_eq!(Raster::open(&written[2]).unwrap().dimensions(), (4, 4));
    assert!(overlays.is_empty());
    std::fs::remove_dir_all(&tmp).ok();
}

fn run(ctx: &MessageContext) -> Vec<PathBuf> {
    let overlays = OverlayCache::new();
    let renderer = SvgOverlayRenderer::new();
    let fonts = FontBook::new();
    save_images(
        ctx,
        Services {
            overlays: &overlays,
            renderer: &renderer,
            fonts: &fonts,
        },
    )
}

fn write_rgb(path: &Path, w: u32, h: u32) {
    Raster::Rgb(RgbImage::from_pixel(w, h, Rgb([1, 2, 3])))
        .save(path)
        .unwrap();
}

#[test]
fn unparsed_existing_product_only_updates_latest_composite() {
    let tmp = temp_dir("pipeline_unparsed");
    let p = profile(
        &tmp,
        "update_existing = true
latest_composite_image = latest_{tag}.png
",
    );
    let ctx = MessageContext {
        tokens: input_tokens(&p, Path::new("x.png"), noon()),
        profile: p,
        source_path: PathBuf::from("x.png"),
        start_time: noon(),
        existing: ExistingProduct::Unparsed {
            path: tmp.join("odd.png"),
        },
        source: Raster::Rgb(RgbImage::new(8, 8)),
    };
    assert_eq!(
        run(&ctx),
        vec![tmp.join("latest_big.png"), tmp.join("latest_small.png")]
    );
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn failing_size_does_not_stop_the_next_one() {
    let tmp = temp_dir("pipeline_partial");
    std::fs::create_dir_all(&tmp).unwrap();
    let p = profile(&tmp, "update_existing = true
");
    let source_path = PathBuf::from("/in/20240501_1200_NOAA19_eurol_overview.png");
    let tokens = input_tokens(&p, &source_path, noon());
    let big = tmp.join("20240501_1200_NOAA19_eurol_overview_big.png");
    write_rgb(&big, 3, 3);

    let ctx = MessageContext {
        existing: ExistingProduct::Found {
            path: big.clone(),
            tokens: tokens.clone(),
        },
        tokens,
        profile: p,
        source_path,
        start_time: noon(),
        source: Raster::Rgb(RgbImage::from_pixel(16, 16, Rgb([200, 100, 50]))),
    };
    assert_eq!(
        run(&ctx),
        vec![tmp.join("20240501_1200_NOAA19_eurol_overview_small.png")]
    );
    assert_eq!(Raster::open(&big).unwrap().dimensions(), (3, 3));
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn latest_composite_failure_keeps_the_written_product() {
    let tmp = temp_dir("pipeline_latest_fail");
    std::fs::create_dir_all(&tmp).unwrap();
    let p = profile(&tmp, "latest_composite_image = latest_{tag}.png
");
    write_rgb(&tmp.join("latest_big.png"), 3, 3);
    let source_path = PathBuf::from("/in/20240501_1200_NOAA19_eurol_overview.png");
    let ctx = MessageContext {
        tokens: input_tokens(&p, &source_path, noon()),
        profile: p,
        source_path,
        start_time: noon(),
        existing: ExistingProduct::NoneFound,
        source: Raster::Rgb(RgbImage::from_pixel(16, 16, Rgb([200, 100, 50]))),
    };
    assert_eq!(
        run(&ctx),
        vec![
            tmp.join("20240501_1200_NOAA19_eurol_overview_big.png"),
            tmp.join("20240501_1200_NOAA19_eurol_overview_small.png"),
            tmp.join("latest_small.png"),
        ]
    );
    std::fs::remove_dir_all(&tmp).ok();
}
