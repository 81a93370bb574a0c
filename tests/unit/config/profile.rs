use super::*;
use crate::{
    area::StaticAreaRegistry,
    config::{store::ConfigStore, text::HorizontalAnchor, text::VerticalAnchor},
    foundation::core::Rgb8,
};

fn resolve(body: &str) -> Result<Profile, ConfigError> {
    let ini = format!("[topic]\n{body}");
    let store = ConfigStore::from_ini_str(&ini).unwrap();
    store.resolve_profile("topic", &StaticAreaRegistry::default())
}

const REQUIRED: &str = "sizes = 100x100\n\
tags = big\n\
areaname = eurol\n\
in_pattern = {time:%Y%m%d_%H%M}_{areaname}.png\n\
out_pattern = {time:%Y%m%d_%H%M}_{areaname}_{tag}.png\n";

#[test]
fn defaults_apply_when_options_are_absent() {
    let p = resolve(REQUIRED).unwrap();
    assert_eq!(p.out_dir, PathBuf::new());
    assert!(!p.update_existing);
    assert!(!p.is_backup);
    assert_eq!(p.backup_policy, BackupPolicy::AnyMatch);
    assert_eq!(p.timeliness, DEFAULT_TIMELINESS);
    assert!(p.latest_composite.is_none());
    assert!(p.text.is_none());
    assert!(p.overlay_config.is_none());
    assert!(p.area_def.is_none());
    assert!(!p.use_platform_name_hack);
    assert_eq!(p.outputs.len(), 1);
    assert_eq!(p.outputs[0].crop, None);
    assert_eq!(p.first_tag(), "big");
}

#[test]
fn areaname_is_substituted_and_out_dir_joined() {
    let p = resolve(&format!("{REQUIRED}out_dir = /data/out\n")).unwrap();
    assert_eq!(p.in_pattern.as_str(), "{time:%Y%m%d_%H%M}_eurol.png");
    assert_eq!(
        p.out_pattern.as_str(),
        "/data/out/{time:%Y%m%d_%H%M}_{areaname}_{tag}.png"
    );
}

#[test]
fn text_settings_take_defaults_and_overrides() {
    let p = resolve(&format!(
        "{REQUIRED}text = {{time:%H:%M}} {{areaname}}\ntext_location = NE\nfont_size = 20\ntext_color = 255,0,0\n"
    ))
    .unwrap();
    let text = p.text.unwrap();
    assert_eq!(text.pattern.as_str(), "{time:%H:%M} {areaname}");
    let s = text.settings;
    assert_eq!(s.location.vertical, VerticalAnchor::North);
    assert_eq!(s.location.horizontal, HorizontalAnchor::East);
    assert_eq!(s.font_size, 20);
    assert_eq!(s.text_color, Rgb8([255, 0, 0]));
    assert_eq!(s.bg_color, Rgb8::WHITE);
    assert_eq!((s.x_margin, s.y_margin), (10, 3));
    assert_eq!(s.bg_extra_width, None);
}

#[test]
fn crops_are_padded_and_unparseable_entries_mean_no_crop() {
    let p = resolve(
        "sizes = 100x100,50x50,10x10\n\
         tags = a,b,c\n\
         crops = 1000x300+103+200,none\n\
         areaname = eurol\n\
         in_pattern = {areaname}.png\n\
         out_pattern = {areaname}_{tag}.png\n",
    )
    .unwrap();
    let crops: Vec<_> = p.outputs.iter().map(|o| o.crop).collect();
    assert_eq!(
        crops,
        vec![Some(CropRect::from_origin_size(103, 200, 1000, 300)), None, None]
    );
}

#[test]
fn sizes_and_tags_must_have_equal_length() {
    let err = resolve(
        "sizes = 100x100,50x50\ntags = a\nareaname = x\nin_pattern = a\nout_pattern = b\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "tags"));
}

#[test]
fn malformed_required_size_is_invalid() {
    let err = resolve("sizes = 100x\ntags = a\nareaname = x\nin_pattern = a\nout_pattern = b\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "sizes"));
}

#[test]
fn malformed_optional_values_fall_back_to_defaults() {
    let p = resolve(&format!(
        "{REQUIRED}timeliness = soon\nupdate_existing = maybe\nonly_backup = Yes\nbackup_skip_on = parsed_match\n"
    ))
    .unwrap();
    assert_eq!(p.timeliness, DEFAULT_TIMELINESS);
    assert!(!p.update_existing);
    assert!(p.is_backup);
    assert_eq!(p.backup_policy, BackupPolicy::ParsedMatch);
}

#[test]
fn area_definition_is_looked_up_by_areaname() {
    let store = ConfigStore::from_ini_str(&format!("[topic]\n{REQUIRED}")).unwrap();
    let areas = StaticAreaRegistry::from_json_str(r#"[{"area_id":"eurol","width":8,"height":4}]"#)
        .unwrap();
    let p = store.resolve_profile("topic", &areas).unwrap();
    assert_eq!(p.area_def.unwrap().width, 8);
}

#[test]
fn malformed_optional_patterns_disable_the_option() {
    let p = resolve(&format!(
        "{REQUIRED}text = {{unclosed\nlatest_composite_image = latest_{{bad\ntimeliness = 5\n"
    ))
    .unwrap();
    assert!(p.text.is_none());
    assert!(p.latest_composite.is_none());
    assert_eq!(p.timeliness, 5);
}

#[test]
fn malformed_required_pattern_is_invalid() {
    let err = resolve("sizes = 1x1\ntags = a\nareaname = x\nin_pattern = {oops\nout_pattern = b\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "in_pattern"));
}
