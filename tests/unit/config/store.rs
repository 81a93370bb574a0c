use super::*;
use crate::area::StaticAreaRegistry;

const INI: &str = r#"
[/image/eurol]
sizes = 100x100,50x50
tags = large,small
areaname = eurol
in_pattern = {time:%Y%m%d_%H%M}_{platform_name}_{areaname}_{composite}.png
out_pattern = {time:%Y%m%d_%H%M}_{platform_name}_{areaname}_{composite}_{tag}.png

[/image/broken]
tags = large
areaname = eurol
"#;

#[test]
fn topics_follow_section_order() {
    let store = ConfigStore::from_ini_str(INI).unwrap();
    assert_eq!(store.topics(), vec!["/image/eurol", "/image/broken"]);
}

#[test]
fn unknown_topic_is_reported() {
    let store = ConfigStore::from_ini_str(INI).unwrap();
    let err = store
        .resolve_profile("/image/nope", &StaticAreaRegistry::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownTopic(ref t) if t == "/image/nope"));
}

#[test]
fn missing_required_option_names_section_and_key() {
    let store = ConfigStore::from_ini_str(INI).unwrap();
    let err = store
        .resolve_profile("/image/broken", &StaticAreaRegistry::default())
        .unwrap_err();
    match err {
        ConfigError::Missing { section, key } => {
            assert_eq!(section, "/image/broken");
            assert_eq!(key, "sizes");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_error_converts_to_swath_config_error() {
    let err: SwathError = ConfigError::UnknownTopic("x".into()).into();
    assert!(err.to_string().starts_with("configuration error:"));
}
