use chrono::NaiveDate;

use super::*;
use crate::{area::StaticAreaRegistry, config::ConfigStore};

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

fn profile(out_dir: &std::path::Path, extra: &str) -> Profile {
    let ini = format!(
        "[topic]\n\
         out_dir = {}\n\
         sizes = 4x4\n\
         tags = big\n\
         areaname = eurol\n\
         timeliness = 10\n\
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

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn current() -> FilenameTokens {
    [
        ("platform_name", TokenValue::from("NOAA19")),
        ("areaname", TokenValue::from("eurol")),
        ("composite", TokenValue::from("overview")),
        ("time", TokenValue::from(at(12, 0))),
    ]
    .into_iter()
    .collect()
}

fn touch(dir: &std::path::Path, name: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let p = dir.join(name);
    std::fs::write(&p, b"x").unwrap();
    p
}

#[test]
fn empty_directory_finds_nothing() {
    let tmp = temp_dir("detect_empty");
    let p = profile(&tmp, "");
    assert_eq!(
        check_existing(&p, &current(), at(12, 0)).unwrap(),
        Detection::Proceed(ExistingProduct::NoneFound)
    );
}

#[test]
fn earliest_minute_in_window_wins() {
    let tmp = temp_dir("detect_earliest");
    let late = touch(&tmp, "20240501_1210_NOAA19_eurol_natural_big.png");
    let early = touch(&tmp, "20240501_1150_NOAA19_eurol_natural_big.png");
    let p = profile(&tmp, "");
    let Detection::Proceed(ExistingProduct::Found { path, tokens }) =
        check_existing(&p, &current(), at(12, 0)).unwrap()
    else {
        panic!("expected a parsed match");
    };
    assert_eq!(path, early);
    assert_ne!(path, late);
    assert_eq!(tokens.get("time").unwrap().as_time(), Some(at(11, 50)));
    assert_eq!(tokens.get_str("composite"), Some("overview"));
    assert_eq!(tokens.get_str("tag"), Some("big"));
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn matches_outside_window_are_ignored() {
    let tmp = temp_dir("detect_outside");
    touch(&tmp, "20240501_1149_NOAA19_eurol_natural_big.png");
    touch(&tmp, "20240501_1211_NOAA19_eurol_natural_big.png");
    let p = profile(&tmp, "");
    assert_eq!(
        check_existing(&p, &current(), at(12, 0)).unwrap(),
        Detection::Proceed(ExistingProduct::NoneFound)
    );
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn other_platform_only_matches_in_backup_mode() {
    let tmp = temp_dir("detect_backup");
    let other = touch(&tmp, "20240501_1203_METOP-B_eurol_natural_big.png");

    let normal = profile(&tmp, "");
    assert_eq!(
        check_existing(&normal, &current(), at(12, 0)).unwrap(),
        Detection::Proceed(ExistingProduct::NoneFound)
    );

    let backup = profile(&tmp, "only_backup = true\n");
    assert_eq!(
        check_existing(&backup, &current(), at(12, 0)).unwrap(),
        Detection::Skip { path: other }
    );
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn unparsed_match_skips_only_under_any_match_policy() {
    let tmp = temp_dir("detect_unparsed");
    // The empty composite matches the glob but not the pattern.
    let odd = touch(&tmp, "20240501_1200_NOAA19_eurol__big.png");

    let normal = profile(&tmp, "");
    assert_eq!(
        check_existing(&normal, &current(), at(12, 0)).unwrap(),
        Detection::Proceed(ExistingProduct::Unparsed { path: odd.clone() })
    );

    let any = profile(&tmp, "only_backup = true\n");
    assert_eq!(
        check_existing(&any, &current(), at(12, 0)).unwrap(),
        Detection::Skip { path: odd.clone() }
    );

    let parsed = profile(&tmp, "only_backup = true\nbackup_skip_on = parsed_match\n");
    assert_eq!(
        check_existing(&parsed, &current(), at(12, 0)).unwrap(),
        Detection::Proceed(ExistingProduct::Unparsed { path: odd })
    );
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn unparsed_match_yields_empty_tokens() {
    let p = ExistingProduct::Unparsed {
        path: PathBuf::from("x"),
    };
    assert!(p.exists());
    assert_eq!(p.tokens(), Some(FilenameTokens::new()));
    assert_eq!(ExistingProduct::NoneFound.tokens(), None);
}
