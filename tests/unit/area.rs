use super::*;

#[test]
fn json_registry_looks_up_by_area_id() {
    let reg = StaticAreaRegistry::from_json_str(
        r#"[
            {"area_id": "euron1", "description": "Northern Europe", "width": 3000, "height": 800,
             "projection": "+proj=stere +lat_0=90", "area_extent": [-1.0, -2.0, 3.0, 4.0]},
            {"area_id": "eurol", "width": 1024, "height": 1024}
        ]"#,
    )
    .unwrap();
    assert_eq!(reg.len(), 2);
    let a = reg.lookup("euron1").unwrap();
    assert_eq!((a.width, a.height), (3000, 800));
    assert_eq!(a.area_extent, [-1.0, -2.0, 3.0, 4.0]);
    assert_eq!(reg.lookup("eurol").unwrap().projection, "");
    assert!(reg.lookup("missing").is_none());
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = StaticAreaRegistry::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, SwathError::Config(_)));
}
