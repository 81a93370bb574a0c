use super::*;

#[test]
fn size_parses_and_rejects_zero() {
    assert_eq!(
        "1024x768".parse::<Size>().unwrap(),
        Size {
            width: 1024,
            height: 768
        }
    );
    assert!("0x10".parse::<Size>().is_err());
    assert!("10".parse::<Size>().is_err());
    assert!("axb".parse::<Size>().is_err());
}

#[test]
fn crop_string_becomes_absolute_rect() {
    let r: CropRect = "1000x300+103+200".parse().unwrap();
    assert_eq!(
        r,
        CropRect {
            x0: 103,
            y0: 200,
            x1: 1103,
            y1: 500
        }
    );
    assert!("1000x300".parse::<CropRect>().is_err());
    assert!("1000x300+1+2+3".parse::<CropRect>().is_err());
}

#[test]
fn clamp_keeps_rect_inside_bounds() {
    let cases = [
        CropRect::from_origin_size(-5, -5, 20, 20),
        CropRect::from_origin_size(5, 5, 200, 200),
        CropRect::from_origin_size(0, 0, 10, 10),
        CropRect::from_origin_size(9, 9, 1, 1),
        CropRect::from_origin_size(-100, 3, 1000, 2),
    ];
    for rect in cases {
        let p = rect.clamp_to(10, 10).unwrap();
        assert!(p.width > 0 && p.height > 0);
        assert!(p.x + p.width <= 10, "{rect:?} -> {p:?}");
        assert!(p.y + p.height <= 10, "{rect:?} -> {p:?}");
    }
}

#[test]
fn clamp_degenerate_rect_is_none() {
    assert!(CropRect::from_origin_size(20, 20, 5, 5).clamp_to(10, 10).is_none());
    assert!(CropRect::from_origin_size(-20, 0, 5, 5).clamp_to(10, 10).is_none());
    assert!(CropRect::from_origin_size(2, 2, 0, 5).clamp_to(10, 10).is_none());
}

#[test]
fn color_triple_parses() {
    assert_eq!("255, 0,16".parse::<Rgb8>().unwrap(), Rgb8([255, 0, 16]));
    assert!("1,2".parse::<Rgb8>().is_err());
    assert!("1,2,300".parse::<Rgb8>().is_err());
    assert_eq!(Rgb8([255, 128, 0]).to_hex(), "#ff8000");
}
