use std::sync::atomic::{AtomicUsize, Ordering};

use image::RgbaImage;

use super::*;
use crate::foundation::error::SwathError;

struct CountingRenderer {
    calls: AtomicUsize,
}

impl OverlayRenderer for CountingRenderer {
    fn render(&self, _overlay_config: &str, area: &AreaDefinition) -> SwathResult<Overlay> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Overlay::new(RgbaImage::new(area.width, area.height)))
    }
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
fn renders_once_per_topic() {
    let cache = OverlayCache::new();
    let renderer = CountingRenderer {
        calls: AtomicUsize::new(0),
    };
    let a = cache
        .get_or_render("/topic/a", "coasts.svg", &area(4, 4), &renderer)
        .unwrap();
    let again = cache
        .get_or_render("/topic/a", "other.svg", &area(8, 8), &renderer)
        .unwrap();
    assert!(Arc::ptr_eq(&a, &again));
    assert_eq!(again.dimensions(), (4, 4));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);

    cache
        .get_or_render("/topic/b", "coasts.svg", &area(2, 2), &renderer)
        .unwrap();
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
    assert!(cache.contains("/topic/b"));
}

#[test]
fn failed_render_is_not_cached() {
    let cache = OverlayCache::new();
    assert!(
        cache
            .populate_once("t", || Err(SwathError::overlay("boom")))
            .is_err()
    );
    assert!(cache.is_empty());
    assert!(cache.get("t").is_none());
    cache
        .populate_once("t", || Ok(Overlay::new(RgbaImage::new(1, 1))))
        .unwrap();
    assert!(cache.get("t").is_some());
}
