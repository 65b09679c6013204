use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::*;

const BOUND: &str = "data-fallback-bound";

#[derive(Default)]
struct ImageInner {
    complete: Cell<bool>,
    skeleton: Cell<bool>,
    settle_handlers: RefCell<Vec<ImageHandler>>,
    error_handlers: RefCell<Vec<ImageHandler>>,
    fallback: Option<String>,
    src: RefCell<String>,
    src_writes: Cell<usize>,
    markers: RefCell<HashSet<String>>,
}

#[derive(Clone, Default)]
struct FakeImage(Rc<ImageInner>);

impl FakeImage {
    fn loading() -> Self {
        let image = Self::default();
        image.0.skeleton.set(true);
        image
    }

    fn complete() -> Self {
        let image = Self::loading();
        image.0.complete.set(true);
        image
    }

    fn with_fallback(src: &str, fallback: &str) -> Self {
        let image = Self(Rc::new(ImageInner {
            fallback: Some(fallback.to_owned()),
            ..ImageInner::default()
        }));
        *image.0.src.borrow_mut() = src.to_owned();
        image
    }

    fn fire_load(&self) {
        self.0.complete.set(true);
        let handlers: Vec<_> = self.0.settle_handlers.borrow_mut().drain(..).collect();
        for handler in handlers {
            handler();
        }
    }

    fn fire_error(&self) {
        self.0.complete.set(true);
        let mut handlers: Vec<_> = self.0.settle_handlers.borrow_mut().drain(..).collect();
        handlers.extend(self.0.error_handlers.borrow_mut().drain(..));
        for handler in handlers {
            handler();
        }
    }

    fn has_skeleton(&self) -> bool {
        self.0.skeleton.get()
    }

    fn src(&self) -> String {
        self.0.src.borrow().clone()
    }
}

impl ImagePort for FakeImage {
    fn is_complete(&self) -> bool {
        self.0.complete.get()
    }

    fn clear_skeleton(&self) {
        self.0.skeleton.set(false);
    }

    fn on_settled_once(&self, handler: ImageHandler) {
        self.0.settle_handlers.borrow_mut().push(handler);
    }

    fn fallback_source(&self) -> Option<String> {
        self.0.fallback.clone()
    }

    fn current_sources(&self) -> Vec<String> {
        vec![self.src()]
    }

    fn on_error_once(&self, handler: ImageHandler) {
        self.0.error_handlers.borrow_mut().push(handler);
    }

    fn set_source(&self, src: &str) {
        self.0.src_writes.set(self.0.src_writes.get() + 1);
        *self.0.src.borrow_mut() = src.to_owned();
    }

    fn claim(&self, marker: &str) -> bool {
        self.0.markers.borrow_mut().insert(marker.to_owned())
    }

    fn release(&self, marker: &str) {
        self.0.markers.borrow_mut().remove(marker);
    }
}

#[derive(Default)]
struct FakeScope {
    skeletons: Vec<FakeImage>,
    fallbacks: Vec<FakeImage>,
}

impl ImageScope for FakeScope {
    type Image = FakeImage;

    fn skeleton_images(&self) -> Vec<FakeImage> {
        self.skeletons.clone()
    }

    fn fallback_images(&self) -> Vec<FakeImage> {
        self.fallbacks.clone()
    }
}

// =============================================================
// Skeletons
// =============================================================

#[test]
fn complete_image_clears_synchronously() {
    let image = FakeImage::complete();
    let scope = FakeScope {
        skeletons: vec![image.clone()],
        ..FakeScope::default()
    };

    let report = init_skeletons(&scope);

    assert_eq!(report, SkeletonReport { cleared: 1, waiting: 0 });
    assert!(!image.has_skeleton());
    assert!(image.0.settle_handlers.borrow().is_empty());
}

#[test]
fn loading_image_clears_on_load() {
    let image = FakeImage::loading();
    let scope = FakeScope {
        skeletons: vec![image.clone()],
        ..FakeScope::default()
    };

    assert_eq!(init_skeletons(&scope).waiting, 1);
    assert!(image.has_skeleton());

    image.fire_load();
    assert!(!image.has_skeleton());
    assert!(image.0.settle_handlers.borrow().is_empty());
}

#[test]
fn loading_image_clears_on_error_too() {
    let image = FakeImage::loading();
    let scope = FakeScope {
        skeletons: vec![image.clone()],
        ..FakeScope::default()
    };
    init_skeletons(&scope);
    image.fire_error();
    assert!(!image.has_skeleton());
}

#[test]
fn mixed_scope_reports_both_counts() {
    let scope = FakeScope {
        skeletons: vec![FakeImage::complete(), FakeImage::loading(), FakeImage::loading()],
        ..FakeScope::default()
    };
    assert_eq!(init_skeletons(&scope), SkeletonReport { cleared: 1, waiting: 2 });
}

#[test]
fn empty_scope_is_a_noop() {
    assert_eq!(init_skeletons(&FakeScope::default()), SkeletonReport::default());
    assert_eq!(init_image_fallbacks(&FakeScope::default(), BOUND), 0);
}

// =============================================================
// Fallbacks
// =============================================================

#[test]
fn failing_image_switches_to_fallback_exactly_once() {
    let image = FakeImage::with_fallback("/img/broken.png", "/img/placeholder.png");
    let scope = FakeScope {
        fallbacks: vec![image.clone()],
        ..FakeScope::default()
    };

    assert_eq!(init_image_fallbacks(&scope, BOUND), 1);

    image.fire_error();
    assert_eq!(image.src(), "/img/placeholder.png");

    // The fallback fails as well: no further rewrite.
    image.fire_error();
    image.fire_error();
    assert_eq!(image.0.src_writes.get(), 1);
}

#[test]
fn image_already_on_fallback_is_not_armed() {
    let image = FakeImage::with_fallback("/img/placeholder.png", "/img/placeholder.png");
    let scope = FakeScope {
        fallbacks: vec![image.clone()],
        ..FakeScope::default()
    };
    assert_eq!(init_image_fallbacks(&scope, BOUND), 0);
    image.fire_error();
    assert_eq!(image.0.src_writes.get(), 0);
}

#[test]
fn empty_fallback_is_ignored() {
    let image = FakeImage::with_fallback("/a.png", "");
    let scope = FakeScope {
        fallbacks: vec![image.clone()],
        ..FakeScope::default()
    };
    assert_eq!(init_image_fallbacks(&scope, BOUND), 0);
}

#[test]
fn rerunning_fallback_init_does_not_double_arm() {
    let image = FakeImage::with_fallback("/a.png", "/b.png");
    let scope = FakeScope {
        fallbacks: vec![image.clone()],
        ..FakeScope::default()
    };

    assert_eq!(init_image_fallbacks(&scope, BOUND), 1);
    assert_eq!(init_image_fallbacks(&scope, BOUND), 0);
    assert_eq!(image.0.error_handlers.borrow().len(), 1);

    image.fire_error();
    assert_eq!(image.0.src_writes.get(), 1);
}

#[test]
fn image_given_new_source_after_fallback_is_armed_again() {
    let image = FakeImage::with_fallback("/img/a.png", "/img/fb.png");
    let scope = FakeScope {
        fallbacks: vec![image.clone()],
        ..FakeScope::default()
    };

    assert_eq!(init_image_fallbacks(&scope, BOUND), 1);
    image.fire_error();
    assert_eq!(image.src(), "/img/fb.png");
    assert!(!image.0.markers.borrow().contains(BOUND));

    // Still on the fallback: nothing to arm.
    assert_eq!(init_image_fallbacks(&scope, BOUND), 0);

    image.set_source("/img/new.png");
    assert_eq!(init_image_fallbacks(&scope, BOUND), 1);
    image.fire_error();
    assert_eq!(image.src(), "/img/fb.png");
    assert_eq!(image.0.src_writes.get(), 3);
}

#[test]
fn rerunning_skeleton_init_is_idempotent() {
    let image = FakeImage::loading();
    let scope = FakeScope {
        skeletons: vec![image.clone()],
        ..FakeScope::default()
    };
    init_skeletons(&scope);
    init_skeletons(&scope);
    image.fire_load();
    assert!(!image.has_skeleton());

    assert_eq!(init_skeletons(&scope), SkeletonReport { cleared: 1, waiting: 0 });
}
