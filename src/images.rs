//! Image loading affordances: skeleton clearing and fallback sources.
//!
//! Both entry points query their scope at call time and may be re-run over
//! content inserted later. Neither keeps a registry; per-element guards
//! make repeat calls harmless.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

/// One-shot callback attached to an image event.
pub type ImageHandler = Box<dyn FnOnce()>;

/// An `<img>` plus the listener plumbing the affordances need.
pub trait ImagePort {
    /// Whether the image already finished loading, successfully or not.
    fn is_complete(&self) -> bool;
    /// Drop the loading class from the enclosing skeleton wrapper, if any.
    fn clear_skeleton(&self);
    /// Run `handler` on the first `load` or `error`, detaching both listeners.
    fn on_settled_once(&self, handler: ImageHandler);

    /// Fallback URL from the marker attribute.
    fn fallback_source(&self) -> Option<String>;
    /// Sources currently assigned (resolved URL and raw attribute).
    fn current_sources(&self) -> Vec<String>;
    /// Run `handler` on the first `error`, detaching before it runs.
    fn on_error_once(&self, handler: ImageHandler);
    fn set_source(&self, src: &str);
    /// Set `marker` on the element; `false` if it was already set.
    fn claim(&self, marker: &str) -> bool;
    /// Remove `marker` so a later pass may claim the element again.
    fn release(&self, marker: &str);
}

/// A document or sub-tree to search for affordance targets.
pub trait ImageScope {
    type Image: ImagePort + Clone + 'static;

    fn skeleton_images(&self) -> Vec<Self::Image>;
    fn fallback_images(&self) -> Vec<Self::Image>;
}

/// Outcome of one [`init_skeletons`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkeletonReport {
    /// Images already complete, cleared synchronously.
    pub cleared: usize,
    /// Images still loading, now waiting on load/error.
    pub waiting: usize,
}

/// Clear skeletons for loaded images and arm the rest.
pub fn init_skeletons<S: ImageScope>(scope: &S) -> SkeletonReport {
    let mut report = SkeletonReport::default();
    for image in scope.skeleton_images() {
        if image.is_complete() {
            image.clear_skeleton();
            report.cleared += 1;
        } else {
            let target = image.clone();
            image.on_settled_once(Box::new(move || target.clear_skeleton()));
            report.waiting += 1;
        }
    }
    log::debug!(
        "images: {} skeleton(s) cleared, {} waiting",
        report.cleared,
        report.waiting
    );
    report
}

/// Arm the fallback swap on every eligible image; returns how many were armed.
///
/// Skips images with an empty fallback, images already pointing at their
/// fallback, and images whose handler from an earlier call is still pending.
/// The marker is released once the swap happens, so an image given a new
/// source afterwards can be armed again.
pub fn init_image_fallbacks<S: ImageScope>(scope: &S, bound_marker: &str) -> usize {
    let mut armed = 0;
    for image in scope.fallback_images() {
        let Some(fallback) = image.fallback_source().filter(|src| !src.is_empty()) else {
            continue;
        };
        if image.current_sources().iter().any(|src| *src == fallback) {
            continue;
        }
        if !image.claim(bound_marker) {
            continue;
        }
        let target = image.clone();
        let marker = bound_marker.to_owned();
        image.on_error_once(Box::new(move || {
            log::debug!("images: swapping in fallback {fallback}");
            target.set_source(&fallback);
            target.release(&marker);
        }));
        armed += 1;
    }
    armed
}
