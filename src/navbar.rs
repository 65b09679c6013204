//! Navbar "scrolled" class driven by the vertical scroll offset.

#[cfg(test)]
#[path = "navbar_test.rs"]
mod navbar_test;

/// Element whose class list the reactor toggles.
pub trait ClassTarget {
    fn set_class(&self, class: &str, enabled: bool);
}

/// True when `offset` is strictly past `threshold`.
pub fn is_scrolled(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

/// Recomputes the scrolled class on every scroll event.
pub struct ScrollReactor<T> {
    target: T,
    class: String,
    threshold: f64,
}

impl<T: ClassTarget> ScrollReactor<T> {
    pub fn new(target: T, class: impl Into<String>, threshold: f64) -> Self {
        Self {
            target,
            class: class.into(),
            threshold,
        }
    }

    /// Set or clear the class for `offset`; returns the applied state.
    pub fn on_scroll(&self, offset: f64) -> bool {
        let scrolled = is_scrolled(offset, self.threshold);
        self.target.set_class(&self.class, scrolled);
        scrolled
    }
}
