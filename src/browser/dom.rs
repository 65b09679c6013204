//! `web-sys` implementations of the behavior ports.
//!
//! Every binding tolerates missing markup: optional elements are held as
//! `Option` and DOM exceptions are logged, never unwrapped.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, HtmlElement, HtmlImageElement,
    HtmlInputElement, Storage,
};

use crate::chat::{ChatMessage, ChatView, PanelState};
use crate::config::PageConfig;
use crate::error::PageError;
use crate::images::{ImageHandler, ImagePort, ImageScope};
use crate::navbar::ClassTarget;
use crate::theme::{ControlState, Theme, ThemeRoot, ThemeStorage, ToggleControl};

#[cfg(all(test, target_arch = "wasm32"))]
#[path = "dom_test.rs"]
mod dom_test;

/// Collect every element under `root` matching `selector`.
pub(super) fn query_all(root: &ScopeRoot, selector: &str) -> Vec<Element> {
    let list = match root {
        ScopeRoot::Document(doc) => doc.query_selector_all(selector),
        ScopeRoot::Element(el) => el.query_selector_all(selector),
    };
    let list = match list {
        Ok(list) => list,
        Err(e) => {
            log::warn!("dom: bad selector {selector}: {e:?}");
            return Vec::new();
        }
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Register `function` for a single firing of `event`.
fn listen_once(target: &EventTarget, event: &str, function: &js_sys::Function) {
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    if let Err(e) =
        target.add_event_listener_with_callback_and_add_event_listener_options(event, function, &options)
    {
        log::warn!("dom: could not listen for {event}: {e:?}");
    }
}

// =============================================================================
// THEME
// =============================================================================

/// `localStorage` slot for the theme preference.
pub(super) struct LocalStorage {
    key: String,
}

impl LocalStorage {
    pub(super) fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<Storage, PageError> {
        web_sys::window()
            .ok_or(PageError::StorageUnavailable)?
            .local_storage()
            .map_err(|e| PageError::Storage(format!("{e:?}")))?
            .ok_or(PageError::StorageUnavailable)
    }
}

impl ThemeStorage for LocalStorage {
    fn load(&self) -> Result<Option<String>, PageError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|e| PageError::Storage(format!("{e:?}")))
    }

    fn store(&self, value: &str) -> Result<(), PageError> {
        Self::storage()?
            .set_item(&self.key, value)
            .map_err(|e| PageError::Storage(format!("{e:?}")))
    }
}

/// `<html>` element carrying the `data-theme` marker.
pub(super) struct RootElement {
    element: Element,
    attribute: String,
}

impl RootElement {
    pub(super) fn new(element: Element, attribute: impl Into<String>) -> Self {
        Self {
            element,
            attribute: attribute.into(),
        }
    }
}

impl ThemeRoot for RootElement {
    fn apply(&self, theme: Theme) {
        let result = if theme.is_dark() {
            self.element.set_attribute(&self.attribute, theme.as_str())
        } else {
            self.element.remove_attribute(&self.attribute)
        };
        if let Err(e) = result {
            log::warn!("theme: could not mark root {theme}: {e:?}");
        }
    }
}

/// One `#themeToggle` button.
pub(super) struct DomToggle {
    element: Element,
    config: Rc<PageConfig>,
}

impl DomToggle {
    pub(super) fn new(element: Element, config: Rc<PageConfig>) -> Self {
        Self { element, config }
    }

    pub(super) fn element(&self) -> &Element {
        &self.element
    }

    fn set_child_text(&self, selector: &str, text: &str) {
        if let Ok(Some(child)) = self.element.query_selector(selector) {
            child.set_text_content(Some(text));
        }
    }
}

impl ToggleControl for DomToggle {
    fn render(&self, state: &ControlState) {
        let _ = self
            .element
            .class_list()
            .toggle_with_force(&self.config.theme_active_class, state.active);
        self.set_child_text(&self.config.theme_icon_selector, state.icon);
        self.set_child_text(&self.config.theme_label_selector, state.label);
        for (name, value) in [
            ("data-mode", state.mode),
            ("aria-label", state.action_label),
            ("title", state.action_label),
        ] {
            if let Err(e) = self.element.set_attribute(name, value) {
                log::warn!("theme: could not set {name}: {e:?}");
            }
        }
    }
}

// =============================================================================
// NAVBAR
// =============================================================================

pub(super) struct NavElement(pub(super) Element);

impl ClassTarget for NavElement {
    fn set_class(&self, class: &str, enabled: bool) {
        let _ = self.0.class_list().toggle_with_force(class, enabled);
    }
}

// =============================================================================
// CHAT
// =============================================================================

pub(super) struct DomChatView {
    document: Document,
    panel: Option<HtmlElement>,
    input: Option<HtmlInputElement>,
    messages: Option<Element>,
}

impl DomChatView {
    pub(super) fn new(document: &Document, config: &PageConfig) -> Self {
        Self {
            document: document.clone(),
            panel: document
                .get_element_by_id(&config.chat_panel_id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok()),
            input: document
                .get_element_by_id(&config.chat_input_id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok()),
            messages: document.get_element_by_id(&config.chat_messages_id),
        }
    }

    pub(super) fn has_panel(&self) -> bool {
        self.panel.is_some()
    }
}

impl ChatView for DomChatView {
    fn panel_state(&self) -> PanelState {
        let display = self
            .panel
            .as_ref()
            .and_then(|panel| panel.style().get_property_value("display").ok());
        if display.as_deref() == Some("flex") {
            PanelState::Open
        } else {
            PanelState::Closed
        }
    }

    fn set_panel_state(&self, state: PanelState) {
        let Some(panel) = &self.panel else {
            return;
        };
        let display = match state {
            PanelState::Open => "flex",
            PanelState::Closed => "none",
        };
        if let Err(e) = panel.style().set_property("display", display) {
            log::warn!("chat: could not set panel display: {e:?}");
        }
    }

    fn focus_input(&self) {
        if let Some(input) = &self.input {
            let _ = input.focus();
        }
    }

    fn input_text(&self) -> String {
        self.input.as_ref().map(HtmlInputElement::value).unwrap_or_default()
    }

    fn clear_input(&self) {
        if let Some(input) = &self.input {
            input.set_value("");
        }
    }

    fn append(&self, message: &ChatMessage) {
        let Some(messages) = &self.messages else {
            return;
        };
        let bubble = match self.document.create_element("div") {
            Ok(el) => el,
            Err(e) => {
                log::warn!("chat: could not create message element: {e:?}");
                return;
            }
        };
        bubble.set_class_name(&format!("ai-msg {}", message.role.as_str()));
        bubble.set_text_content(Some(&message.text));
        if let Err(e) = messages.append_child(&bubble) {
            log::warn!("chat: could not append message: {e:?}");
            return;
        }
        messages.set_scroll_top(messages.scroll_height());
    }
}

// =============================================================================
// IMAGES
// =============================================================================

/// Where an affordance pass searches.
#[derive(Clone)]
pub(super) enum ScopeRoot {
    Document(Document),
    Element(Element),
}

pub(super) struct DomScope {
    root: ScopeRoot,
    config: Rc<PageConfig>,
}

impl DomScope {
    pub(super) fn new(root: ScopeRoot, config: Rc<PageConfig>) -> Self {
        Self { root, config }
    }

    fn images(&self, selector: &str) -> Vec<DomImage> {
        query_all(&self.root, selector)
            .into_iter()
            .map(|element| {
                if !element.is_instance_of::<HtmlImageElement>() {
                    log::debug!(
                        "images: <{}> matched {selector}; waiting for load/error",
                        element.tag_name().to_lowercase()
                    );
                }
                DomImage {
                    element,
                    config: Rc::clone(&self.config),
                }
            })
            .collect()
    }
}

impl ImageScope for DomScope {
    type Image = DomImage;

    fn skeleton_images(&self) -> Vec<DomImage> {
        self.images(&self.config.skeleton_image_selector)
    }

    fn fallback_images(&self) -> Vec<DomImage> {
        self.images(&self.config.fallback_image_selector())
    }
}

/// A marked element, usually `<img>`.
///
/// Other elements (`<video>`, `<iframe>`) never report complete, so their
/// skeleton waits for load/error.
#[derive(Clone)]
pub(super) struct DomImage {
    element: Element,
    config: Rc<PageConfig>,
}

impl DomImage {
    fn img(&self) -> Option<&HtmlImageElement> {
        self.element.dyn_ref::<HtmlImageElement>()
    }
}

impl ImagePort for DomImage {
    fn is_complete(&self) -> bool {
        self.img().is_some_and(HtmlImageElement::complete)
    }

    fn clear_skeleton(&self) {
        if let Ok(Some(wrapper)) = self.element.closest(&self.config.skeleton_wrapper_selector) {
            let _ = wrapper.class_list().remove_1(&self.config.skeleton_class);
        }
    }

    fn on_settled_once(&self, handler: ImageHandler) {
        let target: EventTarget = self.element.clone().into();
        let registered: Rc<RefCell<Option<js_sys::Function>>> = Rc::default();
        let detach = Rc::clone(&registered);
        let detach_from = target.clone();
        // Shared by both events; the first firing unregisters the other.
        let callback = Closure::once_into_js(move |_event: web_sys::Event| {
            if let Some(function) = detach.borrow_mut().take() {
                for event in ["load", "error"] {
                    let _ = detach_from.remove_event_listener_with_callback(event, &function);
                }
            }
            handler();
        });
        let function: js_sys::Function = callback.unchecked_into();
        listen_once(&target, "load", &function);
        listen_once(&target, "error", &function);
        *registered.borrow_mut() = Some(function);
    }

    fn fallback_source(&self) -> Option<String> {
        self.element.get_attribute(&self.config.fallback_attribute)
    }

    fn current_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.img().map(HtmlImageElement::src).into_iter().collect();
        sources.extend(self.element.get_attribute("src"));
        sources
    }

    fn on_error_once(&self, handler: ImageHandler) {
        let callback = Closure::once_into_js(move |_event: web_sys::Event| handler());
        listen_once(&self.element, "error", callback.unchecked_ref());
    }

    fn set_source(&self, src: &str) {
        match self.img() {
            Some(img) => img.set_src(src),
            None => {
                let _ = self.element.set_attribute("src", src);
            }
        }
    }

    fn claim(&self, marker: &str) -> bool {
        if self.element.has_attribute(marker) {
            return false;
        }
        self.element.set_attribute(marker, "").is_ok()
    }

    fn release(&self, marker: &str) {
        let _ = self.element.remove_attribute(marker);
    }
}
