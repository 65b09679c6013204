//! Browser entry points: wires each behavior to the live DOM.
//!
//! SYSTEM CONTEXT
//! ==============
//! `start` runs once when the WASM module loads. It installs logging, reads
//! the optional config override, then initializes the four behaviors
//! independently so missing markup for one never affects the others.
//! Persistent listeners live as long as the page and are leaked with
//! `Closure::forget`.
//!
//! `initSkeletons` / `initImageFallbacks` are exported for page code that
//! inserts images later; they are also installed on `window` under the
//! `__cw*` names older templates call.

mod dom;
mod http;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Window};

use crate::chat::ChatWidget;
use crate::config::{CONFIG_ELEMENT_ID, PageConfig};
use crate::error::PageError;
use crate::images;
use crate::navbar::ScrollReactor;
use crate::theme::ThemeToggle;

use self::dom::{
    DomChatView, DomScope, DomToggle, LocalStorage, NavElement, RootElement, ScopeRoot, query_all,
};
use self::http::FetchTransport;

const SKELETON_GLOBAL: &str = "__cwInitSkeletons";
const FALLBACK_GLOBAL: &str = "__cwInitImageFallbacks";

thread_local! {
    static CONFIG: RefCell<Rc<PageConfig>> = RefCell::new(Rc::new(PageConfig::default()));
}

fn current_config() -> Rc<PageConfig> {
    CONFIG.with(|config| Rc::clone(&config.borrow()))
}

/// Module start hook: initialize every page behavior.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let loaded = load_config(&document);
    let config = Rc::new(loaded.as_ref().map_or_else(|_| PageConfig::default(), Clone::clone));
    // The host page may already own the global logger.
    let _ = console_log::init_with_level(config.level());
    if let Err(e) = &loaded {
        log::warn!("page: using default config: {e}");
    }
    CONFIG.with(|slot| *slot.borrow_mut() = Rc::clone(&config));

    init_theme(&document, &config);
    init_navbar(&window, &document, &config);
    init_chat(&document, &config);
    let scope = DomScope::new(ScopeRoot::Document(document), Rc::clone(&config));
    images::init_skeletons(&scope);
    images::init_image_fallbacks(&scope, &config.fallback_bound_attribute);
    install_globals(&window);

    log::info!("page: behaviors initialized");
}

/// Re-run skeleton clearing over `scope` (an element or document; defaults to the page).
#[wasm_bindgen(js_name = initSkeletons)]
pub fn init_skeletons(scope: JsValue) {
    if let Some(scope) = resolve_scope(scope) {
        images::init_skeletons(&scope);
    }
}

/// Re-run fallback arming over `scope` (an element or document; defaults to the page).
#[wasm_bindgen(js_name = initImageFallbacks)]
pub fn init_image_fallbacks(scope: JsValue) {
    if let Some(scope) = resolve_scope(scope) {
        let config = current_config();
        images::init_image_fallbacks(&scope, &config.fallback_bound_attribute);
    }
}

fn resolve_scope(scope: JsValue) -> Option<DomScope> {
    let root = if let Some(element) = scope.dyn_ref::<Element>() {
        ScopeRoot::Element(element.clone())
    } else if let Some(document) = scope.dyn_ref::<Document>() {
        ScopeRoot::Document(document.clone())
    } else {
        ScopeRoot::Document(web_sys::window()?.document()?)
    };
    Some(DomScope::new(root, current_config()))
}

fn load_config(document: &Document) -> Result<PageConfig, PageError> {
    match document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    {
        Some(raw) => PageConfig::from_json(&raw),
        None => Ok(PageConfig::default()),
    }
}

fn init_theme(document: &Document, config: &Rc<PageConfig>) {
    let Some(html) = document.document_element() else {
        log::warn!("theme: document has no root element");
        return;
    };
    let controls: Vec<DomToggle> = query_all(
        &ScopeRoot::Document(document.clone()),
        &config.theme_toggle_selector(),
    )
    .into_iter()
    .map(|el| DomToggle::new(el, Rc::clone(config)))
    .collect();

    let toggle = Rc::new(ThemeToggle::init(
        LocalStorage::new(&config.theme_storage_key),
        RootElement::new(html, &config.theme_attribute),
        controls,
    ));

    for control in toggle.controls() {
        let toggle = Rc::clone(&toggle);
        let on_click = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            toggle.toggle();
        }));
        if let Err(e) = control
            .element()
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        {
            log::warn!("theme: could not bind toggle: {e:?}");
        }
        on_click.forget();
    }
}

fn init_navbar(window: &Window, document: &Document, config: &PageConfig) {
    let Ok(Some(nav)) = document.query_selector(&config.navbar_selector) else {
        return;
    };
    let reactor = ScrollReactor::new(
        NavElement(nav),
        &config.navbar_scrolled_class,
        config.scroll_threshold_px,
    );
    reactor.on_scroll(window.scroll_y().unwrap_or(0.0));

    let scroll_window = window.clone();
    let on_scroll = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
        reactor.on_scroll(scroll_window.scroll_y().unwrap_or(0.0));
    }));
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    if let Err(e) = window.add_event_listener_with_callback_and_add_event_listener_options(
        "scroll",
        on_scroll.as_ref().unchecked_ref(),
        &options,
    ) {
        log::warn!("navbar: could not bind scroll: {e:?}");
    }
    on_scroll.forget();
}

fn init_chat(document: &Document, config: &PageConfig) {
    let view = DomChatView::new(document, config);
    let has_panel = view.has_panel();
    let widget = Rc::new(ChatWidget::from_config(view, FetchTransport, config));

    let toggle = document
        .get_element_by_id(&config.chat_toggle_id)
        .filter(|_| has_panel);
    if let Some(toggle) = toggle {
        let widget = Rc::clone(&widget);
        let on_click = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            widget.toggle_panel();
        }));
        if let Err(e) = toggle.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref()) {
            log::warn!("chat: could not bind toggle: {e:?}");
        }
        on_click.forget();
    }

    if let Some(form) = document.get_element_by_id(&config.chat_form_id) {
        let on_submit = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
            if let Some(pending) = widget.begin_submit() {
                let widget = Rc::clone(&widget);
                wasm_bindgen_futures::spawn_local(async move {
                    widget.complete(pending).await;
                });
            }
        }));
        if let Err(e) = form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref()) {
            log::warn!("chat: could not bind form: {e:?}");
        }
        on_submit.forget();
    }
}

fn install_globals(window: &Window) {
    let skeletons = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(init_skeletons));
    let fallbacks = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(init_image_fallbacks));
    for (name, callback) in [(SKELETON_GLOBAL, &skeletons), (FALLBACK_GLOBAL, &fallbacks)] {
        if let Err(e) = js_sys::Reflect::set(window, &JsValue::from_str(name), callback.as_ref()) {
            log::warn!("page: could not expose {name}: {e:?}");
        }
    }
    skeletons.forget();
    fallbacks.forget();
}
