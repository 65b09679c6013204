//! Page configuration: the DOM contract, storage key, and chat endpoint.
//!
//! SYSTEM CONTEXT
//! ==============
//! Defaults match the storefront templates. A page may override any field
//! by embedding a JSON object in `<script type="application/json"
//! id="cwPageConfig">`; missing fields keep their defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::error::PageError;

/// Element id the browser layer reads JSON overrides from.
pub const CONFIG_ELEMENT_ID: &str = "cwPageConfig";

/// Names and constants every behavior reads instead of hard-coding.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// `localStorage` key holding `"dark"` or `"light"`.
    pub theme_storage_key: String,
    /// Attribute set on `<html>` while dark mode is active.
    pub theme_attribute: String,
    /// Id shared by every theme toggle control (may repeat).
    pub theme_toggle_id: String,
    pub theme_icon_selector: String,
    pub theme_label_selector: String,
    pub theme_active_class: String,

    /// Selector for the navigation bar.
    pub navbar_selector: String,
    pub navbar_scrolled_class: String,
    /// Scroll offset in pixels the page must exceed to count as scrolled.
    pub scroll_threshold_px: f64,

    pub chat_toggle_id: String,
    pub chat_panel_id: String,
    pub chat_form_id: String,
    pub chat_input_id: String,
    pub chat_messages_id: String,
    /// Endpoint receiving `POST {"message": ...}`.
    pub chat_endpoint: String,
    /// Assistant message shown when a chat request or its decoding fails.
    pub chat_error_text: String,

    pub skeleton_image_selector: String,
    pub skeleton_wrapper_selector: String,
    pub skeleton_class: String,
    /// Attribute on `<img>` carrying the fallback URL.
    pub fallback_attribute: String,
    /// Marker attribute set once a fallback handler is armed.
    pub fallback_bound_attribute: String,

    /// `log` level name used when installing the console logger.
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            theme_storage_key: "cw-theme".to_owned(),
            theme_attribute: "data-theme".to_owned(),
            theme_toggle_id: "themeToggle".to_owned(),
            theme_icon_selector: "[data-icon]".to_owned(),
            theme_label_selector: "[data-label]".to_owned(),
            theme_active_class: "active".to_owned(),
            navbar_selector: ".navbar".to_owned(),
            navbar_scrolled_class: "scrolled".to_owned(),
            scroll_threshold_px: 10.0,
            chat_toggle_id: "aiToggle".to_owned(),
            chat_panel_id: "aiPanel".to_owned(),
            chat_form_id: "aiForm".to_owned(),
            chat_input_id: "aiInput".to_owned(),
            chat_messages_id: "aiMessages".to_owned(),
            chat_endpoint: "/api/ai/chat".to_owned(),
            chat_error_text: "Maaf, terjadi kesalahan.".to_owned(),
            skeleton_image_selector: "[data-skel-img]".to_owned(),
            skeleton_wrapper_selector: "[data-skel]".to_owned(),
            skeleton_class: "skeleton".to_owned(),
            fallback_attribute: "data-fallback".to_owned(),
            fallback_bound_attribute: "data-fallback-bound".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl PageConfig {
    /// Parse overrides from JSON and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Config`] if the JSON is malformed or a required
    /// value is empty or out of range.
    pub fn from_json(raw: &str) -> Result<Self, PageError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| PageError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a behavior cannot work without.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), PageError> {
        if self.theme_storage_key.trim().is_empty() {
            return Err(PageError::Config("theme_storage_key is empty".to_owned()));
        }
        if self.chat_endpoint.trim().is_empty() {
            return Err(PageError::Config("chat_endpoint is empty".to_owned()));
        }
        if !self.scroll_threshold_px.is_finite() || self.scroll_threshold_px < 0.0 {
            return Err(PageError::Config(format!(
                "scroll_threshold_px out of range: {}",
                self.scroll_threshold_px
            )));
        }
        Ok(())
    }

    /// Log level for the console logger; unknown names fall back to `Info`.
    pub fn level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    /// Selector matching every theme toggle, including duplicated ids.
    pub fn theme_toggle_selector(&self) -> String {
        format!("[id=\"{}\"]", self.theme_toggle_id)
    }

    /// Selector matching images that carry a fallback URL.
    pub fn fallback_image_selector(&self) -> String {
        format!("img[{}]", self.fallback_attribute)
    }
}
