use shared::{EditorConfig, LogLevel};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

use crate::services::logging::Logger;

const CSRF_SELECTOR: &str = "[name=csrfmiddlewaretoken]";

/// Everything the apps need from the server-rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub editor: EditorConfig,
    pub csrf_token: String,
}

impl PageConfig {
    /// Reads `data-*` overrides from the app root, the CSRF token from the
    /// page and falls back to the current location for the page URL.
    pub fn from_root(root: &Element) -> Self {
        let mut editor = EditorConfig::default();
        apply_overrides(&mut editor, |name| root.get_attribute(name));
        if editor.page_url.is_empty() {
            editor.page_url = gloo::utils::window()
                .location()
                .href()
                .unwrap_or_default();
        }
        Self {
            editor,
            csrf_token: csrf_token(),
        }
    }
}

/// Applies `data-page-url`, `data-timezone`, `data-row-select-title` and
/// `data-log-level`.
pub fn apply_overrides(config: &mut EditorConfig, attribute: impl Fn(&str) -> Option<String>) {
    if let Some(url) = attribute("data-page-url") {
        config.page_url = url;
    }
    if let Some(timezone) = attribute("data-timezone") {
        config.timezone = timezone;
    }
    if let Some(title) = attribute("data-row-select-title") {
        config.row_select_title = title;
    }
    if let Some(level) = attribute("data-log-level") {
        match level.parse::<LogLevel>() {
            Ok(level) => config.log_level = level,
            Err(e) => Logger::warn_with_component("page", &e),
        }
    }
}

pub fn csrf_token() -> String {
    let token = gloo::utils::document()
        .query_selector(CSRF_SELECTOR)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value());
    match token {
        Some(token) => token,
        None => {
            Logger::warn_with_component("page", "no CSRF token on page; saves will be rejected");
            String::new()
        }
    }
}

/// Text of an embedded `<script type="application/json" id=...>` element.
pub fn json_script(id: &str) -> Option<String> {
    gloo::utils::document()
        .get_element_by_id(id)
        .and_then(|element| element.text_content())
}

pub fn navigate(url: &str) {
    if let Err(e) = gloo::utils::window().location().set_href(url) {
        Logger::error_with_component("page", &format!("Navigation to {} failed: {:?}", url, e));
    }
}

pub fn focus_element(id: &str) {
    let element = gloo::utils::document()
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok());
    match element {
        Some(element) => {
            let _ = element.focus();
        }
        None => Logger::debug_with_component("page", &format!("nothing to focus with id {}", id)),
    }
}
