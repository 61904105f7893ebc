//! Thin helpers over `web_sys` used by the forms and pollers.
//!
//! Nothing here is called from native tests; pure logic lives in the
//! modules that consume these helpers.

pub mod events;
pub mod host;
pub mod http;
pub mod notice;

pub use host::DomSelectorHost;
pub use http::HttpLookup;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn query(selector: &str) -> Option<Element> {
    document()?.query_selector(selector).ok().flatten()
}

pub fn query_in(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn query_all_in(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_html(selector: &str) -> Option<HtmlElement> {
    query(selector)?.dyn_into::<HtmlElement>().ok()
}

pub fn query_html_in(root: &Element, selector: &str) -> Option<HtmlElement> {
    query_in(root, selector)?.dyn_into::<HtmlElement>().ok()
}

/// Sets `display` to `shown_display` or `none`.
pub fn set_display(element: &HtmlElement, shown: bool, shown_display: &str) {
    let display = if shown { shown_display } else { "none" };
    if element.style().set_property("display", display).is_err() {
        log::debug!("could not set display on <{}>", element.tag_name());
    }
}

/// Current `value` of an input, select or textarea; empty for anything else.
pub fn element_value(element: &Element) -> String {
    js_sys::Reflect::get(element, &JsValue::from_str("value"))
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default()
}

pub fn set_text(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

/// New detached element with `class_name` and optional text content.
pub fn create_element(tag: &str, class_name: &str, text: Option<&str>) -> Option<HtmlElement> {
    let element = document()?
        .create_element(tag)
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    element.set_class_name(class_name);
    if let Some(text) = text {
        element.set_text_content(Some(text));
    }
    Some(element)
}

pub fn append(parent: &Element, child: &Element) {
    if parent.append_child(child).is_err() {
        log::debug!("could not append <{}>", child.tag_name());
    }
}

/// Dataset key for a `data-*` attribute name (`data-district-id` -> `districtId`).
pub fn dataset_key(attribute_name: &str) -> Option<String> {
    let rest = attribute_name.strip_prefix("data-")?;
    let mut key = String::with_capacity(rest.len());
    let mut upper_next = false;
    for ch in rest.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next && ch.is_ascii_lowercase() {
            key.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            if upper_next {
                key.push('-');
                upper_next = false;
            }
            key.push(ch);
        }
    }
    if upper_next {
        key.push('-');
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_keys_are_camel_cased() {
        assert_eq!(dataset_key("data-district-id").as_deref(), Some("districtId"));
        assert_eq!(dataset_key("data-bps").as_deref(), Some("bps"));
        assert_eq!(
            dataset_key("data-support-document-note").as_deref(),
            Some("supportDocumentNote")
        );
        assert_eq!(dataset_key("data-x-1").as_deref(), Some("x-1"));
        assert_eq!(dataset_key("class"), None);
    }
}
