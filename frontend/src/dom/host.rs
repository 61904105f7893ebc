use super::notice::{render_notice, sibling_notice};
use crate::cascade::SelectorHost;
use crate::error_display::InlineNotice;
use shared::SelectOption;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

/// [`SelectorHost`] over the live document. Every call re-queries the page,
/// so elements replaced by other scripts are picked up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomSelectorHost;

fn select_element(selector: &str) -> Option<HtmlSelectElement> {
    super::query(selector)?.dyn_into::<HtmlSelectElement>().ok()
}

fn option_elements(select: &HtmlSelectElement) -> Vec<HtmlOptionElement> {
    let options = select.options();
    (0..options.length())
        .filter_map(|index| options.item(index))
        .filter_map(|element| element.dyn_into::<HtmlOptionElement>().ok())
        .collect()
}

fn read_option(element: &HtmlOptionElement) -> SelectOption {
    let mut option = SelectOption::new(element.value(), element.text().trim())
        .with_disabled(element.disabled());
    let names = element.get_attribute_names();
    for index in 0..names.length() {
        let Some(name) = names.get(index).as_string() else {
            continue;
        };
        if let Some(key) = super::dataset_key(&name) {
            let value = element.get_attribute(&name).unwrap_or_default();
            option = option.with_attribute(key, value);
        }
    }
    option
}

fn build_option(option: &SelectOption) -> Option<HtmlOptionElement> {
    let element = HtmlOptionElement::new_with_text_and_value(&option.label, &option.value).ok()?;
    let dataset = element.dataset();
    for (key, value) in &option.attributes {
        if dataset.set(key, value).is_err() {
            log::debug!("could not set data attribute '{}'", key);
        }
    }
    element.set_disabled(option.disabled);
    Some(element)
}

impl SelectorHost for DomSelectorHost {
    fn contains(&self, selector: &str) -> bool {
        super::query(selector).is_some()
    }

    fn options(&self, selector: &str) -> Vec<SelectOption> {
        select_element(selector)
            .map(|select| option_elements(&select).iter().map(read_option).collect())
            .unwrap_or_default()
    }

    fn selected_value(&self, selector: &str) -> String {
        select_element(selector)
            .map(|select| select.value())
            .unwrap_or_default()
    }

    fn select_value(&self, selector: &str, value: &str) {
        if let Some(select) = select_element(selector) {
            select.set_value(value);
        }
    }

    fn apply_visibility(&self, selector: &str, visibility: &[bool], disable_hidden: bool) {
        let Some(select) = select_element(selector) else {
            return;
        };
        for (index, (element, visible)) in option_elements(&select)
            .iter()
            .zip(visibility)
            .enumerate()
        {
            let visible = *visible || index == 0;
            // `hidden` alone is ignored by some embedded webviews.
            super::set_display(element, visible, "");
            element.set_hidden(!visible);
            if disable_hidden {
                element.set_disabled(!visible);
            }
        }
    }

    fn replace_options(&self, selector: &str, options: &[SelectOption]) {
        let Some(select) = select_element(selector) else {
            return;
        };
        select.set_length(0);
        for option in options {
            match build_option(option) {
                Some(element) => {
                    if select.append_child(&element).is_err() {
                        log::warn!("could not append option to '{}'", selector);
                    }
                }
                None => log::warn!("could not create option '{}'", option.value),
            }
        }
    }

    fn input_value(&self, selector: &str) -> String {
        let Some(element) = super::query(selector) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return input.value();
        }
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return select.value();
        }
        element.get_attribute("value").unwrap_or_default()
    }

    fn data_attribute(&self, selector: &str, key: &str) -> String {
        super::query(selector)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .and_then(|element| element.dataset().get(key))
            .unwrap_or_default()
    }

    fn set_notice(&self, selector: &str, notice_target: Option<&str>, notice: Option<&InlineNotice>) {
        let element = match notice_target {
            Some(target) => super::query_html(target),
            None => super::query(selector)
                .and_then(|anchor| sibling_notice(&anchor, notice.is_some())),
        };
        if let Some(element) = element {
            render_notice(&element, notice);
        }
    }
}
