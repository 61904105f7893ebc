//! Profile update form: district/facility/designation cascade, field
//! validation and the cadre "other" field.

use super::{MountedCascade, mount_cascade, no_follow_up, today_iso};
use crate::dom;
use crate::dom::events::listen;
use crate::validation::{DATE_FIELDS, FieldError, LIVE_FIELDS, ProfileRules, REQUIRED_FIELDS};
use shared::PortalConfig;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

const FORM: &str = ".hrmis-form";
const ERROR_CLASS: &str = "hrmis-error";
const HAS_ERROR_CLASS: &str = "has-error";
const CADRE_SELECT: &str = ".js-cadre-select";
const CADRE_OTHER: &str = ".js-cadre-other";
const HIDDEN_CLASS: &str = "d-none";

pub fn mount(config: &PortalConfig) -> Option<MountedCascade> {
    mount_validation();
    mount_cadre_toggle();
    config
        .cascade("profile")
        .and_then(|chain| mount_cascade(chain, no_follow_up()))
}

fn named_field(form: &Element, name: &str) -> Option<HtmlElement> {
    dom::query_html_in(form, &format!("[name=\"{}\"]", name))
}

fn show_error(field: &HtmlElement, message: &str) {
    let Some(parent) = field.parent_element() else {
        return;
    };
    let error = match dom::query_in(&parent, &format!(".{}", ERROR_CLASS)) {
        Some(error) => error,
        None => {
            let Some(error) = dom::create_element("div", ERROR_CLASS, None) else {
                return;
            };
            dom::append(&parent, &error);
            error.into()
        }
    };
    dom::set_text(&error, message);
    let _ = field.class_list().add_1(HAS_ERROR_CLASS);
}

fn clear_error(field: &HtmlElement) {
    if let Some(error) = field
        .parent_element()
        .and_then(|parent| dom::query_in(&parent, &format!(".{}", ERROR_CLASS)))
    {
        error.remove();
    }
    let _ = field.class_list().remove_1(HAS_ERROR_CLASS);
}

fn mount_validation() {
    let Some(form) = dom::query(FORM) else {
        return;
    };
    let rules = match ProfileRules::new() {
        Ok(rules) => Rc::new(rules),
        Err(error) => {
            log::error!("profile validation disabled: {}", error);
            return;
        }
    };

    let today = today_iso();
    for name in DATE_FIELDS {
        if let Some(field) = named_field(&form, name)
            && field.set_attribute("max", &today).is_err()
        {
            log::debug!("could not limit '{}' to today", name);
        }
    }

    for name in LIVE_FIELDS {
        let Some(field) = named_field(&form, name) else {
            continue;
        };
        let rules = rules.clone();
        let observed = field.clone();
        listen(&field, "input", move |_| {
            match rules.check_field(name, &dom::element_value(&observed)) {
                Some(message) => show_error(&observed, message),
                None => clear_error(&observed),
            }
        });
    }

    let observed = form.clone();
    listen(&form, "submit", move |event| {
        let errors = rules.validate_submit(
            |name| named_field(&observed, name).map(|field| dom::element_value(&field)),
            &today_iso(),
        );
        render_submit_errors(&observed, &errors);
        if !errors.is_empty() {
            log::debug!("profile form blocked with {} errors", errors.len());
            event.prevent_default();
            event.stop_propagation();
        }
    });
}

fn render_submit_errors(form: &Element, errors: &[FieldError]) {
    for name in REQUIRED_FIELDS.iter().chain(DATE_FIELDS.iter()) {
        if let Some(field) = named_field(form, name) {
            clear_error(&field);
        }
    }
    for error in errors {
        if let Some(field) = named_field(form, error.field) {
            show_error(&field, error.message);
        }
    }
}

/// The free-text cadre field is only used for the `other` choice.
pub fn cadre_needs_other(cadre: &str) -> bool {
    cadre == "other"
}

fn mount_cadre_toggle() {
    let (Some(select), Some(other)) = (dom::query(CADRE_SELECT), dom::query(CADRE_OTHER)) else {
        return;
    };
    let input = dom::query_in(&other, "input").and_then(|input| input.dyn_into::<HtmlInputElement>().ok());

    let toggle = {
        let select = select.clone();
        move || {
            let needs_other = cadre_needs_other(&dom::element_value(&select));
            let _ = other.class_list().toggle_with_force(HIDDEN_CLASS, !needs_other);
            if let Some(input) = &input {
                input.set_required(needs_other);
                if !needs_other {
                    input.set_value("");
                }
            }
        }
    };
    toggle();
    listen(&select, "change", move |_| toggle());
}
