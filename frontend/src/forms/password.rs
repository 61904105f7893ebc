//! Password change form guard.

use crate::dom;
use crate::dom::events::listen;
use crate::validation::{PasswordField, password_match_feedback, password_submit_error};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement};

const NEW_PASSWORD_ID: &str = "new_password";
const CONFIRM_PASSWORD_ID: &str = "confirm_password";
const MATCH_MESSAGE_ID: &str = "passwordMatchMsg";
const FORM_ID: &str = "passwordForm";

fn by_id(id: &str) -> Option<Element> {
    dom::document()?.get_element_by_id(id)
}

fn password_input(id: &str) -> Option<HtmlInputElement> {
    by_id(id)?.dyn_into::<HtmlInputElement>().ok()
}

fn show_message(message: &Element, text: &str, class_name: &str) {
    dom::set_text(message, text);
    message.set_class_name(class_name);
}

pub fn mount() {
    let (Some(new_password), Some(confirmation), Some(message), Some(form)) = (
        password_input(NEW_PASSWORD_ID),
        password_input(CONFIRM_PASSWORD_ID),
        by_id(MATCH_MESSAGE_ID),
        by_id(FORM_ID),
    ) else {
        return;
    };

    for input in [&new_password, &confirmation] {
        let new_password = new_password.clone();
        let confirmation = confirmation.clone();
        let message = message.clone();
        listen(input, "input", move |_| {
            let feedback = password_match_feedback(&new_password.value(), &confirmation.value());
            show_message(&message, feedback.message, feedback.class_name);
        });
    }

    listen(&form, "submit", move |event| {
        let Some((field, error)) = password_submit_error(&new_password.value(), &confirmation.value())
        else {
            return;
        };
        event.prevent_default();
        show_message(&message, error, "text-danger small");
        let focused = match field {
            PasswordField::New => &new_password,
            PasswordField::Confirmation => &confirmation,
        };
        if focused.focus().is_err() {
            log::debug!("could not focus password field");
        }
    });
}
