use crate::error_display::{InlineNotice, NotificationVariant};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

pub const NOTICE_CLASS: &str = "hrmis-inline-notice";

const VARIANTS: [NotificationVariant; 2] = [NotificationVariant::Error, NotificationVariant::Info];

/// Writes `notice` into `element` as plain text, or empties and hides it.
pub fn render_notice(element: &HtmlElement, notice: Option<&InlineNotice>) {
    let classes = element.class_list();
    for variant in VARIANTS {
        let _ = classes.remove_1(variant.css_class());
    }
    match notice {
        Some(notice) => {
            let _ = classes.add_1(notice.variant.css_class());
            element.set_text_content(Some(&notice.message));
            let role = match notice.variant {
                NotificationVariant::Error => "alert",
                NotificationVariant::Info => "status",
            };
            let _ = element.set_attribute("role", role);
            super::set_display(element, true, "");
        }
        None => {
            element.set_text_content(None);
            super::set_display(element, false, "");
        }
    }
}

/// The notice element right after `anchor`, created on demand.
pub fn sibling_notice(anchor: &Element, create: bool) -> Option<HtmlElement> {
    if let Some(existing) = anchor
        .next_element_sibling()
        .filter(|sibling| sibling.class_list().contains(NOTICE_CLASS))
    {
        return existing.dyn_into::<HtmlElement>().ok();
    }
    if !create {
        return None;
    }
    let element = super::create_element("div", NOTICE_CLASS, None)?;
    let parent = anchor.parent_node()?;
    parent
        .insert_before(&element, anchor.next_sibling().as_ref())
        .ok()?;
    Some(element)
}
