use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, EventTarget, PageTransitionEvent, VisibilityState};

/// Attaches a listener for the lifetime of the page.
pub fn listen(target: &EventTarget, event_type: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    if target
        .add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
        .is_err()
    {
        log::warn!("could not attach '{}' listener", event_type);
        return;
    }
    closure.forget();
}

/// Runs `init` once the document is parsed (immediately if it already is).
pub fn on_dom_ready(init: impl FnOnce() + 'static) {
    let Some(document) = super::document() else {
        return;
    };
    if document.ready_state() != "loading" {
        init();
        return;
    }
    let mut init = Some(init);
    listen(&document, "DOMContentLoaded", move |_| {
        if let Some(init) = init.take() {
            init();
        }
    });
}

/// Calls `restored` when the page comes back from the back/forward cache.
pub fn on_page_restored(mut restored: impl FnMut() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    listen(&window, "pageshow", move |event| {
        let persisted = event
            .dyn_ref::<PageTransitionEvent>()
            .is_some_and(PageTransitionEvent::persisted);
        if persisted {
            restored();
        }
    });
}

/// Calls `visible` whenever the tab becomes visible again.
pub fn on_tab_visible(mut visible: impl FnMut() + 'static) {
    let Some(document) = super::document() else {
        return;
    };
    let observed = document.clone();
    listen(&document, "visibilitychange", move |_| {
        if observed.visibility_state() == VisibilityState::Visible {
            visible();
        }
    });
}

/// Closest ancestor-or-self of the event target matching `selector`.
pub fn closest_target(event: &Event, selector: &str) -> Option<web_sys::Element> {
    event
        .target()?
        .dyn_into::<web_sys::Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}
