//! Page wiring for the portal forms.
//!
//! Each form module mounts its cascades through [`mount_cascade`] and adds
//! the form-specific extras (validation, info panels, vacancy lines).

pub mod leave;
pub mod password;
pub mod profile;
pub mod transfer;

use crate::cascade::{Cascade, CascadeEvent, NodeOutcome};
use crate::dataflow::{Relay, relay};
use crate::dom::events::{listen, on_page_restored};
use crate::dom::{self, DomSelectorHost, HttpLookup};
use futures::StreamExt;
use shared::ChainSpec;
use std::rc::Rc;
use zoon::{Task, TaskHandle};

pub type PageCascade = Cascade<DomSelectorHost, HttpLookup>;

/// Runs after every handled event with the outcomes of that pass.
pub type FollowUp = Rc<dyn Fn(&CascadeEvent, &[NodeOutcome])>;

/// Keeps a cascade's event loop alive.
pub struct MountedCascade {
    _event_loop: TaskHandle,
}

fn emit_field_changed(field_changed_relay: &Relay<CascadeEvent>, event: CascadeEvent) {
    field_changed_relay.send(event);
}

/// Builds the cascade against the page, hooks its listeners and runs the
/// initial pass. `None` when the page does not host the chain.
pub fn mount_cascade(chain: &ChainSpec, follow_up: FollowUp) -> Option<MountedCascade> {
    let cascade = match PageCascade::build(chain, DomSelectorHost, HttpLookup) {
        Ok(cascade) => Rc::new(cascade),
        Err(error) if error.is_absent() => {
            log::debug!("{}", error);
            return None;
        }
        Err(error) => {
            log::error!("{}", error);
            return None;
        }
    };

    let (field_changed_relay, mut field_changed_stream) = relay::<CascadeEvent>();

    for selector in cascade.selectors() {
        let Some(element) = dom::query(selector) else {
            continue;
        };
        let field_changed_relay = field_changed_relay.clone();
        let selector = selector.to_string();
        listen(&element, "change", move |_| {
            emit_field_changed(
                &field_changed_relay,
                CascadeEvent::SelectorChanged(selector.clone()),
            )
        });
    }

    for input in cascade.watched_inputs() {
        let Some(element) = dom::query(input) else {
            log::debug!("cascade '{}': input '{}' not on page", cascade.name(), input);
            continue;
        };
        for event_type in ["input", "change"] {
            let field_changed_relay = field_changed_relay.clone();
            let input = input.to_string();
            listen(&element, event_type, move |_| {
                emit_field_changed(&field_changed_relay, CascadeEvent::InputChanged(input.clone()))
            });
        }
    }

    on_page_restored(move || emit_field_changed(&field_changed_relay, CascadeEvent::PageRestored));

    log::info!("cascade '{}' mounted", cascade.name());

    let event_loop = Task::start_droppable(async move {
        run_pass(cascade.clone(), CascadeEvent::PageRestored, follow_up.clone());
        while let Some(event) = field_changed_stream.next().await {
            run_pass(cascade.clone(), event, follow_up.clone());
        }
    });

    Some(MountedCascade {
        _event_loop: event_loop,
    })
}

// Passes run concurrently; per-node request sequences keep the latest one.
fn run_pass(cascade: Rc<PageCascade>, event: CascadeEvent, follow_up: FollowUp) {
    Task::start(async move {
        let outcomes = if event == CascadeEvent::PageRestored {
            cascade.reapply_all().await
        } else {
            cascade.handle(&event).await
        };
        for outcome in &outcomes {
            log::debug!("cascade '{}': {:?}", cascade.name(), outcome);
        }
        follow_up(&event, &outcomes);
    });
}

pub fn no_follow_up() -> FollowUp {
    Rc::new(|_, _| {})
}

/// Today as `YYYY-MM-DD` (UTC, as `<input type="date">` compares it).
pub fn today_iso() -> String {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    iso.chars().take(10).collect()
}
