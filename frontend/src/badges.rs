//! Pending-count badges in the portal navigation.

use crate::dataflow::{Actor, Relay, relay};
use crate::dom;
use crate::dom::http::get_json;
use crate::polling::{RefreshGate, refresh_requests};
use futures::StreamExt;
use shared::{PendingCounts, PollingSection};
use web_sys::HtmlElement;
use zoon::{SignalExt, Task, TaskHandle};

const MANAGE_LEAVE_BADGE: &str = ".js-hrmis-pending-manage-leave-badge";
const PROFILE_UPDATE_BADGE: &str = ".js-hrmis-pending-profile-update-badge";

/// Text and visibility of one count badge.
pub fn badge_state(count: u32) -> (String, bool) {
    (count.to_string(), count > 0)
}

fn render_badge(badge: Option<&HtmlElement>, count: u32) {
    let Some(badge) = badge else {
        return;
    };
    let (text, shown) = badge_state(count);
    badge.set_text_content(Some(&text));
    dom::set_display(badge, shown, "inline-flex");
}

fn emit_tab_visible(tab_visible_relay: &Relay<()>) {
    tab_visible_relay.send(());
}

pub struct PendingBadges {
    /// `None` until the first successful refresh; server-rendered badges stay as they are.
    #[allow(dead_code)]
    counts: Actor<Option<PendingCounts>>,
    _render_task: TaskHandle,
}

impl PendingBadges {
    /// `None` when the page shows neither badge.
    pub fn mount(polling: &PollingSection) -> Option<Self> {
        let leave_badge = dom::query_html(MANAGE_LEAVE_BADGE);
        let profile_badge = dom::query_html(PROFILE_UPDATE_BADGE);
        if leave_badge.is_none() && profile_badge.is_none() {
            return None;
        }

        let (tab_visible_relay, tab_visible_stream) = relay::<()>();
        dom::events::on_tab_visible(move || emit_tab_visible(&tab_visible_relay));

        let url = polling.pending_counts_url.clone();
        let interval_ms = polling.interval_ms;
        let min_gap_ms = polling.min_refresh_gap_ms;
        let counts = Actor::new(None::<PendingCounts>, async move |state| {
            let mut gate = RefreshGate::new(min_gap_ms);
            let mut requests = refresh_requests(interval_ms, tab_visible_stream);
            while let Some(force) = requests.next().await {
                if !gate.try_begin(js_sys::Date::now(), force) {
                    continue;
                }
                // Failures keep the last rendered counts.
                match get_json::<PendingCounts>(&url, &[]).await {
                    Ok(fresh) if fresh.ok => state.set_neq(Some(fresh)),
                    Ok(_) => log::debug!("pending counts request rejected"),
                    Err(error) => log::debug!("pending counts unavailable: {}", error),
                }
            }
        });

        let render_task = Task::start_droppable(counts.signal().for_each(move |counts| {
            if let Some(counts) = counts {
                render_badge(leave_badge.as_ref(), counts.pending_manage_leave_count);
                render_badge(profile_badge.as_ref(), counts.pending_profile_update_count);
            }
            async {}
        }));

        Some(Self {
            counts,
            _render_task: render_task,
        })
    }
}
