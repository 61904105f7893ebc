//! Notification bell, dropdown list and the notifications page form.

use crate::dataflow::{Actor, Relay, relay};
use crate::dom;
use crate::dom::events::{closest_target, listen};
use crate::dom::http::{get_json, post_form};
use crate::polling::{RefreshGate, refresh_requests};
use futures::StreamExt;
use shared::{NotificationEntry, NotificationsPayload, PollingSection, ReadReceipt};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlButtonElement, HtmlElement, Node};
use zoon::{Mutable, SignalExt, Task, TaskHandle};

const BELL: &str = ".js-hrmis-bell";
const BELL_BADGE: &str = ".js-hrmis-bell-badge";
const DROPDOWN: &str = ".js-hrmis-notif-dropdown";
const LIST: &str = ".js-hrmis-notif-list";
const READ_ALL_BUTTON: &str = ".js-hrmis-notif-read-all";
const READ_ALL_FORM: &str = ".js-hrmis-notif-read-all-form";
const DISMISS_BUTTON: &str = ".js-hrmis-notif-dismiss";
const ITEM_CLASS: &str = "hrmis-notif-item";
const UNREAD_CLASS: &str = "is-unread";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum NotificationFeed {
    #[default]
    NotLoaded,
    Loaded(NotificationsPayload),
    Failed,
}

/// `2024-05-01T10:20:30.123` -> `2024-05-01 10:20:30`.
pub fn format_notification_date(raw: &str) -> String {
    let date = raw.replacen('T', " ", 1);
    match date.rsplit_once('.') {
        Some((head, fraction))
            if !fraction.is_empty() && fraction.chars().all(|ch| ch.is_ascii_digit()) =>
        {
            head.to_string()
        }
        _ => date,
    }
}

pub fn subject_text(entry: &NotificationEntry) -> String {
    let subject = entry.subject.as_deref().unwrap_or("").trim();
    if subject.is_empty() {
        "Notification".to_string()
    } else {
        subject.to_string()
    }
}

pub fn dismiss_label(is_read: bool) -> &'static str {
    if is_read { "Read" } else { "Dismiss" }
}

fn render_unread_badge(badge: Option<&HtmlElement>, unread_count: u32) {
    if let Some(badge) = badge {
        badge.set_text_content(Some(&unread_count.to_string()));
        dom::set_display(badge, unread_count > 0, "");
    }
}

fn render_item(entry: &NotificationEntry) -> Option<HtmlElement> {
    let class_name = if entry.is_read {
        ITEM_CLASS.to_string()
    } else {
        format!("{} {}", ITEM_CLASS, UNREAD_CLASS)
    };
    let item = dom::create_element("div", &class_name, None)?;
    let _ = item.dataset().set("notificationId", &entry.id_text());

    let main = dom::create_element("div", "hrmis-notif-item__main", None)?;
    let subject = dom::create_element("div", "hrmis-notif-item__subject", Some(&subject_text(entry)))?;
    dom::append(&main, &subject);
    let body = entry.body.as_deref().unwrap_or("").trim();
    if !body.is_empty() {
        let body = dom::create_element("div", "hrmis-notif-item__body", Some(body))?;
        dom::append(&main, &body);
    }
    let date = format_notification_date(entry.date.as_deref().unwrap_or(""));
    let meta = dom::create_element("div", "hrmis-notif-item__meta", Some(&date))?;
    dom::append(&main, &meta);

    let actions = dom::create_element("div", "hrmis-notif-item__actions", None)?;
    let button = dom::create_element(
        "button",
        "hrmis-notif-item__dismiss js-hrmis-notif-dismiss",
        Some(dismiss_label(entry.is_read)),
    )?
    .dyn_into::<HtmlButtonElement>()
    .ok()?;
    button.set_type("button");
    button.set_disabled(entry.is_read);
    dom::append(&actions, &button);

    dom::append(&item, &main);
    dom::append(&item, &actions);
    Some(item)
}

fn render_feed(list: &HtmlElement, badge: Option<&HtmlElement>, feed: &NotificationFeed) {
    let empty_message = match feed {
        NotificationFeed::NotLoaded => return,
        NotificationFeed::Failed => Some("Could not load notifications."),
        NotificationFeed::Loaded(payload) => {
            render_unread_badge(badge, payload.unread_count);
            payload.notifications.is_empty().then_some("No notifications.")
        }
    };
    list.set_text_content(None);
    if let Some(message) = empty_message {
        if let Some(empty) = dom::create_element("div", "hrmis-notif-empty", Some(message)) {
            dom::append(list, &empty);
        }
        return;
    }
    if let NotificationFeed::Loaded(payload) = feed {
        for entry in &payload.notifications {
            if let Some(item) = render_item(entry) {
                dom::append(list, &item);
            }
        }
    }
}

fn request_refresh(refresh_requested_relay: &Relay<()>) {
    refresh_requested_relay.send(());
}

fn event_node(event: &web_sys::Event) -> Option<Node> {
    event.target()?.dyn_into::<Node>().ok()
}

pub struct NotificationBell {
    #[allow(dead_code)]
    feed: Actor<NotificationFeed>,
    _render_task: TaskHandle,
}

impl NotificationBell {
    /// `None` when the page has no bell.
    pub fn mount(polling: &PollingSection) -> Option<Self> {
        let bell = dom::query_html(BELL)?;
        let dropdown = dom::query_html(DROPDOWN)?;
        let list = dom::query_html(LIST)?;
        let badge = dom::query_html(BELL_BADGE);

        let (refresh_requested_relay, refresh_requested_stream) = relay::<()>();
        let dropdown_open = Mutable::new(false);

        listen(&bell, "click", {
            let dropdown = dropdown.clone();
            let dropdown_open = dropdown_open.clone();
            let refresh_requested_relay = refresh_requested_relay.clone();
            move |event| {
                event.prevent_default();
                event.stop_propagation();
                let open = !dropdown_open.get();
                dropdown_open.set(open);
                dom::set_display(&dropdown, open, "");
                if open {
                    request_refresh(&refresh_requested_relay);
                }
            }
        });

        if let Some(document) = dom::document() {
            let bell = bell.clone();
            let dropdown = dropdown.clone();
            let dropdown_open = dropdown_open.clone();
            listen(&document, "click", move |event| {
                if !dropdown_open.get() {
                    return;
                }
                let target = event_node(&event);
                if dropdown.contains(target.as_ref()) || bell.contains(target.as_ref()) {
                    return;
                }
                dropdown_open.set(false);
                dom::set_display(&dropdown, false, "");
            });
        }

        listen(&list, "click", {
            let read_url = polling.notifications_read_url.clone();
            let badge = badge.clone();
            move |event| {
                let Some(button) = closest_target(&event, DISMISS_BUTTON)
                    .and_then(|button| button.dyn_into::<HtmlButtonElement>().ok())
                else {
                    return;
                };
                let Some(item) = closest_target(&event, &format!(".{}", ITEM_CLASS)) else {
                    return;
                };
                let Some(id) = item
                    .dyn_ref::<HtmlElement>()
                    .and_then(|item| item.dataset().get("notificationId"))
                else {
                    return;
                };
                dismiss(button, item, id, read_url.clone(), badge.clone());
            }
        });

        if let Some(read_all) = dom::query(READ_ALL_BUTTON)
            .and_then(|button| button.dyn_into::<HtmlButtonElement>().ok())
        {
            let read_all_url = polling.notifications_read_all_url.clone();
            let badge = badge.clone();
            let refresh_requested_relay = refresh_requested_relay.clone();
            let button = read_all.clone();
            listen(&read_all, "click", move |event| {
                event.prevent_default();
                button.set_disabled(true);
                let button = button.clone();
                let read_all_url = read_all_url.clone();
                let badge = badge.clone();
                let refresh_requested_relay = refresh_requested_relay.clone();
                Task::start(async move {
                    match post_form::<ReadReceipt>(&read_all_url, &[]).await {
                        Ok(receipt) => {
                            render_unread_badge(badge.as_ref(), receipt.unread_count);
                            request_refresh(&refresh_requested_relay);
                        }
                        Err(error) => log::warn!("marking all notifications read failed: {}", error),
                    }
                    button.set_disabled(false);
                });
            });
        }

        let url = polling.notifications_url.clone();
        let limit = polling.notifications_limit.to_string();
        let interval_ms = polling.interval_ms;
        let min_gap_ms = polling.min_refresh_gap_ms;
        let feed = Actor::new(NotificationFeed::NotLoaded, async move |state| {
            let mut gate = RefreshGate::new(min_gap_ms);
            let mut requests = refresh_requests(interval_ms, refresh_requested_stream);
            let params = [("limit".to_string(), limit)];
            while let Some(force) = requests.next().await {
                if !gate.try_begin(js_sys::Date::now(), force) {
                    continue;
                }
                match get_json::<NotificationsPayload>(&url, &params).await {
                    Ok(payload) if payload.ok => state.set(NotificationFeed::Loaded(payload)),
                    Ok(_) => log::debug!("notifications request rejected"),
                    Err(error) => {
                        log::debug!("notifications unavailable: {}", error);
                        state.set(NotificationFeed::Failed);
                    }
                }
            }
        });

        let render_task = Task::start_droppable(feed.signal().for_each(move |feed| {
            render_feed(&list, badge.as_ref(), &feed);
            async {}
        }));

        Some(Self {
            feed,
            _render_task: render_task,
        })
    }
}

fn dismiss(
    button: HtmlButtonElement,
    item: Element,
    id: String,
    read_url: String,
    badge: Option<HtmlElement>,
) {
    button.set_disabled(true);
    Task::start(async move {
        match post_form::<ReadReceipt>(&read_url, &[("ids", id)]).await {
            Ok(receipt) => {
                render_unread_badge(badge.as_ref(), receipt.unread_count);
                let _ = item.class_list().remove_1(UNREAD_CLASS);
                button.set_text_content(Some(dismiss_label(true)));
            }
            Err(error) => {
                log::warn!("dismissing notification failed: {}", error);
                button.set_disabled(false);
            }
        }
    });
}

/// Notifications page: "Mark all read" submits in the background, then reloads.
pub fn mount_read_all_form(polling: &PollingSection) {
    let Some(form) = dom::query(READ_ALL_FORM) else {
        return;
    };
    let read_all_url = polling.notifications_read_all_url.clone();
    let submit_button = dom::query_in(&form, "button[type='submit']")
        .and_then(|button| button.dyn_into::<HtmlButtonElement>().ok());
    listen(&form, "submit", move |event| {
        event.prevent_default();
        if let Some(button) = &submit_button {
            button.set_disabled(true);
        }
        let read_all_url = read_all_url.clone();
        let submit_button = submit_button.clone();
        Task::start(async move {
            match post_form::<ReadReceipt>(&read_all_url, &[]).await {
                Ok(_) => {
                    if let Some(window) = web_sys::window()
                        && window.location().reload().is_err()
                    {
                        log::warn!("page reload failed");
                    }
                }
                Err(error) => {
                    log::warn!("marking all notifications read failed: {}", error);
                    if let Some(button) = &submit_button {
                        button.set_disabled(false);
                    }
                }
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dates_drop_separator_and_fraction() {
        assert_eq!(
            format_notification_date("2024-05-01T10:20:30.123456"),
            "2024-05-01 10:20:30"
        );
        assert_eq!(format_notification_date("2024-05-01 10:20:30"), "2024-05-01 10:20:30");
        assert_eq!(format_notification_date(""), "");
    }

    #[test]
    fn blank_subject_falls_back() {
        let entry: NotificationEntry = serde_json::from_value(json!({
            "id": 3,
            "subject": "   ",
            "is_read": true
        }))
        .unwrap();
        assert_eq!(subject_text(&entry), "Notification");
        assert_eq!(dismiss_label(entry.is_read), "Read");
        assert_eq!(entry.id_text(), "3");
    }
}
