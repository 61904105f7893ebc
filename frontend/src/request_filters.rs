//! Client-side filters for the manage-requests table.

use crate::dom;
use crate::dom::events::{listen, on_page_restored};
use std::rc::Rc;
use web_sys::{Element, HtmlElement};
use wasm_bindgen::JsCast;

const PANEL: &str = ".hrmis-panel";
const SEARCH: &str = ".hrmis-filter__search";
const STATUS: &str = "[data-filter=\"status\"]";
const DATE: &str = "[data-filter=\"date\"]";
const ROW: &str = ".hrmis-manage-table__row";

/// Search terms shorter than this are ignored.
const MIN_SEARCH_LEN: usize = 3;
const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    #[default]
    Any,
    Today,
    TwoDays,
    Week,
}

impl DateWindow {
    pub fn from_value(value: &str) -> Self {
        match value {
            "today" => Self::Today,
            "2days" => Self::TwoDays,
            "week" => Self::Week,
            _ => Self::Any,
        }
    }

    /// Earliest row timestamp still shown.
    pub fn start_ms(self, now_ms: f64, midnight_ms: f64) -> Option<f64> {
        match self {
            Self::Any => None,
            Self::Today => Some(midnight_ms),
            Self::TwoDays => Some(now_ms - 2.0 * DAY_MS),
            Self::Week => Some(now_ms - 7.0 * DAY_MS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    search: String,
    status: String,
    window: DateWindow,
}

impl RowFilter {
    pub fn new(search: &str, status: &str, window: &str) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            status: status.to_string(),
            window: DateWindow::from_value(window),
        }
    }

    /// `row_date_ms` is `None` for rows without a parseable date; those
    /// are never hidden by the date window.
    pub fn matches(
        &self,
        row_search: &str,
        row_status: &str,
        row_date_ms: Option<f64>,
        now_ms: f64,
        midnight_ms: f64,
    ) -> bool {
        if self.search.chars().count() >= MIN_SEARCH_LEN
            && !row_search.to_lowercase().contains(&self.search)
        {
            return false;
        }
        if !self.status.is_empty() && row_status != self.status {
            return false;
        }
        match (self.window.start_ms(now_ms, midnight_ms), row_date_ms) {
            (Some(start), Some(row_date)) => row_date >= start,
            _ => true,
        }
    }
}

fn local_midnight_ms() -> f64 {
    let date = js_sys::Date::new_0();
    date.set_hours(0);
    date.set_minutes(0);
    date.set_seconds(0);
    date.set_milliseconds(0);
    date.get_time()
}

fn parse_date_ms(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }
    Some(js_sys::Date::parse(raw)).filter(|ms| !ms.is_nan())
}

pub fn mount() {
    let Some(panel) = dom::query(PANEL) else {
        return;
    };
    let rows: Vec<HtmlElement> = dom::query_all_in(&panel, ROW)
        .into_iter()
        .filter_map(|row| row.dyn_into::<HtmlElement>().ok())
        .collect();
    if rows.is_empty() {
        log::debug!("no request rows to filter");
        return;
    }
    let search = dom::query_in(&panel, SEARCH);
    let status = dom::query_in(&panel, STATUS);
    let date = dom::query_in(&panel, DATE);

    let value = |element: &Option<Element>| element.as_ref().map(dom::element_value).unwrap_or_default();
    let apply: Rc<dyn Fn()> = Rc::new({
        let (search, status, date) = (search.clone(), status.clone(), date.clone());
        move || {
            let filter = RowFilter::new(&value(&search), &value(&status), &value(&date));
            let now_ms = js_sys::Date::now();
            let midnight_ms = local_midnight_ms();
            let mut shown = 0;
            for row in &rows {
                let dataset = row.dataset();
                let visible = filter.matches(
                    &dataset.get("search").unwrap_or_default(),
                    &dataset.get("status").unwrap_or_default(),
                    dataset.get("date").as_deref().and_then(parse_date_ms),
                    now_ms,
                    midnight_ms,
                );
                dom::set_display(row, visible, "");
                shown += usize::from(visible);
            }
            log::debug!("request filter shows {} of {} rows", shown, rows.len());
        }
    });

    for (element, event_type) in [(search, "input"), (status, "change"), (date, "change")] {
        if let Some(element) = element {
            let apply = apply.clone();
            listen(&element, event_type, move |_| apply());
        }
    }
    {
        let apply = apply.clone();
        on_page_restored(move || apply());
    }
    apply();
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: f64 = 1_700_000_000_000.0;
    const MIDNIGHT: f64 = NOW - 10.0 * 60.0 * 60.0 * 1000.0;

    #[test]
    fn short_search_terms_are_ignored() {
        let filter = RowFilter::new("ab", "", "");
        assert!(filter.matches("Casual leave - Ali", "pending", None, NOW, MIDNIGHT));

        let filter = RowFilter::new(" ALI ", "", "");
        assert!(filter.matches("Casual leave - Ali", "pending", None, NOW, MIDNIGHT));
        assert!(!filter.matches("Casual leave - Sara", "pending", None, NOW, MIDNIGHT));
    }

    #[test]
    fn status_must_match_exactly() {
        let filter = RowFilter::new("", "approved", "");
        assert!(filter.matches("", "approved", None, NOW, MIDNIGHT));
        assert!(!filter.matches("", "pending", None, NOW, MIDNIGHT));
    }

    #[test]
    fn date_windows_start_at_midnight_or_relative_to_now() {
        let today = RowFilter::new("", "", "today");
        assert!(today.matches("", "", Some(MIDNIGHT), NOW, MIDNIGHT));
        assert!(!today.matches("", "", Some(MIDNIGHT - 1.0), NOW, MIDNIGHT));

        let two_days = RowFilter::new("", "", "2days");
        assert!(two_days.matches("", "", Some(NOW - DAY_MS), NOW, MIDNIGHT));
        assert!(!two_days.matches("", "", Some(NOW - 3.0 * DAY_MS), NOW, MIDNIGHT));

        let week = RowFilter::new("", "", "week");
        assert!(week.matches("", "", Some(NOW - 6.0 * DAY_MS), NOW, MIDNIGHT));
        assert!(!week.matches("", "", Some(NOW - 8.0 * DAY_MS), NOW, MIDNIGHT));
        assert!(week.matches("", "", None, NOW, MIDNIGHT));

        assert_eq!(DateWindow::from_value("month"), DateWindow::Any);
    }
}
