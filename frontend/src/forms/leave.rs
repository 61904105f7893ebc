//! Leave request form: leave types for the chosen start date, supporting
//! document hints, leave type limits and the approver chain preview.

use super::{FollowUp, MountedCascade, mount_cascade};
use crate::cascade::{CascadeEvent, NodeOutcome, RequestSequence, SelectorHost};
use crate::dom::http::get_json;
use crate::dom::{self, DomSelectorHost};
use shared::{
    Approver, ApproverStep, ApproversPayload, ChainSpec, OptionSource, PortalConfig, SelectOption,
    attribute_text,
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};
use zoon::Task;

const FORM: &str = ".hrmis-leave-request-form";

const SUPPORT_DOC: &str = ".js-hrmis-support-doc";
const SUPPORT_DOC_NOTE: &str = ".js-hrmis-support-doc-note";
const SUPPORT_DOC_FILE: &str = ".js-hrmis-support-doc-file";
const SUPPORT_DOC_REQUIRED: &str = ".js-hrmis-support-doc-required";
const SUPPORT_DOC_LABEL: &str = ".js-hrmis-support-doc-label";

const TYPE_INFO: &str = ".js-leave-type-info";

const APPROVER_PANEL: &str = ".js-hrmis-approver-panel";
const APPROVER_EMPTY: &str = ".js-hrmis-approver-empty";
const APPROVER_STEPS: &str = ".js-hrmis-approver-steps";

pub fn mount(config: &PortalConfig) -> Option<MountedCascade> {
    let form = dom::query_html(FORM)?;
    let dataset = form.dataset();
    let non_empty = |key: &str| dataset.get(key).filter(|value| !value.trim().is_empty());

    let mut chain = config.cascade("leave_types")?.clone();
    if let Some(endpoint) = non_empty("leaveTypesUrl") {
        override_endpoint(&mut chain, &endpoint);
    }
    let approvers_url =
        non_empty("leaveApproversUrl").unwrap_or_else(|| config.leave_form.approvers_url.clone());
    let leave_type = chain.nodes.first()?.selector.clone();

    let approvers = Rc::new(ApproverPanel {
        form: form.clone(),
        url: approvers_url,
        sequence: RequestSequence::new(),
    });
    let follow_up: FollowUp = Rc::new(move |event, outcomes| {
        let selected = DomSelectorHost.selected_option(&leave_type);
        render_support_doc(&form, selected.as_ref());
        render_type_info(selected.as_ref());
        if approvers_outdated(event, outcomes, &leave_type) {
            let leave_type_id = selected.map(|option| option.value).unwrap_or_default();
            approvers.refresh(leave_type_id);
        }
    });
    mount_cascade(&chain, follow_up)
}

/// Points the chain root at a form-provided endpoint.
pub fn override_endpoint(chain: &mut ChainSpec, endpoint: &str) {
    if let Some(OptionSource::Remote(remote)) = chain.nodes.first_mut().map(|node| &mut node.source) {
        remote.endpoint = endpoint.to_string();
    }
}

fn approvers_outdated(event: &CascadeEvent, outcomes: &[NodeOutcome], leave_type: &str) -> bool {
    matches!(event, CascadeEvent::SelectorChanged(selector) if selector == leave_type)
        || outcomes
            .iter()
            .any(|outcome| outcome.selector() == leave_type && outcome.reloaded())
}

// ===== SUPPORTING DOCUMENT =====

#[derive(Debug, Clone, PartialEq)]
pub struct SupportDocState {
    pub required: bool,
    pub helper: String,
    /// Appended to the upload label, e.g. ` (Medical certificate)`.
    pub label_suffix: String,
}

pub fn support_doc_state(leave_type: Option<&SelectOption>) -> SupportDocState {
    let required = leave_type.is_some_and(|option| option.attribute("supportDocument") == "1");
    let note = leave_type
        .map(|option| option.attribute("supportDocumentNote").trim())
        .unwrap_or("");
    let helper = match (required, note.is_empty()) {
        (true, false) => note.to_string(),
        (true, true) => "Please upload the required supporting document.".to_string(),
        (false, _) => "Optional.".to_string(),
    };
    let label_suffix = if required && !note.is_empty() {
        format!(" ({})", note)
    } else {
        String::new()
    };
    SupportDocState {
        required,
        helper,
        label_suffix,
    }
}

fn render_support_doc(form: &Element, leave_type: Option<&SelectOption>) {
    if dom::query_in(form, SUPPORT_DOC).is_none() {
        return;
    }
    let (Some(note), Some(file)) = (
        dom::query_in(form, SUPPORT_DOC_NOTE),
        dom::query_in(form, SUPPORT_DOC_FILE).and_then(|file| file.dyn_into::<HtmlInputElement>().ok()),
    ) else {
        return;
    };
    let state = support_doc_state(leave_type);

    if let Some(mark) = dom::query_html_in(form, SUPPORT_DOC_REQUIRED) {
        dom::set_display(&mark, state.required, "");
    }
    dom::set_text(&note, &state.helper);
    file.set_required(state.required);

    if let Some(label) = dom::query_html_in(form, SUPPORT_DOC_LABEL) {
        let dataset = label.dataset();
        let base = match dataset.get("baseLabel") {
            Some(base) => base,
            None => {
                let base = label.text_content().unwrap_or_default().trim().to_string();
                let _ = dataset.set("baseLabel", &base);
                base
            }
        };
        label.set_text_content(Some(&format!("{}{}", base, state.label_suffix)));
    }
}

// ===== LEAVE TYPE INFO =====

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveTypeInfo {
    /// One decimal place.
    pub balance: String,
    pub has_balance: bool,
    pub max_duration: Option<String>,
    pub max_times: Option<String>,
    pub unpaid: bool,
}

fn number(option: &SelectOption, key: &str) -> f64 {
    option.attribute(key).trim().parse::<f64>().unwrap_or(0.0)
}

/// `None` when no leave type is selected.
pub fn leave_type_info(leave_type: Option<&SelectOption>) -> Option<LeaveTypeInfo> {
    let option = leave_type.filter(|option| !option.value.is_empty())?;
    let balance = number(option, "balance");

    let max_duration = [
        ("maxYear", "days/year"),
        ("maxRequest", "days/request"),
        ("maxMonth", "days/month"),
    ]
    .into_iter()
    .map(|(key, unit)| (number(option, key), unit))
    .find(|(limit, _)| *limit > 0.0)
    .map(|(limit, unit)| format!("{} {}", limit, unit));

    let max_times = number(option, "maxTimes").trunc() as i64;

    Some(LeaveTypeInfo {
        balance: format!("{:.1}", balance),
        has_balance: balance > 0.0,
        max_duration,
        max_times: (max_times > 0).then(|| max_times.to_string()),
        unpaid: option.attribute("unpaid") == "1",
    })
}

fn render_type_info(leave_type: Option<&SelectOption>) {
    let Some(panel) = dom::query_html(TYPE_INFO) else {
        return;
    };
    let Some(info) = leave_type_info(leave_type) else {
        dom::set_display(&panel, false, "block");
        return;
    };
    dom::set_display(&panel, true, "block");

    let show = |selector: &str, shown: bool| {
        if let Some(part) = dom::query_html_in(&panel, selector) {
            dom::set_display(&part, shown, "block");
        }
    };
    let write = |selector: &str, text: &str| {
        if let Some(part) = dom::query_in(&panel, selector) {
            dom::set_text(&part, text);
        }
    };

    write(".js-balance-value", &info.balance);
    show(".js-leave-no-balance", !info.has_balance);
    show(".js-leave-balance", info.has_balance);

    show(".js-leave-max", info.max_duration.is_some());
    if let Some(max_duration) = &info.max_duration {
        write(".js-max-value", max_duration);
    }
    show(".js-leave-times", info.max_times.is_some());
    if let Some(max_times) = &info.max_times {
        write(".js-times-value", max_times);
    }
    show(".js-leave-unpaid", info.unpaid);
}

// ===== APPROVER CHAIN =====

/// Steps with at least one approver covering `employee_bps`.
pub fn visible_steps(steps: &[ApproverStep], employee_bps: i64) -> Vec<ApproverStep> {
    steps
        .iter()
        .filter_map(|step| {
            let approvers: Vec<Approver> = step
                .approvers
                .iter()
                .filter(|approver| approver.covers_bps(employee_bps))
                .cloned()
                .collect();
            (!approvers.is_empty()).then(|| ApproverStep {
                step: step.step.clone(),
                approvers,
            })
        })
        .collect()
}

pub fn approver_subline(approver: &Approver) -> String {
    let meta: Vec<&str> = [approver.job_title.as_deref(), approver.department.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let sequence = attribute_text(&approver.sequence);
    if meta.is_empty() {
        format!("Seq: {}", sequence)
    } else {
        format!("Seq: {} — {}", sequence, meta.join(" • "))
    }
}

pub fn approver_badge(approver: &Approver) -> &str {
    approver
        .sequence_type
        .as_deref()
        .filter(|kind| !kind.is_empty())
        .unwrap_or("sequential")
}

struct ApproverPanel {
    form: HtmlElement,
    url: String,
    sequence: RequestSequence,
}

impl ApproverPanel {
    fn refresh(self: &Rc<Self>, leave_type_id: String) {
        let Some(panel) = dom::query_html_in(&self.form, APPROVER_PANEL) else {
            return;
        };
        let dataset = self.form.dataset();
        let Some(employee_id) = dataset.get("employeeId").filter(|id| !id.is_empty()) else {
            return;
        };
        let employee_bps = dataset
            .get("employeeBps")
            .and_then(|bps| bps.trim().parse::<i64>().ok())
            .unwrap_or(0);

        let ticket = self.sequence.issue();
        if leave_type_id.is_empty() {
            render_approvers(&panel, &[]);
            return;
        }

        let this = Rc::clone(self);
        Task::start(async move {
            let params = [
                ("employee_id".to_string(), employee_id),
                ("leave_type_id".to_string(), leave_type_id),
            ];
            let steps = match get_json::<ApproversPayload>(&this.url, &params).await {
                Ok(payload) if payload.ok => payload.steps,
                Ok(_) => Vec::new(),
                Err(error) => {
                    log::warn!("approver chain unavailable: {}", error);
                    Vec::new()
                }
            };
            if !this.sequence.is_latest(ticket) {
                log::debug!("approver response superseded");
                return;
            }
            render_approvers(&panel, &visible_steps(&steps, employee_bps));
        });
    }
}

fn render_approvers(panel: &HtmlElement, steps: &[ApproverStep]) {
    let Some(steps_element) = dom::query_html_in(panel, APPROVER_STEPS) else {
        return;
    };
    if let Some(empty) = dom::query_html_in(panel, APPROVER_EMPTY) {
        dom::set_display(&empty, steps.is_empty(), "");
    }
    dom::set_display(&steps_element, !steps.is_empty(), "");
    steps_element.set_text_content(None);

    for step in steps {
        if let Some(step_element) = render_step(step) {
            dom::append(&steps_element, &step_element);
        }
    }
}

fn render_step(step: &ApproverStep) -> Option<HtmlElement> {
    let element = dom::create_element("div", "hrmis-approver-step", None)?;
    let title = format!("Step {}", attribute_text(&step.step));
    let title = dom::create_element("div", "hrmis-approver-step__title", Some(&title))?;
    let list = dom::create_element("div", "hrmis-approver-step__list", None)?;

    for approver in &step.approvers {
        let item = dom::create_element("div", "hrmis-approver-step__item", None)?;
        let row = dom::create_element("div", "hrmis-approver-step__row", None)?;
        let name = dom::create_element("div", "hrmis-approver-step__name", Some(&approver.name))?;
        let badge =
            dom::create_element("div", "hrmis-approver-step__badge", Some(approver_badge(approver)))?;
        let sub = dom::create_element(
            "div",
            "hrmis-approver-step__sub",
            Some(&approver_subline(approver)),
        )?;
        dom::append(&row, &name);
        dom::append(&row, &badge);
        dom::append(&item, &row);
        dom::append(&item, &sub);
        dom::append(&list, &item);
    }

    dom::append(&element, &title);
    dom::append(&element, &list);
    Some(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leave_type(attributes: &[(&str, &str)]) -> SelectOption {
        attributes
            .iter()
            .fold(SelectOption::new("7", "Casual Leave"), |option, (key, value)| {
                option.with_attribute(*key, *value)
            })
    }

    #[test]
    fn support_document_hint_follows_leave_type() {
        let optional = support_doc_state(Some(&leave_type(&[("supportDocument", "0")])));
        assert!(!optional.required);
        assert_eq!(optional.helper, "Optional.");
        assert_eq!(optional.label_suffix, "");

        let bare = support_doc_state(Some(&leave_type(&[("supportDocument", "1")])));
        assert!(bare.required);
        assert_eq!(bare.helper, "Please upload the required supporting document.");

        let noted = support_doc_state(Some(&leave_type(&[
            ("supportDocument", "1"),
            ("supportDocumentNote", " Medical certificate "),
        ])));
        assert_eq!(noted.helper, "Medical certificate");
        assert_eq!(noted.label_suffix, " (Medical certificate)");

        assert!(!support_doc_state(None).required);
    }

    #[test]
    fn type_info_prefers_yearly_limit() {
        let info = leave_type_info(Some(&leave_type(&[
            ("balance", "12.26"),
            ("maxYear", "0"),
            ("maxRequest", "15"),
            ("maxMonth", "4"),
            ("maxTimes", "3"),
        ])))
        .unwrap();
        assert_eq!(info.balance, "12.3");
        assert!(info.has_balance);
        assert_eq!(info.max_duration.as_deref(), Some("15 days/request"));
        assert_eq!(info.max_times.as_deref(), Some("3"));
        assert!(!info.unpaid);

        let empty = leave_type_info(Some(&leave_type(&[("unpaid", "1")]))).unwrap();
        assert_eq!(empty.balance, "0.0");
        assert!(!empty.has_balance);
        assert_eq!(empty.max_duration, None);
        assert_eq!(empty.max_times, None);
        assert!(empty.unpaid);

        assert_eq!(leave_type_info(Some(&SelectOption::placeholder("Select"))), None);
    }

    #[test]
    fn approver_steps_are_filtered_by_bps() {
        let payload: ApproversPayload = serde_json::from_value(json!({
            "ok": true,
            "steps": [
                { "step": 1, "approvers": [
                    { "name": "Medical Superintendent", "sequence": 1,
                      "job_title": "MS", "department": "DHQ", "bps_from": 1, "bps_to": 17 }
                ]},
                { "step": 2, "approvers": [
                    { "name": "Secretary", "sequence": 2, "sequence_type": "parallel",
                      "bps_from": 18, "bps_to": 22 }
                ]}
            ]
        }))
        .unwrap();

        let junior = visible_steps(&payload.steps, 17);
        assert_eq!(junior.len(), 1);
        let approver = &junior[0].approvers[0];
        assert_eq!(approver_subline(approver), "Seq: 1 — MS • DHQ");
        assert_eq!(approver_badge(approver), "sequential");

        let senior = visible_steps(&payload.steps, 19);
        assert_eq!(senior.len(), 1);
        assert_eq!(approver_badge(&senior[0].approvers[0]), "parallel");
        assert_eq!(approver_subline(&senior[0].approvers[0]), "Seq: 2");
    }

    #[test]
    fn form_endpoint_replaces_configured_one() {
        let config = crate::config::builtin().unwrap();
        let mut chain = config.cascade("leave_types").unwrap().clone();
        override_endpoint(&mut chain, "/custom/leave/types");
        assert_eq!(
            chain.nodes[0].remote().unwrap().endpoint,
            "/custom/leave/types"
        );
    }

    #[test]
    fn approvers_follow_leave_type_changes_and_reloads() {
        let selector = ".js-hrmis-leave-type";
        assert!(approvers_outdated(
            &CascadeEvent::SelectorChanged(selector.to_string()),
            &[],
            selector
        ));
        assert!(approvers_outdated(
            &CascadeEvent::InputChanged(".js-hrmis-date-from".to_string()),
            &[NodeOutcome::Loaded {
                selector: selector.to_string(),
                count: 3
            }],
            selector
        ));
        assert!(!approvers_outdated(
            &CascadeEvent::InputChanged(".js-hrmis-date-from".to_string()),
            &[NodeOutcome::Superseded {
                selector: selector.to_string()
            }],
            selector
        ));
    }
}
