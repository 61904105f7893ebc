//! In-memory page and scripted lookup for cascade tests.

use super::error::LookupError;
use super::host::SelectorHost;
use super::lookup::{LookupRequest, OptionLookup};
use crate::error_display::InlineNotice;
use futures::channel::oneshot;
use indexmap::IndexMap;
use serde_json::Value;
use shared::SelectOption;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

#[derive(Default)]
struct MemorySelect {
    options: Vec<SelectOption>,
    hidden: Vec<bool>,
    selected: String,
}

#[derive(Default)]
pub struct MemoryHost {
    selects: RefCell<IndexMap<String, MemorySelect>>,
    inputs: RefCell<HashMap<String, String>>,
    data: RefCell<HashMap<(String, String), String>>,
    notices: RefCell<HashMap<String, InlineNotice>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_select(&self, selector: &str, options: Vec<SelectOption>) {
        let selected = options.first().map(|option| option.value.clone()).unwrap_or_default();
        let hidden = vec![false; options.len()];
        self.selects.borrow_mut().insert(
            selector.to_string(),
            MemorySelect {
                options,
                hidden,
                selected,
            },
        );
    }

    /// Simulates the user picking a value, without firing any event.
    pub fn set_selected(&self, selector: &str, value: &str) {
        if let Some(select) = self.selects.borrow_mut().get_mut(selector) {
            select.selected = value.to_string();
        }
    }

    pub fn set_input(&self, selector: &str, value: &str) {
        self.inputs
            .borrow_mut()
            .insert(selector.to_string(), value.to_string());
    }

    pub fn set_data(&self, selector: &str, key: &str, value: &str) {
        self.data
            .borrow_mut()
            .insert((selector.to_string(), key.to_string()), value.to_string());
    }

    pub fn visible_values(&self, selector: &str) -> Vec<String> {
        self.selects
            .borrow()
            .get(selector)
            .map(|select| {
                select
                    .options
                    .iter()
                    .zip(&select.hidden)
                    .filter(|(_, hidden)| !**hidden)
                    .map(|(option, _)| option.value.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn labels(&self, selector: &str) -> Vec<String> {
        self.options(selector)
            .into_iter()
            .map(|option| option.label)
            .collect()
    }

    pub fn notice(&self, selector: &str) -> Option<InlineNotice> {
        self.notices.borrow().get(selector).cloned()
    }
}

impl SelectorHost for MemoryHost {
    fn contains(&self, selector: &str) -> bool {
        self.selects.borrow().contains_key(selector)
            || self.inputs.borrow().contains_key(selector)
    }

    fn options(&self, selector: &str) -> Vec<SelectOption> {
        self.selects
            .borrow()
            .get(selector)
            .map(|select| select.options.clone())
            .unwrap_or_default()
    }

    fn selected_value(&self, selector: &str) -> String {
        self.selects
            .borrow()
            .get(selector)
            .map(|select| select.selected.clone())
            .unwrap_or_default()
    }

    fn select_value(&self, selector: &str, value: &str) {
        if let Some(select) = self.selects.borrow_mut().get_mut(selector) {
            let offered = select.options.iter().any(|option| option.value == value);
            select.selected = if offered { value.to_string() } else { String::new() };
        }
    }

    fn apply_visibility(&self, selector: &str, visibility: &[bool], disable_hidden: bool) {
        if let Some(select) = self.selects.borrow_mut().get_mut(selector) {
            select.hidden = visibility.iter().map(|visible| !visible).collect();
            select.hidden.resize(select.options.len(), false);
            if disable_hidden {
                for (option, visible) in select.options.iter_mut().zip(visibility).skip(1) {
                    option.disabled = !visible;
                }
            }
        }
    }

    fn replace_options(&self, selector: &str, options: &[SelectOption]) {
        if let Some(select) = self.selects.borrow_mut().get_mut(selector) {
            select.options = options.to_vec();
            select.hidden = vec![false; options.len()];
            select.selected = options.first().map(|option| option.value.clone()).unwrap_or_default();
        }
    }

    fn input_value(&self, selector: &str) -> String {
        self.inputs.borrow().get(selector).cloned().unwrap_or_default()
    }

    fn data_attribute(&self, selector: &str, key: &str) -> String {
        self.data
            .borrow()
            .get(&(selector.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn set_notice(&self, selector: &str, _notice_target: Option<&str>, notice: Option<&InlineNotice>) {
        let mut notices = self.notices.borrow_mut();
        match notice {
            Some(notice) => {
                notices.insert(selector.to_string(), notice.clone());
            }
            None => {
                notices.remove(selector);
            }
        }
    }
}

type LookupResult = Result<Value, LookupError>;

/// Lookup answering from a queue of canned responses. When the queue is
/// empty the request stays pending until [`ScriptedLookup::release`].
#[derive(Default)]
pub struct ScriptedLookup {
    scripted: RefCell<VecDeque<LookupResult>>,
    pending: RefCell<Vec<Option<oneshot::Sender<LookupResult>>>>,
    requests: RefCell<Vec<LookupRequest>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, result: LookupResult) {
        self.scripted.borrow_mut().push_back(result);
    }

    /// Completes the `index`-th request that went pending.
    pub fn release(&self, index: usize, result: LookupResult) {
        let sender = self
            .pending
            .borrow_mut()
            .get_mut(index)
            .and_then(Option::take);
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }

    pub fn requests(&self) -> Vec<LookupRequest> {
        self.requests.borrow().clone()
    }
}

impl OptionLookup for ScriptedLookup {
    async fn fetch(&self, request: LookupRequest) -> Result<Value, LookupError> {
        self.requests.borrow_mut().push(request);
        let scripted = self.scripted.borrow_mut().pop_front();
        if let Some(result) = scripted {
            return result;
        }
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push(Some(sender));
        receiver
            .await
            .unwrap_or_else(|_| Err(LookupError::Network("request dropped".to_string())))
    }
}
