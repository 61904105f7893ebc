//! Dependent selector cascade.
//!
//! A cascade is one chain of `<select>` nodes, each filtered by or fetched
//! for the value selected upstream. Changes only ever flow downstream.

use super::error::CascadeError;
use super::host::SelectorHost;
use super::lookup::{LookupRequest, OptionLookup, options_from_payload};
use super::option_filter::{FilterContext, compute_visibility, selection_is_valid};
use super::sequence::RequestSequence;
use crate::error_display::{InlineNotice, log_notice_console_only};
use shared::{ChainSpec, MatchMode, NodeSpec, ParamSource, RemoteSource, SelectOption};
use std::cell::RefCell;
use std::collections::HashSet;

pub const LOADING_LABEL: &str = "Loading…";

/// Something on the page that may require a recompute.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeEvent {
    SelectorChanged(String),
    InputChanged(String),
    /// Back/forward cache restore; the DOM may no longer match our last pass.
    PageRestored,
}

/// What a recompute did to one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    Filtered { selector: String, cleared: bool },
    Loaded { selector: String, count: usize },
    /// A required query parameter was empty; only the placeholder remains.
    Skipped { selector: String },
    Failed { selector: String, code: String },
    /// A newer request for the same node was issued while this one ran.
    Superseded { selector: String },
}

impl NodeOutcome {
    pub fn selector(&self) -> &str {
        match self {
            Self::Filtered { selector, .. }
            | Self::Loaded { selector, .. }
            | Self::Skipped { selector }
            | Self::Failed { selector, .. }
            | Self::Superseded { selector } => selector,
        }
    }

    /// Whether the node's option set was replaced by this pass.
    pub fn reloaded(&self) -> bool {
        matches!(
            self,
            Self::Loaded { .. } | Self::Skipped { .. } | Self::Failed { .. }
        )
    }
}

struct CascadeNode {
    spec: NodeSpec,
    placeholder: SelectOption,
    sequence: RequestSequence,
    /// Selection to restore once the latest fetch lands. Captured when the
    /// first of overlapping fetches starts; the select only shows the
    /// loading placeholder after that.
    pending_value: RefCell<Option<String>>,
}

impl CascadeNode {
    fn pending_value(&self, current: impl FnOnce() -> String) -> String {
        self.pending_value
            .borrow_mut()
            .get_or_insert_with(current)
            .clone()
    }

    fn settle(&self) {
        self.pending_value.borrow_mut().take();
    }
}

pub struct Cascade<H, L> {
    name: String,
    nodes: Vec<CascadeNode>,
    host: H,
    lookup: L,
}

impl<H, L> Cascade<H, L>
where
    H: SelectorHost,
    L: OptionLookup,
{
    /// Orders the chain root first and checks it against the page.
    ///
    /// A missing required selector yields `ConfigurationAbsent`; a missing
    /// optional one ends the chain there.
    pub fn build(chain: &ChainSpec, host: H, lookup: L) -> Result<Self, CascadeError> {
        let ordered = order_chain(chain)?;

        let mut nodes = Vec::with_capacity(ordered.len());
        for spec in ordered {
            if !host.contains(&spec.selector) {
                if spec.optional && !nodes.is_empty() {
                    log::debug!(
                        "cascade '{}': optional '{}' not on page, chain ends before it",
                        chain.name,
                        spec.selector
                    );
                    break;
                }
                return Err(CascadeError::ConfigurationAbsent {
                    cascade: chain.name.clone(),
                    selector: spec.selector.clone(),
                });
            }
            let placeholder = host
                .options(&spec.selector)
                .into_iter()
                .next()
                .filter(|option| option.label != LOADING_LABEL)
                .unwrap_or_else(|| SelectOption::placeholder(""));
            nodes.push(CascadeNode {
                spec: spec.clone(),
                placeholder,
                sequence: RequestSequence::new(),
                pending_value: RefCell::new(None),
            });
        }

        log::debug!("cascade '{}' built with {} nodes", chain.name, nodes.len());
        Ok(Self {
            name: chain.name.clone(),
            nodes,
            host,
            lookup,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Node selectors, root first.
    pub fn selectors(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .map(|node| node.spec.selector.as_str())
            .collect()
    }

    /// Inputs whose edits recompute part of the chain.
    pub fn watched_inputs(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .flat_map(|node| node.spec.watched_inputs())
            .filter(|input| seen.insert(*input))
            .collect()
    }

    pub async fn handle(&self, event: &CascadeEvent) -> Vec<NodeOutcome> {
        match event {
            CascadeEvent::SelectorChanged(selector) => {
                match self.position(|spec| &spec.selector == selector) {
                    Some(index) if index + 1 < self.nodes.len() => {
                        self.on_parent_changed(index + 1).await
                    }
                    _ => Vec::new(),
                }
            }
            CascadeEvent::InputChanged(input) => {
                match self.position(|spec| spec.watched_inputs().contains(&input.as_str())) {
                    Some(index) => self.on_parent_changed(index).await,
                    None => Vec::new(),
                }
            }
            CascadeEvent::PageRestored => self.reapply_all().await,
        }
    }

    /// Re-derives every node from the current page state, root first.
    pub async fn reapply_all(&self) -> Vec<NodeOutcome> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        self.on_parent_changed(0).await
    }

    /// Recomputes the node at `index` and then everything below it.
    /// A superseded fetch stops the walk; the newer request continues it.
    pub async fn on_parent_changed(&self, index: usize) -> Vec<NodeOutcome> {
        let mut outcomes = Vec::new();
        for node in self.nodes.iter().skip(index) {
            let outcome = self.recompute(node).await;
            let superseded = matches!(outcome, NodeOutcome::Superseded { .. });
            outcomes.push(outcome);
            if superseded {
                break;
            }
        }
        outcomes
    }

    fn position(&self, predicate: impl Fn(&NodeSpec) -> bool) -> Option<usize> {
        self.nodes.iter().position(|node| predicate(&node.spec))
    }

    async fn recompute(&self, node: &CascadeNode) -> NodeOutcome {
        let parent_value = node
            .spec
            .parent
            .as_deref()
            .map(|parent| self.host.selected_value(parent))
            .unwrap_or_default();
        match node.spec.remote() {
            Some(remote) => self.refetch(node, remote, &parent_value).await,
            None => self.refilter(node, &parent_value),
        }
    }

    fn refilter(&self, node: &CascadeNode, parent_value: &str) -> NodeOutcome {
        let selector = &node.spec.selector;
        let options = self.host.options(selector);
        let visibility = self.visibility(node, &options, parent_value);
        self.host
            .apply_visibility(selector, &visibility, node.spec.disable_hidden);
        let cleared = self.clear_stale_selection(node, &options, &visibility);
        NodeOutcome::Filtered {
            selector: selector.clone(),
            cleared,
        }
    }

    async fn refetch(
        &self,
        node: &CascadeNode,
        remote: &RemoteSource,
        parent_value: &str,
    ) -> NodeOutcome {
        let selector = &node.spec.selector;
        let ticket = node.sequence.issue();
        let previous_value = node.pending_value(|| self.host.selected_value(selector));

        let waiting_for_parent = node.spec.parent.is_some()
            && node.spec.match_mode == MatchMode::RequireParent
            && parent_value.is_empty();
        let params = match self.query_params(remote, parent_value) {
            Some(params) if !waiting_for_parent => params,
            _ => {
                node.settle();
                self.host
                    .replace_options(selector, std::slice::from_ref(&node.placeholder));
                self.host.select_value(selector, "");
                self.host.set_notice(selector, node.spec.notice_target.as_deref(), None);
                return NodeOutcome::Skipped {
                    selector: selector.clone(),
                };
            }
        };

        self.host
            .replace_options(selector, &[SelectOption::placeholder(LOADING_LABEL)]);
        let request = LookupRequest {
            endpoint: remote.endpoint.clone(),
            params,
        };
        log::debug!("cascade '{}': fetching {:?}", self.name, request);
        let response = self.lookup.fetch(request).await;

        if !node.sequence.is_latest(ticket) {
            log::debug!("cascade '{}': discarding stale response for '{}'", self.name, selector);
            return NodeOutcome::Superseded {
                selector: selector.clone(),
            };
        }
        node.settle();

        match response.and_then(|body| options_from_payload(remote, &node.placeholder, body)) {
            Ok(loaded) => {
                self.host.replace_options(selector, &loaded.options);
                let visibility = self.visibility(node, &loaded.options, parent_value);
                self.host
                    .apply_visibility(selector, &visibility, node.spec.disable_hidden);
                let restore = if selection_is_valid(
                    &loaded.options,
                    &visibility,
                    &previous_value,
                    node.spec.disable_hidden,
                ) {
                    previous_value.as_str()
                } else {
                    ""
                };
                self.host.select_value(selector, restore);

                let summary = remote.summary_template.as_deref().map(|template| {
                    InlineNotice::new_info(selector, loaded.summary(template))
                });
                self.host.set_notice(
                    selector,
                    node.spec.notice_target.as_deref(),
                    summary.as_ref(),
                );
                NodeOutcome::Loaded {
                    selector: selector.clone(),
                    count: loaded.options.len() - 1,
                }
            }
            Err(error) => {
                let code = error.code();
                let notice = match &remote.failure_message {
                    Some(message) => {
                        InlineNotice::new_lookup_failed_with_message(selector, &code, message)
                    }
                    None => InlineNotice::new_lookup_failed(selector, &code),
                };
                log_notice_console_only(&notice);
                log::debug!("cascade '{}': {}", self.name, error);
                self.host
                    .replace_options(selector, std::slice::from_ref(&node.placeholder));
                self.host.select_value(selector, "");
                self.host
                    .set_notice(selector, node.spec.notice_target.as_deref(), Some(&notice));
                NodeOutcome::Failed {
                    selector: selector.clone(),
                    code,
                }
            }
        }
    }

    fn visibility(
        &self,
        node: &CascadeNode,
        options: &[SelectOption],
        parent_value: &str,
    ) -> Vec<bool> {
        let criteria = node
            .spec
            .criteria
            .iter()
            .filter_map(|criterion| {
                let attribute = criterion.attribute.as_deref()?;
                let value = self.host.input_value(&criterion.input).trim().to_string();
                Some((attribute, value))
            })
            .collect();
        let context = FilterContext {
            parent_value,
            match_attribute: node.spec.match_attribute.as_deref(),
            match_mode: node.spec.match_mode,
            criteria,
            unique_by_label: node.spec.unique_by_label,
        };
        compute_visibility(options, &context)
    }

    fn clear_stale_selection(
        &self,
        node: &CascadeNode,
        options: &[SelectOption],
        visibility: &[bool],
    ) -> bool {
        let selector = &node.spec.selector;
        let selected = self.host.selected_value(selector);
        if selection_is_valid(options, visibility, &selected, node.spec.disable_hidden) {
            return false;
        }
        log::debug!("cascade '{}': clearing stale '{}' on '{}'", self.name, selected, selector);
        self.host.select_value(selector, "");
        true
    }

    /// `None` when a required parameter has no value.
    fn query_params(
        &self,
        remote: &RemoteSource,
        parent_value: &str,
    ) -> Option<Vec<(String, String)>> {
        let mut params = Vec::with_capacity(remote.params.len());
        for param in &remote.params {
            let value = match &param.source {
                ParamSource::Parent => parent_value.to_string(),
                ParamSource::Input { selector } => {
                    self.host.input_value(selector).trim().to_string()
                }
                ParamSource::DataAttribute { selector, attribute } => {
                    self.host.data_attribute(selector, attribute).trim().to_string()
                }
                ParamSource::Literal { value } => value.clone(),
            };
            if value.is_empty() {
                if param.required {
                    return None;
                }
                continue;
            }
            params.push((param.name.clone(), value));
        }
        Some(params)
    }
}

/// Root-first order of a chain: exactly one root, every parent declared,
/// at most one child per node.
fn order_chain(chain: &ChainSpec) -> Result<Vec<&NodeSpec>, CascadeError> {
    let invalid = |reason: String| CascadeError::InvalidChain {
        cascade: chain.name.clone(),
        reason,
    };
    if chain.nodes.is_empty() {
        return Err(invalid("no nodes declared".to_string()));
    }

    let roots: Vec<&NodeSpec> = chain
        .nodes
        .iter()
        .filter(|node| node.parent.is_none())
        .collect();
    let [root] = roots.as_slice() else {
        return Err(invalid(format!("expected one root, found {}", roots.len())));
    };

    let mut ordered = vec![*root];
    let mut current = *root;
    loop {
        let children: Vec<&NodeSpec> = chain
            .nodes
            .iter()
            .filter(|node| node.parent.as_deref() == Some(current.selector.as_str()))
            .collect();
        match children.as_slice() {
            [] => break,
            [child] => {
                ordered.push(*child);
                current = *child;
            }
            _ => {
                return Err(invalid(format!(
                    "'{}' has {} children",
                    current.selector,
                    children.len()
                )));
            }
        }
        if ordered.len() > chain.nodes.len() {
            return Err(invalid("cycle between nodes".to_string()));
        }
    }

    if ordered.len() != chain.nodes.len() {
        return Err(invalid(
            "some nodes are not reachable from the root".to_string(),
        ));
    }
    Ok(ordered)
}
