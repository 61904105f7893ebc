//! Pure visibility rules for one selector.
//!
//! Visibility never removes options: hidden entries stay in the selector so a
//! later parent change can bring them back.

use shared::{MatchMode, SelectOption};
use std::collections::HashSet;

/// Everything the predicate needs to know about the node's surroundings.
#[derive(Debug, Clone, Default)]
pub struct FilterContext<'a> {
    pub parent_value: &'a str,
    pub match_attribute: Option<&'a str>,
    pub match_mode: MatchMode,
    /// `(option attribute, trimmed input value)` pairs from extra inputs.
    pub criteria: Vec<(&'a str, String)>,
    pub unique_by_label: bool,
}

/// The filter predicate: does `option` survive the parent match and the
/// extra input criteria? Uniqueness is applied separately because it depends
/// on the options before this one.
pub fn option_matches(option: &SelectOption, context: &FilterContext) -> bool {
    parent_matches(option, context) && criteria_match(option, context)
}

fn parent_matches(option: &SelectOption, context: &FilterContext) -> bool {
    let parent = context.parent_value;
    let Some(attribute) = context.match_attribute else {
        return context.match_mode != MatchMode::RequireParent || !parent.is_empty();
    };
    let own = option.attribute(attribute).trim();
    match context.match_mode {
        MatchMode::Lenient => own.is_empty() || parent.is_empty() || own == parent,
        MatchMode::Strict => parent.is_empty() || own == parent,
        MatchMode::RequireParent => !parent.is_empty() && own == parent,
    }
}

fn criteria_match(option: &SelectOption, context: &FilterContext) -> bool {
    context.criteria.iter().all(|(attribute, value)| {
        value.is_empty() || option.attribute(attribute).trim() == value.as_str()
    })
}

/// Visibility flag per option, index-aligned with `options`.
/// The first option is the placeholder and is always visible.
pub fn compute_visibility(options: &[SelectOption], context: &FilterContext) -> Vec<bool> {
    let mut visibility: Vec<bool> = options
        .iter()
        .enumerate()
        .map(|(index, option)| index == 0 || option_matches(option, context))
        .collect();

    if context.unique_by_label {
        let mut seen_labels = HashSet::new();
        for (index, option) in options.iter().enumerate().skip(1) {
            let key = option.label_key();
            // Unlabelled options never collide.
            if visibility[index] && !key.is_empty() && !seen_labels.insert(key) {
                visibility[index] = false;
            }
        }
    }
    visibility
}

/// Whether `selected` still points at a visible, enabled option.
/// An empty selection is always valid.
pub fn selection_is_valid(
    options: &[SelectOption],
    visibility: &[bool],
    selected: &str,
    disable_hidden: bool,
) -> bool {
    if selected.is_empty() {
        return true;
    }
    options
        .iter()
        .zip(visibility)
        .enumerate()
        .any(|(index, (option, visible))| {
            option.value == selected
                && (index == 0 || (*visible && (disable_hidden || !option.disabled)))
        })
}
