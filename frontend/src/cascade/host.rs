use crate::error_display::InlineNotice;
use shared::SelectOption;

/// Page surface the cascade reads and mutates.
///
/// Selectors are addressed by the CSS selector string from the chain
/// configuration. Every method takes `&self`: the browser implementation
/// queries the live document on each call, and test hosts keep their state
/// behind `RefCell`.
pub trait SelectorHost {
    fn contains(&self, selector: &str) -> bool;

    /// Current options in document order, placeholder first.
    fn options(&self, selector: &str) -> Vec<SelectOption>;

    fn selected_value(&self, selector: &str) -> String;

    /// The option carrying the selected value, `None` when nothing is picked.
    fn selected_option(&self, selector: &str) -> Option<SelectOption> {
        let value = self.selected_value(selector);
        if value.is_empty() {
            return None;
        }
        self.options(selector)
            .into_iter()
            .find(|option| option.value == value)
    }

    /// Selecting a value no option carries leaves the selector empty.
    fn select_value(&self, selector: &str, value: &str);

    /// Shows or hides options index by index. With `disable_hidden`, hidden
    /// options are disabled and visible ones re-enabled.
    fn apply_visibility(&self, selector: &str, visibility: &[bool], disable_hidden: bool);

    /// Replaces the whole option set, placeholder included.
    fn replace_options(&self, selector: &str, options: &[SelectOption]);

    /// Value of a text, number or date input; empty when absent.
    fn input_value(&self, selector: &str) -> String;

    /// `data-*` attribute (dataset key) of an element; empty when absent.
    fn data_attribute(&self, selector: &str, key: &str) -> String;

    /// Shows `notice` next to the selector, or clears it with `None`.
    fn set_notice(&self, selector: &str, notice_target: Option<&str>, notice: Option<&InlineNotice>);
}
