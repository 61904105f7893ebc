//! Transfer request form: current posting and required destination cascades.

use super::{FollowUp, MountedCascade, mount_cascade, no_follow_up};
use crate::cascade::SelectorHost;
use crate::dom::{self, DomSelectorHost};
use shared::{PortalConfig, SelectOption};
use std::rc::Rc;

const VACANCY_LINE: &str = ".js-hrmis-transfer-vacancy";

pub fn mount(config: &PortalConfig) -> Vec<MountedCascade> {
    let current = config
        .cascade("transfer_current")
        .and_then(|chain| mount_cascade(chain, no_follow_up()));

    let required = config.cascade("transfer_required").and_then(|chain| {
        let facility = chain.nodes.last()?.selector.clone();
        mount_cascade(chain, vacancy_follow_up(facility))
    });

    current.into_iter().chain(required).collect()
}

/// Vacancy line for the picked destination facility.
pub fn vacancy_text(facility: Option<&SelectOption>) -> Option<String> {
    let facility = facility.filter(|option| !option.value.is_empty())?;
    let count = |key: &str| match facility.attribute(key) {
        "" => "0".to_string(),
        value => value.to_string(),
    };
    Some(format!(
        "Vacant posts for your designation (BPS {}): {} / {} (Occupied: {})",
        facility.attribute("employeeBps"),
        count("vacant"),
        count("total"),
        count("occupied")
    ))
}

// The line tracks the facility after every pass, including plain selection
// changes on the last node.
fn vacancy_follow_up(facility_selector: String) -> FollowUp {
    Rc::new(move |_, _| {
        let Some(line) = dom::query_html(VACANCY_LINE) else {
            return;
        };
        let facility = DomSelectorHost.selected_option(&facility_selector);
        match vacancy_text(facility.as_ref()) {
            Some(text) => {
                line.set_text_content(Some(&text));
                dom::set_display(&line, true, "");
            }
            None => dom::set_display(&line, false, ""),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::test_support::MemoryHost;

    #[test]
    fn vacancy_line_follows_the_selected_facility() {
        let host = MemoryHost::new();
        host.add_select(
            "#facility",
            vec![
                SelectOption::placeholder("Select facility"),
                SelectOption::new("10", "DHQ (Vacant: 2)")
                    .with_attribute("vacant", "2")
                    .with_attribute("occupied", "5")
                    .with_attribute("total", "7")
                    .with_attribute("employeeBps", "17"),
                SelectOption::new("11", "RHC (Vacant: 0)").with_attribute("employeeBps", "17"),
            ],
        );

        assert_eq!(vacancy_text(host.selected_option("#facility").as_ref()), None);

        host.set_selected("#facility", "10");
        assert_eq!(
            vacancy_text(host.selected_option("#facility").as_ref()).as_deref(),
            Some("Vacant posts for your designation (BPS 17): 2 / 7 (Occupied: 5)")
        );

        host.set_selected("#facility", "11");
        assert_eq!(
            vacancy_text(host.selected_option("#facility").as_ref()).as_deref(),
            Some("Vacant posts for your designation (BPS 17): 0 / 0 (Occupied: 0)")
        );
    }
}
