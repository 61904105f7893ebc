//! PortalApp - everything the portal script mounts on one page

use crate::badges::PendingBadges;
use crate::forms::{self, MountedCascade};
use crate::notifications::{self, NotificationBell};
use crate::request_filters;
use shared::PortalConfig;

/// Page-level owner of the mounted features.
///
/// Features whose elements are missing from the page are skipped; dropping
/// the app stops their loops.
#[allow(dead_code)] // held for their task handles
pub struct PortalApp {
    /// Dependent selector chains found on this page
    pub cascades: Vec<MountedCascade>,

    /// Navigation pending-count badges
    pub badges: Option<PendingBadges>,

    /// Bell and dropdown
    pub notifications: Option<NotificationBell>,
}

impl PortalApp {
    pub fn mount(config: &PortalConfig) -> Self {
        let mut cascades = Vec::new();
        cascades.extend(forms::profile::mount(config));
        cascades.extend(forms::transfer::mount(config));
        cascades.extend(forms::leave::mount(config));

        forms::password::mount();
        request_filters::mount();
        notifications::mount_read_all_form(&config.polling);

        let badges = PendingBadges::mount(&config.polling);
        let notifications = NotificationBell::mount(&config.polling);

        log::info!(
            "portal v{} mounted: {} cascades, badges {}, notifications {}",
            config.app.version,
            cascades.len(),
            on_off(badges.is_some()),
            on_off(notifications.is_some())
        );

        PortalApp {
            cascades,
            badges,
            notifications,
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
