//! HRMIS portal frontend entry point

use std::sync::OnceLock;
use zoon::{Task, TaskHandle};

/// Stores the main application task handle to prevent it from being dropped.
static MAIN_TASK: OnceLock<TaskHandle> = OnceLock::new();

mod app;
mod badges;
mod cascade;
mod config;
mod dataflow;
mod dom;
mod error_display;
mod forms;
mod logging;
mod notifications;
mod polling;
mod request_filters;
mod validation;

pub fn main() {
    logging::init("info");
    let portal_config = config::load();
    logging::init(&portal_config.logging.level);

    dom::events::on_dom_ready(move || {
        let handle = Task::start_droppable(async move {
            let _app = app::PortalApp::mount(&portal_config);
            // The app owns every listener loop; keep it for the page lifetime.
            futures::future::pending::<()>().await;
        });
        if MAIN_TASK.set(handle).is_err() {
            log::warn!("portal already started");
        }
    });
}
