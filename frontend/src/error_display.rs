/// Notice variant, mapped to a CSS modifier class on the notice element.
#[derive(Debug, Clone, PartialEq, Copy, Default)]
pub enum NotificationVariant {
    #[default]
    Error,
    Info,
}

impl NotificationVariant {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Error => "hrmis-inline-notice--error",
            Self::Info => "hrmis-inline-notice--info",
        }
    }
}

/// Non-blocking message rendered next to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineNotice {
    pub message: String,
    pub technical_error: String, // Raw technical error for console logging
    pub variant: NotificationVariant,
}

impl InlineNotice {
    pub fn new_lookup_failed(selector: &str, error_code: &str) -> Self {
        Self {
            message: make_error_user_friendly(error_code),
            technical_error: format!("Lookup for '{}' failed: {}", selector, error_code),
            variant: NotificationVariant::Error,
        }
    }

    /// Failure with a form-specific message instead of the generic one.
    pub fn new_lookup_failed_with_message(selector: &str, error_code: &str, message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..Self::new_lookup_failed(selector, error_code)
        }
    }

    pub fn new_info(selector: &str, message: String) -> Self {
        Self {
            technical_error: format!("Info for '{}': {}", selector, message),
            message,
            variant: NotificationVariant::Info,
        }
    }
}

/// Turns the short error codes returned by lookups and endpoints into text
/// suitable for the page.
pub fn make_error_user_friendly(error: &str) -> String {
    let error_lower = error.trim().to_lowercase();

    if error_lower == "not_allowed" || error_lower == "http_401" || error_lower == "http_403" {
        "You are not allowed to load these options.".to_string()
    } else if error_lower == "missing_employee_id" {
        "Employee information is missing on this page. Please refresh.".to_string()
    } else if error_lower == "http_404" {
        "The requested options are not available.".to_string()
    } else if error_lower.starts_with("http_5") {
        "The server could not load the options. Please try again later.".to_string()
    } else if error_lower.contains("timeout") {
        "Loading options timed out. Please try again.".to_string()
    } else if error_lower == "fetch_failed"
        || error_lower.contains("network")
        || error_lower.contains("connection")
    {
        "Connection error. Please check your network connection.".to_string()
    } else if error_lower == "malformed_json" {
        "The server returned an unexpected response. Please refresh.".to_string()
    } else if error_lower.is_empty() {
        "Could not load options. Please refresh.".to_string()
    } else {
        format!("Could not load options ({}).", error.trim())
    }
}

/// Logs the technical side of a notice without showing it to the user.
pub fn log_notice_console_only(notice: &InlineNotice) {
    match notice.variant {
        NotificationVariant::Error => log::warn!("{}", notice.technical_error),
        NotificationVariant::Info => log::debug!("{}", notice.technical_error),
    }
}
