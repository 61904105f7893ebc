use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CascadeError {
    /// Expected on pages that do not render the form; the chain stays inert.
    #[error("cascade '{cascade}': selector '{selector}' is not on this page")]
    ConfigurationAbsent { cascade: String, selector: String },
    #[error("cascade '{cascade}' is misconfigured: {reason}")]
    InvalidChain { cascade: String, reason: String },
}

impl CascadeError {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::ConfigurationAbsent { .. })
    }
}

/// Every way a remote option fetch can fail. All variants are recovered
/// locally by the cascade (placeholder-only selector plus inline notice).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("rejected by server: {0}")]
    Rejected(String),
}

impl LookupError {
    /// Short code shown to `make_error_user_friendly`.
    pub fn code(&self) -> String {
        match self {
            Self::Network(_) => "fetch_failed".to_string(),
            Self::Status(status) => format!("http_{}", status),
            Self::Malformed(_) => "malformed_json".to_string(),
            Self::Rejected(code) if code.trim().is_empty() => "rejected".to_string(),
            Self::Rejected(code) => code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_codes() {
        assert_eq!(LookupError::Status(404).code(), "http_404");
        assert_eq!(LookupError::Network("offline".into()).code(), "fetch_failed");
        assert_eq!(LookupError::Rejected("not_allowed".into()).code(), "not_allowed");
        assert_eq!(LookupError::Rejected(String::new()).code(), "rejected");
    }

    #[test]
    fn absent_configuration_is_distinguishable() {
        let absent = CascadeError::ConfigurationAbsent {
            cascade: "profile".into(),
            selector: ".js-hrmis-district".into(),
        };
        assert!(absent.is_absent());
        assert_eq!(
            absent.to_string(),
            "cascade 'profile': selector '.js-hrmis-district' is not on this page"
        );
    }
}
