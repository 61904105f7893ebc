//! Portal configuration: the embedded `portal.toml`, optionally replaced by a
//! page-provided override.

use shared::{AppSection, MigrationStrategy, PortalConfig};
use thiserror::Error;

const BUILTIN_CONFIG: &str = include_str!("../portal.toml");

/// Element id of the optional page override
/// (`<script type="application/toml" id="hrmis-portal-config">`).
pub const OVERRIDE_ELEMENT_ID: &str = "hrmis-portal-config";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid portal configuration: {0}")]
    Parse(String),
    #[error("unsupported portal configuration version '{0}'")]
    UnsupportedVersion(String),
}

pub fn builtin() -> Result<PortalConfig, ConfigError> {
    parse(BUILTIN_CONFIG)
}

/// Parses a configuration document and applies its migration strategy.
pub fn parse(source: &str) -> Result<PortalConfig, ConfigError> {
    let mut config = PortalConfig::from_toml_str(source).map_err(ConfigError::Parse)?;
    match config.app.migration_strategy() {
        MigrationStrategy::None => {}
        MigrationStrategy::Upgrade(description) => {
            log::info!("Upgrading portal configuration: {}", description);
            config.app.version = AppSection::CURRENT_VERSION.to_string();
        }
        MigrationStrategy::Recreate => {
            return Err(ConfigError::UnsupportedVersion(config.app.version));
        }
    }
    Ok(config)
}

/// Picks the page override when it is usable, the built-in configuration
/// otherwise. Never fails: a broken built-in falls back to defaults with no
/// cascades.
pub fn resolve(page_override: Option<&str>) -> PortalConfig {
    let builtin = builtin().unwrap_or_else(|error| {
        log::error!("{}", error);
        PortalConfig::default()
    });
    let Some(source) = page_override.filter(|source| !source.trim().is_empty()) else {
        return builtin;
    };
    match parse(source) {
        Ok(config) => {
            log::debug!("Using page configuration override");
            config
        }
        Err(error) => {
            log::warn!("Ignoring page configuration override: {}", error);
            builtin
        }
    }
}

/// Reads the override element from the current document, if any.
pub fn page_override() -> Option<String> {
    web_sys::window()?
        .document()?
        .get_element_by_id(OVERRIDE_ELEMENT_ID)?
        .text_content()
}

pub fn load() -> PortalConfig {
    resolve(page_override().as_deref())
}
