use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::provider::ProviderOptions;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub provider: ProviderConfig,
}

/// ================================
/// Provider
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Path of the service-account credential document.
    pub credentials_path: String,
    #[serde(flatten)]
    pub options: ProviderOptions,
}
