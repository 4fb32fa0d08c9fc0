//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks the provider block (credentials, scopes / audience)
//!   and the server, metrics and logging settings.

use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::{ProviderConfig, ServiceConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_provider(&cfg.provider, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_provider(provider: &ProviderConfig, errors: &mut Vec<String>) {
    if provider.credentials_path.trim().is_empty() {
        errors.push("provider.credentials_path must not be empty".to_string());
    }

    let options = &provider.options;
    if options.scopes.is_empty() && options.target_audience.is_none() {
        errors.push(
            "provider: at least one of 'scopes' or 'target_audience' is required".to_string(),
        );
    }
    for (i, scope) in options.scopes.iter().enumerate() {
        if scope.trim().is_empty() || scope.contains(char::is_whitespace) {
            errors.push(format!(
                "provider.scopes[{}] '{}' must be a single non-empty scope",
                i, scope
            ));
        }
    }
    if let Some(audience) = &options.target_audience {
        if audience.trim().is_empty() {
            errors.push("provider.target_audience must not be empty when set".to_string());
        }
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    if let Some(timeout) = settings.http_timeout_ms {
        if timeout == 0 {
            errors.push("settings.http_timeout_ms must be greater than 0".to_string());
        }
    }

    // logging level
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}
