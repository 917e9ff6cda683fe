//! Extractor settings.
//!
//! Settings have compiled-in defaults and can be overridden through
//! `DEPLOYMENT_UPDATE_*` environment variables.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::model::CONTAINED_IN;

/// Environment variable overriding the containment marker.
pub const ENV_CONTAINMENT_TYPE: &str = "DEPLOYMENT_UPDATE_CONTAINMENT_TYPE";

/// Environment variable toggling the workflow plugin skip rule.
pub const ENV_SKIP_WORKFLOW_PLUGINS: &str = "DEPLOYMENT_UPDATE_SKIP_WORKFLOW_PLUGINS";

/// Environment variable toggling operation alias expansion.
pub const ENV_EXPAND_OPERATION_ALIASES: &str = "DEPLOYMENT_UPDATE_EXPAND_OPERATION_ALIASES";

/// Settings that tune step extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractorSettings {
    /// Type-hierarchy entry that marks a relationship as containment.
    #[serde(default = "default_containment")]
    pub containment_relationship: String,
    /// Drop workflow modifications whose new plugin is neither installed
    /// nor scheduled for installation.
    #[serde(default = "default_skip_plugins")]
    pub skip_unavailable_workflow_plugins: bool,
    /// Diff node operations under their short aliases as well, for plans
    /// whose compiler did not emit them.
    #[serde(default)]
    pub expand_operation_aliases: bool,
}

fn default_containment() -> String {
    String::from(CONTAINED_IN)
}

const fn default_skip_plugins() -> bool {
    true
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            containment_relationship: default_containment(),
            skip_unavailable_workflow_plugins: default_skip_plugins(),
            expand_operation_aliases: false,
        }
    }
}

impl ExtractorSettings {
    /// Loads settings from the process environment on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an override carries an invalid value.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Applies overrides resolved through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override carries an invalid value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(marker) = lookup(ENV_CONTAINMENT_TYPE) {
            if marker.trim().is_empty() {
                return Err(ConfigError::InvalidEnvVar {
                    name: ENV_CONTAINMENT_TYPE.to_string(),
                    value: marker,
                    message: String::from("containment type cannot be empty"),
                }
                .into());
            }
            debug!("Overriding containment relationship from environment");
            self.containment_relationship = marker.trim().to_string();
        }

        if let Some(skip) = lookup_flag(&lookup, ENV_SKIP_WORKFLOW_PLUGINS)? {
            debug!("Overriding workflow plugin skip rule from environment");
            self.skip_unavailable_workflow_plugins = skip;
        }

        if let Some(expand) = lookup_flag(&lookup, ENV_EXPAND_OPERATION_ALIASES)? {
            debug!("Overriding operation alias expansion from environment");
            self.expand_operation_aliases = expand;
        }

        Ok(())
    }
}

fn lookup_flag<F>(lookup: &F, name: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match parse_bool(&raw) {
        Some(flag) => Ok(Some(flag)),
        None => Err(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: raw,
            message: String::from("expected true or false"),
        }
        .into()),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = ExtractorSettings::default();
        assert_eq!(settings.containment_relationship, CONTAINED_IN);
        assert!(settings.skip_unavailable_workflow_plugins);
        assert!(!settings.expand_operation_aliases);
    }

    #[test]
    fn test_overrides_applied() {
        let mut settings = ExtractorSettings::default();
        settings
            .apply_overrides(lookup_from(&[
                (ENV_CONTAINMENT_TYPE, "acme.hosted_on"),
                (ENV_SKIP_WORKFLOW_PLUGINS, "false"),
                (ENV_EXPAND_OPERATION_ALIASES, "yes"),
            ]))
            .unwrap();

        assert_eq!(settings.containment_relationship, "acme.hosted_on");
        assert!(!settings.skip_unavailable_workflow_plugins);
        assert!(settings.expand_operation_aliases);
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let mut settings = ExtractorSettings::default();
        let result = settings.apply_overrides(lookup_from(&[(ENV_SKIP_WORKFLOW_PLUGINS, "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_marker_rejected() {
        let mut settings = ExtractorSettings::default();
        let result = settings.apply_overrides(lookup_from(&[(ENV_CONTAINMENT_TYPE, "  ")]));
        assert!(result.is_err());
    }
}
