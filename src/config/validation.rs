use crate::config::types::{Config, DenylistConfig, NetworkConfig, TargetConfig};
use crate::output::{IssueKind, Severity};
use crate::url::Denylist;
use crate::ConfigError;
use std::collections::BTreeMap;
use url::Url;

/// Validates everything except the target section
///
/// The target usually arrives from the command line after the file has been
/// loaded, so it is checked separately by [`validate_target`].
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_network_config(&config.network)?;
    validate_denylist_config(&config.denylist)?;
    validate_severity_overrides(&config.severity)?;
    Ok(())
}

/// Validates the target section
pub fn validate_target(target: &TargetConfig) -> Result<(), ConfigError> {
    if target.domain.trim().is_empty() {
        return Err(ConfigError::Validation("domain cannot be empty".to_string()));
    }

    if let Some(sitemap) = &target.sitemap {
        let url = Url::parse(sitemap)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sitemap URL '{}': {}", sitemap, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Sitemap URL '{}' must use HTTP or HTTPS",
                sitemap
            )));
        }
    }

    Ok(())
}

/// Validates network limits
fn validate_network_config(config: &NetworkConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("page-timeout", config.page_timeout),
        ("probe-timeout", config.probe_timeout),
        ("sitemap-timeout", config.sitemap_timeout),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be >= 1s, got 0", name)));
        }
    }

    if config.run_timeout == Some(0) {
        return Err(ConfigError::Validation(
            "run-timeout must be >= 1s when set".to_string(),
        ));
    }

    for (name, value) in [
        ("max-concurrent-pages", config.max_concurrent_pages),
        ("max-concurrent-probes", config.max_concurrent_probes),
    ] {
        if !(1..=100).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 100, got {}",
                name, value
            )));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every denylist pattern compiles
fn validate_denylist_config(config: &DenylistConfig) -> Result<(), ConfigError> {
    if config.max_anchor_link_length == 0 {
        return Err(ConfigError::Validation(
            "max-anchor-link-length must be >= 1".to_string(),
        ));
    }

    Denylist::compile(&config.anchor_links, None)?;
    Denylist::compile(&config.normal_links, None)?;
    Ok(())
}

/// Validates severity overrides: known kinds only, fatal kinds stay errors
fn validate_severity_overrides(overrides: &BTreeMap<String, Severity>) -> Result<(), ConfigError> {
    for (name, severity) in overrides {
        let kind = IssueKind::from_name(name).ok_or_else(|| {
            ConfigError::Validation(format!("Unknown issue kind in [severity]: '{}'", name))
        })?;

        if kind.is_fatal() && *severity != Severity::Error {
            return Err(ConfigError::Validation(format!(
                "Issue kind '{}' is fatal and cannot be downgraded to {}",
                name, severity
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkPattern;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.network.probe_timeout = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_run_timeout_rejected() {
        let mut config = Config::default();
        config.network.run_timeout = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.network.max_concurrent_probes = 101;
        assert!(validate(&config).is_err());

        config.network.max_concurrent_probes = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = Config::default();
        config.denylist.normal_links.push(LinkPattern::Regex("[".to_string()));
        assert!(matches!(validate(&config), Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_fatal_kind_cannot_be_downgraded() {
        let mut config = Config::default();
        config
            .severity
            .insert("sitemap-unavailable".to_string(), Severity::Warning);
        assert!(validate(&config).is_err());

        config
            .severity
            .insert("sitemap-unavailable".to_string(), Severity::Error);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_target() {
        let mut target = TargetConfig::default();
        assert!(validate_target(&target).is_err());

        target.domain = "docs.example.org".to_string();
        assert!(validate_target(&target).is_ok());

        target.sitemap = Some("ftp://docs.example.org/sitemap.xml".to_string());
        assert!(validate_target(&target).is_err());

        target.sitemap = Some("not a url".to_string());
        assert!(matches!(validate_target(&target), Err(ConfigError::InvalidUrl(_))));

        target.sitemap = Some("https://docs.example.org/sitemap.xml".to_string());
        assert!(validate_target(&target).is_ok());
    }
}
