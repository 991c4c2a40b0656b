use crate::config::types::{Config, ExtractorKind, NetworkConfig};
use crate::config::validation::{validate, validate_target};
use crate::output::{IssueKind, SeverityPolicy};
use crate::url::{Denylist, Scope};
use crate::{CheckError, ConfigError};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration compiled into the form the engine works with
///
/// Built once per run from a validated [`Config`]; patterns are compiled, the
/// scope is normalized and severity overrides are resolved to issue kinds.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub scope: Scope,
    pub sitemap_url: String,
    pub skip_external: bool,
    pub quiet: bool,
    pub report_absolute_links: bool,
    pub extractor: ExtractorKind,
    pub anchor_denylist: Denylist,
    pub normal_denylist: Denylist,
    pub severity: SeverityPolicy,
    pub network: NetworkConfig,
}

impl RunSettings {
    /// Validates and compiles a configuration
    ///
    /// # Returns
    ///
    /// * `Ok(RunSettings)` - Ready to run
    /// * `Err(CheckError)` - Invalid configuration or target URL
    pub fn from_config(config: &Config) -> Result<Self, CheckError> {
        validate(config)?;
        validate_target(&config.target)?;

        let scope = Scope::new(&config.target.domain, &config.target.folder)?;
        let sitemap_url = config
            .target
            .sitemap
            .clone()
            .unwrap_or_else(|| scope.default_sitemap_url());

        let anchor_denylist = Denylist::compile(
            &config.denylist.anchor_links,
            Some(config.denylist.max_anchor_link_length),
        )?;
        let normal_denylist = Denylist::compile(&config.denylist.normal_links, None)?;

        let overrides = config
            .severity
            .iter()
            .map(|(name, severity)| {
                IssueKind::from_name(name)
                    .map(|kind| (kind, *severity))
                    .ok_or_else(|| ConfigError::Validation(format!("Unknown issue kind '{}'", name)))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            scope,
            sitemap_url,
            skip_external: config.checks.skip_external,
            quiet: config.checks.quiet,
            report_absolute_links: config.checks.report_absolute_links,
            extractor: config.checks.extractor,
            anchor_denylist,
            normal_denylist,
            severity: SeverityPolicy::new(overrides),
            network: config.network.clone(),
        })
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.network.page_timeout)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.network.probe_timeout)
    }

    pub fn sitemap_timeout(&self) -> Duration {
        Duration::from_secs(self.network.sitemap_timeout)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.network.run_timeout.map(Duration::from_secs)
    }
}
