//! Configuration module for Anchor-Watch
//!
//! This module handles loading, parsing, validating and compiling the
//! configuration. The command line supplies the target; an optional TOML file
//! tunes denylists, severities, network limits and the extractor.
//!
//! # Example
//!
//! ```no_run
//! use anchor_watch::config::{load_config, RunSettings};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("anchor-watch.toml")).unwrap();
//! config.target.domain = "docs.example.org".to_string();
//! let settings = RunSettings::from_config(&config).unwrap();
//! println!("Sitemap: {}", settings.sitemap_url);
//! ```

mod parser;
mod settings;
mod types;
mod validation;

// Re-export types
pub use settings::RunSettings;
pub use types::{
    CheckConfig, Config, DenylistConfig, ExtractorKind, LinkPattern, NetworkConfig, TargetConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_target};
