use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{File, FileFormat};
use serde::Deserialize;
use url::Url;

pub use duration::Duration;

mod duration;

/// The default configuration, compiled into every binary.
pub const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of additional config files, applied in order on top of
/// the defaults.
pub const CONFIG_PATHS_ENV: &str = "FOLIO_CONFIG";

/// Loads the default config and every file listed in `FOLIO_CONFIG`.
pub fn load() -> anyhow::Result<Config> {
    let paths = std::env::var_os(CONFIG_PATHS_ENV)
        .map(|paths| std::env::split_paths(&paths).collect::<Vec<PathBuf>>())
        .unwrap_or_default();
    load_with_override(&paths, &[])
}

pub fn load_paths(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    load_with_override(paths, &[])
}

/// Loads the default config, then `paths`, then each of the inline toml
/// snippets in `overrides`.
pub fn load_with_override(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    let builder = config::Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    let builder = paths.iter().try_fold(builder, |builder, path| {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let source = File::from_str(&content, FileFormat::Toml);
        anyhow::Ok(builder.add_source(source))
    })?;

    overrides
        .iter()
        .fold(builder, |builder, &snippet| {
            builder.add_source(File::from_str(snippet, FileFormat::Toml))
        })
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub relay: RelayConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Deserialize)]
pub struct RelayConfig {
    pub endpoint: Url,
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub inspect_response_body: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub reset_delay: Duration,
    pub subject_prefix: String,
}
