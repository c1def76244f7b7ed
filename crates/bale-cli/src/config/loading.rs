use super::{BaleConfig, ConfigOverrides};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use std::path::Path;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "bale.config.json";

/// Prefix of environment variables read as settings (`BALE_MINIFY=true`).
pub const ENV_PREFIX: &str = "BALE_";

/// Setting names accepted from the environment, after the prefix is stripped.
const ENV_KEYS: [&str; 15] = [
    "patterns",
    "exclude",
    "outfile",
    "plain",
    "minify",
    "coverage",
    "debug",
    "standalone",
    "watch",
    "comments",
    "engine",
    "minifier",
    "ignore",
    "debounce",
    "cwd",
];

impl BaleConfig {
    /// Load configuration from every source.
    ///
    /// Priority: CLI overrides > environment variables > config file > defaults.
    /// A relative `config_path` resolves against `base_dir`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] if `config_path` does not exist, and
    /// [`ConfigError::InvalidValue`] if the merged settings do not deserialize.
    pub fn load(
        overrides: &ConfigOverrides,
        config_path: Option<&Path>,
        base_dir: &Path,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) => {
                let path = base_dir.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = base_dir.join(CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            debug!("Loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).only(&ENV_KEYS));
        figment = figment.merge(Serialized::defaults(overrides));

        figment.extract().map_err(|e| {
            let field = if e.path.is_empty() {
                "configuration".to_string()
            } else {
                e.path.join(".")
            };
            ConfigError::InvalidValue {
                field,
                value: e.to_string(),
                hint: format!("Check {} syntax and field types", CONFIG_FILE),
            }
            .into()
        })
    }
}
