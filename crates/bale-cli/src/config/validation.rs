use super::BaleConfig;
use crate::cli::is_identifier_path;
use crate::error::{ConfigError, Result};

impl BaleConfig {
    /// Validate the settings every command needs.
    pub fn validate(&self) -> Result<()> {
        if !self.plain && !self.minify && !self.coverage {
            return Err(ConfigError::ConflictingOptions(
                "the plain bundle is disabled and neither minify nor coverage is requested"
                    .to_string(),
            )
            .into());
        }

        if let Some(name) = &self.standalone {
            if !is_identifier_path(name) {
                return Err(ConfigError::InvalidValue {
                    field: "standalone".to_string(),
                    value: name.clone(),
                    hint: "Use a JavaScript identifier such as MyLib, or a dotted path such as Acme.widgets"
                        .to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Validate the settings `bale build` additionally needs: the engine, and the
    /// minifier when a minified bundle is requested.
    pub fn validate_for_build(&self) -> Result<()> {
        self.validate()?;

        if self.engine.is_empty() {
            return Err(ConfigError::MissingField {
                field: "engine".to_string(),
                hint: "Pass --engine 'node scripts/bundle.mjs' or set \"engine\" in bale.config.json"
                    .to_string(),
            }
            .into());
        }

        if self.minify && self.minifier.is_empty() {
            return Err(ConfigError::MissingField {
                field: "minifier".to_string(),
                hint: "Minified bundles need a whole-bundle minifier: pass --minifier or set \"minifier\" in bale.config.json"
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }
}
