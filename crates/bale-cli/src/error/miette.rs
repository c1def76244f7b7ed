//! Conversion from CLI errors to miette reports.

use crate::error::CliError;
use ::miette::{Report, miette};

/// Convert a [`CliError`] into a miette report for `main`.
///
/// Bundler errors keep their own diagnostic codes and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => Report::new(e),
        CliError::Config(e) => miette!(code = "bale::config", "{}", e),
        CliError::Build(e) => miette!(code = "bale::build", "{}", e),
        other => miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, ConfigError};
    use ::miette::Diagnostic as _;

    #[test]
    fn test_bundler_diagnostic_is_kept() {
        let report = cli_error_to_miette(CliError::Bundler(bale_bundler::Error::NoEntryFiles));
        assert_eq!(report.code().unwrap().to_string(), "NO_ENTRY_FILES");
        assert!(report.help().is_some());
    }

    #[test]
    fn test_config_and_build_codes() {
        let report = cli_error_to_miette(ConfigError::ConflictingOptions("x".into()).into());
        assert_eq!(report.code().unwrap().to_string(), "bale::config");

        let report = cli_error_to_miette(BuildError::PlanFailed(1).into());
        assert_eq!(report.code().unwrap().to_string(), "bale::build");
        assert!(report.to_string().contains("could not be planned"));
    }
}
