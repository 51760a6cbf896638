//! Configuration validation.

use std::collections::HashSet;

use trellis_core::Phase;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogLevel, LogOutput, LoggingConfig, RoutesConfig, TrellisConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &TrellisConfig) -> ConfigResult<()> {
    if let Some(namespace) = &config.app.namespace
        && namespace.trim().is_empty()
    {
        return Err(ConfigError::validation(
            "app.namespace must not be empty; omit it to disable namespacing",
        ));
    }

    validate_routes(&config.routes)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_routes(routes: &RoutesConfig) -> ConfigResult<()> {
    for phase in Phase::ALL {
        let Some(kinds) = routes.kinds(phase) else {
            continue;
        };

        let mut seen = HashSet::new();
        for kind in kinds {
            if kind.phase() != phase {
                return Err(ConfigError::validation(format!(
                    "routes.{phase} lists `{kind}`, which is evaluated at the {} phase",
                    kind.phase()
                )));
            }
            if !seen.insert(kind) {
                return Err(ConfigError::validation(format!(
                    "routes.{phase} lists `{kind}` more than once"
                )));
            }
        }
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    for (module, level) in &logging.filters {
        if !LogLevel::NAMES.contains(&level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(format!(
                "Invalid log level for `{module}`: {level}. Valid values are: {:?}",
                LogLevel::NAMES
            )));
        }
    }

    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is `file`",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::RouteKind;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TrellisConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let mut config = TrellisConfig::default();
        config.app.namespace = Some("  ".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_kind_under_wrong_phase_rejected() {
        let mut config = TrellisConfig::default();
        config.routes.late = Some(vec![RouteKind::LateFrontend, RouteKind::Frontend]);
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("`frontend`, which is evaluated at the early phase"), "{err}");
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut config = TrellisConfig::default();
        config.routes.early = Some(vec![RouteKind::Any, RouteKind::Any]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_logging_rules() {
        let mut config = TrellisConfig::default();
        config
            .logging
            .filters
            .insert("trellis_framework".into(), "loud".into());
        assert!(validate_config(&config).is_err());

        let mut config = TrellisConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());
        config.logging.file_path = Some("trellis.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
