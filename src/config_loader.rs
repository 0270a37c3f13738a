use crate::config::ExporterConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<ExporterConfig> {
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open config file '{}'", config_path.display()))?;

    let config: ExporterConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse config file '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Command-line values that override the YAML file and defaults
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub region: Option<String>,
    pub filter: Option<String>,
    pub period: Option<Duration>,
    pub debug: bool,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut ExporterConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(region) = &overrides.region {
        config.region = region.clone();
    }
    if let Some(filter) = &overrides.filter {
        config.filter = filter.clone();
    }
    if let Some(period) = overrides.period {
        config.period = period;
    }
    // --debug can only switch verbose logging on
    if overrides.debug {
        config.debug = true;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

/// Resolve the effective configuration: defaults, then the optional YAML
/// file, then command-line flags.
pub fn resolve_config(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<ExporterConfig> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => ExporterConfig::default(),
    };
    apply_cli_overrides(&mut config, overrides)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port: 9100\nfilter: \"private-*\"\nperiod: 30s").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.filter, "private-*");
        assert_eq!(config.period, Duration::from_secs(30));
        assert_eq!(config.region, "eu-west-2");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "period: 0s").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("/nonexistent/exporter.yaml")).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port: 9100\nregion: us-east-1").unwrap();

        let overrides = CliOverrides {
            port: Some(9200),
            period: Some(Duration::from_secs(10)),
            debug: true,
            ..Default::default()
        };
        let config = resolve_config(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.port, 9200);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.period, Duration::from_secs(10));
        assert!(config.debug);
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let config = resolve_config(None, &CliOverrides::default()).unwrap();
        assert_eq!(config, ExporterConfig::default());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = CliOverrides {
            filter: Some(String::new()),
            ..Default::default()
        };
        assert!(resolve_config(None, &overrides).is_err());
    }
}
