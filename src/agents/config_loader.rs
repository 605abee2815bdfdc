use crate::agents::artifact_filter::ArtifactFilter;
use crate::agents::exact_version::UpdaterSettings;
use crate::error::{PomverError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "pomver.toml";

/// Project defaults read from `pomver.toml`; every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    pub process_dependency_management: Option<bool>,
    pub process_dependencies: Option<bool>,
    pub exclude_reactor: Option<bool>,
    pub generate_backup_poms: Option<bool>,
}

/// Values given on the command line. They take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub no_dependency_management: bool,
    pub no_dependencies: bool,
    pub include_reactor: bool,
    pub no_backup: bool,
}

impl ProjectConfig {
    /// A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(project_path: P) -> Result<Self> {
        let path = project_path.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            PomverError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn settings(&self, cli: &CliOverrides) -> Result<UpdaterSettings> {
        let includes = if cli.includes.is_empty() {
            &self.includes
        } else {
            &cli.includes
        };
        let excludes = if cli.excludes.is_empty() {
            &self.excludes
        } else {
            &cli.excludes
        };

        Ok(UpdaterSettings {
            process_dependency_management: !cli.no_dependency_management
                && self.process_dependency_management.unwrap_or(true),
            process_dependencies: !cli.no_dependencies && self.process_dependencies.unwrap_or(true),
            exclude_reactor: !cli.include_reactor && self.exclude_reactor.unwrap_or(true),
            filter: ArtifactFilter::new(includes, excludes)?,
        })
    }

    pub fn backup_enabled(&self, cli: &CliOverrides) -> bool {
        !cli.no_backup && self.generate_backup_poms.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maven::DependencyRecord;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());

        let settings = config.settings(&CliOverrides::default()).unwrap();
        assert!(settings.process_dependency_management);
        assert!(settings.process_dependencies);
        assert!(settings.exclude_reactor);
        assert!(config.backup_enabled(&CliOverrides::default()));
    }

    #[test]
    fn reads_file_values() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
excludes = ["com.example:*"]
process-dependency-management = false
generate-backup-poms = false
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap();
        let settings = config.settings(&CliOverrides::default()).unwrap();

        assert!(!settings.process_dependency_management);
        assert!(!config.backup_enabled(&CliOverrides::default()));
        assert!(
            !settings
                .filter
                .is_included(&DependencyRecord::new("com.example", "core", Some("1")))
        );
    }

    #[test]
    fn cli_patterns_replace_file_patterns() {
        let config = ProjectConfig {
            excludes: vec!["org.*".into()],
            ..ProjectConfig::default()
        };
        let cli = CliOverrides {
            excludes: vec!["com.*".into()],
            include_reactor: true,
            ..CliOverrides::default()
        };

        let settings = config.settings(&cli).unwrap();

        assert!(!settings.exclude_reactor);
        assert!(
            settings
                .filter
                .is_included(&DependencyRecord::new("org.lib", "lib", Some("1")))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "exact-version = \"1.0\"\n").unwrap();
        let err = ProjectConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, PomverError::Toml(_)));
    }
}
