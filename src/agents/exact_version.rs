use crate::agents::artifact_filter::ArtifactFilter;
use crate::error::{PomverError, Result};
use crate::maven::{DependencyRecord, DependencyVersionSetter, MavenProject};
use crate::utils::log::UpdateLog;
use std::fmt;

/// A trimmed, non-blank version applied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactVersion(String);

impl ExactVersion {
    pub fn parse(raw: &str) -> Result<Self> {
        // clap only guarantees the argument is present, not that it has content
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PomverError::InvalidArgument(
                "exactVersion must not be blank".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which dependency collections are processed and how they are filtered.
#[derive(Debug, Clone)]
pub struct UpdaterSettings {
    pub process_dependency_management: bool,
    pub process_dependencies: bool,
    pub exclude_reactor: bool,
    pub filter: ArtifactFilter,
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            process_dependency_management: true,
            process_dependencies: true,
            exclude_reactor: true,
            filter: ArtifactFilter::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedDependency {
    pub coordinate: String,
    pub new_version: String,
}

/// Outcome of one or more update passes.
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub updated: Vec<UpdatedDependency>,
    pub ignored_reactor: Vec<String>,
}

impl UpdateReport {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
    }

    pub fn merge(&mut self, other: UpdateReport) {
        self.updated.extend(other.updated);
        self.ignored_reactor.extend(other.ignored_reactor);
    }
}

type Predicate<'a> = Box<dyn Fn(&DependencyRecord) -> bool + 'a>;

/// Pins every selected dependency of a project to one exact version.
pub struct ExactVersionUpdater<'a> {
    exact_version: ExactVersion,
    settings: &'a UpdaterSettings,
    is_reactor: Predicate<'a>,
    is_included: Predicate<'a>,
}

impl<'a> ExactVersionUpdater<'a> {
    /// Fails on a blank version before any dependency is looked at.
    pub fn new(
        exact_version: &str,
        settings: &'a UpdaterSettings,
        is_reactor: impl Fn(&DependencyRecord) -> bool + 'a,
    ) -> Result<Self> {
        let exact_version = ExactVersion::parse(exact_version)?;
        Ok(Self {
            exact_version,
            settings,
            is_reactor: Box::new(is_reactor),
            is_included: Box::new(move |dep: &DependencyRecord| {
                settings.filter.is_included(dep)
            }),
        })
    }

    /// Replaces the include/exclude check derived from the settings' filter.
    pub fn with_inclusion(
        mut self,
        is_included: impl Fn(&DependencyRecord) -> bool + 'a,
    ) -> Self {
        self.is_included = Box::new(is_included);
        self
    }

    pub fn update_project(
        &self,
        pom: &mut dyn DependencyVersionSetter,
        project: &MavenProject,
        log: &mut dyn UpdateLog,
    ) -> Result<UpdateReport> {
        self.update(
            pom,
            project.dependency_management.as_deref(),
            &project.dependencies,
            log,
        )
    }

    /// Runs the dependency-management pass, then the dependencies pass, as enabled.
    pub fn update(
        &self,
        pom: &mut dyn DependencyVersionSetter,
        dependency_management: Option<&[DependencyRecord]>,
        dependencies: &[DependencyRecord],
        log: &mut dyn UpdateLog,
    ) -> Result<UpdateReport> {
        let mut report = UpdateReport::default();

        if let Some(managed) = dependency_management {
            if self.settings.process_dependency_management {
                self.use_exact_version(pom, managed, log, &mut report)?;
            }
        }
        if self.settings.process_dependencies {
            self.use_exact_version(pom, dependencies, log, &mut report)?;
        }

        Ok(report)
    }

    fn use_exact_version(
        &self,
        pom: &mut dyn DependencyVersionSetter,
        dependencies: &[DependencyRecord],
        log: &mut dyn UpdateLog,
        report: &mut UpdateReport,
    ) -> Result<()> {
        for dep in dependencies {
            if self.settings.exclude_reactor && (self.is_reactor)(dep) {
                log.info(&format!("Ignoring reactor dependency: {}", dep));
                report.ignored_reactor.push(dep.to_string());
                continue;
            }

            if !(self.is_included)(dep) {
                continue;
            }

            if pom.set_dependency_version(
                &dep.group_id,
                &dep.artifact_id,
                dep.version.as_deref(),
                self.exact_version.as_str(),
            )? {
                log.info(&format!(
                    "Updated {} to version {}",
                    dep, self.exact_version
                ));
                report.updated.push(UpdatedDependency {
                    coordinate: dep.to_string(),
                    new_version: self.exact_version.to_string(),
                });
            }
        }

        Ok(())
    }
}
