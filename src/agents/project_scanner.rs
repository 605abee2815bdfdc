use crate::error::{PomverError, Result};
use crate::maven::{DependencyRecord, MavenProject};
use crate::utils::log::is_verbose;
use crate::utils::path_validator::PathValidator;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// ProjectScannerAgent validates the project structure and loads the reactor
pub struct ProjectScannerAgent {
    project_path: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Validates the project structure
    pub fn validate(&self) -> Result<ProjectInfo> {
        let project_path = PathValidator::validate_project_path(&self.project_path)?;

        let pom_path = project_path.join("pom.xml");
        if !pom_path.is_file() {
            return Err(PomverError::ProjectValidation(format!(
                "pom.xml not found in '{}'",
                project_path.display()
            )));
        }

        let git_dir = project_path.join(".git");
        let is_git_repo = git_dir.exists() && git_dir.is_dir();

        Ok(ProjectInfo {
            project_path,
            pom_path,
            has_git: is_git_repo,
        })
    }

    /// Loads the root pom and, unless `recursive` is false, every module below it.
    pub fn load_reactor(&self, info: &ProjectInfo, recursive: bool) -> Result<Reactor> {
        let root = MavenProject::load(&info.pom_path, None)?;
        let mut reactor = Reactor::default();
        let mut seen = HashSet::new();
        seen.insert(info.pom_path.clone());

        if recursive {
            self.collect_modules(&root, &mut reactor, &mut seen)?;
        }
        reactor.projects.insert(0, root);

        Ok(reactor)
    }

    fn collect_modules(
        &self,
        aggregator: &MavenProject,
        reactor: &mut Reactor,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        for module in &aggregator.modules {
            let pom_path = module_pom_path(aggregator.base_dir(), module)?;
            if !seen.insert(pom_path.clone()) {
                continue;
            }

            if is_verbose() {
                eprintln!("[VERBOSE] Loading module: {}", pom_path.display());
            }

            let project = MavenProject::load_module(&pom_path, aggregator)?;
            self.collect_modules(&project, reactor, seen)?;
            reactor.projects.push(project);
        }
        Ok(())
    }
}

fn module_pom_path(base_dir: &Path, module: &str) -> Result<PathBuf> {
    let candidate = base_dir.join(module);
    let pom_path = if candidate.is_dir() {
        candidate.join("pom.xml")
    } else {
        candidate
    };

    pom_path.canonicalize().map_err(|e| {
        PomverError::ProjectValidation(format!(
            "Module '{}' has no pom at '{}': {e}",
            module,
            pom_path.display()
        ))
    })
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub project_path: PathBuf,
    pub pom_path: PathBuf,
    pub has_git: bool,
}

/// Every project built together in one invocation, root first.
#[derive(Debug, Clone, Default)]
pub struct Reactor {
    pub projects: Vec<MavenProject>,
}

impl Reactor {
    /// Whether the dependency is produced by one of the reactor's projects.
    pub fn produces(&self, dependency: &DependencyRecord) -> bool {
        self.projects.iter().any(|p| {
            p.group_id == dependency.group_id && p.artifact_id == dependency.artifact_id
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn multi_module_project(root: &Path) {
        write(
            &root.join("pom.xml"),
            r#"<project>
  <groupId>com.example</groupId>
  <artifactId>parent</artifactId>
  <version>1.0.0</version>
  <packaging>pom</packaging>
  <properties><lib.version>4.2</lib.version></properties>
  <modules>
    <module>core</module>
    <module>web</module>
  </modules>
</project>"#,
        );
        write(
            &root.join("core/pom.xml"),
            r#"<project>
  <parent>
    <groupId>com.example</groupId>
    <artifactId>parent</artifactId>
    <version>1.0.0</version>
  </parent>
  <artifactId>core</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.lib</groupId>
      <artifactId>lib</artifactId>
      <version>${lib.version}</version>
    </dependency>
  </dependencies>
</project>"#,
        );
        write(
            &root.join("web/pom.xml"),
            r#"<project>
  <groupId>com.example.web</groupId>
  <artifactId>web</artifactId>
  <version>2.0.0</version>
</project>"#,
        );
    }

    #[test]
    fn validate_requires_pom() {
        let dir = tempdir().unwrap();
        let err = ProjectScannerAgent::new(dir.path()).validate().unwrap_err();
        assert!(matches!(err, PomverError::ProjectValidation(_)));
    }

    #[test]
    fn validate_detects_git() {
        let dir = tempdir().unwrap();
        multi_module_project(dir.path());
        fs::create_dir(dir.path().join(".git")).unwrap();
        let info = ProjectScannerAgent::new(dir.path()).validate().unwrap();
        assert!(info.has_git);
        assert!(info.pom_path.ends_with("pom.xml"));
    }

    #[test]
    fn loads_modules_with_inherited_coordinates_and_properties() {
        let dir = tempdir().unwrap();
        multi_module_project(dir.path());
        let scanner = ProjectScannerAgent::new(dir.path());
        let info = scanner.validate().unwrap();
        let reactor = scanner.load_reactor(&info, true).unwrap();

        let ids: Vec<_> = reactor.projects.iter().map(|p| p.coordinate()).collect();
        assert_eq!(
            ids,
            vec!["com.example:parent", "com.example:core", "com.example.web:web"]
        );

        let core = &reactor.projects[1];
        assert_eq!(core.dependencies[0].version.as_deref(), Some("4.2"));
        assert_eq!(reactor.projects[0].artifact_id, "parent");
    }

    #[test]
    fn non_recursive_loads_only_root() {
        let dir = tempdir().unwrap();
        multi_module_project(dir.path());
        let scanner = ProjectScannerAgent::new(dir.path());
        let info = scanner.validate().unwrap();
        let reactor = scanner.load_reactor(&info, false).unwrap();
        assert_eq!(reactor.projects.len(), 1);
    }

    #[test]
    fn reactor_membership_compares_group_and_artifact() {
        let dir = tempdir().unwrap();
        multi_module_project(dir.path());
        let scanner = ProjectScannerAgent::new(dir.path());
        let info = scanner.validate().unwrap();
        let reactor = scanner.load_reactor(&info, true).unwrap();

        assert!(reactor.produces(&DependencyRecord::new("com.example", "core", Some("9"))));
        assert!(!reactor.produces(&DependencyRecord::new("com.example", "web", None)));
        assert!(!reactor.produces(&DependencyRecord::new("org.lib", "lib", Some("4.2"))));
    }

    #[test]
    fn module_without_aggregator_parent_keeps_its_own_properties() {
        let dir = tempdir().unwrap();
        multi_module_project(dir.path());
        write(
            &dir.path().join("web/pom.xml"),
            r#"<project>
  <groupId>com.example.web</groupId>
  <artifactId>web</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.lib</groupId>
      <artifactId>lib</artifactId>
      <version>${lib.version}</version>
    </dependency>
  </dependencies>
</project>"#,
        );
        let scanner = ProjectScannerAgent::new(dir.path());
        let info = scanner.validate().unwrap();
        let reactor = scanner.load_reactor(&info, true).unwrap();

        let web = &reactor.projects[2];
        assert_eq!(web.artifact_id, "web");
        assert_eq!(web.dependencies[0].version.as_deref(), Some("${lib.version}"));
        assert_eq!(reactor.projects[1].dependencies[0].version.as_deref(), Some("4.2"));
    }

    #[test]
    fn missing_module_is_rejected() {
        let dir = tempdir().unwrap();
        write(
            &dir.path().join("pom.xml"),
            "<project><groupId>g</groupId><artifactId>a</artifactId><modules><module>gone</module></modules></project>",
        );
        let scanner = ProjectScannerAgent::new(dir.path());
        let info = scanner.validate().unwrap();
        let err = scanner.load_reactor(&info, true).unwrap_err();
        assert!(matches!(err, PomverError::ProjectValidation(_)));
    }
}
