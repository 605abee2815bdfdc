use crate::agents::{
    CliOverrides, ExactVersion, ExactVersionUpdater, ProjectConfig, ProjectScannerAgent, Reactor,
    UpdateReport, VersionControlAgent,
};
use crate::error::{PomverError, Result};
use crate::maven::{DependencyRecord, MavenProject, ModifiedPom};
use crate::utils::log::{ConsoleLog, is_verbose};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Execute the use-exact-version workflow
pub fn execute_use_exact_version<P: AsRef<Path>>(
    project_path: P,
    exact_version: &str,
    overrides: CliOverrides,
    non_recursive: bool,
    commit: bool,
) -> Result<()> {
    // Rejected before the project is even looked at.
    let exact_version = ExactVersion::parse(exact_version)?;
    println!(
        "{}",
        format!("Setting dependency versions to {}...", exact_version)
            .cyan()
            .bold()
    );

    // Step 1: Validate project structure and read configuration
    println!("\n{}", "1. Validating project structure...".yellow());
    let scanner = ProjectScannerAgent::new(project_path);
    let project_info = scanner.validate()?;
    let config = ProjectConfig::load(&project_info.project_path)?;
    let settings = config.settings(&overrides)?;
    let backup = config.backup_enabled(&overrides);
    println!("{}", "✓ Project structure is valid".green());

    // Step 2: Check Git status when a commit was requested
    let git_agent = if commit {
        println!("\n{}", "2. Checking Git status...".yellow());
        if !project_info.has_git {
            return Err(PomverError::ProjectValidation(
                "--commit requires the project to be a Git repository".to_string(),
            ));
        }

        let agent = VersionControlAgent::new(&project_info.project_path)?;
        if !agent.is_working_directory_clean()? {
            println!(
                "{}",
                "⚠ Warning: Working directory has uncommitted changes".red()
            );
            println!("Please commit or stash your changes before proceeding.");
            return Ok(());
        }
        println!("{}", "✓ Working directory is clean".green());
        Some(agent)
    } else {
        println!("\n{}", "2. Skipping Git checks (no --commit)".yellow());
        None
    };

    // Step 3: Load the reactor
    println!("\n{}", "3. Reading project model...".yellow());
    let reactor = scanner.load_reactor(&project_info, !non_recursive)?;
    print_reactor(&reactor);

    // Step 4: Rewrite every pom in memory
    println!("\n{}", "4. Updating dependency versions...".yellow());
    let updater = ExactVersionUpdater::new(exact_version.as_str(), &settings, |dep| {
        reactor.produces(dep)
    })?;
    let mut log = ConsoleLog;
    let mut report = UpdateReport::default();
    let mut poms = Vec::with_capacity(reactor.projects.len());

    for project in &reactor.projects {
        println!("\n   {}", project.coordinate().bright_cyan());
        let mut pom = ModifiedPom::load(&project.pom_path, project.interpolator().clone())?;
        report.merge(updater.update_project(&mut pom, project, &mut log)?);
        poms.push(pom);
    }

    // Step 5: Persist only once every project succeeded
    println!("\n{}", "5. Writing modified poms...".yellow());
    let mut written: Vec<PathBuf> = Vec::new();
    for pom in &poms {
        if pom.save(backup)? {
            println!(
                "   {} {}",
                "✓".green(),
                display_path(pom.path(), &project_info.project_path)
            );
            written.push(pom.path().to_path_buf());
        } else if is_verbose() {
            eprintln!("[VERBOSE] Unchanged: {}", pom.path().display());
        }
    }

    print_report(&report);

    // Step 6: Commit
    if let Some(agent) = git_agent {
        if written.is_empty() {
            println!("\n{}", "6. Nothing to commit".yellow());
        } else {
            println!("\n{}", "6. Committing changes...".yellow());
            let branch = agent.commit_to_new_branch(exact_version.as_str(), &written)?;
            println!(
                "{}",
                format!("✓ Changes committed to branch: {}", branch).green()
            );
        }
    }

    println!("\n{}", "✨ Done!".green().bold());
    Ok(())
}

/// One dependency declaration as shown by `list`.
#[derive(Debug, Serialize)]
struct ListedDependency<'a> {
    project: String,
    section: &'static str,
    #[serde(flatten)]
    dependency: &'a DependencyRecord,
    reactor: bool,
    selected: bool,
}

/// Execute the list workflow
pub fn execute_list<P: AsRef<Path>>(
    project_path: P,
    json: bool,
    overrides: CliOverrides,
) -> Result<()> {
    let scanner = ProjectScannerAgent::new(project_path);
    let project_info = scanner.validate()?;
    let config = ProjectConfig::load(&project_info.project_path)?;
    let settings = config.settings(&overrides)?;
    let reactor = scanner.load_reactor(&project_info, true)?;

    let mut listed = Vec::new();
    for project in &reactor.projects {
        let managed = project
            .dependency_management
            .iter()
            .flatten()
            .map(|d| ("dependencyManagement", d, settings.process_dependency_management));
        let direct = project
            .dependencies
            .iter()
            .map(|d| ("dependencies", d, settings.process_dependencies));

        for (section, dependency, processed) in managed.chain(direct) {
            let in_reactor = reactor.produces(dependency);
            listed.push(ListedDependency {
                project: project.coordinate(),
                section,
                dependency,
                reactor: in_reactor,
                selected: processed
                    && !(settings.exclude_reactor && in_reactor)
                    && settings.filter.is_included(dependency),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if listed.is_empty() {
        println!("{}", "No dependencies declared".yellow());
        return Ok(());
    }

    let mut current_project = None;
    for entry in &listed {
        if current_project != Some(&entry.project) {
            println!("\n{}", entry.project.cyan().bold());
            current_project = Some(&entry.project);
        }

        let marker = if entry.selected {
            "•".green()
        } else {
            "-".dimmed()
        };
        let mut line = format!(
            "  {} {} {}",
            marker,
            entry.dependency.to_string().white().bold(),
            format!("({})", entry.section).dimmed()
        );
        if entry.reactor {
            line.push_str(&format!(" {}", "[reactor]".yellow()));
        }
        println!("{}", line);
    }

    Ok(())
}

fn print_reactor(reactor: &Reactor) {
    println!("   Found {} project(s):", reactor.projects.len());
    for project in &reactor.projects {
        println!(
            "   • {}:{} ({})",
            project.coordinate().bright_cyan(),
            project.version.as_deref().unwrap_or("?"),
            project_summary(project).dimmed()
        );
    }
}

fn project_summary(project: &MavenProject) -> String {
    let managed = project
        .dependency_management
        .as_ref()
        .map(Vec::len)
        .unwrap_or(0);
    format!(
        "{} managed, {} direct",
        managed,
        project.dependencies.len()
    )
}

fn print_report(report: &UpdateReport) {
    if report.is_empty() {
        println!("\n{}", "No dependency versions were changed".yellow());
        return;
    }

    println!("\n{}", "Update Summary:".cyan().bold());
    println!(
        "{}",
        format!("Total updates: {}", report.updated.len()).green()
    );
    for updated in &report.updated {
        println!(
            "  • {} → {}",
            updated.coordinate.white().bold(),
            updated.new_version.green()
        );
    }

    if !report.ignored_reactor.is_empty() {
        println!(
            "{}",
            format!(
                "Reactor dependencies left untouched: {}",
                report.ignored_reactor.len()
            )
            .dimmed()
        );
    }
}

fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ROOT_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <groupId>com.example</groupId>
  <artifactId>parent</artifactId>
  <version>1.0.0</version>
  <modules>
    <module>core</module>
  </modules>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>com.example</groupId>
        <artifactId>core</artifactId>
        <version>1.0.0</version>
      </dependency>
      <dependency>
        <groupId>org.lib</groupId>
        <artifactId>lib</artifactId>
        <version>4.2</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>
"#;

    const CORE_POM: &str = r#"<project>
  <parent>
    <groupId>com.example</groupId>
    <artifactId>parent</artifactId>
    <version>1.0.0</version>
  </parent>
  <artifactId>core</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.other</groupId>
      <artifactId>other</artifactId>
      <version>0.1</version> <!-- keep me -->
    </dependency>
  </dependencies>
</project>
"#;

    fn project() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pom.xml"), ROOT_POM).unwrap();
        fs::create_dir(dir.path().join("core")).unwrap();
        fs::write(dir.path().join("core/pom.xml"), CORE_POM).unwrap();
        dir
    }

    #[test]
    fn rewrites_every_module_and_skips_reactor_dependencies() {
        let dir = project();

        execute_use_exact_version(dir.path(), "5.0", CliOverrides::default(), false, false)
            .unwrap();

        let root = fs::read_to_string(dir.path().join("pom.xml")).unwrap();
        assert!(root.contains("<artifactId>core</artifactId>\n        <version>1.0.0</version>"));
        assert!(root.contains("<artifactId>lib</artifactId>\n        <version>5.0</version>"));

        let core = fs::read_to_string(dir.path().join("core/pom.xml")).unwrap();
        assert!(core.contains("<version>5.0</version> <!-- keep me -->"));

        assert_eq!(
            fs::read_to_string(dir.path().join("pom.xml.versionsBackup")).unwrap(),
            ROOT_POM
        );
    }

    #[test]
    fn blank_version_leaves_project_untouched() {
        let dir = project();

        let err = execute_use_exact_version(dir.path(), "  ", CliOverrides::default(), false, false)
            .unwrap_err();

        assert!(matches!(err, PomverError::InvalidArgument(_)));
        assert_eq!(fs::read_to_string(dir.path().join("pom.xml")).unwrap(), ROOT_POM);
    }

    #[test]
    fn rewrites_pom_with_byte_order_mark_and_non_ascii_coordinates() {
        let dir = tempdir().unwrap();
        let pom = "\u{feff}<project>
  <groupId>org.café</groupId>
  <artifactId>app</artifactId>
  <dependencies>
    <dependency>
      <groupId>éé</groupId>
      <artifactId>y</artifactId>
      <version>1.0</version>
    </dependency>
  </dependencies>
</project>
";
        fs::write(dir.path().join("pom.xml"), pom).unwrap();

        execute_use_exact_version(dir.path(), "9.9", CliOverrides::default(), false, false)
            .unwrap();

        let written = fs::read_to_string(dir.path().join("pom.xml")).unwrap();
        assert_eq!(written, pom.replace("<version>1.0</version>", "<version>9.9</version>"));
    }

    #[test]
    fn non_recursive_only_touches_root() {
        let dir = project();
        let overrides = CliOverrides {
            no_backup: true,
            ..CliOverrides::default()
        };

        execute_use_exact_version(dir.path(), "5.0", overrides, true, false).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("core/pom.xml")).unwrap(),
            CORE_POM
        );
        assert!(!dir.path().join("pom.xml.versionsBackup").exists());
    }

    #[test]
    fn malformed_module_aborts_before_anything_is_written() {
        let dir = project();
        fs::write(
            dir.path().join("core/pom.xml"),
            "<project><artifactId>core</artifactId><dependencies>",
        )
        .unwrap();

        assert!(
            execute_use_exact_version(dir.path(), "5.0", CliOverrides::default(), false, false)
                .is_err()
        );
        assert_eq!(fs::read_to_string(dir.path().join("pom.xml")).unwrap(), ROOT_POM);
    }

    #[test]
    fn commit_requires_git_repository() {
        let dir = project();
        let err = execute_use_exact_version(dir.path(), "5.0", CliOverrides::default(), false, true)
            .unwrap_err();
        assert!(matches!(err, PomverError::ProjectValidation(_)));
    }

    #[test]
    fn list_runs_on_multi_module_project() {
        let dir = project();
        assert!(execute_list(dir.path(), true, CliOverrides::default()).is_ok());
        assert!(execute_list(dir.path(), false, CliOverrides::default()).is_ok());
    }
}
