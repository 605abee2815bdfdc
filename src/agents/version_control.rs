use crate::error::{PomverError, Result};
use crate::utils::path_validator::PathValidator;
use jiff::Zoned;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const MAX_BRANCH_LEN: usize = 60;

/// VersionControlAgent commits rewritten poms with hardened input validation.
pub struct VersionControlAgent {
    project_path: PathBuf,
}

impl VersionControlAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Result<Self> {
        let project_path = Self::validate_git_path(project_path.as_ref())?;
        Ok(Self { project_path })
    }

    /// Check if the working directory is clean
    pub fn is_working_directory_clean(&self) -> Result<bool> {
        let output = self.run_git(&["status", "--porcelain"])?;
        Self::ensure_success(&output, "git status")?;
        Ok(output.stdout.is_empty())
    }

    /// Branch, stage the given poms and commit them in one go.
    pub fn commit_to_new_branch(&self, exact_version: &str, poms: &[PathBuf]) -> Result<String> {
        let branch_name = Self::branch_name(exact_version, &Zoned::now());
        let output = self.run_git(&["checkout", "-b", &branch_name])?;
        Self::ensure_success(&output, "git checkout -b")?;

        self.stage_poms(poms)?;

        let message = format!("chore(deps): use exact version {exact_version}");
        let output = self.run_git(&["commit", "-m", &message])?;
        Self::ensure_success(&output, "git commit")?;

        Ok(branch_name)
    }

    fn stage_poms(&self, poms: &[PathBuf]) -> Result<()> {
        let mut relative = Vec::with_capacity(poms.len());
        for pom in poms {
            let path = PathValidator::relative_to_base(pom, &self.project_path).map_err(|err| {
                PomverError::GitOperation(format!("Refusing to stage unsafe path: {err}"))
            })?;
            relative.push(path.to_string_lossy().into_owned());
        }

        let mut args = vec!["add", "--"];
        args.extend(relative.iter().map(String::as_str));
        let output = self.run_git(&args)?;
        Self::ensure_success(&output, "git add")
    }

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .current_dir(&self.project_path)
            .args(args)
            .output()
            .map_err(|e| {
                PomverError::GitOperation(format!(
                    "Failed to execute git command '{}': {e}",
                    args.join(" ")
                ))
            })
    }

    fn ensure_success(output: &Output, command: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        Err(PomverError::GitOperation(format!(
            "{} failed: {}",
            command,
            String::from_utf8_lossy(&output.stderr)
        )))
    }

    fn validate_git_path(path: &Path) -> Result<PathBuf> {
        let dangerous = [';', '|', '&', '$', '`', '\n', '\r'];
        let path_str = path.to_string_lossy();
        if let Some(ch) = dangerous.iter().find(|c| path_str.contains(**c)) {
            return Err(PomverError::GitOperation(format!(
                "Path contains dangerous character: '{}'",
                ch
            )));
        }

        if !path.is_absolute() {
            return Err(PomverError::GitOperation(
                "Only absolute paths are allowed for Git operations".to_string(),
            ));
        }

        PathValidator::validate_project_path(path)
            .map_err(|err| PomverError::GitOperation(format!("Invalid Git path: {}", err)))
    }

    fn branch_name(exact_version: &str, now: &Zoned) -> String {
        let date = now.strftime("%Y-%m-%d").to_string();
        let mut branch_name: String = format!("deps/exact-{exact_version}-{date}")
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '/' | '.' => c,
                _ => '-',
            })
            .collect();

        // git refuses ".." anywhere in a ref name
        while branch_name.contains("..") {
            branch_name = branch_name.replace("..", ".");
        }
        branch_name.truncate(MAX_BRANCH_LEN);
        branch_name
    }
}
