use crate::error::{PomverError, Result};
use std::path::{Path, PathBuf};

const FORBIDDEN_ROOTS: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

/// Guards the paths pomver reads, writes and hands to git.
pub struct PathValidator;

impl PathValidator {
    /// Canonicalises the project directory, refusing files and system locations.
    pub fn validate_project_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            PomverError::ProjectValidation(format!("Invalid path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(PomverError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        if let Some(root) = Self::forbidden_root(path, &canonical) {
            return Err(PomverError::ProjectValidation(format!(
                "Access to system directory '{}' is not allowed",
                root
            )));
        }

        Ok(canonical)
    }

    /// Returns `file_path` relative to `base_dir`, failing when it escapes the base.
    pub fn relative_to_base(
        file_path: impl AsRef<Path>,
        base_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let file_path = file_path.as_ref();
        let base_dir = base_dir.as_ref();

        let canonical_file = file_path.canonicalize().map_err(|e| {
            PomverError::ProjectValidation(format!(
                "Invalid file path '{}': {e}",
                file_path.display()
            ))
        })?;
        let canonical_base = base_dir.canonicalize().map_err(|e| {
            PomverError::ProjectValidation(format!(
                "Invalid base directory '{}': {e}",
                base_dir.display()
            ))
        })?;

        canonical_file
            .strip_prefix(&canonical_base)
            .map(Path::to_path_buf)
            .map_err(|_| {
                PomverError::ProjectValidation(format!(
                    "'{}' is outside '{}'",
                    canonical_file.display(),
                    canonical_base.display()
                ))
            })
    }

    fn forbidden_root(path: &Path, canonical: &Path) -> Option<&'static str> {
        FORBIDDEN_ROOTS.iter().copied().find(|root| {
            let root_path = Path::new(root);
            path.starts_with(root_path)
                || canonical.starts_with(root_path)
                || root_path
                    .canonicalize()
                    .is_ok_and(|resolved| canonical.starts_with(resolved))
        })
    }
}
