use crate::error::{PomverError, Result};
use crate::maven::Interpolator;
use crate::utils::log::is_verbose;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Every place a `<dependency>` may legally be declared in a pom.
static DEPENDENCY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/project(/profiles/profile)?(/dependencyManagement|/build(/pluginManagement)?/plugins/plugin)?/dependencies/dependency$",
    )
    .expect("dependency path regex is valid")
});

pub const BACKUP_SUFFIX: &str = ".versionsBackup";

/// Rewrites the version of a declared dependency inside a serialized pom.
pub trait DependencyVersionSetter {
    /// Returns `true` when the document text actually changed.
    fn set_dependency_version(
        &mut self,
        group_id: &str,
        artifact_id: &str,
        current_version: Option<&str>,
        new_version: &str,
    ) -> Result<bool>;
}

/// In-memory pom text that is patched token by token, leaving every other byte untouched.
pub struct ModifiedPom {
    path: PathBuf,
    original: String,
    content: String,
    interpolator: Interpolator,
}

impl ModifiedPom {
    pub fn new<P: AsRef<Path>>(path: P, content: String, interpolator: Interpolator) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            original: content.clone(),
            content,
            interpolator,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, interpolator: Interpolator) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PomverError::PomParsing(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Ok(Self::new(path, content, interpolator))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_modified(&self) -> bool {
        self.content != self.original
    }

    /// Writes the pom back if it changed, optionally keeping the original next to it.
    pub fn save(&self, backup: bool) -> Result<bool> {
        if !self.is_modified() {
            return Ok(false);
        }

        if backup {
            let mut backup_path = self.path.clone().into_os_string();
            backup_path.push(BACKUP_SUFFIX);
            fs::write(&backup_path, &self.original)?;
        }

        fs::write(&self.path, &self.content)?;
        Ok(true)
    }

    fn find_version_tokens(
        &self,
        group_id: &str,
        artifact_id: &str,
        current_version: &str,
        new_version: &str,
    ) -> Result<Vec<Range<usize>>> {
        // Spans index `content`, so they must count the BOM quick-xml skips.
        let body = self.content.strip_prefix('\u{feff}').unwrap_or(&self.content);
        let offset = self.content.len() - body.len();
        let mut reader = Reader::from_str(body);
        let mut path: Vec<String> = Vec::new();
        let mut dependency: Option<DeclaredDependency> = None;
        let mut capture: Option<(Field, usize)> = None;
        let mut tokens = Vec::new();

        loop {
            let before = offset + reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                PomverError::PomParsing(format!(
                    "Failed to stream '{}' at byte {}: {}",
                    self.path.display(),
                    offset + reader.error_position() as usize,
                    e
                ))
            })?;
            let after = offset + reader.buffer_position() as usize;

            let depth = dependency.as_ref().map(|dep| dep.depth);
            match event {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    match depth {
                        None => {
                            path.push(name);
                            if DEPENDENCY_PATH.is_match(&format!("/{}", path.join("/"))) {
                                dependency = Some(DeclaredDependency::new(path.len()));
                            }
                        }
                        Some(depth) => {
                            if path.len() == depth {
                                capture = Field::from_name(&name).map(|field| (field, after));
                            }
                            path.push(name);
                        }
                    }
                }
                Event::End(_) => {
                    match depth {
                        Some(depth) if path.len() == depth + 1 => {
                            if let (Some((field, start)), Some(dep)) =
                                (capture.take(), dependency.as_mut())
                            {
                                dep.set(field, start..before);
                            }
                        }
                        Some(depth) if path.len() == depth => {
                            if let Some(token) = dependency.take().and_then(|dep| {
                                self.matching_token(
                                    &dep,
                                    group_id,
                                    artifact_id,
                                    current_version,
                                    new_version,
                                )
                            }) {
                                tokens.push(token);
                            }
                        }
                        _ => {}
                    }
                    path.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !path.is_empty() {
            return Err(PomverError::PomParsing(format!(
                "Unexpected end of '{}': <{}> is not closed",
                self.path.display(),
                path.join("/")
            )));
        }

        Ok(tokens)
    }

    fn matching_token(
        &self,
        dep: &DeclaredDependency,
        group_id: &str,
        artifact_id: &str,
        current_version: &str,
        new_version: &str,
    ) -> Option<Range<usize>> {
        let group = self.interpolator.interpolate(self.text(dep.group_id.clone()?).trim());
        let artifact = self
            .interpolator
            .interpolate(self.text(dep.artifact_id.clone()?).trim());
        if group != group_id || artifact != artifact_id {
            return None;
        }

        let span = dep.version.clone()?;
        let raw = self.text(span.clone());
        let version = raw.trim();
        if version != current_version || version == new_version {
            return None;
        }

        let leading = raw.len() - raw.trim_start().len();
        let start = span.start + leading;
        Some(start..start + version.len())
    }

    fn text(&self, span: Range<usize>) -> &str {
        &self.content[span]
    }
}

impl DependencyVersionSetter for ModifiedPom {
    fn set_dependency_version(
        &mut self,
        group_id: &str,
        artifact_id: &str,
        current_version: Option<&str>,
        new_version: &str,
    ) -> Result<bool> {
        // A dependency without a declared version has no token to rewrite.
        let Some(current_version) = current_version else {
            return Ok(false);
        };

        let tokens = self.find_version_tokens(group_id, artifact_id, current_version, new_version)?;
        for token in tokens.iter().rev() {
            self.content.replace_range(token.clone(), new_version);
        }

        if is_verbose() && tokens.len() > 1 {
            eprintln!(
                "[VERBOSE] {}:{} declared {} times in {}",
                group_id,
                artifact_id,
                tokens.len(),
                self.path.display()
            );
        }

        Ok(!tokens.is_empty())
    }
}

#[derive(Clone, Copy)]
enum Field {
    GroupId,
    ArtifactId,
    Version,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "groupId" => Some(Self::GroupId),
            "artifactId" => Some(Self::ArtifactId),
            "version" => Some(Self::Version),
            _ => None,
        }
    }
}

struct DeclaredDependency {
    depth: usize,
    group_id: Option<Range<usize>>,
    artifact_id: Option<Range<usize>>,
    version: Option<Range<usize>>,
}

impl DeclaredDependency {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            group_id: None,
            artifact_id: None,
            version: None,
        }
    }

    fn set(&mut self, field: Field, span: Range<usize>) {
        match field {
            Field::GroupId => self.group_id = Some(span),
            Field::ArtifactId => self.artifact_id = Some(span),
            Field::Version => self.version = Some(span),
        }
    }
}
