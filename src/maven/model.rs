use crate::error::{PomverError, Result};
use quick_xml::de::from_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PROPERTY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("property reference regex is valid"));

/// Nested property references are resolved at most this many times.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// A dependency declaration as seen by the project model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
}

impl DependencyRecord {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: Option<&str>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.map(str::to_string),
            kind: None,
            classifier: None,
            scope: None,
        }
    }

    /// Packaging type, defaulting to `jar` like Maven does.
    pub fn kind(&self) -> &str {
        self.kind
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or("jar")
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.kind())?;
        if let Some(classifier) = self.classifier.as_deref().filter(|c| !c.is_empty()) {
            write!(f, ":{}", classifier)?;
        }
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}

/// Resolves `${...}` references against project properties.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    values: BTreeMap<String, String>,
}

impl Interpolator {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Unknown references are left in place.
    pub fn interpolate(&self, raw: &str) -> String {
        let mut current = raw.to_string();
        for _ in 0..MAX_INTERPOLATION_DEPTH {
            if !current.contains("${") {
                break;
            }
            let next = PROPERTY_REF
                .replace_all(&current, |caps: &regex::Captures| {
                    self.values
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

/// A pom.xml loaded into a resolved project model.
#[derive(Debug, Clone)]
pub struct MavenProject {
    pub pom_path: PathBuf,
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub modules: Vec<String>,
    pub dependency_management: Option<Vec<DependencyRecord>>,
    pub dependencies: Vec<DependencyRecord>,
    interpolator: Interpolator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParentRef {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
}

impl MavenProject {
    /// Loads a pom, optionally inheriting properties from a parent in the same build.
    pub fn load<P: AsRef<Path>>(
        pom_path: P,
        inherited: Option<&BTreeMap<String, String>>,
    ) -> Result<Self> {
        let pom_path = pom_path.as_ref();
        let content = read_pom(pom_path)?;
        Self::parse(pom_path, &content, inherited)
    }

    /// Loads a module pom. The aggregator's properties apply only when the module
    /// names it as its `<parent>`.
    pub fn load_module<P: AsRef<Path>>(pom_path: P, aggregator: &MavenProject) -> Result<Self> {
        let pom_path = pom_path.as_ref();
        let content = read_pom(pom_path)?;
        let raw = RawProject::parse(pom_path, &content)?;
        let inherits = raw
            .parent
            .as_ref()
            .map(RawParent::to_ref)
            .is_some_and(|parent| {
                parent.group_id == aggregator.group_id
                    && parent.artifact_id == aggregator.artifact_id
            });
        Self::resolve(pom_path, raw, inherits.then(|| aggregator.interpolator.values()))
    }

    pub fn parse(
        pom_path: &Path,
        content: &str,
        inherited: Option<&BTreeMap<String, String>>,
    ) -> Result<Self> {
        let raw = RawProject::parse(pom_path, content)?;
        Self::resolve(pom_path, raw, inherited)
    }

    fn resolve(
        pom_path: &Path,
        raw: RawProject,
        inherited: Option<&BTreeMap<String, String>>,
    ) -> Result<Self> {
        let parent = raw.parent.as_ref().map(RawParent::to_ref);

        let group_id = trimmed(raw.group_id)
            .or_else(|| parent.as_ref().map(|p| p.group_id.clone()))
            .unwrap_or_default();
        let artifact_id = trimmed(raw.artifact_id).ok_or_else(|| {
            PomverError::PomParsing(format!(
                "'{}' does not declare an artifactId",
                pom_path.display()
            ))
        })?;
        let version = trimmed(raw.version)
            .or_else(|| parent.as_ref().and_then(|p| p.version.clone()));

        let mut values = inherited.cloned().unwrap_or_default();
        for (key, value) in raw.properties {
            values.insert(key, value.trim().to_string());
        }
        for prefix in ["project", "pom"] {
            values.insert(format!("{prefix}.groupId"), group_id.clone());
            values.insert(format!("{prefix}.artifactId"), artifact_id.clone());
            if let Some(version) = &version {
                values.insert(format!("{prefix}.version"), version.clone());
            }
        }
        if let Some(parent) = &parent {
            values.insert("project.parent.groupId".into(), parent.group_id.clone());
            values.insert("project.parent.artifactId".into(), parent.artifact_id.clone());
            if let Some(version) = &parent.version {
                values.insert("project.parent.version".into(), version.clone());
            }
        }
        let interpolator = Interpolator::new(values);

        let dependency_management = raw.dependency_management.map(|dm| {
            dm.dependencies
                .dependency
                .into_iter()
                .map(|d| d.resolve(&interpolator))
                .collect()
        });
        let dependencies = raw
            .dependencies
            .dependency
            .into_iter()
            .map(|d| d.resolve(&interpolator))
            .collect();

        Ok(Self {
            pom_path: pom_path.to_path_buf(),
            group_id: interpolator.interpolate(&group_id),
            artifact_id: interpolator.interpolate(&artifact_id),
            version: version.map(|v| interpolator.interpolate(&v)),
            modules: raw
                .modules
                .module
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            dependency_management,
            dependencies,
            interpolator,
        })
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Directory holding the pom, used to resolve `<module>` paths.
    pub fn base_dir(&self) -> &Path {
        self.pom_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

fn read_pom(pom_path: &Path) -> Result<String> {
    fs::read_to_string(pom_path).map_err(|e| {
        PomverError::PomParsing(format!("Failed to read '{}': {}", pom_path.display(), e))
    })
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    parent: Option<RawParent>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
    #[serde(default)]
    modules: RawModules,
    dependency_management: Option<RawDependencyManagement>,
    #[serde(default)]
    dependencies: RawDependencies,
}

impl RawProject {
    fn parse(pom_path: &Path, content: &str) -> Result<Self> {
        from_str(content).map_err(|e| {
            PomverError::PomParsing(format!("Failed to parse '{}': {}", pom_path.display(), e))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParent {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
}

impl RawParent {
    fn to_ref(&self) -> ParentRef {
        ParentRef {
            group_id: trimmed(self.group_id.clone()).unwrap_or_default(),
            artifact_id: trimmed(self.artifact_id.clone()).unwrap_or_default(),
            version: trimmed(self.version.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawModules {
    #[serde(default)]
    module: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDependencyManagement {
    #[serde(default)]
    dependencies: RawDependencies,
}

#[derive(Debug, Default, Deserialize)]
struct RawDependencies {
    #[serde(default)]
    dependency: Vec<RawDependency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDependency {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    classifier: Option<String>,
    scope: Option<String>,
}

impl RawDependency {
    fn resolve(self, interpolator: &Interpolator) -> DependencyRecord {
        let resolve = |value: Option<String>| trimmed(value).map(|v| interpolator.interpolate(&v));
        DependencyRecord {
            group_id: resolve(self.group_id).unwrap_or_default(),
            artifact_id: resolve(self.artifact_id).unwrap_or_default(),
            version: resolve(self.version),
            kind: resolve(self.kind),
            classifier: resolve(self.classifier),
            scope: resolve(self.scope),
        }
    }
}
