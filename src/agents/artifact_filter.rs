use crate::error::{PomverError, Result};
use crate::maven::DependencyRecord;
use regex::Regex;

/// Include/exclude patterns over `groupId:artifactId:type:classifier:version`.
///
/// Each segment is a glob (`*`, `?`); segments left out of a pattern match anything.
/// An empty include list includes everything, and excludes always win.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    includes: Vec<CoordinatePattern>,
    excludes: Vec<CoordinatePattern>,
}

impl ArtifactFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        Ok(Self {
            includes: compile_all(includes)?,
            excludes: compile_all(excludes)?,
        })
    }

    pub fn is_included(&self, dependency: &DependencyRecord) -> bool {
        let tokens = identity(dependency);

        let included =
            self.includes.is_empty() || self.includes.iter().any(|p| p.matches(&tokens));
        included && !self.excludes.iter().any(|p| p.matches(&tokens))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<CoordinatePattern>> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(CoordinatePattern::new)
        .collect()
}

fn identity(dependency: &DependencyRecord) -> [&str; 5] {
    [
        dependency.group_id.as_str(),
        dependency.artifact_id.as_str(),
        dependency.kind(),
        dependency.classifier.as_deref().unwrap_or(""),
        dependency.version.as_deref().unwrap_or(""),
    ]
}

#[derive(Debug, Clone)]
struct CoordinatePattern {
    segments: Vec<Regex>,
}

impl CoordinatePattern {
    fn new(pattern: &str) -> Result<Self> {
        let parts: Vec<&str> = pattern.split(':').collect();
        if parts.len() > 5 {
            return Err(PomverError::Config(format!(
                "Invalid artifact pattern '{}'. Expected groupId:artifactId:type:classifier:version",
                pattern
            )));
        }

        let segments = parts
            .into_iter()
            .map(|segment| compile_glob(segment.trim(), pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    fn matches(&self, tokens: &[&str; 5]) -> bool {
        self.segments
            .iter()
            .zip(tokens.iter())
            .all(|(regex, token)| regex.is_match(token))
    }
}

fn compile_glob(segment: &str, pattern: &str) -> Result<Regex> {
    if segment.is_empty() {
        return Regex::new("^.*$").map_err(|e| invalid_pattern(pattern, e));
    }

    let mut regex = String::from("^");
    for ch in segment.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' => {
                regex.push('\\');
                regex.push(ch);
            }
            _ => regex.push(ch),
        }
    }
    regex.push('$');

    Regex::new(&regex).map_err(|e| invalid_pattern(pattern, e))
}

fn invalid_pattern(pattern: &str, e: regex::Error) -> PomverError {
    PomverError::Config(format!("Invalid artifact pattern '{}': {}", pattern, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(group: &str, artifact: &str, version: &str) -> DependencyRecord {
        DependencyRecord::new(group, artifact, Some(version))
    }

    fn filter(includes: &[&str], excludes: &[&str]) -> ArtifactFilter {
        let includes: Vec<String> = includes.iter().map(|s| s.to_string()).collect();
        let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
        ArtifactFilter::new(&includes, &excludes).unwrap()
    }

    #[test]
    fn empty_filter_includes_everything() {
        assert!(ArtifactFilter::default().is_included(&dep("g", "a", "1.0")));
    }

    #[test]
    fn group_only_pattern_matches_all_artifacts() {
        let f = filter(&["org.springframework*"], &[]);
        assert!(f.is_included(&dep("org.springframework.boot", "spring-boot", "3.2.0")));
        assert!(!f.is_included(&dep("com.google.guava", "guava", "33.0-jre")));
    }

    #[test]
    fn dots_are_literal() {
        let f = filter(&["org.slf4j"], &[]);
        assert!(!f.is_included(&dep("orgxslf4j", "slf4j-api", "2.0.9")));
    }

    #[test]
    fn excludes_win_over_includes() {
        let f = filter(&["com.example:*"], &["com.example:legacy-*"]);
        assert!(f.is_included(&dep("com.example", "core", "1.0")));
        assert!(!f.is_included(&dep("com.example", "legacy-api", "1.0")));
    }

    #[test]
    fn matches_type_classifier_and_version_segments() {
        let mut record = dep("com.example", "core", "1.0-SNAPSHOT");
        record.kind = Some("test-jar".into());
        record.classifier = Some("tests".into());

        assert!(filter(&["com.example:core:test-jar:tests:*-SNAPSHOT"], &[]).is_included(&record));
        assert!(!filter(&["com.example:core:jar"], &[]).is_included(&record));
        assert!(filter(&["::test-jar"], &[]).is_included(&record));
    }

    #[test]
    fn blank_patterns_are_ignored() {
        let f = filter(&["  "], &[""]);
        assert!(f.is_included(&dep("g", "a", "1")));
    }

    #[test]
    fn rejects_too_many_segments() {
        let err = ArtifactFilter::new(&["a:b:c:d:e:f".to_string()], &[]).unwrap_err();
        assert!(matches!(err, PomverError::Config(_)));
    }
}
