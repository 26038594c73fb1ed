//! Identifier declarations recognised inside package sources
//!
//! Sources are only read as text; nothing is imported or executed.

use regex::Regex;
use serde::Deserialize;

/// Declarations that name a package, each capturing the identifier
const IDENTIFIER_PATTERNS: &[&str] = &[
    r#"cnr_id["\s']+:\s*["']([^"']+)["']"#,
    r#"aux_id["\s']+:\s*["']([^"']+)["']"#,
    r#"id_mapping\s*=\s*['"]([\w\-/]+)['"]"#,
    r#"ID\s*=\s*['"]([\w\-/]+)['"]"#,
];

/// Compiled identifier patterns
pub struct IdentifierPatterns {
    patterns: Vec<Regex>,
}

impl IdentifierPatterns {
    pub fn new() -> Self {
        let patterns = IDENTIFIER_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();
        Self { patterns }
    }

    /// Case-folded identifiers declared in a source text, first-seen order
    pub fn extract(&self, content: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for pattern in &self.patterns {
            for captures in pattern.captures_iter(content) {
                if let Some(id) = captures.get(1) {
                    let id = id.as_str().trim().to_lowercase();
                    if !id.is_empty() && !found.contains(&id) {
                        found.push(id);
                    }
                }
            }
        }
        found
    }
}

impl Default for IdentifierPatterns {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct PyProject {
    project: Option<Project>,
}

#[derive(Deserialize)]
struct Project {
    name: Option<String>,
}

/// `[project] name` of a `pyproject.toml`, case-folded
///
/// Unparseable files yield `None`.
pub fn pyproject_name(content: &str) -> Option<String> {
    let parsed: PyProject = match toml::from_str(content) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("ignoring unparseable pyproject.toml: {}", e);
            return None;
        }
    };

    parsed
        .project
        .and_then(|project| project.name)
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_declarations() {
        let source = r#"
NODE_INFO = {"cnr_id": "ComfyUI-Impact-Pack", 'aux_id': 'ltdrdata/ComfyUI-Impact-Pack'}
id_mapping = "impact"
PACKAGE_ID = 'impact-pack'
"#;
        let ids = IdentifierPatterns::new().extract(source);
        assert_eq!(
            ids,
            vec![
                "comfyui-impact-pack",
                "ltdrdata/comfyui-impact-pack",
                "impact",
                "impact-pack",
            ]
        );
    }

    #[test]
    fn test_extract_nothing_from_plain_code() {
        let source = "def run(x):\n    return x * 2\n";
        assert!(IdentifierPatterns::new().extract(source).is_empty());
    }

    #[test]
    fn test_pyproject_name() {
        let content = r#"
[build-system]
name = "not-this"

[project]
namespace = "skip"
name = "ComfyUI-KJNodes"
version = "1.0.0"
"#;
        assert_eq!(pyproject_name(content), Some("comfyui-kjnodes".to_string()));
    }

    #[test]
    fn test_pyproject_without_project_section() {
        assert_eq!(pyproject_name("[tool.ruff]\nname = \"x\"\n"), None);
    }

    #[test]
    fn test_pyproject_name_ignores_trailing_comment() {
        let content = "[project]\nname = \"comfyui-foo\"  # registry id\n";
        assert_eq!(pyproject_name(content), Some("comfyui-foo".to_string()));
    }

    #[test]
    fn test_pyproject_section_header_with_comment() {
        let content = "[project] # metadata\nname = \"comfyui-foo\"\n";
        assert_eq!(pyproject_name(content), Some("comfyui-foo".to_string()));
    }

    #[test]
    fn test_pyproject_unparseable_is_none() {
        assert_eq!(pyproject_name("[project\nname = "), None);
    }
}
