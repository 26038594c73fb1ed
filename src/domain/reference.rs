//! Model references extracted from workflows and their resolutions

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ResourceKind;

/// A model reference taken from one node's widget values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RawReference {
    /// Kind guessed by the scanner, `None` when nothing matched
    pub kind: Option<ResourceKind>,

    /// Reference as written in the workflow (bare name or relative path)
    pub name: String,
}

impl RawReference {
    pub fn new(kind: Option<ResourceKind>, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Path components of the reference, accepting either separator
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.name
            .split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != ".")
    }

    /// Final component of the reference
    pub fn basename(&self) -> &str {
        self.components().last().unwrap_or(self.name.as_str())
    }

    /// Whether the reference carries a subdirectory
    pub fn has_subdirectory(&self) -> bool {
        self.components().count() > 1
    }

    /// Reference with forward slashes
    pub fn normalized(&self) -> String {
        self.components().collect::<Vec<_>>().join("/")
    }

    /// Join the reference onto a root directory
    pub fn join_onto(&self, root: &Path) -> PathBuf {
        self.components()
            .fold(root.to_path_buf(), |path, part| path.join(part))
    }
}

/// Where a reference was found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelLocation {
    /// Kind of the root the file was found under
    pub kind: ResourceKind,
    pub path: PathBuf,
}

/// A reference plus its resolved location, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedResource {
    pub reference: RawReference,
    pub location: Option<ModelLocation>,
}

impl ResolvedResource {
    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name() {
        let reference = RawReference::new(None, "model_a.safetensors");
        assert_eq!(reference.basename(), "model_a.safetensors");
        assert!(!reference.has_subdirectory());
    }

    #[test]
    fn test_windows_separators() {
        let reference = RawReference::new(None, "SDXL\\styles\\anime.safetensors");
        assert_eq!(reference.basename(), "anime.safetensors");
        assert!(reference.has_subdirectory());
        assert_eq!(reference.normalized(), "SDXL/styles/anime.safetensors");
    }

    #[test]
    fn test_join_onto() {
        let reference = RawReference::new(None, "sub/model.ckpt");
        assert_eq!(
            reference.join_onto(Path::new("/models/checkpoints")),
            PathBuf::from("/models/checkpoints/sub/model.ckpt")
        );
    }
}
