//! Resolution of scanned references against the local installation
//!
//! This module handles:
//! - Locating model files through the [`PathIndex`]
//! - Matching package identifiers through the [`PackageRegistry`]
//! - Collecting everything that could not be resolved

pub mod models;
pub mod packages;

use std::collections::HashSet;

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{RawReference, ResolvedPackage, ResolvedResource};
use crate::paths::PathIndex;
use crate::registry::PackageRegistry;
use crate::scanner::ScanResult;

pub use models::resolve_model;
pub use packages::resolve_package;

/// Outcome of resolving one scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    /// Every model reference, resolved or not, in scan order
    pub models: Vec<ResolvedResource>,

    /// Matched packages, unique by path
    pub packages: Vec<ResolvedPackage>,

    /// Package identifiers that matched nothing
    pub unresolved_packages: Vec<String>,
}

impl Resolution {
    pub fn resolved_models(&self) -> impl Iterator<Item = &ResolvedResource> {
        self.models.iter().filter(|m| m.is_resolved())
    }

    pub fn unresolved_models(&self) -> impl Iterator<Item = &ResolvedResource> {
        self.models.iter().filter(|m| !m.is_resolved())
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved_models().count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved_models().count() + self.unresolved_packages.len()
    }
}

/// Resolves references using prebuilt lookup structures
pub struct Resolver<'a> {
    index: &'a PathIndex,
    registry: &'a PackageRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a PathIndex, registry: &'a PackageRegistry) -> Self {
        Self { index, registry }
    }

    /// Resolve one model reference
    pub fn resolve_model(&self, reference: &RawReference) -> ResolvedResource {
        let location = models::resolve_model(self.index, reference);
        if location.is_none() {
            tracing::debug!("unresolved model reference {}", reference.name);
        }
        ResolvedResource {
            reference: reference.clone(),
            location,
        }
    }

    /// Resolve one package identifier
    pub fn resolve_package(&self, id: &str) -> Vec<ResolvedPackage> {
        packages::resolve_package(self.registry, id)
    }

    /// Resolve a whole scan
    ///
    /// Model lookups run in parallel; output order follows the scan.
    pub fn resolve(&self, scan: &ScanResult) -> Resolution {
        let models: Vec<ResolvedResource> = scan
            .references
            .par_iter()
            .map(|reference| self.resolve_model(reference))
            .collect();

        let mut resolution = Resolution {
            models,
            ..Resolution::default()
        };

        let mut seen = HashSet::new();
        for id in &scan.package_ids {
            let matched = self.resolve_package(id);
            if matched.is_empty() {
                tracing::debug!("unresolved package identifier {}", id);
                resolution.unresolved_packages.push(id.clone());
                continue;
            }
            for package in matched {
                if seen.insert(packages::canonical(&package.path)) {
                    resolution.packages.push(package);
                }
            }
        }

        tracing::debug!(
            "resolved {} of {} models and {} packages",
            resolution.resolved_count(),
            resolution.models.len(),
            resolution.packages.len()
        );

        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceKind;
    use crate::scanner::GraphScanner;
    use crate::test_fixtures::FakeInstallation;
    use serde_json::json;

    #[test]
    fn test_end_to_end_checkpoint() {
        let install = FakeInstallation::new();
        let file = install.add_model("checkpoints", "model_a.safetensors", 16);

        let index = PathIndex::load(install.root());
        let registry = PackageRegistry::for_installation(install.root());
        let workflow = json!({
            "nodes": [{
                "type": "CheckpointLoaderSimple",
                "widgets_values": ["model_a.safetensors"]
            }]
        });

        let scan = GraphScanner::new(&index).scan(&workflow);
        let resolution = Resolver::new(&index, &registry).resolve(&scan);

        assert_eq!(resolution.models.len(), 1);
        let location = resolution.models[0].location.as_ref().unwrap();
        assert_eq!(location.kind, ResourceKind::Checkpoints);
        assert_eq!(location.path, file);
        assert_eq!(resolution.unresolved_count(), 0);
    }

    #[test]
    fn test_unresolved_are_reported() {
        let install = FakeInstallation::new();
        install.add_package("comfyui-kjnodes", &[]);

        let index = PathIndex::load(install.root());
        let registry = PackageRegistry::for_installation(install.root());
        let workflow = json!({
            "nodes": [
                {"type": "VAELoader", "widgets_values": ["missing_vae.safetensors"]},
                {"type": "X", "properties": {"cnr_id": "comfyui-kjnodes"}},
                {"type": "Y", "properties": {"cnr_id": "efficiency-nodes"}}
            ]
        });

        let scan = GraphScanner::new(&index).scan(&workflow);
        let resolution = Resolver::new(&index, &registry).resolve(&scan);

        assert_eq!(resolution.resolved_count(), 0);
        assert_eq!(resolution.unresolved_models().count(), 1);
        assert_eq!(resolution.packages.len(), 1);
        assert_eq!(resolution.unresolved_packages, vec!["efficiency-nodes"]);
        assert_eq!(resolution.unresolved_count(), 2);
    }

    #[test]
    fn test_packages_unique_across_identifiers() {
        let install = FakeInstallation::new();
        install.add_package(
            "ComfyUI-Impact-Pack",
            &[("__init__.py", "INFO = {\"cnr_id\": \"impact\"}")],
        );

        let index = PathIndex::load(install.root());
        let registry = PackageRegistry::for_installation(install.root());
        let scan = ScanResult {
            references: Vec::new(),
            package_ids: ["impact".to_string(), "comfyui-impact-pack".to_string()]
                .into_iter()
                .collect(),
        };

        let resolution = Resolver::new(&index, &registry).resolve(&scan);
        assert_eq!(resolution.packages.len(), 1);
    }
}
