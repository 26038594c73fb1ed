//! Package assembly
//!
//! Copies the workflow, the resolved custom node packages and the resolved
//! models into a package directory and writes its manifest. Models at or
//! above the size threshold go through an [`ExternalizationPolicy`].
//!
//! Problems with a single model or package are logged and recorded in the
//! [`AssemblyReport`]; only failures to write the package itself abort.

pub mod archive;
pub mod layout;
pub mod policy;

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;

use crate::common::fs::{self as common_fs, NoiseFilter};
use crate::config::{ExternalAsset, Manifest};
use crate::domain::{RawReference, ResolvedPackage, ResolvedResource};
use crate::error::{PackError, Result, fs as fs_error};
use crate::hash;

pub use layout::PackageLayout;
pub use policy::{
    ExternalizationPolicy, FixedPolicy, GIB, LargeModel, LargeModelAction, UrlMapPolicy,
};

/// Default size threshold in GiB
pub const DEFAULT_THRESHOLD_GIB: f64 = 2.0;

/// Convert a GiB threshold to bytes
pub fn threshold_bytes(gib: f64) -> u64 {
    (gib.max(0.0) * GIB as f64) as u64
}

/// What happened to one model reference
#[derive(Debug)]
pub enum ModelOutcome {
    Copied { destination: PathBuf, size: u64 },
    Externalized { url: String, size: u64 },
    Skipped { size: u64 },
    Unresolved,
    Failed(PackError),
}

#[derive(Debug)]
pub struct ModelReport {
    pub reference: RawReference,
    pub outcome: ModelOutcome,
}

/// What happened to one package
#[derive(Debug)]
pub struct PackageReport {
    pub name: String,
    pub files: usize,
    pub failures: Vec<PackError>,
}

impl PackageReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of assembling a package
#[derive(Debug)]
pub struct AssemblyReport {
    pub root: PathBuf,
    pub manifest: Manifest,
    pub models: Vec<ModelReport>,
    pub packages: Vec<PackageReport>,
}

impl AssemblyReport {
    fn count(&self, pred: impl Fn(&ModelOutcome) -> bool) -> usize {
        self.models.iter().filter(|m| pred(&m.outcome)).count()
    }

    pub fn copied(&self) -> usize {
        self.count(|o| matches!(o, ModelOutcome::Copied { .. }))
    }

    pub fn externalized(&self) -> usize {
        self.count(|o| matches!(o, ModelOutcome::Externalized { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ModelOutcome::Skipped { .. }))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, ModelOutcome::Unresolved))
    }

    /// Models that failed plus packages copied with errors
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ModelOutcome::Failed(_)))
            + self.packages.iter().filter(|p| !p.is_clean()).count()
    }

    /// Models and packages placed or recorded without error
    pub fn succeeded(&self) -> usize {
        self.copied()
            + self.externalized()
            + self.packages.iter().filter(|p| p.is_clean()).count()
    }
}

/// Builds one package directory
pub struct Assembler<'a> {
    layout: PackageLayout,
    threshold: u64,
    policy: &'a mut dyn ExternalizationPolicy,
    progress: ProgressBar,
    filter: NoiseFilter,
}

impl<'a> Assembler<'a> {
    pub fn new(
        layout: PackageLayout,
        threshold: u64,
        policy: &'a mut dyn ExternalizationPolicy,
    ) -> Self {
        Self {
            layout,
            threshold,
            policy,
            progress: ProgressBar::hidden(),
            filter: NoiseFilter::new(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Assemble the package and write its manifest
    pub fn assemble(
        mut self,
        workflow: &Path,
        models: &[ResolvedResource],
        packages: &[ResolvedPackage],
        mut manifest: Manifest,
    ) -> Result<AssemblyReport> {
        self.copy_workflow(workflow)?;

        self.progress.set_length((models.len() + packages.len()) as u64);

        let mut package_reports = Vec::with_capacity(packages.len());
        for package in packages {
            self.progress.set_message(package.name.clone());
            let report = self.copy_package(package);
            if report.files > 0 || report.is_clean() {
                manifest
                    .installation_order
                    .push(PackageLayout::custom_node_entry(&package.name));
            }
            package_reports.push(report);
            self.progress.inc(1);
        }

        let mut model_reports = Vec::with_capacity(models.len());
        for resource in models {
            self.progress.set_message(resource.reference.name.clone());
            let outcome = match self.place_model(resource, &mut manifest) {
                Ok(outcome) => outcome,
                Err(e) if matches!(e, PackError::PromptFailed { .. }) => {
                    self.progress.abandon();
                    return Err(e);
                }
                Err(e) => {
                    self.progress.suspend(|| tracing::warn!("{}", e));
                    ModelOutcome::Failed(e)
                }
            };
            model_reports.push(ModelReport {
                reference: resource.reference.clone(),
                outcome,
            });
            self.progress.inc(1);
        }

        manifest.save(&self.layout.manifest_path())?;
        self.progress.finish_and_clear();

        Ok(AssemblyReport {
            root: self.layout.root().to_path_buf(),
            manifest,
            models: model_reports,
            packages: package_reports,
        })
    }

    fn copy_workflow(&self, workflow: &Path) -> Result<()> {
        let file_name = workflow
            .file_name()
            .ok_or_else(|| fs_error::not_found(workflow))?;
        let dest = self.layout.workflows_dir().join(file_name);
        common_fs::copy_file(workflow, &dest)?;
        Ok(())
    }

    fn copy_package(&self, package: &ResolvedPackage) -> PackageReport {
        let dest = self.layout.custom_node_dir(&package.name);
        tracing::debug!("copying package {} to {}", package.name, dest.display());

        match common_fs::copy_dir_filtered(&package.path, &dest, &self.filter) {
            Ok(copy) => PackageReport {
                name: package.name.clone(),
                files: copy.files,
                failures: copy.failures,
            },
            Err(e) => {
                self.progress.suspend(|| tracing::warn!("{}", e));
                PackageReport {
                    name: package.name.clone(),
                    files: 0,
                    failures: vec![e],
                }
            }
        }
    }

    fn place_model(
        &mut self,
        resource: &ResolvedResource,
        manifest: &mut Manifest,
    ) -> Result<ModelOutcome> {
        let reference = &resource.reference;
        let Some(location) = &resource.location else {
            self.progress
                .suspend(|| tracing::warn!("Could not locate {}", reference.name));
            return Ok(ModelOutcome::Unresolved);
        };

        let size = std::fs::metadata(&location.path)
            .map_err(|e| fs_error::read_failed(&location.path, e))?
            .len();
        let destination = self.layout.model_destination(&location.kind, reference)?;

        if size < self.threshold {
            common_fs::copy_file(&location.path, &destination)?;
            return Ok(ModelOutcome::Copied { destination, size });
        }

        let large = LargeModel {
            reference: reference.clone(),
            kind: location.kind.clone(),
            path: location.path.clone(),
            size,
        };
        let policy = &mut *self.policy;
        let action = self.progress.suspend(|| policy.decide(&large))?;

        match action {
            LargeModelAction::Embed => {
                tracing::info!("Embedding large model {} ({:.2} GiB)", reference.name, large.size_gib());
                common_fs::copy_file(&location.path, &destination)?;
                Ok(ModelOutcome::Copied { destination, size })
            }
            LargeModelAction::Externalize { url } => {
                let fingerprint = hash::hash_file(&location.path)?;
                manifest.add_external(ExternalAsset {
                    name: reference.basename().to_string(),
                    kind: location.kind.clone(),
                    path: reference
                        .has_subdirectory()
                        .then(|| reference.normalized()),
                    url: url.clone(),
                    hash: Some(fingerprint),
                    size: Some(size),
                });
                Ok(ModelOutcome::Externalized { url, size })
            }
            LargeModelAction::Skip => {
                tracing::info!("Skipping large model {}", reference.name);
                Ok(ModelOutcome::Skipped { size })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelLocation, ResourceKind};
    use crate::test_fixtures::FakeInstallation;
    use tempfile::TempDir;

    struct Recording {
        seen: Vec<String>,
        action: LargeModelAction,
    }

    impl ExternalizationPolicy for Recording {
        fn decide(&mut self, model: &LargeModel) -> Result<LargeModelAction> {
            self.seen.push(model.reference.name.clone());
            Ok(self.action.clone())
        }
    }

    fn resolved(kind: ResourceKind, name: &str, path: &Path) -> ResolvedResource {
        ResolvedResource {
            reference: RawReference::new(Some(kind.clone()), name),
            location: Some(ModelLocation {
                kind,
                path: path.to_path_buf(),
            }),
        }
    }

    fn workflow(install: &FakeInstallation) -> PathBuf {
        install.write_workflow("flow.json", &serde_json::json!({"nodes": []}))
    }

    #[test]
    fn test_small_models_are_copied() {
        let install = FakeInstallation::new();
        let model = install.add_model("loras/styles", "anime.safetensors", 64);
        let out = TempDir::new().unwrap();
        let layout = PackageLayout::create(out.path().join("pkg"), false).unwrap();

        let mut policy = Recording {
            seen: Vec::new(),
            action: LargeModelAction::Skip,
        };
        let models = vec![resolved(ResourceKind::Loras, "styles/anime.safetensors", &model)];
        let report = Assembler::new(layout, 1024, &mut policy)
            .assemble(&workflow(&install), &models, &[], Manifest::new("pkg", "flow.json"))
            .unwrap();

        assert_eq!(report.copied(), 1);
        assert!(policy.seen.is_empty());
        assert!(out.path().join("pkg/models/loras/styles/anime.safetensors").is_file());
        assert!(out.path().join("pkg/workflows/flow.json").is_file());
        assert!(out.path().join("pkg/config.json").is_file());
    }

    #[test]
    fn test_size_at_threshold_is_large() {
        let install = FakeInstallation::new();
        let model = install.add_model("checkpoints", "exact.safetensors", 100);
        let out = TempDir::new().unwrap();
        let layout = PackageLayout::create(out.path().join("pkg"), false).unwrap();

        let mut policy = Recording {
            seen: Vec::new(),
            action: LargeModelAction::Skip,
        };
        let models = vec![resolved(ResourceKind::Checkpoints, "exact.safetensors", &model)];
        let report = Assembler::new(layout, 100, &mut policy)
            .assemble(&workflow(&install), &models, &[], Manifest::new("pkg", "flow.json"))
            .unwrap();

        assert_eq!(policy.seen, vec!["exact.safetensors"]);
        assert_eq!(report.skipped(), 1);
        assert!(!out.path().join("pkg/models/checkpoints/exact.safetensors").exists());
    }

    #[test]
    fn test_externalized_model_is_recorded_not_copied() {
        let install = FakeInstallation::new();
        let model = install.add_model("checkpoints", "model_a.safetensors", 300);
        let expected_hash = hash::hash_file(&model).unwrap();
        let out = TempDir::new().unwrap();
        let layout = PackageLayout::create(out.path().join("pkg"), false).unwrap();

        let mut policy = FixedPolicy(LargeModelAction::Externalize {
            url: "https://example.com/model_a".to_string(),
        });
        let models = vec![resolved(ResourceKind::Checkpoints, "model_a.safetensors", &model)];
        let report = Assembler::new(layout, 200, &mut policy)
            .assemble(&workflow(&install), &models, &[], Manifest::new("pkg", "flow.json"))
            .unwrap();

        assert_eq!(report.externalized(), 1);
        assert!(!out.path().join("pkg/models/checkpoints/model_a.safetensors").exists());

        let written = Manifest::load(&out.path().join("pkg/config.json")).unwrap();
        assert_eq!(written.external_models.len(), 1);
        let asset = written.external_models[0].asset().unwrap();
        assert_eq!(asset.name, "model_a.safetensors");
        assert_eq!(asset.kind, ResourceKind::Checkpoints);
        assert_eq!(asset.path, None);
        assert_eq!(asset.hash.as_deref(), Some(expected_hash.as_str()));
        assert_eq!(asset.size, Some(300));
    }

    #[test]
    fn test_failures_do_not_stop_assembly() {
        let install = FakeInstallation::new();
        let good = install.add_model("vae", "good_vae.safetensors", 10);
        let package = install.add_package(
            "ComfyUI-KJNodes",
            &[("__init__.py", "x = 1"), ("__pycache__/a.pyc", "bin")],
        );
        let out = TempDir::new().unwrap();
        let layout = PackageLayout::create(out.path().join("pkg"), false).unwrap();

        let models = vec![
            resolved(
                ResourceKind::Checkpoints,
                "gone.safetensors",
                &install.root().join("models/checkpoints/gone.safetensors"),
            ),
            ResolvedResource {
                reference: RawReference::new(None, "nowhere.bin"),
                location: None,
            },
            resolved(ResourceKind::Vae, "good_vae.safetensors", &good),
        ];
        let packages = vec![ResolvedPackage {
            name: "ComfyUI-KJNodes".to_string(),
            path: package,
        }];

        let mut policy = FixedPolicy(LargeModelAction::Skip);
        let report = Assembler::new(layout, 1024, &mut policy)
            .assemble(&workflow(&install), &models, &packages, Manifest::new("pkg", "flow.json"))
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.unresolved(), 1);
        assert_eq!(report.copied(), 1);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            report.manifest.installation_order,
            vec!["custom_nodes/ComfyUI-KJNodes"]
        );
        assert!(out.path().join("pkg/custom_nodes/ComfyUI-KJNodes/__init__.py").is_file());
        assert!(!out.path().join("pkg/custom_nodes/ComfyUI-KJNodes/__pycache__").exists());
    }

    #[test]
    fn test_threshold_bytes() {
        assert_eq!(threshold_bytes(2.0), 2 * GIB);
        assert_eq!(threshold_bytes(0.5), GIB / 2);
        assert_eq!(threshold_bytes(-1.0), 0);
    }
}
