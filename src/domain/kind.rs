//! Resource kinds
//!
//! A kind names a category of model file and the `models/<dir>` directory
//! ComfyUI loads it from.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category of a model-like binary asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Checkpoints,
    Vae,
    Loras,
    Embeddings,
    Controlnet,
    Clip,
    ClipVision,
    UpscaleModels,
    FacerestoreModels,
    Insightface,
    Ultralytics,
    Unet,
    DiffusionModels,
    TextEncoders,
    Llm,
    Configs,
    VaeApprox,
    Sams,
    Gligen,
    Hypernetworks,
    /// Kind introduced by an `extra_model_paths.yaml` overlay
    Custom(String),
}

/// Built-in kinds in path index order
pub const KNOWN_KINDS: [ResourceKind; 20] = [
    ResourceKind::Checkpoints,
    ResourceKind::Vae,
    ResourceKind::Loras,
    ResourceKind::Embeddings,
    ResourceKind::Controlnet,
    ResourceKind::Clip,
    ResourceKind::ClipVision,
    ResourceKind::UpscaleModels,
    ResourceKind::FacerestoreModels,
    ResourceKind::Insightface,
    ResourceKind::Ultralytics,
    ResourceKind::Unet,
    ResourceKind::DiffusionModels,
    ResourceKind::TextEncoders,
    ResourceKind::Llm,
    ResourceKind::Configs,
    ResourceKind::VaeApprox,
    ResourceKind::Sams,
    ResourceKind::Gligen,
    ResourceKind::Hypernetworks,
];

impl ResourceKind {
    /// Directory name under `models/`
    pub fn dir_name(&self) -> &str {
        match self {
            Self::Checkpoints => "checkpoints",
            Self::Vae => "vae",
            Self::Loras => "loras",
            Self::Embeddings => "embeddings",
            Self::Controlnet => "controlnet",
            Self::Clip => "clip",
            Self::ClipVision => "clip_vision",
            Self::UpscaleModels => "upscale_models",
            Self::FacerestoreModels => "facerestore_models",
            Self::Insightface => "insightface",
            Self::Ultralytics => "ultralytics",
            Self::Unet => "unet",
            Self::DiffusionModels => "diffusion_models",
            Self::TextEncoders => "text_encoders",
            Self::Llm => "LLM",
            Self::Configs => "configs",
            Self::VaeApprox => "vae_approx",
            Self::Sams => "sams",
            Self::Gligen => "gligen",
            Self::Hypernetworks => "hypernetworks",
            Self::Custom(name) => name,
        }
    }

    /// Parse a kind name, case-insensitively
    ///
    /// Names that are not built in become [`ResourceKind::Custom`] keyed by
    /// their lower-cased form.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        KNOWN_KINDS
            .into_iter()
            .find(|kind| kind.dir_name().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| Self::Custom(name.to_lowercase()))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl Serialize for ResourceKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.dir_name())
    }
}

impl<'de> Deserialize<'de> for ResourceKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}
