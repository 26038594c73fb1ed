//! Ordered lookup tables for guessing a model's kind
//!
//! Tables are evaluated top to bottom and the first match wins.

use crate::domain::ResourceKind;

/// Widget values that are never file references
pub const STOPLIST: &[&str] = &["randomize", "true", "false", "enable", "disable"];

/// Extensions of model-like files
pub const MODEL_EXTENSIONS: &[&str] = &[".safetensors", ".ckpt", ".pt", ".pth", ".bin", ".onnx"];

/// Extensions whose files default to checkpoints when nothing else matches
const CHECKPOINT_EXTENSIONS: &[&str] = &[".safetensors", ".ckpt"];

/// Node type substring to kind, specific keys before generic ones
const NODE_TYPE_TABLE: &[(&str, ResourceKind)] = &[
    ("checkpointloader", ResourceKind::Checkpoints),
    ("checkpoint", ResourceKind::Checkpoints),
    ("vaeloader", ResourceKind::Vae),
    ("vae", ResourceKind::Vae),
    ("clipvision", ResourceKind::ClipVision),
    ("clip", ResourceKind::Clip),
    ("loraloader", ResourceKind::Loras),
    ("lora", ResourceKind::Loras),
    ("embedding", ResourceKind::Embeddings),
    ("textualinversion", ResourceKind::Embeddings),
    ("hypernetwork", ResourceKind::Hypernetworks),
    ("controlnet", ResourceKind::Controlnet),
    ("upscale", ResourceKind::UpscaleModels),
    ("unet", ResourceKind::Unet),
    ("facedetection", ResourceKind::Insightface),
    ("facerestore", ResourceKind::FacerestoreModels),
    ("ultralytics", ResourceKind::Ultralytics),
    ("llm", ResourceKind::Llm),
    ("sam", ResourceKind::Sams),
    ("load", ResourceKind::Checkpoints),
];

/// Filename substrings for checkpoint-like extensions
const CHECKPOINT_NAME_TABLE: &[(&[&str], ResourceKind)] = &[
    (&["lora"], ResourceKind::Loras),
    (&["vae"], ResourceKind::Vae),
    (&["embedding", "embed"], ResourceKind::Embeddings),
    (&["controlnet", "control_"], ResourceKind::Controlnet),
];

/// Filename substrings for `.pt`/`.pth` files
const TORCH_NAME_TABLE: &[(&[&str], ResourceKind)] = &[
    (&["sam"], ResourceKind::Sams),
    (&["gfpgan", "codeformer", "face"], ResourceKind::FacerestoreModels),
    (&["upscale", "esrgan"], ResourceKind::UpscaleModels),
];

/// Filename substrings for `.onnx` files
const ONNX_NAME_TABLE: &[(&[&str], ResourceKind)] = &[(&["inswapper"], ResourceKind::Insightface)];

/// Whether a widget value is a stoplisted token
pub fn is_stopword(value: &str) -> bool {
    STOPLIST.iter().any(|word| value.eq_ignore_ascii_case(word))
}

/// Whether a value ends with a model-like extension
pub fn has_model_extension(value: &str) -> bool {
    let lower = value.to_lowercase();
    MODEL_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Kind implied by a node's type string
pub fn kind_from_node_type(node_type: &str) -> Option<ResourceKind> {
    let node_type = node_type.to_lowercase();
    NODE_TYPE_TABLE
        .iter()
        .find(|(key, _)| node_type.contains(key))
        .map(|(_, kind)| kind.clone())
}

/// Kind implied by a file name
///
/// Checkpoint-like extensions default to checkpoints; other extensions
/// without a matching substring have no kind.
pub fn kind_from_filename(filename: &str) -> Option<ResourceKind> {
    let name = filename.to_lowercase();
    let lookup = |table: &[(&[&str], ResourceKind)]| {
        table
            .iter()
            .find(|(needles, _)| needles.iter().any(|needle| name.contains(needle)))
            .map(|(_, kind)| kind.clone())
    };

    if CHECKPOINT_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        Some(lookup(CHECKPOINT_NAME_TABLE).unwrap_or(ResourceKind::Checkpoints))
    } else if name.ends_with(".pt") || name.ends_with(".pth") {
        lookup(TORCH_NAME_TABLE)
    } else if name.ends_with(".onnx") {
        lookup(ONNX_NAME_TABLE)
    } else {
        None
    }
}
