//! Command implementations for comfypack CLI

pub mod completions;
pub mod fetch;
pub mod helpers;
pub mod pack;
pub mod prompt;
pub mod scan;
pub mod version;
