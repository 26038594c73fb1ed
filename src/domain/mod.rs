//! Domain models for comfypack
//!
//! Plain data passed between the scanner, resolver and assembler.

pub mod kind;
pub mod package;
pub mod reference;

pub use kind::{KNOWN_KINDS, ResourceKind};
pub use package::ResolvedPackage;
pub use reference::{ModelLocation, RawReference, ResolvedResource};
