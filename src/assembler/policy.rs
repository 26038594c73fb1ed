//! Decisions for models at or above the size threshold

use std::path::PathBuf;

use crate::config::UrlMap;
use crate::domain::{RawReference, ResourceKind};
use crate::error::Result;

/// A model large enough to need a decision
#[derive(Debug, Clone)]
pub struct LargeModel {
    pub reference: RawReference,
    pub kind: ResourceKind,
    pub path: PathBuf,
    pub size: u64,
}

impl LargeModel {
    pub fn size_gib(&self) -> f64 {
        self.size as f64 / GIB as f64
    }
}

/// Bytes per GiB
pub const GIB: u64 = 1024 * 1024 * 1024;

/// What to do with a large model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LargeModelAction {
    /// Copy it into the package anyway
    Embed,
    /// Record it for download from `url`
    Externalize { url: String },
    /// Leave it out
    Skip,
}

impl LargeModelAction {
    /// Externalize, or skip when the URL is blank
    pub fn externalize_or_skip(url: &str) -> Self {
        let url = url.trim();
        if url.is_empty() {
            Self::Skip
        } else {
            Self::Externalize {
                url: url.to_string(),
            }
        }
    }
}

/// Chooses an action per large model
///
/// An error aborts assembly.
pub trait ExternalizationPolicy {
    fn decide(&mut self, model: &LargeModel) -> Result<LargeModelAction>;
}

/// Same answer for every model
#[derive(Debug, Clone)]
pub struct FixedPolicy(pub LargeModelAction);

impl ExternalizationPolicy for FixedPolicy {
    fn decide(&mut self, _model: &LargeModel) -> Result<LargeModelAction> {
        Ok(self.0.clone())
    }
}

/// Externalize models with a mapped URL, defer the rest
pub struct UrlMapPolicy<P> {
    urls: UrlMap,
    otherwise: P,
}

impl<P: ExternalizationPolicy> UrlMapPolicy<P> {
    pub fn new(urls: UrlMap, otherwise: P) -> Self {
        Self { urls, otherwise }
    }
}

impl<P: ExternalizationPolicy> ExternalizationPolicy for UrlMapPolicy<P> {
    fn decide(&mut self, model: &LargeModel) -> Result<LargeModelAction> {
        match self.urls.url_for(&model.reference) {
            Some(url) => Ok(LargeModelAction::externalize_or_skip(url)),
            None => self.otherwise.decide(model),
        }
    }
}

impl<P: ExternalizationPolicy + ?Sized> ExternalizationPolicy for Box<P> {
    fn decide(&mut self, model: &LargeModel) -> Result<LargeModelAction> {
        (**self).decide(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn large(name: &str) -> LargeModel {
        LargeModel {
            reference: RawReference::new(Some(ResourceKind::Checkpoints), name),
            kind: ResourceKind::Checkpoints,
            path: PathBuf::from("/models/checkpoints").join(name),
            size: 3 * GIB,
        }
    }

    #[test]
    fn test_blank_url_means_skip() {
        assert_eq!(LargeModelAction::externalize_or_skip("  "), LargeModelAction::Skip);
        assert_eq!(
            LargeModelAction::externalize_or_skip(" https://x.example/a "),
            LargeModelAction::Externalize {
                url: "https://x.example/a".to_string()
            }
        );
    }

    #[test]
    fn test_url_map_then_fallback() {
        let urls = UrlMap::from_yaml("mapped.safetensors: https://x.example/mapped\n").unwrap();
        let mut policy = UrlMapPolicy::new(urls, FixedPolicy(LargeModelAction::Embed));

        assert_eq!(
            policy.decide(&large("mapped.safetensors")).unwrap(),
            LargeModelAction::Externalize {
                url: "https://x.example/mapped".to_string()
            }
        );
        assert_eq!(
            policy.decide(&large("other.safetensors")).unwrap(),
            LargeModelAction::Embed
        );
    }

    #[test]
    fn test_size_gib() {
        assert!((large("a.ckpt").size_gib() - 3.0).abs() < f64::EPSILON);
    }
}
