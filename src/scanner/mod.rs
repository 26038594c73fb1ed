//! Workflow graph scanning
//!
//! Walks the `nodes` array of a ComfyUI workflow and collects the model
//! references and custom node identifiers it mentions. The kind of each
//! reference comes from, in order:
//!
//! 1. an explicit `properties.models[].directory` tag naming a known kind
//! 2. the node type keyword table
//! 3. the filename heuristics
//!
//! Scanning a document never fails; a value without a `nodes` array scans
//! to an empty result.

pub mod heuristics;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{RawReference, ResourceKind};
use crate::error::{Result, fs as fs_error, input};
use crate::paths::PathIndex;

/// Property fields naming a node's package, in priority order
pub const PACKAGE_ID_FIELDS: &[&str] = &["cnr_id", "aux_id", "Node name for S&R"];

/// References and package identifiers found in a workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Model references, de-duplicated per (kind, name) in first-seen order
    pub references: Vec<RawReference>,

    /// Case-folded package identifiers
    pub package_ids: BTreeSet<String>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.package_ids.is_empty()
    }
}

/// Scans workflow documents against the kinds of a path index
pub struct GraphScanner<'a> {
    index: &'a PathIndex,
}

impl<'a> GraphScanner<'a> {
    pub fn new(index: &'a PathIndex) -> Self {
        Self { index }
    }

    /// Read and scan a workflow file
    ///
    /// A missing, unreadable or malformed file is an input error.
    pub fn scan_file(&self, path: &Path) -> Result<ScanResult> {
        if !path.is_file() {
            return Err(input::workflow_not_found(path));
        }
        let content = std::fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, e))?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| input::workflow_parse_failed(path, e))?;
        Ok(self.scan(&document))
    }

    /// Scan workflow JSON text, yielding an empty result when unparseable
    pub fn scan_str(&self, json: &str) -> ScanResult {
        match serde_json::from_str::<Value>(json) {
            Ok(document) => self.scan(&document),
            Err(e) => {
                tracing::warn!("Workflow is not valid JSON: {}", e);
                ScanResult::default()
            }
        }
    }

    /// Scan a parsed workflow document
    pub fn scan(&self, workflow: &Value) -> ScanResult {
        let mut result = ScanResult::default();

        let Some(nodes) = workflow.get("nodes").and_then(Value::as_array) else {
            tracing::debug!("workflow has no nodes array");
            return result;
        };

        let mut seen: HashSet<(Option<ResourceKind>, String)> = HashSet::new();
        for node in nodes.iter().filter_map(Value::as_object) {
            let properties = node.get("properties").and_then(Value::as_object);

            if let Some(id) = properties.and_then(package_id) {
                result.package_ids.insert(id);
            }

            let Some(values) = node.get("widgets_values").and_then(Value::as_array) else {
                continue;
            };
            let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
            let tagged = properties.map(|p| self.tagged_kinds(p)).unwrap_or_default();
            let node_kind = heuristics::kind_from_node_type(node_type);

            for value in values.iter().filter_map(Value::as_str) {
                let value = value.trim();
                if value.is_empty()
                    || heuristics::is_stopword(value)
                    || !heuristics::has_model_extension(value)
                {
                    continue;
                }

                let kind = tagged
                    .get(value)
                    .cloned()
                    .or_else(|| node_kind.clone())
                    .or_else(|| heuristics::kind_from_filename(value));

                if seen.insert((kind.clone(), value.to_string())) {
                    tracing::debug!(
                        node_type,
                        kind = kind.as_ref().map_or("unknown", ResourceKind::dir_name),
                        "found model reference {}",
                        value
                    );
                    result.references.push(RawReference::new(kind, value));
                }
            }
        }

        result
    }

    /// Explicit `properties.models` tags naming a kind the index knows
    fn tagged_kinds(&self, properties: &serde_json::Map<String, Value>) -> HashMap<String, ResourceKind> {
        let Some(models) = properties.get("models").and_then(Value::as_array) else {
            return HashMap::new();
        };

        models
            .iter()
            .filter_map(|model| {
                let name = model.get("name")?.as_str()?;
                let directory = model.get("directory")?.as_str()?;
                let kind = ResourceKind::parse(directory);
                self.index
                    .contains(&kind)
                    .then(|| (name.trim().to_string(), kind))
            })
            .collect()
    }
}

/// First non-empty package identifier field, case-folded
fn package_id(properties: &serde_json::Map<String, Value>) -> Option<String> {
    PACKAGE_ID_FIELDS
        .iter()
        .filter_map(|field| properties.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_lowercase)
}
