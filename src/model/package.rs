use serde::{Deserialize, Serialize};

use super::Metadata;

/// Source-control provenance for packages extracted from a checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCodeIdentifier {
    pub repo: String,
    pub commit: String,
}

/// The container image layer a package was found in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDetails {
    pub index: usize,
    pub diff_id: String,
    pub chain_id: String,
    pub command: String,
    pub in_base_image: bool,
}

/// A package as emitted by an extractor, before identity normalization.
///
/// `plugins` lists the extractors that produced the record. It is normally
/// non-empty, but records injected by hand may carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPackage {
    pub name: String,
    pub version: String,
    pub ecosystem: String,
    pub locations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_code: Option<SourceCodeIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub plugins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_details: Option<LayerDetails>,
}

impl RawPackage {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        ecosystem: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ecosystem: ecosystem.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugins.push(plugin.into());
        self
    }

    pub fn with_source_code(mut self, repo: impl Into<String>, commit: impl Into<String>) -> Self {
        self.source_code = Some(SourceCodeIdentifier {
            repo: repo.into(),
            commit: commit.into(),
        });
        self
    }

    pub fn with_layer_details(mut self, layer_details: LayerDetails) -> Self {
        self.layer_details = Some(layer_details);
        self
    }
}
