//! Loading extractor output from disk.
//!
//! An inventory file is JSON, either a document
//!
//! ```json
//! { "packages": [ { "name": "lodash", "version": "4.17.21", "ecosystem": "npm" } ],
//!   "generic_findings": [] }
//! ```
//!
//! or a bare array of package records. A directory is walked for `*.json`
//! files, which are merged in path order.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::IgnoreConfig;
use crate::error::{Error, Result};
use crate::model::{GenericFinding, PackageScanResult, RawPackage, ScanResult};
use crate::resolver::PackageInfo;

/// Raw packages and generic findings gathered from one or more files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub packages: Vec<RawPackage>,
    pub generic_findings: Vec<GenericFinding>,
}

impl Inventory {
    /// Parses a single inventory document, either an object or a bare array
    /// of package records.
    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        let to_error = |source| Error::Inventory {
            path: path.to_path_buf(),
            source,
        };

        if content.trim_start().starts_with('[') {
            let packages = serde_json::from_str(content).map_err(to_error)?;
            Ok(Inventory {
                packages,
                generic_findings: Vec::new(),
            })
        } else {
            serde_json::from_str(content).map_err(to_error)
        }
    }

    /// Loads an inventory from a file, or from every `*.json` file under a
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            let mut inventory = Inventory::default();
            for file in json_files(path)? {
                inventory.merge(Self::load_file(&file)?);
            }
            Ok(inventory)
        } else {
            Self::load_file(path)
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let inventory = Self::from_json(&content, path)?;

        tracing::debug!(
            path = %path.display(),
            packages = inventory.packages.len(),
            findings = inventory.generic_findings.len(),
            "loaded inventory"
        );
        Ok(inventory)
    }

    /// Appends another inventory's records after this one's.
    pub fn merge(&mut self, other: Inventory) {
        self.packages.extend(other.packages);
        self.generic_findings.extend(other.generic_findings);
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.generic_findings.is_empty()
    }

    /// Resolves every record and collects the ones `ignore` does not exclude,
    /// keeping discovery order.
    pub fn resolve(self, ignore: &IgnoreConfig) -> ScanResult {
        let filter = ignore.compile();
        let mut result = ScanResult::new();

        for raw in self.packages {
            let package = PackageInfo::from_package(Arc::new(raw));
            if filter.should_ignore(&package) {
                tracing::debug!(
                    name = %package.name(),
                    source = %package.source_type(),
                    "skipping ignored package"
                );
                continue;
            }

            // Each record gets a fresh Arc, so it cannot already be present.
            if let Err(err) = result.add_package(PackageScanResult::new(package)) {
                tracing::warn!("{err}");
            }
        }

        for finding in self.generic_findings {
            result.add_generic_finding(finding);
        }

        result
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| Error::Io {
            path: err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.to_path_buf()),
            source: err.into(),
        })?;

        let is_json = entry.path().extension().and_then(|ext| ext.to_str()) == Some("json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
