use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::{GenericFinding, LayerDetails, License, RawPackage, Vulnerability};
use crate::error::{Error, Result};
use crate::resolver::{PackageInfo, SourceType};

/// A package together with what matching found for it.
#[derive(Debug, Clone, Serialize)]
pub struct PackageScanResult {
    package: PackageInfo,
    vulnerabilities: Vec<Vulnerability>,
    licenses: Vec<License>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer_details: Option<LayerDetails>,
}

impl PackageScanResult {
    /// Starts a result for `package`, carrying over its image layer.
    pub fn new(package: PackageInfo) -> Self {
        let layer_details = package.raw().layer_details.clone();
        Self {
            package,
            vulnerabilities: Vec::new(),
            licenses: Vec::new(),
            layer_details,
        }
    }

    pub fn with_vulnerabilities(mut self, vulnerabilities: Vec<Vulnerability>) -> Self {
        self.vulnerabilities = vulnerabilities;
        self
    }

    pub fn with_licenses(mut self, licenses: Vec<License>) -> Self {
        self.licenses = licenses;
        self
    }

    pub fn package(&self) -> &PackageInfo {
        &self.package
    }

    pub fn vulnerabilities(&self) -> &[Vulnerability] {
        &self.vulnerabilities
    }

    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    pub fn layer_details(&self) -> Option<&LayerDetails> {
        self.layer_details.as_ref()
    }

    pub fn is_vulnerable(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }
}

/// Everything one scan produced: per-package results in discovery order and
/// findings that are not tied to a package.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub scan_time: DateTime<Utc>,
    package_results: Vec<PackageScanResult>,
    generic_findings: Vec<GenericFinding>,
    #[serde(skip)]
    records: HashSet<usize>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self {
            scan_time: Utc::now(),
            package_results: Vec::new(),
            generic_findings: Vec::new(),
            records: HashSet::new(),
        }
    }

    /// Appends a package result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRecord`] when the same raw record already
    /// backs a package in this result. Equal but distinct records are kept;
    /// merging across extractors happens downstream.
    pub fn add_package(&mut self, result: PackageScanResult) -> Result<()> {
        let record = result.package.record();

        if !self.records.insert(Arc::as_ptr(record) as usize) {
            return Err(Error::DuplicateRecord {
                name: record.name.clone(),
                version: record.version.clone(),
            });
        }

        self.package_results.push(result);
        Ok(())
    }

    pub fn add_generic_finding(&mut self, finding: GenericFinding) {
        self.generic_findings.push(finding);
    }

    pub fn package_results(&self) -> &[PackageScanResult] {
        &self.package_results
    }

    pub fn generic_findings(&self) -> &[GenericFinding] {
        &self.generic_findings
    }

    pub fn is_empty(&self) -> bool {
        self.package_results.is_empty() && self.generic_findings.is_empty()
    }

    pub fn total_vulnerabilities(&self) -> usize {
        self.package_results
            .iter()
            .map(|r| r.vulnerabilities.len())
            .sum()
    }

    pub fn vulnerable_packages(&self) -> impl Iterator<Item = &PackageScanResult> {
        self.package_results.iter().filter(|r| r.is_vulnerable())
    }

    /// Number of packages per source type, keyed by the serialized name.
    pub fn source_type_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.package_results {
            let source: SourceType = result.package.source_type();
            *counts.entry(source.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for ScanResult {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Arc<RawPackage>> for PackageScanResult {
    fn from(package: Arc<RawPackage>) -> Self {
        Self::new(PackageInfo::from_package(package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn result_for(name: &str) -> PackageScanResult {
        PackageScanResult::from(Arc::new(
            RawPackage::new(name, "1.0.0", "npm").with_plugin("javascript/packagelockjson"),
        ))
    }

    #[test]
    fn test_add_package_keeps_order() {
        let mut scan = ScanResult::new();
        scan.add_package(result_for("b")).unwrap();
        scan.add_package(result_for("a")).unwrap();

        let names: Vec<String> = scan
            .package_results()
            .iter()
            .map(|r| r.package().name())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_same_record_rejected() {
        let raw = Arc::new(RawPackage::new("lodash", "4.17.21", "npm"));
        let mut scan = ScanResult::new();

        scan.add_package(PackageScanResult::from(Arc::clone(&raw)))
            .unwrap();
        let err = scan
            .add_package(PackageScanResult::from(Arc::clone(&raw)))
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateRecord { .. }));
        assert_eq!(scan.package_results().len(), 1);
    }

    #[test]
    fn test_cloned_package_info_shares_record() {
        let info = PackageInfo::from_package(RawPackage::new("serde", "1.0.193", "crates.io"));
        let mut scan = ScanResult::new();

        scan.add_package(PackageScanResult::new(info.clone())).unwrap();
        assert!(scan.add_package(PackageScanResult::new(info)).is_err());
    }

    #[test]
    fn test_equal_but_distinct_records_are_kept() {
        let mut scan = ScanResult::new();
        scan.add_package(result_for("lodash")).unwrap();
        scan.add_package(result_for("lodash")).unwrap();
        assert_eq!(scan.package_results().len(), 2);
    }

    #[test]
    fn test_layer_details_carried_over() {
        let layer = LayerDetails {
            index: 2,
            diff_id: "sha256:abc".to_string(),
            command: "RUN apk add openssl".to_string(),
            ..Default::default()
        };
        let raw = RawPackage::new("openssl", "3.1.4-r0", "Alpine").with_layer_details(layer.clone());
        let result = PackageScanResult::new(PackageInfo::from_package(raw));

        assert_eq!(result.layer_details(), Some(&layer));
    }

    #[test]
    fn test_vulnerability_summaries() {
        let mut scan = ScanResult::new();
        scan.add_package(
            result_for("lodash").with_vulnerabilities(vec![
                Vulnerability::new("GHSA-p6mc-m468-83gw"),
                Vulnerability::new("GHSA-35jh-r3h4-6jhm"),
            ]),
        )
        .unwrap();
        scan.add_package(result_for("left-pad").with_licenses(vec![License::new("MIT")]))
            .unwrap();
        scan.add_generic_finding(GenericFinding {
            id: "weak-credentials".to_string(),
            title: "Weak SSH password".to_string(),
            severity: Severity::High,
            ..Default::default()
        });

        assert_eq!(scan.total_vulnerabilities(), 2);
        assert_eq!(scan.vulnerable_packages().count(), 1);
        assert_eq!(scan.generic_findings().len(), 1);
        assert_eq!(scan.source_type_counts().get("lockfile"), Some(&2));
        assert!(!scan.is_empty());
        assert!(ScanResult::new().is_empty());
    }

    #[test]
    fn test_serializes_resolved_identity() {
        let mut scan = ScanResult::new();
        scan.add_package(PackageScanResult::from(Arc::new(RawPackage::new(
            "Foo_Bar", "1.0", "PyPI",
        ))))
        .unwrap();

        let json = serde_json::to_value(&scan).unwrap();
        assert_eq!(json["package_results"][0]["package"]["name"], "foo-bar");
        assert!(json.get("records").is_none());
        assert!(json.get("scan_time").is_some());
    }
}
