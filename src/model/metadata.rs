//! Extractor metadata and the facets the resolver reads from it.
//!
//! Every extractor attaches its own metadata shape to the records it emits.
//! Rather than matching on concrete shapes, the resolver asks the
//! [`PackageMetadata`] facets it cares about; a shape only implements the
//! facets it actually carries.

use serde::{Deserialize, Serialize};

/// Optional capabilities exposed by extractor metadata.
///
/// Every facet defaults to absent, so a new metadata shape only overrides
/// what it knows about.
pub trait PackageMetadata {
    /// Maven `(group id, artifact id)` pair.
    fn maven_coordinates(&self) -> Option<(&str, &str)> {
        None
    }

    /// Distro source package name (Debian `Source:` field).
    fn os_source_name(&self) -> Option<&str> {
        None
    }

    /// Alpine origin package name.
    fn os_origin_name(&self) -> Option<&str> {
        None
    }

    /// Binary package name as installed by the OS package manager.
    fn os_package_name(&self) -> Option<&str> {
        None
    }

    /// Dependency groups such as `dev` or `test`.
    fn dep_groups(&self) -> Option<&[String]> {
        None
    }

    /// Package url recovered from an SBOM document.
    fn purl(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpkgMetadata {
    pub package_name: String,
    pub source_name: String,
    pub package_version: String,
    pub source_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version_codename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

impl PackageMetadata for DpkgMetadata {
    fn os_source_name(&self) -> Option<&str> {
        Some(self.source_name.as_str())
    }

    fn os_package_name(&self) -> Option<&str> {
        Some(self.package_name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApkMetadata {
    pub package_name: String,
    pub origin_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl PackageMetadata for ApkMetadata {
    fn os_origin_name(&self) -> Option<&str> {
        Some(self.origin_name.as_str())
    }

    fn os_package_name(&self) -> Option<&str> {
        Some(self.package_name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpmMetadata {
    pub package_name: String,
    pub source_rpm: String,
    pub epoch: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl PackageMetadata for RpmMetadata {
    fn os_package_name(&self) -> Option<&str> {
        Some(self.package_name.as_str())
    }
}

/// Coordinates read from a JAR's `pom.properties` or manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaArchiveMetadata {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

impl PackageMetadata for JavaArchiveMetadata {
    fn maven_coordinates(&self) -> Option<(&str, &str)> {
        Some((self.group_id.as_str(), self.artifact_id.as_str()))
    }
}

/// A component entry read from an SPDX or CycloneDX document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SbomMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cpes: Vec<String>,
}

impl PackageMetadata for SbomMetadata {
    fn purl(&self) -> Option<&str> {
        self.purl.as_deref()
    }
}

/// Metadata attached by lockfile and manifest extractors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockfileMetadata {
    pub dep_groups: Vec<String>,
}

impl PackageMetadata for LockfileMetadata {
    fn dep_groups(&self) -> Option<&[String]> {
        Some(self.dep_groups.as_slice())
    }
}

/// The metadata shapes extractors can attach to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Metadata {
    Dpkg(DpkgMetadata),
    Apk(ApkMetadata),
    Rpm(RpmMetadata),
    JavaArchive(JavaArchiveMetadata),
    Sbom(SbomMetadata),
    Lockfile(LockfileMetadata),
}

impl Metadata {
    fn facets(&self) -> &dyn PackageMetadata {
        match self {
            Metadata::Dpkg(m) => m,
            Metadata::Apk(m) => m,
            Metadata::Rpm(m) => m,
            Metadata::JavaArchive(m) => m,
            Metadata::Sbom(m) => m,
            Metadata::Lockfile(m) => m,
        }
    }
}

impl PackageMetadata for Metadata {
    fn maven_coordinates(&self) -> Option<(&str, &str)> {
        self.facets().maven_coordinates()
    }

    fn os_source_name(&self) -> Option<&str> {
        self.facets().os_source_name()
    }

    fn os_origin_name(&self) -> Option<&str> {
        self.facets().os_origin_name()
    }

    fn os_package_name(&self) -> Option<&str> {
        self.facets().os_package_name()
    }

    fn dep_groups(&self) -> Option<&[String]> {
        self.facets().dep_groups()
    }

    fn purl(&self) -> Option<&str> {
        self.facets().purl()
    }
}
