//! Classification of where a package record came from.
//!
//! The classification is driven purely by the names of the extractors that
//! produced the record, checked against fixed membership tables.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Names of the extractors the membership tables know about.
pub mod extractors {
    pub const DPKG: &str = "os/dpkg";
    pub const APK: &str = "os/apk";
    pub const RPM: &str = "os/rpm";
    pub const SPDX: &str = "sbom/spdx";
    pub const CYCLONEDX: &str = "sbom/cdx";
    pub const GIT_REPO: &str = "vcs/gitrepo";
    pub const NODE_MODULES: &str = "javascript/nodemodules";
    pub const GO_BINARY: &str = "go/binary";
    pub const JAVA_ARCHIVE: &str = "java/archive";
    pub const PYTHON_WHEEL_EGG: &str = "python/wheelegg";
}

static OS_EXTRACTORS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HashSet::from([extractors::DPKG, extractors::APK, extractors::RPM]));

static SBOM_EXTRACTORS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HashSet::from([extractors::SPDX, extractors::CYCLONEDX]));

static GIT_EXTRACTORS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HashSet::from([extractors::GIT_REPO]));

static ARTIFACT_EXTRACTORS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        extractors::NODE_MODULES,
        extractors::GO_BINARY,
        extractors::JAVA_ARCHIVE,
        extractors::PYTHON_WHEEL_EGG,
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// No extractor is attached to the record.
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "os")]
    OsPackage,
    #[serde(rename = "sbom")]
    Sbom,
    #[serde(rename = "git")]
    Git,
    #[serde(rename = "artifact")]
    Artifact,
    /// Declared directly in a project manifest or lockfile.
    #[serde(rename = "lockfile")]
    ProjectPackage,
}

impl SourceType {
    /// Every source type, in classification precedence.
    pub const ALL: [SourceType; 6] = [
        SourceType::OsPackage,
        SourceType::Sbom,
        SourceType::Git,
        SourceType::Artifact,
        SourceType::ProjectPackage,
        SourceType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Unknown => "unknown",
            SourceType::OsPackage => "os",
            SourceType::Sbom => "sbom",
            SourceType::Git => "git",
            SourceType::Artifact => "artifact",
            SourceType::ProjectPackage => "lockfile",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceType::Unknown => "Unknown",
            SourceType::OsPackage => "OS Package",
            SourceType::Sbom => "SBOM",
            SourceType::Git => "Git",
            SourceType::Artifact => "Artifact",
            SourceType::ProjectPackage => "Project",
        }
    }

    /// The extractor names that map onto this source type, sorted.
    ///
    /// Empty for the fallback categories.
    pub fn extractors(&self) -> Vec<&'static str> {
        let table = match self {
            SourceType::OsPackage => &*OS_EXTRACTORS,
            SourceType::Sbom => &*SBOM_EXTRACTORS,
            SourceType::Git => &*GIT_EXTRACTORS,
            SourceType::Artifact => &*ARTIFACT_EXTRACTORS,
            SourceType::Unknown | SourceType::ProjectPackage => return Vec::new(),
        };
        let mut names: Vec<_> = table.iter().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Classifies a record by the extractors that produced it.
///
/// Plugins are visited in order and each is tested against the OS, SBOM,
/// Git and artifact tables in that precedence; the first hit decides. No
/// hit means the package was declared by a project, and no plugins at all
/// means the provenance is unknown.
pub fn classify<S: AsRef<str>>(plugins: &[S]) -> SourceType {
    if plugins.is_empty() {
        return SourceType::Unknown;
    }

    for plugin in plugins {
        let plugin = plugin.as_ref();
        if OS_EXTRACTORS.contains(plugin) {
            return SourceType::OsPackage;
        } else if SBOM_EXTRACTORS.contains(plugin) {
            return SourceType::Sbom;
        } else if GIT_EXTRACTORS.contains(plugin) {
            return SourceType::Git;
        } else if ARTIFACT_EXTRACTORS.contains(plugin) {
            return SourceType::Artifact;
        }
    }

    SourceType::ProjectPackage
}
