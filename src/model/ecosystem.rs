use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};

/// A package namespace recognised by the vulnerability database.
///
/// Names are matched exactly and case-sensitively (`PyPI`, not `pypi`).
/// Anything else is kept verbatim in [`Ecosystem::Unknown`] so no
/// information is lost when an extractor emits an unexpected name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    AlmaLinux,
    Alpine,
    Android,
    Bioconductor,
    Bitnami,
    Chainguard,
    ConanCenter,
    Cran,
    CratesIo,
    Debian,
    Ghc,
    GitHubActions,
    Go,
    Hackage,
    Hex,
    Linux,
    Mageia,
    Maven,
    MinimOs,
    Npm,
    NuGet,
    OpenEuler,
    OpenSuse,
    OssFuzz,
    Packagist,
    PhotonOs,
    Pub,
    PyPI,
    RedHat,
    RockyLinux,
    RubyGems,
    Suse,
    SwiftUrl,
    Ubuntu,
    Wolfi,
    Unknown(String),
}

impl Ecosystem {
    pub fn as_str(&self) -> &str {
        match self {
            Ecosystem::AlmaLinux => "AlmaLinux",
            Ecosystem::Alpine => "Alpine",
            Ecosystem::Android => "Android",
            Ecosystem::Bioconductor => "Bioconductor",
            Ecosystem::Bitnami => "Bitnami",
            Ecosystem::Chainguard => "Chainguard",
            Ecosystem::ConanCenter => "ConanCenter",
            Ecosystem::Cran => "CRAN",
            Ecosystem::CratesIo => "crates.io",
            Ecosystem::Debian => "Debian",
            Ecosystem::Ghc => "GHC",
            Ecosystem::GitHubActions => "GitHub Actions",
            Ecosystem::Go => "Go",
            Ecosystem::Hackage => "Hackage",
            Ecosystem::Hex => "Hex",
            Ecosystem::Linux => "Linux",
            Ecosystem::Mageia => "Mageia",
            Ecosystem::Maven => "Maven",
            Ecosystem::MinimOs => "MinimOS",
            Ecosystem::Npm => "npm",
            Ecosystem::NuGet => "NuGet",
            Ecosystem::OpenEuler => "openEuler",
            Ecosystem::OpenSuse => "openSUSE",
            Ecosystem::OssFuzz => "OSS-Fuzz",
            Ecosystem::Packagist => "Packagist",
            Ecosystem::PhotonOs => "Photon OS",
            Ecosystem::Pub => "Pub",
            Ecosystem::PyPI => "PyPI",
            Ecosystem::RedHat => "Red Hat",
            Ecosystem::RockyLinux => "Rocky Linux",
            Ecosystem::RubyGems => "RubyGems",
            Ecosystem::Suse => "SUSE",
            Ecosystem::SwiftUrl => "SwiftURL",
            Ecosystem::Ubuntu => "Ubuntu",
            Ecosystem::Wolfi => "Wolfi",
            Ecosystem::Unknown(name) => name.as_str(),
        }
    }

    /// Looks up a known ecosystem by its exact database name.
    pub fn from_name(name: &str) -> Option<Self> {
        let ecosystem = match name {
            "AlmaLinux" => Ecosystem::AlmaLinux,
            "Alpine" => Ecosystem::Alpine,
            "Android" => Ecosystem::Android,
            "Bioconductor" => Ecosystem::Bioconductor,
            "Bitnami" => Ecosystem::Bitnami,
            "Chainguard" => Ecosystem::Chainguard,
            "ConanCenter" => Ecosystem::ConanCenter,
            "CRAN" => Ecosystem::Cran,
            "crates.io" => Ecosystem::CratesIo,
            "Debian" => Ecosystem::Debian,
            "GHC" => Ecosystem::Ghc,
            "GitHub Actions" => Ecosystem::GitHubActions,
            "Go" => Ecosystem::Go,
            "Hackage" => Ecosystem::Hackage,
            "Hex" => Ecosystem::Hex,
            "Linux" => Ecosystem::Linux,
            "Mageia" => Ecosystem::Mageia,
            "Maven" => Ecosystem::Maven,
            "MinimOS" => Ecosystem::MinimOs,
            "npm" => Ecosystem::Npm,
            "NuGet" => Ecosystem::NuGet,
            "openEuler" => Ecosystem::OpenEuler,
            "openSUSE" => Ecosystem::OpenSuse,
            "OSS-Fuzz" => Ecosystem::OssFuzz,
            "Packagist" => Ecosystem::Packagist,
            "Photon OS" => Ecosystem::PhotonOs,
            "Pub" => Ecosystem::Pub,
            "PyPI" => Ecosystem::PyPI,
            "Red Hat" => Ecosystem::RedHat,
            "Rocky Linux" => Ecosystem::RockyLinux,
            "RubyGems" => Ecosystem::RubyGems,
            "SUSE" => Ecosystem::Suse,
            "SwiftURL" => Ecosystem::SwiftUrl,
            "Ubuntu" => Ecosystem::Ubuntu,
            "Wolfi" => Ecosystem::Wolfi,
            _ => return None,
        };
        Some(ecosystem)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Ecosystem::Unknown(_))
    }

    /// Returns the package-url type used for this ecosystem, if there is one.
    pub fn purl_type(&self) -> Option<&'static str> {
        match self {
            Ecosystem::Alpine => Some("apk"),
            Ecosystem::Bitnami => Some("bitnami"),
            Ecosystem::ConanCenter => Some("conan"),
            Ecosystem::Cran => Some("cran"),
            Ecosystem::CratesIo => Some("cargo"),
            Ecosystem::Debian | Ecosystem::Ubuntu => Some("deb"),
            Ecosystem::GitHubActions => Some("github"),
            Ecosystem::Go => Some("golang"),
            Ecosystem::Hackage => Some("hackage"),
            Ecosystem::Hex => Some("hex"),
            Ecosystem::Maven => Some("maven"),
            Ecosystem::Npm => Some("npm"),
            Ecosystem::NuGet => Some("nuget"),
            Ecosystem::Packagist => Some("composer"),
            Ecosystem::Pub => Some("pub"),
            Ecosystem::PyPI => Some("pypi"),
            Ecosystem::RedHat | Ecosystem::RockyLinux | Ecosystem::AlmaLinux => Some("rpm"),
            Ecosystem::RubyGems => Some("gem"),
            Ecosystem::SwiftUrl => Some("swift"),
            _ => None,
        }
    }

    /// Maps a package-url type back to its ecosystem.
    ///
    /// Types shared by several distributions (`deb`, `rpm`) resolve to the
    /// canonical one of the family.
    pub fn from_purl_type(purl_type: &str) -> Option<Self> {
        let ecosystem = match purl_type {
            "apk" => Ecosystem::Alpine,
            "bitnami" => Ecosystem::Bitnami,
            "cargo" => Ecosystem::CratesIo,
            "composer" => Ecosystem::Packagist,
            "conan" => Ecosystem::ConanCenter,
            "cran" => Ecosystem::Cran,
            "deb" => Ecosystem::Debian,
            "gem" => Ecosystem::RubyGems,
            "github" => Ecosystem::GitHubActions,
            "golang" => Ecosystem::Go,
            "hackage" => Ecosystem::Hackage,
            "hex" => Ecosystem::Hex,
            "maven" => Ecosystem::Maven,
            "npm" => Ecosystem::Npm,
            "nuget" => Ecosystem::NuGet,
            "pub" => Ecosystem::Pub,
            "pypi" => Ecosystem::PyPI,
            "rpm" => Ecosystem::RedHat,
            "swift" => Ecosystem::SwiftUrl,
            _ => return None,
        };
        Some(ecosystem)
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ecosystem string split into its name and optional release suffix,
/// e.g. `Debian:11` or `Ubuntu:22.04:LTS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedEcosystem {
    pub ecosystem: Ecosystem,
    pub suffix: Option<String>,
}

impl ParsedEcosystem {
    /// Parses `Name[:suffix]`, splitting at the first `:`.
    ///
    /// An empty string is a valid, empty ecosystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEcosystem`] when the name is not recognised.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(Self::empty());
        }

        let (name, suffix) = match raw.split_once(':') {
            Some((name, suffix)) => (name, Some(suffix.to_string())),
            None => (raw, None),
        };

        let ecosystem =
            Ecosystem::from_name(name).ok_or_else(|| Error::UnknownEcosystem(name.to_string()))?;

        Ok(Self { ecosystem, suffix })
    }

    /// The value callers fall back to when [`parse`](Self::parse) fails.
    pub fn unknown(raw: &str) -> Self {
        Self {
            ecosystem: Ecosystem::Unknown(raw.to_string()),
            suffix: None,
        }
    }

    pub fn empty() -> Self {
        Self::unknown("")
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.ecosystem, Ecosystem::Unknown(name) if name.is_empty())
    }

    pub fn is(&self, ecosystem: &Ecosystem) -> bool {
        &self.ecosystem == ecosystem
    }
}

impl Default for ParsedEcosystem {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for ParsedEcosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suffix {
            Some(suffix) => write!(f, "{}:{}", self.ecosystem, suffix),
            None => write!(f, "{}", self.ecosystem),
        }
    }
}

impl Serialize for ParsedEcosystem {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
