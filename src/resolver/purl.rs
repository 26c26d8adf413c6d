//! Conversions between package records and package urls.

use packageurl::PackageUrl;
use serde::Serialize;

use super::normalize_pypi_name;
use crate::error::{Error, Result};
use crate::model::{Ecosystem, PackageMetadata, ParsedEcosystem, RawPackage};

/// A `(name, version, ecosystem)` triple recovered from a package url.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
    pub ecosystem: String,
}

/// Derives a package url for a raw record.
///
/// A purl recovered by the extractor (SBOM metadata) wins; otherwise one is
/// built from the record's ecosystem, name and version. Returns `None` when
/// the ecosystem has no package-url type or the parts are not valid.
pub fn from_package(package: &RawPackage) -> Option<String> {
    if let Some(purl) = package.metadata.as_ref().and_then(|m| m.purl()) {
        return Some(purl.to_string());
    }

    let ecosystem = ParsedEcosystem::parse(&package.ecosystem).ok()?.ecosystem;
    let maven = package
        .metadata
        .as_ref()
        .and_then(|m| m.maven_coordinates())
        .filter(|(group, artifact)| !group.is_empty() && !artifact.is_empty());

    build(&ecosystem, &package.name, &package.version, maven).ok()
}

/// Builds a package url string for a name in `ecosystem`.
///
/// `maven` overrides the namespace/name split for Maven packages.
pub fn build(
    ecosystem: &Ecosystem,
    name: &str,
    version: &str,
    maven: Option<(&str, &str)>,
) -> Result<String> {
    let Some(purl_type) = ecosystem.purl_type() else {
        return Err(Error::UnknownEcosystem(ecosystem.to_string()));
    };

    let (namespace, name) = match ecosystem {
        Ecosystem::Maven => match maven {
            Some((group, artifact)) => (Some(group.to_string()), artifact.to_string()),
            None => split_namespace(name, ':'),
        },
        Ecosystem::Debian => (Some("debian".to_string()), name.to_string()),
        Ecosystem::Ubuntu => (Some("ubuntu".to_string()), name.to_string()),
        Ecosystem::Alpine => (Some("alpine".to_string()), name.to_string()),
        Ecosystem::Go | Ecosystem::Npm | Ecosystem::Packagist | Ecosystem::GitHubActions => {
            split_namespace(name, '/')
        }
        _ => (None, name.to_string()),
    };

    let raw = format!("pkg:{purl_type}/{name}");
    let mut purl = PackageUrl::new(purl_type, name).map_err(|source| Error::Purl {
        purl: raw,
        source,
    })?;
    if let Some(namespace) = namespace {
        purl.with_namespace(namespace);
    }
    if !version.is_empty() {
        purl.with_version(version.to_string());
    }

    Ok(purl.to_string())
}

/// Parses a package url into the identity vulnerability lookups use.
///
/// Maven names become `group:artifact`, Debian and Alpine drop their distro
/// namespace, and every other namespace is joined with `/`. PyPI names are
/// normalized so the result matches what the resolver produces for
/// manifest-declared packages.
///
/// # Errors
///
/// Returns [`Error::Purl`] when the string is not a valid package url.
pub fn to_identity(purl: &str) -> Result<PackageIdentity> {
    let parsed: PackageUrl = purl.parse().map_err(|source| Error::Purl {
        purl: purl.to_string(),
        source,
    })?;

    let ecosystem = Ecosystem::from_purl_type(parsed.ty());
    let ecosystem_name = match &ecosystem {
        Some(ecosystem) => ecosystem.as_str().to_string(),
        None => parsed.ty().to_string(),
    };

    let name = match (parsed.namespace().filter(|ns| !ns.is_empty()), &ecosystem) {
        (Some(namespace), Some(Ecosystem::Maven)) => format!("{namespace}:{}", parsed.name()),
        (Some(_), Some(Ecosystem::Debian | Ecosystem::Alpine)) => parsed.name().to_string(),
        (Some(namespace), _) => format!("{namespace}/{}", parsed.name()),
        (None, Some(Ecosystem::PyPI)) => normalize_pypi_name(parsed.name()),
        (None, _) => parsed.name().to_string(),
    };

    Ok(PackageIdentity {
        name,
        version: parsed.version().unwrap_or_default().to_string(),
        ecosystem: ecosystem_name,
    })
}

fn split_namespace(name: &str, separator: char) -> (Option<String>, String) {
    match name.rsplit_once(separator) {
        Some((namespace, name)) if !namespace.is_empty() => {
            (Some(namespace.to_string()), name.to_string())
        }
        _ => (None, name.to_string()),
    }
}
