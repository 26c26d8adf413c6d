//! Package identity resolution.
//!
//! [`PackageInfo`] wraps a [`RawPackage`] and exposes the name, version and
//! ecosystem vulnerability matching should use. Extractors disagree on naming
//! conventions (binary vs. source distro packages, un-normalized PyPI names,
//! split Maven coordinates, purl-only SBOM entries), and the getters here
//! apply one consistent, ecosystem-aware policy on top of them.
//!
//! # Example
//!
//! ```
//! use pkgident::model::RawPackage;
//! use pkgident::resolver::{PackageInfo, SourceType};
//!
//! let raw = RawPackage::new("Django_REST.framework", "3.14.0", "PyPI")
//!     .with_plugin("python/requirements");
//! let info = PackageInfo::from_package(raw);
//!
//! assert_eq!(info.name(), "django-rest-framework");
//! assert_eq!(info.source_type(), SourceType::ProjectPackage);
//! ```

mod provenance;
pub mod purl;
mod version;

pub use provenance::{classify, extractors, SourceType};
pub use purl::PackageIdentity;
pub use version::SemverLike;

use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::{Arc, LazyLock};

use crate::model::{Ecosystem, PackageMetadata, ParsedEcosystem, RawPackage};

/// Name the Go toolchain itself is reported under by extractors.
pub const GO_TOOLCHAIN_NAME: &str = "go";

/// Synthetic package name vulnerability databases use for the Go toolchain.
pub const GO_STDLIB_NAME: &str = "stdlib";

/// Patch version assumed for Go releases that only declare `major.minor`,
/// placing them at the newest patch of their minor line.
pub const GO_STDLIB_ASSUMED_PATCH: u64 = 99;

static PYPI_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("static regex"));

/// Normalizes a PyPI distribution name per PEP 503.
///
/// Lowercases and collapses every run of `-`, `_` and `.` into a single `-`.
pub fn normalize_pypi_name(name: &str) -> String {
    PYPI_SEPARATORS.replace_all(name, "-").to_lowercase()
}

/// Identity state fixed when the wrapper is built.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IdentityState {
    /// Getters apply the per-field rules to the raw record.
    Unresolved,
    /// Identity recovered from an SBOM package url; returned verbatim.
    Resolved(PackageIdentity),
}

/// A raw package record together with its normalized identity.
///
/// Cloning is cheap: the record is shared, never copied or mutated.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    package: Arc<RawPackage>,
    identity: IdentityState,
}

impl PackageInfo {
    /// Wraps a raw record.
    ///
    /// Records that came from an SBOM get their identity from the package
    /// url recovered from the document. When no purl can be derived or it
    /// does not parse, the per-field rules apply as for any other record.
    pub fn from_package(package: impl Into<Arc<RawPackage>>) -> Self {
        let package = package.into();

        let identity = if classify(&package.plugins) == SourceType::Sbom {
            Self::resolve_from_purl(&package)
        } else {
            IdentityState::Unresolved
        };

        Self { package, identity }
    }

    fn resolve_from_purl(package: &RawPackage) -> IdentityState {
        let Some(purl) = purl::from_package(package) else {
            tracing::debug!(name = %package.name, "no package url derivable for SBOM package");
            return IdentityState::Unresolved;
        };

        match purl::to_identity(&purl) {
            Ok(identity) => IdentityState::Resolved(identity),
            Err(err) => {
                tracing::debug!(name = %package.name, error = %err, "ignoring SBOM package url");
                IdentityState::Unresolved
            }
        }
    }

    /// The underlying extractor record.
    pub fn raw(&self) -> &RawPackage {
        &self.package
    }

    /// The shared handle to the extractor record.
    pub fn record(&self) -> &Arc<RawPackage> {
        &self.package
    }

    /// Whether the identity was taken from an SBOM package url.
    pub fn is_resolved(&self) -> bool {
        matches!(self.identity, IdentityState::Resolved(_))
    }

    /// The name vulnerability lookups should use.
    ///
    /// Resolution order, first match wins:
    /// 1. the SBOM identity, verbatim
    /// 2. the Go toolchain becomes `stdlib`
    /// 3. PyPI names are PEP 503 normalized
    /// 4. Maven `group:artifact` when both coordinates are set
    /// 5. the distro source package name (Debian)
    /// 6. the origin package name (Alpine)
    /// 7. the raw name
    pub fn name(&self) -> String {
        if let IdentityState::Resolved(identity) = &self.identity {
            return identity.name.clone();
        }

        let package = &self.package;
        let ecosystem = self.ecosystem_kind();

        if ecosystem == Ecosystem::Go && package.name == GO_TOOLCHAIN_NAME {
            return GO_STDLIB_NAME.to_string();
        }

        if ecosystem == Ecosystem::PyPI {
            return normalize_pypi_name(&package.name);
        }

        if let Some(metadata) = &package.metadata {
            if let Some((group, artifact)) = metadata.maven_coordinates() {
                if !group.is_empty() && !artifact.is_empty() {
                    return format!("{group}:{artifact}");
                }
            }

            // Distro advisories are keyed on the source package
            if let Some(source) = metadata.os_source_name().filter(|s| !s.is_empty()) {
                return source.to_string();
            }

            if let Some(origin) = metadata.os_origin_name().filter(|s| !s.is_empty()) {
                return origin.to_string();
            }
        }

        package.name.clone()
    }

    /// The parsed ecosystem of the package.
    ///
    /// An unparseable ecosystem string is reported as a warning and yields
    /// the unknown-ecosystem value carrying the raw string.
    pub fn ecosystem(&self) -> ParsedEcosystem {
        let raw = self.ecosystem_str();
        match ParsedEcosystem::parse(raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(ecosystem = raw, "{err}");
                ParsedEcosystem::unknown(raw)
            }
        }
    }

    fn ecosystem_str(&self) -> &str {
        match &self.identity {
            IdentityState::Resolved(identity) => &identity.ecosystem,
            IdentityState::Unresolved => &self.package.ecosystem,
        }
    }

    /// Ecosystem used while evaluating the other rules, parsed without warning.
    fn ecosystem_kind(&self) -> Ecosystem {
        let raw = self.ecosystem_str();
        ParsedEcosystem::parse(raw)
            .unwrap_or_else(|_| ParsedEcosystem::unknown(raw))
            .ecosystem
    }

    /// The version vulnerability lookups should use.
    ///
    /// Go toolchain versions declared as `major.minor` get a patch of
    /// [`GO_STDLIB_ASSUMED_PATCH`]; everything else is returned as is.
    pub fn version(&self) -> String {
        if let IdentityState::Resolved(identity) = &self.identity {
            return identity.version.clone();
        }

        if self.ecosystem_kind() == Ecosystem::Go && self.name() == GO_STDLIB_NAME {
            let version = SemverLike::parse(&self.package.version, Some(3));
            if version.components.len() == 2 {
                return format!(
                    "{}.{}.{}",
                    version.component(0),
                    version.component(1),
                    GO_STDLIB_ASSUMED_PATCH
                );
            }
        }

        self.package.version.clone()
    }

    /// The first location the package was found at, or `""`.
    pub fn location(&self) -> &str {
        self.package
            .locations
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The source-control commit, or `""` without source-code provenance.
    pub fn commit(&self) -> &str {
        self.package
            .source_code
            .as_ref()
            .map(|sc| sc.commit.as_str())
            .unwrap_or_default()
    }

    pub fn source_type(&self) -> SourceType {
        classify(&self.package.plugins)
    }

    /// Dependency groups (`dev`, `test`, ...); empty when not tracked.
    pub fn dep_groups(&self) -> &[String] {
        self.package
            .metadata
            .as_ref()
            .and_then(|m| m.dep_groups())
            .unwrap_or_default()
    }

    /// The binary package name for OS packages, or `""`.
    pub fn os_package_name(&self) -> &str {
        self.package
            .metadata
            .as_ref()
            .and_then(|m| m.os_package_name())
            .unwrap_or_default()
    }

    /// The resolved identity as a value.
    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity {
            name: self.name(),
            version: self.version(),
            ecosystem: self.ecosystem().to_string(),
        }
    }

    /// Package url of the resolved identity, when its ecosystem has one.
    pub fn purl(&self) -> Option<String> {
        let ecosystem = self.ecosystem_kind();
        purl::build(&ecosystem, &self.name(), &self.version(), None).ok()
    }
}

#[derive(Serialize)]
struct PackageSummary<'a> {
    name: String,
    version: String,
    ecosystem: ParsedEcosystem,
    source_type: SourceType,
    #[serde(skip_serializing_if = "str::is_empty")]
    location: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    commit: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    os_package_name: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    dep_groups: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<String>,
}

impl Serialize for PackageInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PackageSummary {
            name: self.name(),
            version: self.version(),
            ecosystem: self.ecosystem(),
            source_type: self.source_type(),
            location: self.location(),
            commit: self.commit(),
            os_package_name: self.os_package_name(),
            dep_groups: self.dep_groups(),
            purl: self.purl(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use crate::model::{
        ApkMetadata, DpkgMetadata, JavaArchiveMetadata, LockfileMetadata, Metadata, RpmMetadata,
        SbomMetadata,
    };

    fn sbom_package(purl: Option<&str>) -> RawPackage {
        RawPackage::new("raw-name", "0.0.1", "npm")
            .with_plugin(extractors::CYCLONEDX)
            .with_metadata(Metadata::Sbom(SbomMetadata {
                purl: purl.map(str::to_string),
                cpes: vec![],
            }))
    }

    #[test]
    fn test_pypi_name_normalization() {
        let cases = [
            ("Django", "django"),
            ("Foo_Bar", "foo-bar"),
            ("zope.interface", "zope-interface"),
            ("a--b__c..d", "a-b-c-d"),
            ("Mixed-_.Separators", "mixed-separators"),
        ];

        for (raw, expected) in cases {
            let info = PackageInfo::from_package(RawPackage::new(raw, "1.0", "PyPI"));
            assert_eq!(info.name(), expected, "normalizing {raw}");
        }
    }

    #[test]
    fn test_pypi_normalization_properties() {
        for raw in ["Flask_SQLAlchemy", "ruamel.yaml.clib", "A__-..B", "--lead", "plain"] {
            let once = normalize_pypi_name(raw);
            assert_eq!(once, once.to_lowercase());
            assert!(!once.contains('_'));
            assert!(!once.contains('.'));
            assert!(!once.contains("--"));
            assert_eq!(normalize_pypi_name(&once), once);
        }
    }

    #[test]
    fn test_go_toolchain_is_stdlib() {
        for version in ["1.20", "1.21.3", "", "devel"] {
            let info = PackageInfo::from_package(RawPackage::new("go", version, "Go"));
            assert_eq!(info.name(), "stdlib");
        }
    }

    #[test]
    fn test_go_module_named_go_elsewhere_is_untouched() {
        let info = PackageInfo::from_package(RawPackage::new("go", "1.0.0", "npm"));
        assert_eq!(info.name(), "go");
    }

    #[test]
    fn test_go_stdlib_two_component_version_gets_patch() {
        let info = PackageInfo::from_package(RawPackage::new("go", "1.20", "Go"));
        assert_eq!(info.version(), "1.20.99");

        let info = PackageInfo::from_package(RawPackage::new("go", "1..20", "Go"));
        assert_eq!(info.version(), "1.20.99");

        let info = PackageInfo::from_package(RawPackage::new("stdlib", "1.19", "Go"));
        assert_eq!(info.version(), "1.19.99");
    }

    #[test]
    fn test_go_stdlib_other_versions_unchanged() {
        for version in ["1.21.3", "devel", "", "go1.20"] {
            let info = PackageInfo::from_package(RawPackage::new("go", version, "Go"));
            assert_eq!(info.version(), version);
        }
    }

    #[test]
    fn test_go_module_versions_unchanged() {
        let info = PackageInfo::from_package(RawPackage::new(
            "github.com/gin-gonic/gin",
            "1.9",
            "Go",
        ));
        assert_eq!(info.version(), "1.9");
    }

    #[test]
    fn test_debian_source_name() {
        let raw = RawPackage::new("openssl", "1.1.1n-0+deb11u4", "Debian").with_metadata(
            Metadata::Dpkg(DpkgMetadata {
                package_name: "openssl".to_string(),
                source_name: "openssl1.1".to_string(),
                ..Default::default()
            }),
        );
        let info = PackageInfo::from_package(raw);

        assert_eq!(info.name(), "openssl1.1");
        assert_eq!(info.os_package_name(), "openssl");
    }

    #[test]
    fn test_debian_empty_source_name_falls_back() {
        let raw = RawPackage::new("libc6", "2.36-9", "Debian:12").with_metadata(Metadata::Dpkg(
            DpkgMetadata {
                package_name: "libc6".to_string(),
                ..Default::default()
            },
        ));
        assert_eq!(PackageInfo::from_package(raw).name(), "libc6");
    }

    #[test]
    fn test_alpine_origin_name() {
        let raw = RawPackage::new("libcrypto3", "3.1.4-r0", "Alpine:v3.18")
            .with_plugin(extractors::APK)
            .with_metadata(Metadata::Apk(ApkMetadata {
                package_name: "libcrypto3".to_string(),
                origin_name: "openssl".to_string(),
                ..Default::default()
            }));
        let info = PackageInfo::from_package(raw);

        assert_eq!(info.name(), "openssl");
        assert_eq!(info.os_package_name(), "libcrypto3");
        assert_eq!(info.source_type(), SourceType::OsPackage);
    }

    #[test]
    fn test_rpm_package_name() {
        let raw = RawPackage::new("openssl-libs", "3.0.7", "Red Hat").with_metadata(
            Metadata::Rpm(RpmMetadata {
                package_name: "openssl-libs".to_string(),
                ..Default::default()
            }),
        );
        let info = PackageInfo::from_package(raw);

        assert_eq!(info.name(), "openssl-libs");
        assert_eq!(info.os_package_name(), "openssl-libs");
    }

    #[test]
    fn test_maven_coordinates() {
        let raw = RawPackage::new("com.example:mylib", "1.0.0", "Maven").with_metadata(
            Metadata::JavaArchive(JavaArchiveMetadata {
                group_id: "com.example".to_string(),
                artifact_id: "mylib".to_string(),
                sha1: None,
            }),
        );
        assert_eq!(PackageInfo::from_package(raw).name(), "com.example:mylib");

        let raw = RawPackage::new("mylib", "1.0.0", "Maven").with_metadata(Metadata::JavaArchive(
            JavaArchiveMetadata {
                group_id: "com.example".to_string(),
                artifact_id: "mylib".to_string(),
                sha1: None,
            },
        ));
        assert_eq!(PackageInfo::from_package(raw).name(), "com.example:mylib");
    }

    #[test]
    fn test_maven_missing_group_keeps_raw_name() {
        let raw = RawPackage::new("mylib", "1.0.0", "Maven").with_metadata(Metadata::JavaArchive(
            JavaArchiveMetadata {
                group_id: String::new(),
                artifact_id: "mylib".to_string(),
                sha1: None,
            },
        ));
        assert_eq!(PackageInfo::from_package(raw).name(), "mylib");
    }

    #[test]
    fn test_pypi_rule_precedes_metadata_rules() {
        let raw = RawPackage::new("Foo_Bar", "1.0", "PyPI").with_metadata(Metadata::Dpkg(
            DpkgMetadata {
                source_name: "python-foo".to_string(),
                ..Default::default()
            },
        ));
        assert_eq!(PackageInfo::from_package(raw).name(), "foo-bar");
    }

    #[test]
    fn test_plain_name_unchanged() {
        let info = PackageInfo::from_package(RawPackage::new("Lodash", "4.17.21", "npm"));
        assert_eq!(info.name(), "Lodash");
        assert_eq!(info.version(), "4.17.21");
        assert_eq!(info.ecosystem().ecosystem, Ecosystem::Npm);
    }

    #[test]
    fn test_unknown_ecosystem_degrades() {
        let info = PackageInfo::from_package(RawPackage::new("wget", "1.21.4", "Homebrew"));
        let ecosystem = info.ecosystem();

        assert!(!ecosystem.ecosystem.is_known());
        assert_eq!(ecosystem.to_string(), "Homebrew");
        assert_eq!(info.name(), "wget");
        assert_eq!(info.version(), "1.21.4");
    }

    /// Counts WARN events emitted while it is the active subscriber.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, f);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_unknown_ecosystem_warns_once_per_ecosystem_call() {
        let info = PackageInfo::from_package(
            RawPackage::new("wget", "1.21.4", "Homebrew").with_plugin("os/brew"),
        );

        let from_ecosystem = count_warnings(|| {
            assert!(!info.ecosystem().ecosystem.is_known());
        });
        let from_rules = count_warnings(|| {
            assert_eq!(info.name(), "wget");
            assert_eq!(info.version(), "1.21.4");
            assert_eq!(info.source_type(), SourceType::ProjectPackage);
        });

        assert_eq!(from_ecosystem, 1);
        assert_eq!(from_rules, 0);
    }

    #[test]
    fn test_known_ecosystem_does_not_warn() {
        let info = PackageInfo::from_package(RawPackage::new("go", "1.20", "Go:stdlib"));

        let warnings = count_warnings(|| {
            assert_eq!(info.ecosystem().to_string(), "Go:stdlib");
            assert_eq!(info.version(), "1.20.99");
        });
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_location_and_commit() {
        let info = PackageInfo::from_package(
            RawPackage::new("serde", "1.0.193", "crates.io")
                .with_location("/src/Cargo.lock")
                .with_location("/src/vendor/Cargo.lock")
                .with_source_code("https://github.com/serde-rs/serde", "abc123"),
        );
        assert_eq!(info.location(), "/src/Cargo.lock");
        assert_eq!(info.commit(), "abc123");

        let info = PackageInfo::from_package(RawPackage::new("serde", "1.0.193", "crates.io"));
        assert_eq!(info.location(), "");
        assert_eq!(info.commit(), "");
    }

    #[test]
    fn test_dep_groups() {
        let raw = RawPackage::new("pytest", "7.4.0", "PyPI").with_metadata(Metadata::Lockfile(
            LockfileMetadata {
                dep_groups: vec!["dev".to_string()],
            },
        ));
        assert_eq!(PackageInfo::from_package(raw).dep_groups(), ["dev".to_string()]);
    }

    #[test]
    fn test_empty_plugins() {
        let info = PackageInfo::from_package(RawPackage::new("lodash", "4.17.21", "npm"));
        assert_eq!(info.source_type(), SourceType::Unknown);
        assert!(info.dep_groups().is_empty());
        assert_eq!(info.os_package_name(), "");
        assert!(!info.is_resolved());
    }

    #[test]
    fn test_sbom_identity_from_purl() {
        let info = PackageInfo::from_package(sbom_package(Some(
            "pkg:maven/org.apache.logging.log4j/log4j-core@2.14.1",
        )));

        assert!(info.is_resolved());
        assert_eq!(info.source_type(), SourceType::Sbom);
        assert_eq!(info.name(), "org.apache.logging.log4j:log4j-core");
        assert_eq!(info.version(), "2.14.1");
        assert_eq!(info.ecosystem().ecosystem, Ecosystem::Maven);
    }

    #[test]
    fn test_sbom_pypi_purl_is_normalized() {
        let info = PackageInfo::from_package(sbom_package(Some("pkg:pypi/Foo_Bar@1.0")));
        assert_eq!(info.name(), "foo-bar");
        assert_eq!(info.version(), "1.0");
        assert_eq!(info.ecosystem().ecosystem, Ecosystem::PyPI);
    }

    #[test]
    fn test_sbom_identity_skips_patch_rules() {
        let info = PackageInfo::from_package(sbom_package(Some("pkg:golang/stdlib@1.20")));

        assert_eq!(info.name(), "stdlib");
        assert_eq!(info.version(), "1.20");
    }

    #[test]
    fn test_sbom_without_purl_builds_from_fields() {
        let raw = RawPackage::new("Foo.Bar", "2.0", "PyPI")
            .with_plugin(extractors::SPDX)
            .with_metadata(Metadata::Sbom(SbomMetadata::default()));
        let info = PackageInfo::from_package(raw);

        assert!(info.is_resolved());
        assert_eq!(info.name(), "foo-bar");
        assert_eq!(info.version(), "2.0");
    }

    #[test]
    fn test_sbom_with_bad_purl_falls_back() {
        let info = PackageInfo::from_package(sbom_package(Some("definitely not a purl")));

        assert!(!info.is_resolved());
        assert_eq!(info.name(), "raw-name");
        assert_eq!(info.version(), "0.0.1");
        assert_eq!(info.source_type(), SourceType::Sbom);
    }

    #[test]
    fn test_non_sbom_records_never_resolve() {
        let raw = RawPackage::new("lodash", "4.17.21", "npm")
            .with_plugin("javascript/packagelockjson")
            .with_metadata(Metadata::Sbom(SbomMetadata {
                purl: Some("pkg:npm/underscore@1.0.0".to_string()),
                cpes: vec![],
            }));
        let info = PackageInfo::from_package(raw);

        assert!(!info.is_resolved());
        assert_eq!(info.name(), "lodash");
    }

    #[test]
    fn test_purl_and_identity() {
        let info = PackageInfo::from_package(RawPackage::new("Foo_Bar", "1.0", "PyPI"));
        assert_eq!(info.purl().as_deref(), Some("pkg:pypi/foo-bar@1.0"));
        assert_eq!(
            info.identity(),
            PackageIdentity {
                name: "foo-bar".to_string(),
                version: "1.0".to_string(),
                ecosystem: "PyPI".to_string(),
            }
        );
    }

    #[test]
    fn test_serialize_summary() {
        let info = PackageInfo::from_package(
            RawPackage::new("go", "1.21", "Go")
                .with_plugin(extractors::GO_BINARY)
                .with_location("/usr/local/bin/app"),
        );
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["name"], "stdlib");
        assert_eq!(json["version"], "1.21.99");
        assert_eq!(json["ecosystem"], "Go");
        assert_eq!(json["source_type"], "artifact");
        assert_eq!(json["location"], "/usr/local/bin/app");
        assert!(json.get("commit").is_none());
        assert!(json.get("dep_groups").is_none());
    }

    #[test]
    fn test_shared_record_across_threads() {
        let raw = Arc::new(RawPackage::new("Foo_Bar", "1.0", "PyPI"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let raw = Arc::clone(&raw);
                std::thread::spawn(move || PackageInfo::from_package(raw).name())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "foo-bar");
        }
    }
}
