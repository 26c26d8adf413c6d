//! Core data types for package records, ecosystems, and scan results.
//!
//! - [`RawPackage`] - A package as emitted by an extractor
//! - [`Metadata`] - Extractor-specific metadata, read through [`PackageMetadata`] facets
//! - [`ParsedEcosystem`] - A structured ecosystem string
//! - [`Vulnerability`], [`License`], [`GenericFinding`] - Matching output
//! - [`PackageScanResult`], [`ScanResult`] - Aggregated scan results
//!
//! # Example
//!
//! ```
//! use pkgident::model::{PackageScanResult, RawPackage, ScanResult};
//! use pkgident::resolver::PackageInfo;
//!
//! let raw = RawPackage::new("lodash", "4.17.21", "npm").with_plugin("javascript/packagelockjson");
//! let mut result = ScanResult::new();
//! result.add_package(PackageScanResult::new(PackageInfo::from_package(raw)))?;
//!
//! println!("Resolved {} packages", result.package_results().len());
//! # Ok::<(), pkgident::Error>(())
//! ```

mod ecosystem;
mod metadata;
mod package;
mod scan_result;
mod vulnerability;

pub use ecosystem::*;
pub use metadata::*;
pub use package::*;
pub use scan_result::*;
pub use vulnerability::*;
