//! Error types for identity resolution and inventory loading.
//!
//! Resolution itself never fails: the getters on
//! [`PackageInfo`](crate::resolver::PackageInfo) degrade to fallback values.
//! These errors surface from the fallible building blocks (ecosystem parsing,
//! package-url conversion) and from reading inventories off disk.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The ecosystem name is not one the vulnerability database recognises.
    #[error("unknown ecosystem: {0:?}")]
    UnknownEcosystem(String),

    /// A package url could not be parsed or built.
    #[error("invalid package url {purl:?}: {source}")]
    Purl {
        purl: String,
        #[source]
        source: packageurl::Error,
    },

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse inventory {path:?}: {source}")]
    Inventory {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The raw record already backs another package in the scan result.
    #[error("package {name}@{version} is already part of the scan result")]
    DuplicateRecord { name: String, version: String },
}

pub type Result<T> = std::result::Result<T, Error>;
