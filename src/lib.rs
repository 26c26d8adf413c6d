pub mod config;
pub mod error;
pub mod inventory;
pub mod model;
pub mod output;
pub mod resolver;

pub use config::Config;
pub use error::{Error, Result};
pub use inventory::Inventory;
pub use model::{PackageScanResult, ParsedEcosystem, RawPackage, ScanResult};
pub use resolver::{PackageInfo, SourceType};
