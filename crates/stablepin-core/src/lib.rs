mod catalog;
mod host;
mod package;
mod report;
mod version;

pub use catalog::{Catalog, InstalledRegistry};
pub use host::{HostFailure, PackageHost, PinStore, ReportSink};
pub use package::{ChangeRecord, InstalledPackage, PackageDescriptor, PinEntry, RepositoryEntry};
pub use report::{build_change_report, ChangeReport};
pub use version::{is_synthetic_version, PackageVersion, SYNTHETIC_VERSION_FLOOR};
