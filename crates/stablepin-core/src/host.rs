use anyhow::Result;
use thiserror::Error;

use crate::{InstalledPackage, PackageDescriptor, PinEntry};

/// Failures raised by a [`PackageHost`]. Hosts return them inside
/// `anyhow::Error`; callers can recover the variant with `downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostFailure {
    #[error("failed to uninstall {name} {version}: {reason}")]
    Uninstall {
        name: String,
        version: String,
        reason: String,
    },
    #[error("failed to install {name} {version} from {repository}: {reason}")]
    Install {
        name: String,
        version: String,
        repository: String,
        reason: String,
    },
}

/// Install and uninstall primitives owned by the host package manager.
///
/// Calls are synchronous. Uninstall and install are separate steps with no
/// atomic replace between them.
pub trait PackageHost {
    fn uninstall(&mut self, record: &InstalledPackage) -> Result<()>;

    fn install(&mut self, descriptor: &PackageDescriptor) -> Result<()>;
}

/// Append-only pin configuration. Returns how many entries were newly recorded.
pub trait PinStore {
    fn append_pins(&mut self, pins: &[PinEntry]) -> Result<usize>;
}

pub trait ReportSink {
    fn status_line(&mut self, line: &str);

    fn titled_report(&mut self, title: &str, lines: &[String]);
}
