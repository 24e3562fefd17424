//! Connection table port (interface).

use crate::domain::{ConnectionState, Endpoint, Protocol};
use crate::error::{ProbeError, ScanError};

/// A socket as reported by the OS, before its owner is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConnection {
    /// Owning process, if the OS disclosed it.
    pub pid: Option<u32>,
    pub protocol: Protocol,
    pub state: ConnectionState,
    pub local: Option<Endpoint>,
    pub remote: Option<Endpoint>,
}

/// Port for reading internet-domain sockets (TCP and UDP).
///
/// Implementations handle platform-specific details (ss, lsof, netstat).
pub trait ConnectionSource: Send + Sync {
    /// Query every socket on the system in one call.
    ///
    /// Returns `ScanError::PermissionDenied` when the OS refuses the bulk
    /// query, which callers may work around with `connections_of`.
    fn connections(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<RawConnection>, ScanError>> + Send;

    /// Query the sockets of a single process.
    fn connections_of(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<Vec<RawConnection>, ProbeError>> + Send;
}

impl<T: ConnectionSource> ConnectionSource for std::sync::Arc<T> {
    fn connections(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<RawConnection>, ScanError>> + Send {
        (**self).connections()
    }

    fn connections_of(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<Vec<RawConnection>, ProbeError>> + Send {
        (**self).connections_of(pid)
    }
}
