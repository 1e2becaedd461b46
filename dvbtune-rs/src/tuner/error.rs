use std::fmt;
use std::io;

use dvbtune_protocol::ProtocolError;
use thiserror::Error;

use crate::tuner::sys::{errno, NodeKind};

/// A resource the device handle tried to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Adapter(u8),
    Node { kind: NodeKind, device: u8 },
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Adapter(adapter) => write!(f, "adapter {}", adapter),
            Resource::Node { kind, device } => write!(f, "{}{}", kind.name(), device),
        }
    }
}

/// Which of the two channels merged by the read loop failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Frontend status events.
    Events,
    /// Demultiplexed payload.
    Data,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Events => f.write_str("events"),
            Channel::Data => f.write_str("data"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DeviceError {
    /// The adapter directory or one of its nodes cannot be opened.
    #[error("cannot access {resource}: {source}")]
    ResourceUnavailable {
        resource: Resource,
        #[source]
        source: io::Error,
    },

    /// Every slot of the per-PID filter table is in use.
    #[error("cannot add PID 0x{pid:04X}: all {capacity} PID filters in use")]
    CapacityExceeded { pid: u16, capacity: usize },

    /// The device refused a control operation.
    #[error("cannot {operation}: {source}")]
    ProtocolRejected {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// The consumer is too slow and the kernel dropped events or data.
    #[error("cannot dequeue {0} fast enough")]
    Overrun(Channel),

    /// Any other failure of the read loop. The stream is over.
    #[error("cannot read {channel}: {source}")]
    Stream {
        channel: Channel,
        #[source]
        source: io::Error,
    },

    /// A tuning operation was issued on a handle opened without a frontend.
    #[error("frontend is not open")]
    FrontendNotOpen,

    /// The tuning request has a value the frontend properties cannot carry.
    #[error("invalid tuning parameters: {0}")]
    InvalidParameters(#[from] ProtocolError),
}

impl DeviceError {
    /// Overruns lose data but leave the handle usable; the caller may poll again.
    pub fn is_transient(&self) -> bool {
        matches!(self, DeviceError::Overrun(_))
    }
}

impl From<DeviceError> for io::Error {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::ResourceUnavailable { source, .. }
            | DeviceError::ProtocolRejected { source, .. }
            | DeviceError::Stream { source, .. } => source,
            DeviceError::CapacityExceeded { .. } => io::Error::from_raw_os_error(errno::EMFILE),
            DeviceError::Overrun(_) => io::Error::from_raw_os_error(errno::EOVERFLOW),
            DeviceError::FrontendNotOpen => {
                io::Error::new(io::ErrorKind::NotConnected, "frontend is not open")
            }
            DeviceError::InvalidParameters(e) => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}

pub(crate) fn is_overflow(err: &io::Error) -> bool {
    err.raw_os_error() == Some(errno::EOVERFLOW)
}

pub(crate) fn is_transient(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_maps_to_emfile() {
        let err = DeviceError::CapacityExceeded {
            pid: 0x100,
            capacity: 256,
        };
        assert_eq!(err.to_string(), "cannot add PID 0x0100: all 256 PID filters in use");
        let io_err: io::Error = err.into();
        assert_eq!(io_err.raw_os_error(), Some(errno::EMFILE));
    }

    #[test]
    fn test_overrun_is_transient() {
        assert!(DeviceError::Overrun(Channel::Data).is_transient());
        assert!(!DeviceError::FrontendNotOpen.is_transient());
        assert!(!DeviceError::from(ProtocolError::BandwidthOutOfRange(5000)).is_transient());
        assert_eq!(
            DeviceError::Overrun(Channel::Events).to_string(),
            "cannot dequeue events fast enough"
        );
    }

    #[test]
    fn test_resource_display() {
        let err = DeviceError::ResourceUnavailable {
            resource: Resource::Node {
                kind: NodeKind::Frontend,
                device: 1,
            },
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("cannot access frontend1: "));
        assert_eq!(Resource::Adapter(3).to_string(), "adapter 3");
    }

    #[test]
    fn test_error_classification() {
        assert!(is_overflow(&io::Error::from_raw_os_error(errno::EOVERFLOW)));
        assert!(!is_overflow(&io::Error::from(io::ErrorKind::Other)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient(&io::Error::from_raw_os_error(errno::EOVERFLOW)));
    }
}
