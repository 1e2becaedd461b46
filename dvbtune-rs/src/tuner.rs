//! DVB adapter access: device lifecycle, PID filtering, tuning and the read loop.

pub use self::capture::CaptureMode;
pub use self::device::{Device, DeviceConfig, DEFAULT_BUFFER_SIZE};
pub use self::error::{Channel, DeviceError, Resource};
pub use self::pid_table::MAX_PIDS;
pub use self::reader::{ReadOutcome, READ_TIMEOUT};
pub use self::sys::{FrontendEvent, NodeKind, Platform, Readiness};

#[cfg(target_os = "linux")]
pub use self::linux::LinuxDvb;
#[cfg(not(target_os = "linux"))]
pub use self::unsupported::UnsupportedPlatform;

/// The backend [`Device::open`] uses on this platform.
#[cfg(target_os = "linux")]
pub type SystemPlatform = LinuxDvb;
#[cfg(not(target_os = "linux"))]
pub type SystemPlatform = UnsupportedPlatform;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod unsupported;

#[cfg(test)]
mod sim;

mod capture;
mod device;
mod error;
mod frontend;
mod pid_table;
mod reader;
mod sys;
