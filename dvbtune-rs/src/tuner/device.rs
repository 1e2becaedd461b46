use std::fmt;

use dvbtune_protocol::FrontendInfo;
use log::{debug, error, info};

use crate::tuner::capture::{Capture, CaptureMode};
use crate::tuner::error::{DeviceError, Resource};
use crate::tuner::sys::{NodeKind, Platform};
use crate::tuner::SystemPlatform;

/// Kernel buffer requested for the demultiplexer in budget and hardware
/// filter modes.
pub const DEFAULT_BUFFER_SIZE: u32 = 1 << 20;

/// Which adapter to open and how to capture from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub adapter: u8,
    pub device: u8,
    pub mode: CaptureMode,
    pub buffer_size: u32,
}

impl DeviceConfig {
    pub fn new(adapter: u8, device: u8) -> Self {
        Self {
            adapter,
            device,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adapter: 0,
            device: 0,
            mode: CaptureMode::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Frontend node of a device opened for tuning.
pub(super) struct Frontend<P: Platform> {
    /// Conditional access module, when the adapter has one.
    pub(super) ca: Option<P::Node>,
    pub(super) node: P::Node,
    pub(super) info: FrontendInfo,
}

/// An open DVB adapter.
///
/// All handles are owned, so dropping the device (or calling
/// [`Device::close`]) releases every one of them. Fields are dropped in
/// declaration order: per-PID filters, CA, frontend, then the data node.
pub struct Device<P: Platform = SystemPlatform> {
    pub(super) capture: Capture<P>,
    pub(super) frontend: Option<Frontend<P>>,
    pub(super) data: P::Node,
    pub(super) platform: P,
    adapter: u8,
    device: u8,
}

impl Device<SystemPlatform> {
    /// Opens `/dev/dvb/adapter<N>`. With `tune`, the frontend is opened too
    /// and its capabilities are read once.
    pub fn open(config: &DeviceConfig, tune: bool) -> Result<Self, DeviceError> {
        Self::open_with(SystemPlatform::new(), config, tune)
    }
}

impl<P: Platform> Device<P> {
    pub fn open_with(platform: P, config: &DeviceConfig, tune: bool) -> Result<Self, DeviceError> {
        let dir = platform.open_adapter(config.adapter).map_err(|source| {
            error!("cannot access adapter {}: {}", config.adapter, source);
            DeviceError::ResourceUnavailable {
                resource: Resource::Adapter(config.adapter),
                source,
            }
        })?;

        let (capture, data) = Capture::open(
            &platform,
            &dir,
            config.adapter,
            config.device,
            config.mode,
            config.buffer_size,
        )?;

        let frontend = if tune {
            Some(Frontend::open(&platform, &dir, config)?)
        } else {
            None
        };

        debug!(
            "adapter {} device {} opened ({})",
            config.adapter, config.device, config.mode
        );
        Ok(Device {
            capture,
            frontend,
            data,
            platform,
            adapter: config.adapter,
            device: config.device,
        })
    }

    /// Releases every handle. Dropping the device does the same.
    pub fn close(self) {
        debug!("closing adapter {} device {}", self.adapter, self.device);
    }

    pub fn capture_mode(&self) -> CaptureMode {
        self.capture.mode()
    }

    /// Adds `pid` to the captured stream. A no-op in budget mode.
    pub fn add_pid(&mut self, pid: u16) -> Result<(), DeviceError> {
        self.capture.add_pid(&self.platform, &self.data, pid)
    }

    /// Stops capturing `pid`. Unknown PIDs are ignored.
    pub fn remove_pid(&mut self, pid: u16) {
        self.capture.remove_pid(&self.platform, &self.data, pid)
    }

    /// PIDs with their own filter in emulation mode, empty otherwise.
    pub fn tracked_pids(&self) -> Vec<u16> {
        self.capture.tracked_pids()
    }

    /// The capability snapshot taken at open time, if tuning.
    pub fn info(&self) -> Option<&FrontendInfo> {
        self.frontend.as_ref().map(|frontend| &frontend.info)
    }

    pub fn has_ca(&self) -> bool {
        self.frontend
            .as_ref()
            .map_or(false, |frontend| frontend.ca.is_some())
    }

    pub fn adapter(&self) -> u8 {
        self.adapter
    }

    pub fn device(&self) -> u8 {
        self.device
    }
}

impl<P: Platform> Frontend<P> {
    fn open(platform: &P, dir: &P::Dir, config: &DeviceConfig) -> Result<Self, DeviceError> {
        let node = platform
            .open_node(dir, NodeKind::Frontend, config.device)
            .map_err(|source| {
                error!(
                    "cannot access frontend {} of adapter {}: {}",
                    config.device, config.adapter, source
                );
                DeviceError::ResourceUnavailable {
                    resource: Resource::Node {
                        kind: NodeKind::Frontend,
                        device: config.device,
                    },
                    source,
                }
            })?;

        let info = platform.frontend_info(&node).map_err(|source| {
            error!("cannot get frontend info: {}", source);
            DeviceError::ProtocolRejected {
                operation: "get frontend info",
                source,
            }
        })?;
        info!("using frontend: {}", info.name);
        debug!(
            " type {}, capabilities 0x{:08X}",
            info.frontend_type, info.caps
        );

        let ca = match platform.open_node(dir, NodeKind::Ca, config.device) {
            Ok(ca) => Some(ca),
            Err(e) => {
                debug!("conditional access module not available ({})", e);
                None
            }
        };

        Ok(Frontend { ca, node, info })
    }
}

impl<P: Platform> fmt::Debug for Device<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("adapter", &self.adapter)
            .field("device", &self.device)
            .field("mode", &self.capture.mode())
            .field("frontend", &self.info().map(|info| info.name.as_str()))
            .finish()
    }
}
