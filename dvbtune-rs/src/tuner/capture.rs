//! How the transport stream is pulled out of the demultiplexer.
//!
//! Budget devices pass the whole multiplex through one filter. Devices with
//! multi-PID hardware filtering get PIDs added to their single demux filter.
//! Everything else is emulated: one demux handle per PID, all feeding the
//! shared DVR node.

use std::fmt;

use dvbtune_protocol::{dmx, PesFilter};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::tuner::error::{DeviceError, Resource};
use crate::tuner::pid_table::PidTable;
use crate::tuner::sys::{NodeKind, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    /// Whole transport stream (PID 0x2000), PID requests are ignored.
    Budget,
    /// PIDs are added to the demux filter with `DMX_ADD_PID`.
    HardwareFilter,
    /// One demux filter per PID, read back through the DVR node.
    #[default]
    Emulated,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Budget => f.write_str("budget"),
            CaptureMode::HardwareFilter => f.write_str("hardware PID filter"),
            CaptureMode::Emulated => f.write_str("emulated PID filter"),
        }
    }
}

pub(crate) enum Capture<P: Platform> {
    Budget,
    HardwareFilter,
    Emulated {
        /// Kept open to create per-PID demux nodes after the adapter
        /// directory is released.
        dir: P::Dir,
        device: u8,
        pids: PidTable<P::Node>,
    },
}

impl<P: Platform> Capture<P> {
    /// Opens the data node for `mode` and returns it with the capture state.
    pub fn open(
        platform: &P,
        dir: &P::Dir,
        adapter: u8,
        device: u8,
        mode: CaptureMode,
        buffer_size: u32,
    ) -> Result<(Self, P::Node), DeviceError> {
        match mode {
            CaptureMode::Budget | CaptureMode::HardwareFilter => {
                let demux = platform
                    .open_node(dir, NodeKind::Demux, device)
                    .map_err(|source| {
                        error!("cannot access demultiplexer: {}", source);
                        DeviceError::ResourceUnavailable {
                            resource: Resource::Node {
                                kind: NodeKind::Demux,
                                device,
                            },
                            source,
                        }
                    })?;

                if let Err(e) = platform.set_buffer_size(&demux, buffer_size) {
                    warn!("cannot expand demultiplexing buffer: {}", e);
                }

                // The TS tap needs at least one filtered PID; hardware mode starts from the PAT.
                let pid = match mode {
                    CaptureMode::Budget => dmx::PID_WHOLE_TS,
                    _ => dmx::PID_PAT,
                };
                platform
                    .set_pes_filter(&demux, &PesFilter::demux_tap(pid))
                    .map_err(|source| {
                        error!("cannot setup TS demultiplexer: {}", source);
                        DeviceError::ProtocolRejected {
                            operation: "set up TS demultiplexer",
                            source,
                        }
                    })?;

                let capture = match mode {
                    CaptureMode::Budget => Capture::Budget,
                    _ => Capture::HardwareFilter,
                };
                Ok((capture, demux))
            }
            CaptureMode::Emulated => {
                let dir = platform.duplicate_dir(dir).map_err(|source| {
                    error!("cannot duplicate adapter {} directory: {}", adapter, source);
                    DeviceError::ResourceUnavailable {
                        resource: Resource::Adapter(adapter),
                        source,
                    }
                })?;
                let dvr = platform
                    .open_node(&dir, NodeKind::Dvr, device)
                    .map_err(|source| {
                        error!("cannot access DVR: {}", source);
                        DeviceError::ResourceUnavailable {
                            resource: Resource::Node {
                                kind: NodeKind::Dvr,
                                device,
                            },
                            source,
                        }
                    })?;
                let capture = Capture::Emulated {
                    dir,
                    device,
                    pids: PidTable::new(),
                };
                Ok((capture, dvr))
            }
        }
    }

    pub fn mode(&self) -> CaptureMode {
        match self {
            Capture::Budget => CaptureMode::Budget,
            Capture::HardwareFilter => CaptureMode::HardwareFilter,
            Capture::Emulated { .. } => CaptureMode::Emulated,
        }
    }

    pub fn add_pid(&mut self, platform: &P, data: &P::Node, pid: u16) -> Result<(), DeviceError> {
        let result = match self {
            Capture::Budget => Ok(()),
            Capture::HardwareFilter => {
                // The PAT is already tapped by the base filter.
                if pid == dmx::PID_PAT {
                    return Ok(());
                }
                platform
                    .add_pid(data, pid)
                    .map_err(|source| DeviceError::ProtocolRejected {
                        operation: "add PID",
                        source,
                    })
            }
            Capture::Emulated { dir, device, pids } => {
                Self::add_emulated(platform, dir, *device, pids, pid)
            }
        };
        if let Err(ref e) = result {
            error!("cannot add PID 0x{:04X}: {}", pid, e);
        }
        result
    }

    fn add_emulated(
        platform: &P,
        dir: &P::Dir,
        device: u8,
        pids: &mut PidTable<P::Node>,
        pid: u16,
    ) -> Result<(), DeviceError> {
        if pids.contains(pid) {
            return Ok(());
        }
        if !pids.has_free_slot() {
            return Err(DeviceError::CapacityExceeded {
                pid,
                capacity: pids.capacity(),
            });
        }

        let demux = platform
            .open_node(dir, NodeKind::Demux, device)
            .map_err(|source| DeviceError::ResourceUnavailable {
                resource: Resource::Node {
                    kind: NodeKind::Demux,
                    device,
                },
                source,
            })?;
        // On failure the new node is dropped, and with it closed.
        platform
            .set_pes_filter(&demux, &PesFilter::dvr_tap(pid))
            .map_err(|source| DeviceError::ProtocolRejected {
                operation: "set PID filter",
                source,
            })?;

        if pids.insert(pid, demux).is_err() {
            return Err(DeviceError::CapacityExceeded {
                pid,
                capacity: pids.capacity(),
            });
        }
        debug!("PID 0x{:04X} filtered ({} in use)", pid, pids.len());
        Ok(())
    }

    pub fn remove_pid(&mut self, platform: &P, data: &P::Node, pid: u16) {
        match self {
            Capture::Budget => {}
            Capture::HardwareFilter => {
                if pid != dmx::PID_PAT {
                    if let Err(e) = platform.remove_pid(data, pid) {
                        warn!("cannot remove PID 0x{:04X}: {}", pid, e);
                    }
                }
            }
            Capture::Emulated { pids, .. } => {
                if pids.remove(pid).is_some() {
                    debug!("PID 0x{:04X} released", pid);
                }
            }
        }
    }

    pub fn tracked_pids(&self) -> Vec<u16> {
        match self {
            Capture::Emulated { pids, .. } => pids.pids(),
            _ => Vec::new(),
        }
    }
}
