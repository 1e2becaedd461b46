//! Linux DVB API version 5 backend.

use std::ffi::{c_char, c_void, CString};
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::mem::{self, MaybeUninit};
use std::os::fd::{AsFd, AsRawFd, FromRawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dvbtune_protocol::{FrontendInfo, FrontendStatus, FrontendType, PesFilter, Property};
use log::trace;
use nix::errno::Errno;
use nix::libc;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::tuner::sys::{FrontendEvent, NodeKind, Platform, Readiness};

const DEFAULT_ROOT: &str = "/dev/dvb";

// struct dvb_frontend_info
#[repr(C)]
#[allow(dead_code)]
struct DvbFrontendInfo {
    name: [c_char; 128],
    fe_type: u32,
    frequency_min: u32,
    frequency_max: u32,
    frequency_stepsize: u32,
    frequency_tolerance: u32,
    symbol_rate_min: u32,
    symbol_rate_max: u32,
    symbol_rate_tolerance: u32,
    notifier_delay: u32,
    caps: u32,
}

// struct dvb_frontend_parameters; the union is at most seven words (OFDM).
#[repr(C)]
#[allow(dead_code)]
struct DvbFrontendParameters {
    frequency: u32,
    inversion: u32,
    u: [u32; 7],
}

// struct dvb_frontend_event
#[repr(C)]
struct DvbFrontendEvent {
    status: u32,
    parameters: DvbFrontendParameters,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct DtvBuffer {
    data: [u8; 32],
    len: u32,
    reserved1: [u32; 3],
    reserved2: *mut c_void,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
union DtvPropertyValue {
    data: u32,
    buffer: DtvBuffer,
}

// struct dtv_property is declared __attribute__((packed)) by the kernel.
#[repr(C, packed)]
#[derive(Clone, Copy)]
struct DtvProperty {
    cmd: u32,
    reserved: [u32; 3],
    u: DtvPropertyValue,
    result: i32,
}

#[repr(C)]
struct DtvProperties {
    num: u32,
    props: *mut DtvProperty,
}

// struct dmx_pes_filter_params
#[repr(C)]
struct DmxPesFilterParams {
    pid: u16,
    input: u32,
    output: u32,
    pes_type: u32,
    flags: u32,
}

nix::ioctl_read!(fe_get_info, b'o', 61, DvbFrontendInfo);
nix::ioctl_read!(fe_read_status, b'o', 69, u32);
nix::ioctl_read!(fe_read_signal_strength, b'o', 71, u16);
nix::ioctl_read!(fe_read_snr, b'o', 72, u16);
nix::ioctl_read!(fe_get_event, b'o', 78, DvbFrontendEvent);
nix::ioctl_write_ptr!(fe_set_property, b'o', 82, DtvProperties);
nix::ioctl_write_ptr!(dmx_set_pes_filter, b'o', 44, DmxPesFilterParams);
nix::ioctl_write_int_bad!(dmx_set_buffer_size, nix::request_code_none!(b'o', 45));
nix::ioctl_write_ptr!(dmx_add_pid, b'o', 51, u16);
nix::ioctl_write_ptr!(dmx_remove_pid, b'o', 52, u16);

/// Adapters under `/dev/dvb`, driven with raw ioctls.
#[derive(Debug, Clone)]
pub struct LinuxDvb {
    root: PathBuf,
}

impl Default for LinuxDvb {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxDvb {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    /// Looks for `adapter<N>` directories below `root` instead of `/dev/dvb`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl Platform for LinuxDvb {
    type Dir = File;
    type Node = File;

    fn open_adapter(&self, adapter: u8) -> io::Result<File> {
        let path = self.root.join(format!("adapter{}", adapter));
        OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_DIRECTORY)
            .open(path)
    }

    fn duplicate_dir(&self, dir: &File) -> io::Result<File> {
        dir.try_clone()
    }

    fn open_node(&self, dir: &File, kind: NodeKind, device: u8) -> io::Result<File> {
        let name = CString::new(format!("{}{}", kind.name(), device))?;
        let access = if kind.writable() {
            libc::O_RDWR
        } else {
            libc::O_RDONLY
        };
        let flags = access | libc::O_CLOEXEC | libc::O_NONBLOCK;
        let fd = Errno::result(unsafe { libc::openat(dir.as_raw_fd(), name.as_ptr(), flags) })?;
        // SAFETY: openat just returned this descriptor and nothing else owns it.
        Ok(unsafe { File::from_raw_fd(fd) })
    }

    fn set_buffer_size(&self, demux: &File, size: u32) -> io::Result<()> {
        let size = libc::c_int::try_from(size).unwrap_or(libc::c_int::MAX);
        unsafe { dmx_set_buffer_size(demux.as_raw_fd(), size) }?;
        Ok(())
    }

    fn set_pes_filter(&self, demux: &File, filter: &PesFilter) -> io::Result<()> {
        let params = DmxPesFilterParams {
            pid: filter.pid,
            input: filter.input,
            output: filter.output,
            pes_type: filter.pes_type,
            flags: filter.flags,
        };
        unsafe { dmx_set_pes_filter(demux.as_raw_fd(), &params) }?;
        Ok(())
    }

    fn add_pid(&self, demux: &File, pid: u16) -> io::Result<()> {
        unsafe { dmx_add_pid(demux.as_raw_fd(), &pid) }?;
        Ok(())
    }

    fn remove_pid(&self, demux: &File, pid: u16) -> io::Result<()> {
        unsafe { dmx_remove_pid(demux.as_raw_fd(), &pid) }?;
        Ok(())
    }

    fn frontend_info(&self, frontend: &File) -> io::Result<FrontendInfo> {
        let mut raw = MaybeUninit::<DvbFrontendInfo>::zeroed();
        unsafe { fe_get_info(frontend.as_raw_fd(), raw.as_mut_ptr()) }?;
        // SAFETY: zero-initialised and then filled in by the kernel.
        let raw = unsafe { raw.assume_init() };

        let name: Vec<u8> = raw
            .name
            .iter()
            .take_while(|c| **c != 0)
            .map(|c| *c as u8)
            .collect();
        Ok(FrontendInfo {
            name: String::from_utf8_lossy(&name).into_owned(),
            frontend_type: FrontendType::from_raw(raw.fe_type),
            frequency_min: raw.frequency_min,
            frequency_max: raw.frequency_max,
            frequency_stepsize: raw.frequency_stepsize,
            frequency_tolerance: raw.frequency_tolerance,
            symbol_rate_min: raw.symbol_rate_min,
            symbol_rate_max: raw.symbol_rate_max,
            symbol_rate_tolerance: raw.symbol_rate_tolerance,
            caps: raw.caps,
        })
    }

    fn set_properties(&self, frontend: &File, props: &[Property]) -> io::Result<()> {
        let mut raw: Vec<DtvProperty> = props
            .iter()
            .map(|prop| {
                // SAFETY: all-zero is a valid value for every member of the union.
                let mut u: DtvPropertyValue = unsafe { mem::zeroed() };
                u.data = prop.value;
                DtvProperty {
                    cmd: prop.cmd,
                    reserved: [0; 3],
                    u,
                    result: 0,
                }
            })
            .collect();
        let list = DtvProperties {
            num: raw.len() as u32,
            props: raw.as_mut_ptr(),
        };
        trace!("FE_SET_PROPERTY with {} properties", list.num);
        unsafe { fe_set_property(frontend.as_raw_fd(), &list) }?;
        Ok(())
    }

    fn read_status(&self, frontend: &File) -> io::Result<FrontendStatus> {
        let mut status: u32 = 0;
        unsafe { fe_read_status(frontend.as_raw_fd(), &mut status) }?;
        Ok(FrontendStatus::from_bits(status))
    }

    fn next_event(&self, frontend: &File) -> io::Result<FrontendEvent> {
        let mut raw = MaybeUninit::<DvbFrontendEvent>::zeroed();
        unsafe { fe_get_event(frontend.as_raw_fd(), raw.as_mut_ptr()) }?;
        // SAFETY: zero-initialised and then filled in by the kernel.
        let raw = unsafe { raw.assume_init() };
        Ok(FrontendEvent {
            status: FrontendStatus::from_bits(raw.status),
            frequency: raw.parameters.frequency,
        })
    }

    fn signal_strength(&self, frontend: &File) -> io::Result<u16> {
        let mut strength: u16 = 0;
        unsafe { fe_read_signal_strength(frontend.as_raw_fd(), &mut strength) }?;
        Ok(strength)
    }

    fn snr(&self, frontend: &File) -> io::Result<u16> {
        let mut snr: u16 = 0;
        unsafe { fe_read_snr(frontend.as_raw_fd(), &mut snr) }?;
        Ok(snr)
    }

    fn poll(
        &self,
        data: &File,
        frontend: Option<&File>,
        timeout: Duration,
    ) -> io::Result<Readiness> {
        let mut fds = Vec::with_capacity(2);
        fds.push(PollFd::new(data.as_fd(), PollFlags::POLLIN));
        if let Some(frontend) = frontend {
            fds.push(PollFd::new(frontend.as_fd(), PollFlags::POLLIN));
        }

        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        poll(&mut fds, PollTimeout::from(millis))?;

        Ok(Readiness {
            data: signalled(&fds[0]),
            frontend: fds.get(1).map_or(false, signalled),
        })
    }

    fn read(&self, data: &File, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader: &File = data;
        reader.read(buf)
    }
}

// Errors and hang-ups count as readable so the next call reports them.
fn signalled(fd: &PollFd<'_>) -> bool {
    fd.revents().map_or(false, |ev| !ev.is_empty())
}
