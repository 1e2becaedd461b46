use std::io;
use std::io::ErrorKind;
use std::time::Duration;

use dvbtune_protocol::{FrontendInfo, FrontendStatus, PesFilter, Property};

use crate::tuner::sys::{FrontendEvent, NodeKind, Platform, Readiness};

const UNSUPPORTED_MSG: &str = "DVB device access is not supported on this platform (supported: Linux)";

fn unsupported<T>() -> io::Result<T> {
    Err(io::Error::new(ErrorKind::Unsupported, UNSUPPORTED_MSG))
}

/// Stand-in backend for platforms without a DVB subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

impl UnsupportedPlatform {
    pub fn new() -> Self {
        Self
    }
}

/// Never constructed; every open fails first.
#[derive(Debug)]
pub enum NoHandle {}

impl Platform for UnsupportedPlatform {
    type Dir = NoHandle;
    type Node = NoHandle;

    fn open_adapter(&self, _adapter: u8) -> io::Result<NoHandle> {
        unsupported()
    }

    fn duplicate_dir(&self, dir: &NoHandle) -> io::Result<NoHandle> {
        match *dir {}
    }

    fn open_node(&self, dir: &NoHandle, _kind: NodeKind, _device: u8) -> io::Result<NoHandle> {
        match *dir {}
    }

    fn set_buffer_size(&self, demux: &NoHandle, _size: u32) -> io::Result<()> {
        match *demux {}
    }

    fn set_pes_filter(&self, demux: &NoHandle, _filter: &PesFilter) -> io::Result<()> {
        match *demux {}
    }

    fn add_pid(&self, demux: &NoHandle, _pid: u16) -> io::Result<()> {
        match *demux {}
    }

    fn remove_pid(&self, demux: &NoHandle, _pid: u16) -> io::Result<()> {
        match *demux {}
    }

    fn frontend_info(&self, frontend: &NoHandle) -> io::Result<FrontendInfo> {
        match *frontend {}
    }

    fn set_properties(&self, frontend: &NoHandle, _props: &[Property]) -> io::Result<()> {
        match *frontend {}
    }

    fn read_status(&self, frontend: &NoHandle) -> io::Result<FrontendStatus> {
        match *frontend {}
    }

    fn next_event(&self, frontend: &NoHandle) -> io::Result<FrontendEvent> {
        match *frontend {}
    }

    fn signal_strength(&self, frontend: &NoHandle) -> io::Result<u16> {
        match *frontend {}
    }

    fn snr(&self, frontend: &NoHandle) -> io::Result<u16> {
        match *frontend {}
    }

    fn poll(
        &self,
        data: &NoHandle,
        _frontend: Option<&NoHandle>,
        _timeout: Duration,
    ) -> io::Result<Readiness> {
        match *data {}
    }

    fn read(&self, data: &NoHandle, _buf: &mut [u8]) -> io::Result<usize> {
        match *data {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_unsupported() {
        let err = UnsupportedPlatform::new().open_adapter(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
