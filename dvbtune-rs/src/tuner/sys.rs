//! The operations a DVB adapter has to offer.
//!
//! [`Platform`] is the seam between the device logic and the kernel. The
//! Linux backend issues the real ioctls; tests drive the same logic through
//! a simulated adapter. Handles are owned values and are closed on drop.

use std::fmt;
use std::io;
use std::time::Duration;

use dvbtune_protocol::{FrontendInfo, FrontendStatus, PesFilter, Property};

/// Errno values the device logic needs to recognise.
pub(crate) mod errno {
    #[cfg(unix)]
    pub const EMFILE: i32 = nix::libc::EMFILE;
    #[cfg(unix)]
    pub const EOVERFLOW: i32 = nix::libc::EOVERFLOW;

    #[cfg(not(unix))]
    pub const EMFILE: i32 = 24;
    #[cfg(not(unix))]
    pub const EOVERFLOW: i32 = 75;
}

/// Typed device nodes found in an adapter directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Frontend,
    Demux,
    Dvr,
    Ca,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Frontend => "frontend",
            NodeKind::Demux => "demux",
            NodeKind::Dvr => "dvr",
            NodeKind::Ca => "ca",
        }
    }

    /// Frontend and CA nodes take commands and are opened read-write.
    pub fn writable(self) -> bool {
        matches!(self, NodeKind::Frontend | NodeKind::Ca)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of waiting on the data node and, when tuning, the frontend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub data: bool,
    pub frontend: bool,
}

/// One dequeued frontend event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontendEvent {
    pub status: FrontendStatus,
    /// Frequency the frontend reported with the event.
    pub frequency: u32,
}

pub trait Platform {
    /// An open adapter directory.
    type Dir;
    /// An open device node.
    type Node;

    fn open_adapter(&self, adapter: u8) -> io::Result<Self::Dir>;

    fn duplicate_dir(&self, dir: &Self::Dir) -> io::Result<Self::Dir>;

    /// Opens `<kind><device>` inside `dir`, non-blocking.
    fn open_node(&self, dir: &Self::Dir, kind: NodeKind, device: u8) -> io::Result<Self::Node>;

    fn set_buffer_size(&self, demux: &Self::Node, size: u32) -> io::Result<()>;

    fn set_pes_filter(&self, demux: &Self::Node, filter: &PesFilter) -> io::Result<()>;

    fn add_pid(&self, demux: &Self::Node, pid: u16) -> io::Result<()>;

    fn remove_pid(&self, demux: &Self::Node, pid: u16) -> io::Result<()>;

    fn frontend_info(&self, frontend: &Self::Node) -> io::Result<FrontendInfo>;

    /// Submits the whole list in one call; the device accepts all or none.
    fn set_properties(&self, frontend: &Self::Node, props: &[Property]) -> io::Result<()>;

    fn read_status(&self, frontend: &Self::Node) -> io::Result<FrontendStatus>;

    fn next_event(&self, frontend: &Self::Node) -> io::Result<FrontendEvent>;

    fn signal_strength(&self, frontend: &Self::Node) -> io::Result<u16>;

    fn snr(&self, frontend: &Self::Node) -> io::Result<u16>;

    fn poll(
        &self,
        data: &Self::Node,
        frontend: Option<&Self::Node>,
        timeout: Duration,
    ) -> io::Result<Readiness>;

    fn read(&self, data: &Self::Node, buf: &mut [u8]) -> io::Result<usize>;
}
