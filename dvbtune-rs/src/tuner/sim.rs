//! In-memory adapter used by the device tests.
//!
//! Every handle it hands out is tracked until dropped, so tests can assert
//! that a failed open or a close leaks nothing. Faults are armed per
//! operation and stay armed until cleared.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use dvbtune_protocol::{caps, FrontendInfo, FrontendStatus, FrontendType, PesFilter, Property};

use crate::tuner::sys::{FrontendEvent, NodeKind, Platform, Readiness};

/// Operations a fault can be armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    OpenAdapter,
    DuplicateDir,
    Open(NodeKind),
    SetBufferSize,
    SetPesFilter,
    AddPid,
    RemovePid,
    FrontendInfo,
    SetProperties,
    ReadStatus,
    SignalStrength,
    Snr,
    Poll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleKind {
    Dir,
    Node(NodeKind),
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Kind(io::ErrorKind),
    Os(i32),
}

impl Fault {
    fn error(self) -> io::Error {
        match self {
            Fault::Kind(kind) => io::Error::from(kind),
            Fault::Os(code) => io::Error::from_raw_os_error(code),
        }
    }
}

struct State {
    next_id: u64,
    live: BTreeMap<u64, HandleKind>,
    faults: HashMap<Op, Fault>,
    calls: HashMap<Op, usize>,
    info: FrontendInfo,
    status: FrontendStatus,
    strength: u16,
    snr: u16,
    events: VecDeque<io::Result<FrontendEvent>>,
    data: VecDeque<io::Result<Vec<u8>>>,
    properties: Vec<Vec<Property>>,
    filters: Vec<PesFilter>,
    buffer_sizes: Vec<u32>,
    hw_pids: BTreeSet<u16>,
}

impl State {
    /// Counts the attempt, then fails it if a fault is armed.
    fn check(&mut self, op: Op) -> io::Result<()> {
        *self.calls.entry(op).or_default() += 1;
        match self.faults.get(&op) {
            Some(fault) => Err(fault.error()),
            None => Ok(()),
        }
    }
}

/// A handle into the simulated adapter.
#[derive(Debug)]
pub(crate) struct SimHandle {
    id: u64,
    state: Rc<RefCell<State>>,
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        self.state.borrow_mut().live.remove(&self.id);
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State").field("live", &self.live).finish()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SimPlatform {
    state: Rc<RefCell<State>>,
}

/// A DVB-S frontend without second generation support.
pub(crate) fn satellite_info() -> FrontendInfo {
    FrontendInfo {
        name: "Simulated DVB-S".to_string(),
        frontend_type: FrontendType::Qpsk,
        frequency_min: 950_000,
        frequency_max: 2_150_000,
        frequency_stepsize: 125,
        frequency_tolerance: 0,
        symbol_rate_min: 1_000_000,
        symbol_rate_max: 45_000_000,
        symbol_rate_tolerance: 500,
        caps: caps::FE_CAN_INVERSION_AUTO | caps::FE_CAN_FEC_AUTO,
    }
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::with_frontend(satellite_info())
    }

    pub fn with_frontend(info: FrontendInfo) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                next_id: 0,
                live: BTreeMap::new(),
                faults: HashMap::new(),
                calls: HashMap::new(),
                info,
                status: FrontendStatus::default(),
                strength: 0,
                snr: 0,
                events: VecDeque::new(),
                data: VecDeque::new(),
                properties: Vec::new(),
                filters: Vec::new(),
                buffer_sizes: Vec::new(),
                hw_pids: BTreeSet::new(),
            })),
        }
    }

    pub fn fail(&self, op: Op, kind: io::ErrorKind) {
        self.state.borrow_mut().faults.insert(op, Fault::Kind(kind));
    }

    pub fn fail_os(&self, op: Op, code: i32) {
        self.state.borrow_mut().faults.insert(op, Fault::Os(code));
    }

    pub fn clear_faults(&self) {
        self.state.borrow_mut().faults.clear();
    }

    /// How many times `op` was attempted, failed attempts included.
    pub fn calls(&self, op: Op) -> usize {
        self.state.borrow().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn open_handles(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn open_nodes(&self, kind: NodeKind) -> usize {
        self.state
            .borrow()
            .live
            .values()
            .filter(|live| **live == HandleKind::Node(kind))
            .count()
    }

    pub fn open_dirs(&self) -> usize {
        self.state
            .borrow()
            .live
            .values()
            .filter(|live| **live == HandleKind::Dir)
            .count()
    }

    pub fn set_quality(&self, strength: u16, snr: u16) {
        let mut state = self.state.borrow_mut();
        state.strength = strength;
        state.snr = snr;
    }

    pub fn set_status(&self, status: FrontendStatus) {
        self.state.borrow_mut().status = status;
    }

    pub fn push_event(&self, status: FrontendStatus) {
        self.state.borrow_mut().events.push_back(Ok(FrontendEvent {
            status,
            frequency: 0,
        }));
    }

    pub fn push_event_error(&self, err: io::Error) {
        self.state.borrow_mut().events.push_back(Err(err));
    }

    pub fn push_data(&self, bytes: &[u8]) {
        self.state.borrow_mut().data.push_back(Ok(bytes.to_vec()));
    }

    pub fn push_read_error(&self, err: io::Error) {
        self.state.borrow_mut().data.push_back(Err(err));
    }

    /// Every property list submitted so far, oldest first.
    pub fn properties(&self) -> Vec<Vec<Property>> {
        self.state.borrow().properties.clone()
    }

    pub fn filters(&self) -> Vec<PesFilter> {
        self.state.borrow().filters.clone()
    }

    pub fn buffer_sizes(&self) -> Vec<u32> {
        self.state.borrow().buffer_sizes.clone()
    }

    /// PIDs currently added with `DMX_ADD_PID`.
    pub fn hw_pids(&self) -> Vec<u16> {
        self.state.borrow().hw_pids.iter().copied().collect()
    }

    fn handle(&self, op: Op, kind: HandleKind) -> io::Result<SimHandle> {
        let mut state = self.state.borrow_mut();
        state.check(op)?;
        let id = state.next_id;
        state.next_id += 1;
        state.live.insert(id, kind);
        Ok(SimHandle {
            id,
            state: Rc::clone(&self.state),
        })
    }

    fn checked<T>(&self, op: Op, f: impl FnOnce(&mut State) -> T) -> io::Result<T> {
        let mut state = self.state.borrow_mut();
        state.check(op)?;
        Ok(f(&mut *state))
    }
}

impl Platform for SimPlatform {
    type Dir = SimHandle;
    type Node = SimHandle;

    fn open_adapter(&self, _adapter: u8) -> io::Result<SimHandle> {
        self.handle(Op::OpenAdapter, HandleKind::Dir)
    }

    fn duplicate_dir(&self, _dir: &SimHandle) -> io::Result<SimHandle> {
        self.handle(Op::DuplicateDir, HandleKind::Dir)
    }

    fn open_node(&self, _dir: &SimHandle, kind: NodeKind, _device: u8) -> io::Result<SimHandle> {
        self.handle(Op::Open(kind), HandleKind::Node(kind))
    }

    fn set_buffer_size(&self, _demux: &SimHandle, size: u32) -> io::Result<()> {
        self.checked(Op::SetBufferSize, |state| state.buffer_sizes.push(size))
    }

    fn set_pes_filter(&self, _demux: &SimHandle, filter: &PesFilter) -> io::Result<()> {
        self.checked(Op::SetPesFilter, |state| state.filters.push(*filter))
    }

    fn add_pid(&self, _demux: &SimHandle, pid: u16) -> io::Result<()> {
        self.checked(Op::AddPid, |state| {
            state.hw_pids.insert(pid);
        })
    }

    fn remove_pid(&self, _demux: &SimHandle, pid: u16) -> io::Result<()> {
        self.checked(Op::RemovePid, |state| {
            state.hw_pids.remove(&pid);
        })
    }

    fn frontend_info(&self, _frontend: &SimHandle) -> io::Result<FrontendInfo> {
        self.checked(Op::FrontendInfo, |state| state.info.clone())
    }

    fn set_properties(&self, _frontend: &SimHandle, props: &[Property]) -> io::Result<()> {
        self.checked(Op::SetProperties, |state| state.properties.push(props.to_vec()))
    }

    fn read_status(&self, _frontend: &SimHandle) -> io::Result<FrontendStatus> {
        self.checked(Op::ReadStatus, |state| state.status)
    }

    fn next_event(&self, _frontend: &SimHandle) -> io::Result<FrontendEvent> {
        self.state
            .borrow_mut()
            .events
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::from(io::ErrorKind::WouldBlock)))
    }

    fn signal_strength(&self, _frontend: &SimHandle) -> io::Result<u16> {
        self.checked(Op::SignalStrength, |state| state.strength)
    }

    fn snr(&self, _frontend: &SimHandle) -> io::Result<u16> {
        self.checked(Op::Snr, |state| state.snr)
    }

    fn poll(
        &self,
        _data: &SimHandle,
        frontend: Option<&SimHandle>,
        _timeout: Duration,
    ) -> io::Result<Readiness> {
        self.checked(Op::Poll, |state| Readiness {
            data: !state.data.is_empty(),
            frontend: frontend.is_some() && !state.events.is_empty(),
        })
    }

    fn read(&self, _data: &SimHandle, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        match state.data.pop_front() {
            Some(Ok(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    state.data.push_front(Ok(bytes.split_off(n)));
                }
                Ok(n)
            }
            Some(Err(err)) => Err(err),
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_tracked_until_dropped() {
        let sim = SimPlatform::new();
        let dir = sim.open_adapter(0).unwrap();
        let node = sim.open_node(&dir, NodeKind::Demux, 0).unwrap();
        assert_eq!(sim.open_handles(), 2);
        assert_eq!(sim.open_nodes(NodeKind::Demux), 1);
        drop(dir);
        assert_eq!(sim.open_dirs(), 0);
        drop(node);
        assert_eq!(sim.open_handles(), 0);
    }

    #[test]
    fn test_armed_fault() {
        let sim = SimPlatform::new();
        sim.fail(Op::OpenAdapter, io::ErrorKind::NotFound);
        let err = sim.open_adapter(0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(sim.open_handles(), 0);
        sim.clear_faults();
        assert!(sim.open_adapter(0).is_ok());
    }
}
