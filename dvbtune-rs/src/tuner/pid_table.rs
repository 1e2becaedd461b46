/// Number of per-PID filters a device can hold in emulation mode.
pub const MAX_PIDS: usize = 256;

/// Fixed-capacity arena of `(pid, handle)` slots.
///
/// Each PID occupies at most one slot. Empty slots are `None`, so every PID
/// value including 0 can be tracked.
pub(crate) struct PidTable<H> {
    slots: [Option<(u16, H)>; MAX_PIDS],
}

impl<H> PidTable<H> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    pub fn contains(&self, pid: u16) -> bool {
        self.position(pid).is_some()
    }

    /// Stores `handle` for `pid` in the first free slot. Hands the handle
    /// back when the table is full.
    pub fn insert(&mut self, pid: u16, handle: H) -> Result<(), H> {
        debug_assert!(!self.contains(pid));
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some((pid, handle));
                Ok(())
            }
            None => Err(handle),
        }
    }

    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    pub fn remove(&mut self, pid: u16) -> Option<H> {
        let index = self.position(pid)?;
        self.slots[index].take().map(|(_, handle)| handle)
    }

    /// Tracked PIDs in slot order.
    pub fn pids(&self) -> Vec<u16> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(pid, _)| *pid))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn capacity(&self) -> usize {
        MAX_PIDS
    }

    fn position(&self, pid: u16) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some((tracked, _)) if *tracked == pid))
    }
}

impl<H> Default for PidTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
