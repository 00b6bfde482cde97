//! Process table ("P" in SPEC_FULL.md §2). Ported from the fixed-size slot
//! table and linear `create`/`terminate` scan in
//! `examples/original_source/src/process.c`, re-expressed with a `Pid`
//! newtype and `Result<_, KernelError>` returns in place of the original's
//! `-1`/`NULL` sentinels, and an out-of-line [`queue::ReadyQueue`] in place
//! of ad-hoc array-index bookkeeping (SPEC_FULL.md §9). Depends on
//! [`crate::memory`] for kernel-stack allocation.

pub mod pcb;
pub mod queue;

pub use pcb::{Mailbox, Pcb, Pid, ProcessState};
pub use queue::ReadyQueue;

use crate::config::{N_PROC, STACK_PER_PROC};
use crate::error::KernelError;
use crate::memory::HeapArena;
use crate::scheduler::context::{self, ProcessEntry};
use core::array;

/// A no-op process body used only by this crate's own tests, which exercise
/// dispatch bookkeeping without ever actually jumping into a process (the
/// mock `ContextSwitch` never transfers control — see `scheduler::context`).
#[cfg(test)]
pub(crate) extern "C" fn test_entry() {}

/// The fixed-capacity table of process control blocks plus the ready queue
/// threaded through it.
pub struct ProcessTable {
    slots: [Pcb; N_PROC],
    ready: ReadyQueue,
    current: Option<usize>,
    next_pid: u64,
}

impl ProcessTable {
    pub fn new() -> Self {
        let mut table = ProcessTable {
            slots: array::from_fn(|_| Pcb::free()),
            ready: ReadyQueue::new(),
            current: None,
            next_pid: 1,
        };
        table.init();
        table
    }

    /// Reset every slot to Free, the ready queue to empty, `currpid` to
    /// `None`, and the pid allocator to 1 (§4.2). Idempotent, but not
    /// concurrent-safe — there is exactly one logical thread of execution
    /// per §5.
    pub fn init(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.reset();
        }
        self.ready = ReadyQueue::new();
        self.current = None;
        self.next_pid = 1;
    }

    fn alloc_pid(&mut self) -> Pid {
        let pid = Pid(self.next_pid);
        self.next_pid += 1;
        pid
    }

    fn find_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|p| p.state == ProcessState::Free)
    }

    /// Create a new process at the given priority with the given entry
    /// point, drawing its kernel stack from `heap`, and place it on the
    /// ready queue. Fails if the table is full or the heap cannot satisfy
    /// the stack request. `priority` is stored exactly as given — nothing
    /// caps it here; `original_priority` equals `priority` for the life of
    /// the process, with only the scheduler's aging pass ever clamping the
    /// working `priority` to `PRIO_CAP` (§4.3).
    pub fn create(
        &mut self,
        priority: u8,
        entry: ProcessEntry,
        heap: &mut HeapArena,
    ) -> Result<Pid, KernelError> {
        let slot = self.find_free_slot().ok_or(KernelError::NoFreeSlot)?;
        let stack = heap
            .alloc(STACK_PER_PROC)
            .ok_or(KernelError::OutOfMemory)?;
        let stack_top = heap.as_mut_ptr(&stack) as u64 + stack.len() as u64;

        // SAFETY: `stack` was just allocated above and nothing else holds a
        // reference into it yet.
        let ctx = unsafe {
            context::process_entry_context(entry, crate::scheduler::process_epilogue, stack_top)
        };

        let pid = self.alloc_pid();
        self.slots[slot] = Pcb {
            pid: Some(pid),
            state: ProcessState::Ready,
            priority,
            original_priority: priority,
            kernel_stack: Some(stack),
            context: ctx,
            quantum: crate::config::DEFAULT_QUANTUM,
            remaining_time: crate::config::DEFAULT_QUANTUM,
            ..Pcb::free()
        };
        self.ready.push_back(&mut self.slots, slot);
        Ok(pid)
    }

    fn find_slot(&self, pid: Pid) -> Option<usize> {
        self.slots.iter().position(|p| p.pid == Some(pid))
    }

    /// Tear down a process and release its kernel stack back to `heap`.
    /// Removes it from the ready queue first if it was present there.
    pub fn terminate(&mut self, pid: Pid, heap: &mut HeapArena) -> Result<(), KernelError> {
        let slot = self.find_slot(pid).ok_or(KernelError::NotFound)?;
        if self.slots[slot].state == ProcessState::Ready {
            self.ready.remove(&mut self.slots, slot);
        }
        if self.current == Some(slot) {
            self.current = None;
        }
        if let Some(stack) = self.slots[slot].kernel_stack.take() {
            heap.free(stack);
        }
        self.slots[slot].reset();
        Ok(())
    }

    /// Make `pid` the current process (§4.2). A no-op if `pid` is unknown.
    /// Demotes whatever was previously Curr back to Ready at the tail of
    /// the ready queue, and pulls the target out of the ready queue if it
    /// was sitting there.
    pub fn set_current(&mut self, pid: Pid) {
        let Some(slot) = self.find_slot(pid) else {
            return;
        };

        if let Some(prev) = self.current {
            if prev != slot && self.slots[prev].state == ProcessState::Curr {
                self.slots[prev].state = ProcessState::Ready;
                self.ready.push_back(&mut self.slots, prev);
            }
        }

        if self.slots[slot].state == ProcessState::Ready {
            self.ready.remove(&mut self.slots, slot);
        }
        self.slots[slot].state = ProcessState::Curr;
        self.current = Some(slot);
    }

    pub fn current_slot(&self) -> Option<usize> {
        self.current
    }

    /// Set `currpid` to the given slot's process directly, without any of
    /// `set_current`'s demote/dequeue side effects — used by the scheduler's
    /// `resched`, which has already performed those steps itself as part of
    /// its own state-machine walk (§4.3).
    pub(crate) fn set_current_slot_unchecked(&mut self, slot: usize) {
        self.current = Some(slot);
    }

    pub fn getpid(&self) -> Option<Pid> {
        self.current.and_then(|slot| self.slots[slot].pid)
    }

    pub fn slot_of(&self, pid: Pid) -> Option<usize> {
        self.find_slot(pid)
    }

    pub fn is_valid_pid(&self, pid: Pid) -> bool {
        self.find_slot(pid).is_some()
    }

    pub fn get_state(&self, pid: Pid) -> Option<ProcessState> {
        self.find_slot(pid).map(|slot| self.slots[slot].state)
    }

    pub fn get_priority(&self, pid: Pid) -> Option<u8> {
        self.find_slot(pid).map(|slot| self.slots[slot].priority)
    }

    /// The base (lowest address) of `pid`'s kernel stack, for callers that
    /// need a raw pointer into it (diagnostics, a future stack-overflow
    /// guard) rather than the opaque `HeapBlock` handle this table owns.
    /// `None` if `pid` is unknown. Takes `heap` because a `HeapBlock` only
    /// yields a pointer through the arena that allocated it (§4.1).
    pub fn get_stack_base(&self, pid: Pid, heap: &mut HeapArena) -> Option<*mut u8> {
        let slot = self.find_slot(pid)?;
        let stack = self.slots[slot].kernel_stack.as_ref()?;
        Some(heap.as_mut_ptr(stack))
    }

    pub fn num_ready(&self) -> usize {
        self.ready.len()
    }

    pub fn slots(&self) -> &[Pcb; N_PROC] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Pcb; N_PROC] {
        &mut self.slots
    }

    /// Read-only traversal of the ready queue in enqueue order, for the
    /// scheduler's policy scan.
    pub fn ready_iter(&self) -> queue::ReadyIter<'_> {
        self.ready.iter(&self.slots)
    }

    pub fn ready_head(&self) -> Option<usize> {
        self.ready.head()
    }

    pub fn enqueue_ready(&mut self, slot: usize) {
        self.ready.push_back(&mut self.slots, slot);
    }

    pub fn dequeue_ready(&mut self, slot: usize) {
        self.ready.remove(&mut self.slots, slot);
    }

    pub fn pop_ready_front(&mut self) -> Option<usize> {
        self.ready.pop_front(&mut self.slots)
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HeapArena;

    #[test]
    fn create_then_terminate_returns_slot_to_free() {
        // Scenario 2 from spec.md §8.
        let mut table = ProcessTable::new();
        table.init();
        let mut heap = HeapArena::new();

        let pid = table.create(5, test_entry, &mut heap).unwrap();
        assert_eq!(table.get_state(pid), Some(ProcessState::Ready));
        assert_eq!(table.num_ready(), 1);

        table.terminate(pid, &mut heap).unwrap();
        assert_eq!(table.get_state(pid), None);
        assert_eq!(table.num_ready(), 0);
        assert!(!table.is_valid_pid(pid));
    }

    #[test]
    fn create_fails_when_table_is_full() {
        let mut table = ProcessTable::new();
        table.init();
        let mut heap = HeapArena::new();
        for _ in 0..N_PROC {
            table.create(1, test_entry, &mut heap).unwrap();
        }
        assert_eq!(
            table.create(1, test_entry, &mut heap),
            Err(KernelError::NoFreeSlot)
        );
    }

    #[test]
    fn priority_is_stored_uncapped_at_creation() {
        // spec.md §8 / SPEC_FULL.md §8: original_priority equals the
        // priority passed to create, with no cap — only aging (§4.3) ever
        // clamps the working priority to PRIO_CAP.
        let mut table = ProcessTable::new();
        table.init();
        let mut heap = HeapArena::new();
        let pid = table.create(250, test_entry, &mut heap).unwrap();
        assert_eq!(table.get_priority(pid), Some(250));
    }

    #[test]
    fn terminate_unknown_pid_is_not_found() {
        let mut table = ProcessTable::new();
        table.init();
        let mut heap = HeapArena::new();
        assert_eq!(
            table.terminate(Pid(9999), &mut heap),
            Err(KernelError::NotFound)
        );
    }

    #[test]
    fn pids_are_strictly_increasing() {
        let mut table = ProcessTable::new();
        let mut heap = HeapArena::new();
        let a = table.create(1, test_entry, &mut heap).unwrap();
        let b = table.create(1, test_entry, &mut heap).unwrap();
        let c = table.create(1, test_entry, &mut heap).unwrap();
        assert!(a.0 < b.0);
        assert!(b.0 < c.0);
    }

    #[test]
    fn repeating_set_current_is_idempotent() {
        let mut table = ProcessTable::new();
        let mut heap = HeapArena::new();
        let pid = table.create(1, test_entry, &mut heap).unwrap();
        table.set_current(pid);
        let after_first = table.num_ready();
        table.set_current(pid);
        assert_eq!(table.num_ready(), after_first);
        assert_eq!(table.get_state(pid), Some(ProcessState::Curr));
    }

    #[test]
    fn set_current_demotes_previous_current_to_ready_tail() {
        let mut table = ProcessTable::new();
        let mut heap = HeapArena::new();
        let a = table.create(1, test_entry, &mut heap).unwrap();
        let b = table.create(1, test_entry, &mut heap).unwrap();
        table.set_current(a);
        table.set_current(b);
        assert_eq!(table.get_state(a), Some(ProcessState::Ready));
        assert_eq!(table.get_state(b), Some(ProcessState::Curr));
        assert_eq!(table.num_ready(), 1);
    }

    #[test]
    fn get_stack_base_resolves_a_live_pid_and_rejects_unknown_ones() {
        let mut table = ProcessTable::new();
        table.init();
        let mut heap = HeapArena::new();
        let pid = table.create(1, test_entry, &mut heap).unwrap();
        assert!(table.get_stack_base(pid, &mut heap).is_some());
        assert!(table.get_stack_base(Pid(9999), &mut heap).is_none());
    }
}
