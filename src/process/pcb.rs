//! The process control block and its supporting types (§3). Grounded on
//! `examples/Caya231-AtomicOS/src/scheduler/task.rs` for the
//! `Pid`-newtype/`ProcessState`-enum shape, generalized to the fixed-slot,
//! no-heap-allocation data model spec.md requires (no `Vec`/`String` fields
//! — this crate has no global allocator).

use crate::config::MSG_MAX;
use crate::memory::HeapBlock;
use crate::scheduler::context::Context;

/// A process identifier, disjoint from its slot index. Assigned from a
/// monotone counter that is never recycled, so a reused slot's new pid can
/// never be mistaken for a stale reference to the process that used to
/// occupy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pid(pub u64);

/// Process lifecycle state (§3). Only `Free`, `Ready` and `Curr` are
/// produced by the operations in this crate; `Blocked` and `Waiting` are
/// reserved for future extensions (a blocking `receive`, a timed sleep) and
/// are never entered by the core itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Slot holds no process.
    Free,
    /// Eligible to be dispatched; present in the ready queue.
    Ready,
    /// The currently dispatched process.
    Curr,
    /// Reserved: blocked on a condition (e.g. a future blocking IPC wait).
    Blocked,
    /// Reserved: waiting on a timer or other future extension.
    Waiting,
}

/// The one-slot mailbox carried inside every PCB (§4.4). Lossy by design:
/// a second `send` before the pending message is read overwrites it.
pub struct Mailbox {
    sender: Option<Pid>,
    length: usize,
    bytes: [u8; MSG_MAX],
    has_msg: bool,
}

impl Mailbox {
    const fn empty() -> Self {
        Mailbox {
            sender: None,
            length: 0,
            bytes: [0; MSG_MAX],
            has_msg: false,
        }
    }

    pub fn has_msg(&self) -> bool {
        self.has_msg
    }

    pub fn sender(&self) -> Option<Pid> {
        self.sender
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Deposit a message, overwriting any message already pending.
    pub fn deposit(&mut self, sender: Pid, payload: &[u8]) {
        self.sender = Some(sender);
        self.length = payload.len();
        self.bytes[..payload.len()].copy_from_slice(payload);
        self.has_msg = true;
    }

    /// Copy up to `buf.len()` bytes out of the pending message and clear it.
    /// Caller is responsible for having already validated sender/capacity.
    pub fn take(&mut self, buf: &mut [u8]) -> usize {
        let n = self.length.min(buf.len());
        buf[..n].copy_from_slice(&self.bytes[..n]);
        self.has_msg = false;
        n
    }
}

/// One process table slot's worth of state.
pub struct Pcb {
    pub pid: Option<Pid>,
    pub state: ProcessState,
    pub priority: u8,
    pub original_priority: u8,
    /// The per-process kernel stack, drawn from the heap arena (§3: *not*
    /// the bump stack arena).
    pub kernel_stack: Option<HeapBlock>,
    /// Saved register set, including the stack pointer the context-switch
    /// collaborator restores on dispatch.
    pub context: Context,
    /// Ready-queue successor slot index, owned by whichever queue currently
    /// holds this slot. Must be `None` whenever `state != Ready`.
    pub next: Option<usize>,
    pub quantum: u32,
    pub remaining_time: u32,
    pub cpu_time: u32,
    pub wait_time: u32,
    pub inbox: Mailbox,
}

impl Pcb {
    pub const fn free() -> Self {
        Pcb {
            pid: None,
            state: ProcessState::Free,
            priority: 0,
            original_priority: 0,
            kernel_stack: None,
            context: Context::empty(),
            next: None,
            quantum: 0,
            remaining_time: 0,
            cpu_time: 0,
            wait_time: 0,
            inbox: Mailbox::empty(),
        }
    }

    /// Reset a slot back to its just-initialised, unused state.
    pub fn reset(&mut self) {
        *self = Pcb::free();
    }
}
