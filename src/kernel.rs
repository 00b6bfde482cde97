//! The top-level kernel value ("K" in SPEC_FULL.md §2): owns one instance
//! each of [`MemoryArena`], [`ProcessTable`] and [`Scheduler`], and threads
//! them through every public entry point. Grounded on how the teacher crate
//! threads its own global `SCHEDULER`/`FRAME_ALLOCATOR` statics
//! (`examples/Caya231-AtomicOS/src/scheduler/mod.rs`): a single
//! `lazy_static` + `spin::Mutex` singleton exists so the excluded boot code
//! can reach the kernel from a free function, even though every method on
//! `Kernel` itself needs no locking of its own (§5 — single logical thread
//! of execution).

use crate::error::KernelError;
use crate::memory::MemoryArena;
use crate::process::{Pid, ProcessTable};
use crate::scheduler::context::{DefaultContextSwitch, ProcessEntry};
use crate::scheduler::{SchedPolicy, Scheduler};
use spin::Mutex;

pub struct Kernel {
    pub memory: MemoryArena,
    pub processes: ProcessTable,
    pub scheduler: Scheduler,
}

impl Kernel {
    fn new() -> Self {
        Kernel {
            memory: MemoryArena::new(),
            processes: ProcessTable::new(),
            scheduler: Scheduler::new(SchedPolicy::default()),
        }
    }

    fn init(&mut self) {
        self.processes.init();
    }

    pub fn create_process(&mut self, priority: u8, entry: ProcessEntry) -> Result<Pid, KernelError> {
        self.processes.create(priority, entry, &mut self.memory.heap)
    }

    pub fn terminate_process(&mut self, pid: Pid) -> Result<(), KernelError> {
        self.processes.terminate(pid, &mut self.memory.heap)
    }

    pub fn yield_now(&mut self) {
        self.scheduler.yield_now::<DefaultContextSwitch>(&mut self.processes);
    }

    pub fn user_process_exit(&mut self) -> ! {
        self.scheduler
            .user_process_exit::<DefaultContextSwitch>(&mut self.processes, &mut self.memory.heap)
    }

    pub fn send(&mut self, sender: Pid, dest: Pid, payload: &[u8]) -> Result<(), KernelError> {
        crate::ipc::send(&mut self.processes, sender, dest, payload)
    }

    pub fn receive(
        &mut self,
        receiver: Pid,
        expected_sender: Pid,
        buf: &mut [u8],
    ) -> Result<usize, KernelError> {
        crate::ipc::receive(&mut self.processes, receiver, expected_sender, buf)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    /// The process-wide kernel singleton. The only free-standing global this
    /// crate defines, matching SPEC_FULL.md §9: the excluded boot/shell code
    /// has no natural place to hold a `&mut Kernel`, so it reaches in through
    /// this one lock.
    pub static ref KERNEL: Mutex<Kernel> = Mutex::new(Kernel::new());
}

/// Bring up the kernel: the process table (memory arenas need no explicit
/// init beyond construction) and the serial console. Idempotent at the
/// process-table level per §4.2, but only ever called once in practice.
pub fn init() {
    crate::serial::init();
    KERNEL.lock().init();
    crate::log_info!("kernel_core initialized");
}
