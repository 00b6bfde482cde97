//! Built-time tunables. These are part of the ABI of the kernel core: changing
//! any of them changes the layout other code compiled against this crate
//! depends on, so they live in one place instead of as scattered literals.

/// Size in bytes of the bump-only stack arena.
pub const S_STACK: usize = 4096;

/// Size in bytes of the free-list heap arena.
pub const S_HEAP: usize = 8192;

/// Number of process table slots.
pub const N_PROC: usize = 8;

/// Size in bytes of each process's kernel stack, drawn from the heap arena.
pub const STACK_PER_PROC: usize = 512;

/// Maximum payload size, in bytes, of a single IPC message.
pub const MSG_MAX: usize = 128;

/// Default scheduling quantum assigned to a freshly created process.
pub const DEFAULT_QUANTUM: u32 = 10;

/// Wait-time threshold, in scheduler ticks, before a ready process is aged.
pub const AGING_THRESHOLD: u32 = 50;

/// Priority increment applied when a ready process crosses `AGING_THRESHOLD`.
pub const AGING_BOOST: u8 = 1;

/// Upper bound a process's priority can never exceed, even after aging.
pub const PRIO_CAP: u8 = 10;
