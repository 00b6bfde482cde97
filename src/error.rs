//! Kernel-local error type. Every fallible core operation returns
//! `Result<_, KernelError>` instead of a sentinel value — no operation
//! fabricates a result on failure, and nothing in this crate panics or
//! aborts on a caller-triggered error path.

/// Every way a kernel core operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// `heap_alloc` found no free block large enough for the request.
    OutOfMemory,
    /// `create` found no `Free` slot in the process table.
    NoFreeSlot,
    /// A pid-keyed lookup (`terminate`, `set_current`, `send`, ...) found no
    /// matching slot.
    NotFound,
    /// `send` was asked to deliver more than `config::MSG_MAX` bytes.
    PayloadTooLarge,
    /// `receive` was called with no message pending in the inbox.
    NoPendingMessage,
    /// `receive`'s expected sender did not match the inbox's sender_pid.
    SenderMismatch,
    /// `receive`'s destination buffer is smaller than the pending message.
    BufferTooSmall,
    /// `resched` was invoked with no runnable process anywhere in the table.
    NoRunnableProcess,
}
