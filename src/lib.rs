//! The kernel core of a minimal freestanding operating system: two
//! statically reserved memory arenas, a fixed-capacity process table, a
//! cooperative priority scheduler, and a one-slot IPC mailbox per process
//! (see `SPEC_FULL.md`). The serial console, the context-switch primitive,
//! boot, and the interactive shell loop are external collaborators — this
//! crate gives the first two a home behind a trait (`serial::Console`,
//! `scheduler::context::ContextSwitch`) and leaves the rest to its caller.
//!
//! Built `#![cfg_attr(not(test), no_std)]` so `cargo test` runs the exact
//! same M/P/I/S logic hosted, against a mock `Console` and a recording
//! `ContextSwitch` stand-in, while the freestanding target gets the real
//! UART and naked-asm implementations.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod ipc;
pub mod kernel;
pub mod memory;
pub mod process;
pub mod scheduler;
pub mod serial;

#[cfg(not(test))]
use core::panic::PanicInfo;

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    crate::log_error!("{}", info);
    loop {
        x86_64::instructions::hlt();
    }
}
