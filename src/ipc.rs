//! One-slot-per-process IPC mailbox ("I" in SPEC_FULL.md §2, spec.md §4.4).
//! Unlike the memory and scheduler components this has no counterpart in
//! `examples/original_source/` — spec.md introduces it directly — so it is
//! grounded purely in spec.md §4.4's description, expressed with the same
//! `Result<_, KernelError>` and fixed-buffer conventions as [`crate::process`].

use crate::error::KernelError;
use crate::process::{Pid, ProcessTable};

/// Deposit `payload` into `dest`'s mailbox, overwriting any message already
/// pending there. Fails if `dest` does not name a live process or `payload`
/// exceeds `MSG_MAX`.
pub fn send(table: &mut ProcessTable, sender: Pid, dest: Pid, payload: &[u8]) -> Result<(), KernelError> {
    if payload.len() > crate::config::MSG_MAX {
        return Err(KernelError::PayloadTooLarge);
    }
    let slot = table.slot_of(dest).ok_or(KernelError::NotFound)?;
    table.slots_mut()[slot].inbox.deposit(sender, payload);
    Ok(())
}

/// Receive into `buf` a message addressed to `receiver`, which must have
/// been sent by `expected_sender`. Leaves the mailbox untouched if the
/// sender doesn't match, so a caller can retry once the right message
/// arrives instead of losing a mismatched one.
pub fn receive(
    table: &mut ProcessTable,
    receiver: Pid,
    expected_sender: Pid,
    buf: &mut [u8],
) -> Result<usize, KernelError> {
    let slot = table.slot_of(receiver).ok_or(KernelError::NotFound)?;
    let inbox = &mut table.slots_mut()[slot].inbox;
    if !inbox.has_msg() {
        return Err(KernelError::NoPendingMessage);
    }
    if inbox.sender() != Some(expected_sender) {
        return Err(KernelError::SenderMismatch);
    }
    if buf.len() < inbox.length() {
        return Err(KernelError::BufferTooSmall);
    }
    Ok(inbox.take(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HeapArena;
    use crate::process::test_entry;

    fn two_processes() -> (ProcessTable, HeapArena, Pid, Pid) {
        let mut table = ProcessTable::new();
        table.init();
        let mut heap = HeapArena::new();
        let a = table.create(3, test_entry, &mut heap).unwrap();
        let b = table.create(3, test_entry, &mut heap).unwrap();
        (table, heap, a, b)
    }

    #[test]
    fn happy_path_round_trips_a_message() {
        // Scenario 5 from spec.md §8.
        let (mut table, _heap, a, b) = two_processes();
        send(&mut table, a, b, b"hello").unwrap();
        let mut buf = [0u8; 16];
        let n = receive(&mut table, b, a, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[test]
    fn receive_rejects_wrong_sender() {
        // Scenario 6 from spec.md §8.
        let (mut table, _heap, a, b) = two_processes();
        send(&mut table, a, b, b"hi").unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(
            receive(&mut table, b, b, &mut buf),
            Err(KernelError::SenderMismatch)
        );
    }

    #[test]
    fn receive_with_no_pending_message_fails() {
        let (mut table, _heap, a, b) = two_processes();
        let mut buf = [0u8; 16];
        assert_eq!(
            receive(&mut table, b, a, &mut buf),
            Err(KernelError::NoPendingMessage)
        );
    }

    #[test]
    fn a_second_send_overwrites_the_first() {
        let (mut table, _heap, a, b) = two_processes();
        send(&mut table, a, b, b"first").unwrap();
        send(&mut table, a, b, b"second").unwrap();
        let mut buf = [0u8; 16];
        let n = receive(&mut table, b, a, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"second");
    }

    #[test]
    fn send_rejects_oversized_payload() {
        let (mut table, _heap, a, b) = two_processes();
        let big = [0u8; crate::config::MSG_MAX + 1];
        assert_eq!(
            send(&mut table, a, b, &big),
            Err(KernelError::PayloadTooLarge)
        );
    }

    #[test]
    fn receive_rejects_buffer_too_small() {
        let (mut table, _heap, a, b) = two_processes();
        send(&mut table, a, b, b"hello").unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(
            receive(&mut table, b, a, &mut buf),
            Err(KernelError::BufferTooSmall)
        );
    }
}
