//! An intrusive FIFO ready queue over process table slots (§4.2 redesign
//! note in SPEC_FULL.md §9: pull the linked-list bookkeeping the original's
//! PCBs embedded directly into their own struct out into one small type that
//! operates on the table from outside, instead of every `Pcb` method having
//! to reach into its siblings through raw array indices).
//!
//! Grounded on the general shape of `examples/sarnowski-lona`'s small
//! single-purpose collection types: a struct that owns only head/tail
//! indices and borrows the backing storage per call, with no allocation.

use super::pcb::Pcb;
use crate::config::N_PROC;

/// Head/tail indices into a `[Pcb; N_PROC]`'s `next` chain. Holds no
/// references to the table itself — every operation borrows it explicitly —
/// so it can sit alongside the table in [`super::ProcessTable`] without a
/// self-referential struct.
#[derive(Default)]
pub struct ReadyQueue {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl ReadyQueue {
    pub const fn new() -> Self {
        ReadyQueue {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Walk the chain from head in order, without mutating anything.
    pub fn iter<'a>(&self, table: &'a [Pcb; N_PROC]) -> ReadyIter<'a> {
        ReadyIter {
            table,
            cursor: self.head,
        }
    }

    /// Append `slot` to the tail. Caller must have already set
    /// `table[slot].state = Ready`.
    pub fn push_back(&mut self, table: &mut [Pcb; N_PROC], slot: usize) {
        table[slot].next = None;
        match self.tail {
            Some(tail) => table[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
    }

    /// Remove and return the head slot, if any.
    pub fn pop_front(&mut self, table: &mut [Pcb; N_PROC]) -> Option<usize> {
        let head = self.head?;
        self.head = table[head].next.take();
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(head)
    }

    /// Remove `slot` from wherever it sits in the chain, if present.
    /// `O(N_PROC)` — fine at this table's size, and needed so a process can
    /// be pulled out of the ready queue without dispatching it (e.g. a
    /// future blocking extension).
    pub fn remove(&mut self, table: &mut [Pcb; N_PROC], slot: usize) {
        if self.head == Some(slot) {
            self.pop_front(table);
            return;
        }
        let mut cursor = self.head;
        while let Some(i) = cursor {
            if table[i].next == Some(slot) {
                table[i].next = table[slot].next.take();
                if self.tail == Some(slot) {
                    self.tail = Some(i);
                }
                self.len -= 1;
                return;
            }
            cursor = table[i].next;
        }
    }
}

/// Read-only traversal of a [`ReadyQueue`] in head-to-tail order.
pub struct ReadyIter<'a> {
    table: &'a [Pcb; N_PROC],
    cursor: Option<usize>,
}

impl Iterator for ReadyIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let slot = self.cursor?;
        self.cursor = self.table[slot].next;
        Some(slot)
    }
}
