//! Cooperative scheduler ("S" in SPEC_FULL.md §2, spec.md §4.3). Ported from
//! the ready-queue scan and quantum/aging bookkeeping in
//! `examples/original_source/src/scheduler.c`, driven through the
//! `ReadyQueue`/`ProcessTable` abstractions in [`crate::process`] instead of
//! raw array indices, and handing off to the architecture's
//! [`context::ContextSwitch`] collaborator rather than inlining `asm!` at
//! every call site (mirrors how the teacher crate's own `yield_now` isolates
//! the naked-asm call behind `context::switch_context`).

pub mod context;

use crate::config::{AGING_BOOST, AGING_THRESHOLD, PRIO_CAP};
use crate::process::{ProcessState, ProcessTable};
use context::{Context, ContextSwitch};

/// Process-selection policy (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedPolicy {
    /// Selects the ready queue's head, ignoring priority.
    RoundRobin,
    /// Selects the maximum-priority ready slot; ties broken by earliest
    /// enqueue (the default).
    PriorityRr,
}

impl Default for SchedPolicy {
    fn default() -> Self {
        SchedPolicy::PriorityRr
    }
}

/// Owns nothing but the active policy — every operation takes the
/// `ProcessTable` it schedules over explicitly, matching this crate's
/// "no self-referential global state inside a component" rule (the one
/// process-wide `Mutex` lives on [`crate::kernel::Kernel`], not here).
pub struct Scheduler {
    policy: SchedPolicy,
}

impl Scheduler {
    pub fn new(policy: SchedPolicy) -> Self {
        Scheduler { policy }
    }

    fn pick_next(&self, table: &ProcessTable) -> Option<usize> {
        match self.policy {
            SchedPolicy::RoundRobin => table.ready_head(),
            SchedPolicy::PriorityRr => {
                let mut best: Option<(usize, u8)> = None;
                for slot in table.ready_iter() {
                    let priority = table.slots()[slot].priority;
                    let better = match best {
                        None => true,
                        Some((_, best_prio)) => priority > best_prio,
                    };
                    if better {
                        best = Some((slot, priority));
                    }
                }
                best.map(|(slot, _)| slot)
            }
        }
    }

    /// Apply aging to every ready slot, and reset/restore the current
    /// slot's priority (§4.3). Called once per `yield_now`.
    fn apply_aging(&self, table: &mut ProcessTable) {
        let ready_slots: [Option<usize>; crate::config::N_PROC] = {
            let mut buf = [None; crate::config::N_PROC];
            for (i, slot) in table.ready_iter().enumerate() {
                buf[i] = Some(slot);
            }
            buf
        };
        for slot in ready_slots.into_iter().flatten() {
            let pcb = &mut table.slots_mut()[slot];
            pcb.wait_time += 1;
            if pcb.wait_time >= AGING_THRESHOLD {
                pcb.priority = (pcb.priority + AGING_BOOST).min(PRIO_CAP);
                pcb.wait_time = 0;
            }
        }

        if let Some(curr) = table.current_slot() {
            let pcb = &mut table.slots_mut()[curr];
            pcb.wait_time = 0;
            if pcb.priority > pcb.original_priority {
                pcb.priority = pcb.original_priority;
            }
        }
    }

    /// The central scheduling operation (§4.3 step list). Generic over the
    /// context-switch collaborator so the real naked-asm implementation and
    /// the test recording stub compile against the same call site.
    pub fn resched<CS: ContextSwitch>(&self, table: &mut ProcessTable) {
        let next_slot = match self.pick_next(table) {
            Some(slot) => slot,
            None => {
                crate::log_warn!("resched: no runnable process");
                return;
            }
        };
        let next_pid = table.slots()[next_slot].pid.expect("ready slot without a pid");

        if table.getpid() == Some(next_pid) {
            return;
        }

        let old_slot = table.current_slot();
        if let Some(old) = old_slot {
            if table.slots()[old].state == ProcessState::Curr {
                table.slots_mut()[old].state = ProcessState::Ready;
                table.enqueue_ready(old);
            }
        }

        table.dequeue_ready(next_slot);
        table.slots_mut()[next_slot].state = ProcessState::Curr;
        let quantum = table.slots()[next_slot].quantum;
        table.slots_mut()[next_slot].remaining_time = quantum;
        table.set_current_slot_unchecked(next_slot);

        if let Some(old) = old_slot {
            let old_ptr = &mut table.slots_mut()[old].context as *mut Context;
            let new_ptr = &table.slots()[next_slot].context as *const Context;
            unsafe { CS::switch(old_ptr, new_ptr) };
        }
    }

    /// The cooperative yield entry point (§4.3).
    pub fn yield_now<CS: ContextSwitch>(&self, table: &mut ProcessTable) {
        if let Some(curr) = table.current_slot() {
            let pcb = &mut table.slots_mut()[curr];
            pcb.remaining_time = pcb.remaining_time.saturating_sub(1);
            pcb.cpu_time += 1;
        }
        self.apply_aging(table);
        self.resched::<CS>(table);
    }

    /// Terminate the current process and dispatch the next one. Wired as
    /// the synthetic return address beneath every freshly created process's
    /// entry point; never returns.
    pub fn user_process_exit<CS: ContextSwitch>(
        &self,
        table: &mut ProcessTable,
        heap: &mut crate::memory::HeapArena,
    ) -> ! {
        if let Some(pid) = table.getpid() {
            let _ = table.terminate(pid, heap);
        }
        self.resched::<CS>(table);
        unreachable!("user_process_exit: resched returned instead of dispatching")
    }
}

/// The concrete address [`crate::process::ProcessTable::create`] wires into
/// every freshly created process's stack as its entry function's return
/// target (§4.3, §9's trampoline note; see `context::process_entry_context`
/// for the write itself). A bare `extern "C" fn` rather than a method,
/// because the naked `switch` routine lands on it via a plain `ret` with no
/// way to thread a `&mut Scheduler`/`&mut ProcessTable` through the call —
/// it reaches the one place both live together, the global [`Kernel`]
/// singleton, the same way the excluded boot/shell code does.
///
/// [`Kernel`]: crate::kernel::Kernel
pub extern "C" fn process_epilogue() -> ! {
    crate::kernel::KERNEL.lock().user_process_exit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HeapArena;
    use context::MockContextSwitch;

    use crate::process::test_entry;

    fn setup() -> (ProcessTable, HeapArena) {
        let mut table = ProcessTable::new();
        table.init();
        (table, HeapArena::new())
    }

    #[test]
    fn round_robin_picks_queue_head_regardless_of_priority() {
        // Scenario 7.
        let (mut table, mut heap) = setup();
        let low = table.create(1, test_entry, &mut heap).unwrap();
        let _high = table.create(9, test_entry, &mut heap).unwrap();
        let sched = Scheduler::new(SchedPolicy::RoundRobin);
        sched.resched::<MockContextSwitch>(&mut table);
        assert_eq!(table.getpid(), Some(low));
    }

    #[test]
    fn priority_rr_picks_maximum_priority() {
        // Scenario 3 from spec.md §8.
        let (mut table, mut heap) = setup();
        let _low = table.create(1, test_entry, &mut heap).unwrap();
        let high = table.create(9, test_entry, &mut heap).unwrap();
        let sched = Scheduler::new(SchedPolicy::PriorityRr);
        sched.resched::<MockContextSwitch>(&mut table);
        assert_eq!(table.getpid(), Some(high));
    }

    #[test]
    fn dispatching_a_new_process_demotes_the_previous_current() {
        // Scenario 4 from spec.md §8.
        let (mut table, mut heap) = setup();
        let first = table.create(5, test_entry, &mut heap).unwrap();
        let sched = Scheduler::new(SchedPolicy::PriorityRr);
        sched.resched::<MockContextSwitch>(&mut table);
        assert_eq!(table.getpid(), Some(first));

        let second = table.create(5, test_entry, &mut heap).unwrap();
        sched.resched::<MockContextSwitch>(&mut table);
        assert_eq!(table.getpid(), Some(second));
        assert_eq!(table.get_state(first), Some(ProcessState::Ready));
    }

    #[test]
    fn aging_boosts_and_caps_priority_then_dispatch_restores_it() {
        // Scenario 8.
        let (mut table, mut heap) = setup();
        let low = table.create(1, test_entry, &mut heap).unwrap();
        let _busy = table.create(5, test_entry, &mut heap).unwrap();
        let sched = Scheduler::new(SchedPolicy::PriorityRr);

        // Dispatch the higher-priority process first so `low` sits in the
        // ready queue accumulating wait_time.
        sched.resched::<MockContextSwitch>(&mut table);
        for _ in 0..(AGING_THRESHOLD as usize + 1) {
            sched.yield_now::<MockContextSwitch>(&mut table);
        }

        let boosted = table.get_priority(low).unwrap();
        assert!(boosted > 1, "aging should have raised low's priority above its original value");
        assert!(boosted <= PRIO_CAP);

        // Once dispatched, the boost is consumed and original_priority
        // restored.
        sched.resched::<MockContextSwitch>(&mut table);
        if table.getpid() == Some(low) {
            assert_eq!(table.get_priority(low), Some(1));
        }
    }

    #[test]
    fn resched_with_no_ready_process_is_a_harmless_noop() {
        let (mut table, _heap) = setup();
        let sched = Scheduler::new(SchedPolicy::PriorityRr);
        sched.resched::<MockContextSwitch>(&mut table);
        assert_eq!(table.num_ready(), 0);
    }
}
