use std::hash::Hash;

use indexmap::IndexSet;

/// Coalesces layout requests made within one tick.
///
/// The first enqueue arms the scheduler; the owner is expected to schedule
/// exactly one drain per arming. Draining disarms before handing out the
/// batch, so requests made while the batch is processed arm a fresh drain.
#[derive(Debug)]
pub struct LayoutScheduler<T> {
    pending: IndexSet<T>,
    armed: bool,
    pass: u64,
}

impl<T> Default for LayoutScheduler<T> {
    fn default() -> Self {
        Self {
            pending: IndexSet::new(),
            armed: false,
            pass: 0,
        }
    }
}

impl<T: Copy + Eq + Hash> LayoutScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` to the dirty set. Returns `true` when this call armed the
    /// scheduler and a drain must be scheduled.
    pub fn enqueue(&mut self, node: T) -> bool {
        self.pending.insert(node);
        if self.armed {
            return false;
        }
        self.armed = true;
        true
    }

    /// Takes the dirty set, newest first, and starts a new pass.
    pub fn drain(&mut self) -> Vec<T> {
        let batch: Vec<T> = self.pending.drain(..).rev().collect();
        self.armed = false;
        self.pass += 1;
        batch
    }

    pub fn remove(&mut self, node: T) -> bool {
        self.pending.shift_remove(&node)
    }

    pub fn is_pending(&self, node: T) -> bool {
        self.pending.contains(&node)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Identifier of the most recent drain.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutScheduler;

    #[test]
    fn only_first_enqueue_arms() {
        let mut scheduler = LayoutScheduler::new();
        assert!(scheduler.enqueue(1));
        assert!(!scheduler.enqueue(2));
        assert!(!scheduler.enqueue(1));
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn drain_returns_reverse_insertion_order_and_disarms() {
        let mut scheduler = LayoutScheduler::new();
        scheduler.enqueue(1);
        scheduler.enqueue(2);
        scheduler.enqueue(3);
        scheduler.enqueue(2);

        assert_eq!(scheduler.drain(), vec![3, 2, 1]);
        assert!(!scheduler.is_armed());
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pass(), 1);
    }

    #[test]
    fn enqueue_during_a_drain_arms_a_fresh_run() {
        let mut scheduler = LayoutScheduler::new();
        scheduler.enqueue(1);
        let batch = scheduler.drain();
        assert_eq!(batch, vec![1]);
        assert!(scheduler.enqueue(1));
        assert_eq!(scheduler.drain(), vec![1]);
        assert_eq!(scheduler.pass(), 2);
    }
}
