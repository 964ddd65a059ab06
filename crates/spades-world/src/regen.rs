use std::collections::BTreeMap;

use hashbrown::HashMap;
use spades_geom::IVec3;

/// Time-ordered block healing schedule with at most one entry per voxel.
///
/// Keys are `(due time bits, sequence)`: due times are never negative, and
/// for non-negative floats the raw bit pattern orders like the value.
#[derive(Debug, Default)]
pub struct RegenQueue {
    by_time: BTreeMap<(u64, u64), IVec3>,
    by_pos: HashMap<IVec3, (u64, u64)>,
    seq: u64,
}

impl RegenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pos.is_empty()
    }

    /// Schedules `pos` to heal at `due`, replacing any pending entry.
    pub fn schedule(&mut self, pos: IVec3, due: f64) {
        self.cancel(pos);
        let key = (due.max(0.0).to_bits(), self.seq);
        self.seq = self.seq.wrapping_add(1);
        self.by_time.insert(key, pos);
        self.by_pos.insert(pos, key);
    }

    pub fn cancel(&mut self, pos: IVec3) -> bool {
        match self.by_pos.remove(&pos) {
            Some(key) => {
                self.by_time.remove(&key);
                true
            }
            None => false,
        }
    }

    pub fn due_time(&self, pos: IVec3) -> Option<f64> {
        self.by_pos.get(&pos).map(|(bits, _)| f64::from_bits(*bits))
    }

    /// Removes and returns the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<IVec3> {
        let (&key, &pos) = self.by_time.first_key_value()?;
        if f64::from_bits(key.0) > now {
            return None;
        }
        self.by_time.remove(&key);
        self.by_pos.remove(&pos);
        Some(pos)
    }

    pub fn clear(&mut self) {
        self.by_time.clear();
        self.by_pos.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reschedule_replaces_entry() {
        let mut q = RegenQueue::new();
        let p = IVec3::new(1, 2, 3);
        q.schedule(p, 10.0);
        q.schedule(p, 15.0);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(12.0), None);
        assert_eq!(q.pop_due(15.0), Some(p));
        assert!(q.is_empty());
    }

    #[test]
    fn pops_in_time_order() {
        let mut q = RegenQueue::new();
        q.schedule(IVec3::new(0, 0, 0), 3.0);
        q.schedule(IVec3::new(1, 0, 0), 1.0);
        q.schedule(IVec3::new(2, 0, 0), 2.0);
        let order: Vec<_> = std::iter::from_fn(|| q.pop_due(5.0)).map(|p| p.x).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
