//! Probe-length and slot-usage statistics, enabled by the `stats` feature.

use alloc::vec::Vec;
use core::hash::BuildHasher;

use crate::probing_table::ProbingTable;
use crate::probing_table::Slot;

/// Snapshot of how a [`ProbingTable`] is using its slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStats {
    /// Live entries.
    pub populated: usize,
    /// Tombstone counter used by the growth trigger.
    pub deleted: usize,
    /// Tombstone slots actually present in the array. Never larger than
    /// `deleted`, smaller when tombstones have been reused.
    pub tombstone_slots: usize,
    /// Slots that have never been used since the last growth or clear.
    pub empty_slots: usize,
    /// Total number of slots.
    pub capacity: usize,
    /// `(populated + deleted) / capacity`, the ratio compared against 0.7.
    pub load_factor: f64,
    /// Longest distance of a live entry from its home slot.
    pub max_probe_length: usize,
    /// Mean distance of live entries from their home slots.
    pub mean_probe_length: f64,
    /// Longest run of non-empty slots. A lookup for a missing key may scan
    /// this many slots before reaching an empty one.
    pub longest_cluster: usize,
}

impl ProbeStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probing Table Statistics ===");
        println!(
            "Population: {} live + {} deleted / {} slots ({:.2}% load factor)",
            self.populated,
            self.deleted,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slots: {} empty, {} tombstones",
            self.empty_slots, self.tombstone_slots
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Longest cluster: {} slots", self.longest_cluster);
    }
}

/// Histogram of probe lengths: index `i` counts live entries sitting `i`
/// slots past their home slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// Bin counts. Empty when the table holds no entries.
    pub bins: Vec<usize>,
}

impl ProbeHistogram {
    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let total = self.bins.iter().sum::<usize>();
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({total} entries):");
        for (distance, &count) in self.bins.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{distance:>4} | {:<max_bar$} {count}", "█".repeat(width));
        }
    }
}

impl<V, S> ProbingTable<V, S>
where
    V: Copy,
    S: BuildHasher,
{
    fn probe_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        let mask = self.capacity() - 1;
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| match slot {
                Slot::Occupied { hash, .. } => Some(index.wrapping_sub(*hash as usize) & mask),
                _ => None,
            })
    }

    /// Computes a histogram of how far each live entry sits from its home
    /// slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    ///
    /// let mut table = ProbingTable::new();
    /// table.insert("a", ()).unwrap();
    ///
    /// assert_eq!(table.probe_histogram().bins, [1]);
    /// ```
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = Vec::new();
        for length in self.probe_lengths() {
            if bins.len() <= length {
                bins.resize(length + 1, 0);
            }
            bins[length] += 1;
        }
        ProbeHistogram { bins }
    }

    /// Returns slot usage and probe statistics for the current table state.
    pub fn probe_stats(&self) -> ProbeStats {
        let mut tombstone_slots = 0;
        let mut empty_slots = 0;
        for slot in &self.slots {
            match slot {
                Slot::Empty => empty_slots += 1,
                Slot::Tombstone => tombstone_slots += 1,
                Slot::Occupied { .. } => {}
            }
        }

        let (max_probe_length, total_probe_length) = self
            .probe_lengths()
            .fold((0usize, 0usize), |(max, sum), length| (max.max(length), sum + length));

        ProbeStats {
            populated: self.len,
            deleted: self.deleted,
            tombstone_slots,
            empty_slots,
            capacity: self.capacity(),
            load_factor: (self.len + self.deleted) as f64 / self.capacity() as f64,
            max_probe_length,
            mean_probe_length: if self.len == 0 {
                0.0
            } else {
                total_probe_length as f64 / self.len as f64
            },
            longest_cluster: self.longest_cluster(),
        }
    }

    fn longest_cluster(&self) -> usize {
        let capacity = self.capacity();
        // The load factor guarantees at least one empty slot to start from.
        let Some(start) = self.slots.iter().position(|slot| matches!(slot, Slot::Empty)) else {
            return capacity;
        };

        let mut longest = 0;
        let mut run = 0;
        for offset in 1..=capacity {
            if matches!(self.slots[(start + offset) % capacity], Slot::Empty) {
                run = 0;
            } else {
                run += 1;
                longest = longest.max(run);
            }
        }
        longest
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;

    use super::*;

    fn colliding_keys(count: usize) -> Vec<String> {
        let home = crate::fnv::hash_key("seed") & 7;
        (0..)
            .map(|i| format!("c{i}"))
            .filter(|k| crate::fnv::hash_key(k) & 7 == home)
            .take(count)
            .collect()
    }

    #[test]
    fn empty_table_stats() {
        let table: ProbingTable<u8> = ProbingTable::new();
        let stats = table.probe_stats();
        assert_eq!(stats.populated, 0);
        assert_eq!(stats.empty_slots, 8);
        assert_eq!(stats.longest_cluster, 0);
        assert_eq!(stats.mean_probe_length, 0.0);
        assert!(table.probe_histogram().bins.is_empty());
    }

    #[test]
    fn collisions_lengthen_probes() {
        let mut table = ProbingTable::new();
        for key in colliding_keys(4) {
            table.insert(key, ()).unwrap();
        }

        assert_eq!(table.probe_histogram().bins, [1, 1, 1, 1]);
        let stats = table.probe_stats();
        assert_eq!(stats.max_probe_length, 3);
        assert_eq!(stats.mean_probe_length, 1.5);
        assert_eq!(stats.longest_cluster, 4);
    }

    #[test]
    fn tombstones_keep_clusters_alive() {
        let keys = colliding_keys(4);
        let mut table = ProbingTable::new();
        for key in &keys {
            table.insert(key.as_str(), ()).unwrap();
        }
        for key in &keys[..3] {
            table.remove(key);
        }

        let stats = table.probe_stats();
        assert_eq!(stats.populated, 1);
        assert_eq!(stats.tombstone_slots, 3);
        assert_eq!(stats.deleted, 3);
        assert_eq!(stats.max_probe_length, 3);
        assert_eq!(stats.longest_cluster, 4);
    }

    #[test]
    fn reused_tombstones_are_still_counted() {
        let mut table = ProbingTable::new();
        for _ in 0..3 {
            table.insert("a", ()).unwrap();
            table.remove("a");
        }
        table.insert("a", ()).unwrap();

        let stats = table.probe_stats();
        assert_eq!(stats.deleted, 3);
        assert_eq!(stats.tombstone_slots, 0);
        assert_eq!(stats.load_factor, 0.5);
    }

    #[cfg(feature = "std")]
    #[test]
    fn print_output() {
        let mut table = ProbingTable::new();
        for i in 0..1000u32 {
            table.insert(format!("user{i}"), i).unwrap();
        }
        table.probe_histogram().print();
        table.probe_stats().print();
    }
}
