use std::{collections::HashMap, fmt::Display, hash::Hash};

use crate::record::{ExperimentRecord, Measurement, SchedulePolicy, ScheduleRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct Group<K, R> {
    pub key: K,
    pub records: Vec<R>,
}

impl<K, R> Group<K, R> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Groups `records` by `key`, borrowing from the source collection.
pub fn group_by<'a, R, K, F>(records: &'a [R], mut key: F) -> Vec<Group<K, &'a R>>
where
    K: Eq + Hash + Clone,
    F: FnMut(&R) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Group<K, &'a R>> = Vec::new();
    for record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&slot) => groups[slot].records.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(Group {
                    key: k,
                    records: vec![record],
                });
            }
        }
    }
    groups
}

/// Dataset size: the dimensions a thread-count sweep holds fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey {
    pub point_count: u64,
    pub cluster_count: u32,
}

impl From<&ExperimentRecord> for ConfigKey {
    fn from(r: &ExperimentRecord) -> Self {
        ConfigKey {
            point_count: r.point_count,
            cluster_count: r.cluster_count,
        }
    }
}

impl From<&ScheduleRecord> for ConfigKey {
    fn from(r: &ScheduleRecord) -> Self {
        ConfigKey {
            point_count: r.point_count,
            cluster_count: r.cluster_count,
        }
    }
}

impl Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} points, {} clusters",
            thousands(self.point_count),
            self.cluster_count
        )
    }
}

/// One chunk-size sweep of a single policy on a fixed dataset and thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SweepKey {
    pub config: ConfigKey,
    pub thread_count: u32,
    pub policy: SchedulePolicy,
}

impl From<&ScheduleRecord> for SweepKey {
    fn from(r: &ScheduleRecord) -> Self {
        SweepKey {
            config: ConfigKey::from(r),
            thread_count: r.thread_count,
            policy: r.schedule_policy,
        }
    }
}

impl Display for SweepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {} threads)",
            self.policy, self.config, self.thread_count
        )
    }
}

/// Schedule policy and chunk size: the dimensions a thread-count sweep of the log holds fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub config: ConfigKey,
    pub policy: SchedulePolicy,
    pub chunk_size: u32,
}

impl From<&ScheduleRecord> for ChunkKey {
    fn from(r: &ScheduleRecord) -> Self {
        ChunkKey {
            config: ConfigKey::from(r),
            policy: r.schedule_policy,
            chunk_size: r.chunk_size,
        }
    }
}

impl Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, chunk {} ({})",
            self.policy,
            crate::record::chunk_label(self.chunk_size),
            self.config
        )
    }
}

pub fn by_config(records: &[ExperimentRecord]) -> Vec<Group<ConfigKey, &ExperimentRecord>> {
    group_by(records, |r| ConfigKey::from(r))
}

pub fn by_sweep(records: &[ScheduleRecord]) -> Vec<Group<SweepKey, &ScheduleRecord>> {
    group_by(records, |r| SweepKey::from(r))
}

pub fn by_chunk(records: &[ScheduleRecord]) -> Vec<Group<ChunkKey, &ScheduleRecord>> {
    group_by(records, |r| ChunkKey::from(r))
}

/// A copy of `items` ordered by thread count. Stable, so equal thread counts keep input order.
pub fn sorted_by_threads<T, F>(items: &[T], mut measurement: F) -> Vec<&T>
where
    F: FnMut(&T) -> u32,
{
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| measurement(*item));
    sorted
}

/// Distinct chunk sizes in ascending order.
pub fn chunk_axis(records: &[ScheduleRecord]) -> Vec<u32> {
    let mut axis: Vec<u32> = records.iter().map(|r| r.chunk_size).collect();
    axis.sort_unstable();
    axis.dedup();
    axis
}

/// Thread counts present in a group, in input order.
pub fn thread_counts<M: Measurement>(records: &[M]) -> Vec<u32> {
    records.iter().map(Measurement::thread_count).collect()
}

fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{experiment, schedule};

    #[test]
    fn test_group_order_is_first_appearance() {
        let records = vec![
            experiment(2000, 8, 1, 10.0),
            experiment(1000, 4, 1, 5.0),
            experiment(2000, 8, 2, 6.0),
            experiment(500, 2, 1, 1.0),
            experiment(1000, 4, 2, 3.0),
        ];
        let groups = by_config(&records);
        let keys: Vec<(u64, u32)> = groups
            .iter()
            .map(|g| (g.key.point_count, g.key.cluster_count))
            .collect();
        assert_eq!(keys, vec![(2000, 8), (1000, 4), (500, 2)]);
    }

    #[test]
    fn test_record_order_within_group() {
        let records = vec![
            experiment(1000, 4, 8, 1.0),
            experiment(1000, 4, 1, 8.0),
            experiment(2000, 4, 1, 8.0),
            experiment(1000, 4, 2, 4.0),
        ];
        let groups = by_config(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(thread_counts(&groups[0].records), vec![8, 1, 2]);
        assert!(std::ptr::eq(groups[0].records[1], &records[1]));
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<ExperimentRecord> = Vec::new();
        assert!(by_config(&records).is_empty());
    }

    #[test]
    fn test_custom_key() {
        let records = vec![
            experiment(1000, 4, 1, 8.0),
            experiment(2000, 4, 2, 8.0),
            experiment(3000, 8, 1, 8.0),
        ];
        let groups = group_by(&records, |r| r.thread_count);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_schedule_keys() {
        let records = vec![
            schedule(SchedulePolicy::Static, 0, 1.0),
            schedule(SchedulePolicy::Static, 10, 0.9),
            schedule(SchedulePolicy::Dynamic, 0, 1.1),
            schedule(SchedulePolicy::Dynamic, 10, 0.8),
        ];
        let sweeps = by_sweep(&records);
        assert_eq!(sweeps.len(), 2);
        assert_eq!(sweeps[0].key.policy, SchedulePolicy::Static);
        assert_eq!(sweeps[1].key.policy, SchedulePolicy::Dynamic);

        let chunks = by_chunk(&records);
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn test_sorting_is_explicit() {
        let records = vec![
            experiment(1000, 4, 8, 1.0),
            experiment(1000, 4, 1, 8.0),
            experiment(1000, 4, 2, 4.0),
        ];
        let sorted = sorted_by_threads(&records, |r| r.thread_count);
        let threads: Vec<u32> = sorted.iter().map(|r| r.thread_count).collect();
        assert_eq!(threads, vec![1, 2, 8]);
    }

    #[test]
    fn test_chunk_axis() {
        let records = vec![
            schedule(SchedulePolicy::Static, 100, 1.0),
            schedule(SchedulePolicy::Static, 0, 1.0),
            schedule(SchedulePolicy::Dynamic, 100, 1.0),
            schedule(SchedulePolicy::Dynamic, 10, 1.0),
        ];
        assert_eq!(chunk_axis(&records), vec![0, 10, 100]);
    }

    #[test]
    fn test_key_display() {
        let key = ConfigKey {
            point_count: 1_000_000,
            cluster_count: 16,
        };
        assert_eq!(key.to_string(), "1,000,000 points, 16 clusters");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
    }
}
