//! A hash map from sparse global ids onto a dense `[0, count)` range.

use fxhash::hash64;

use crate::index::Idx;

const GROUP_PAIRS: usize = 4;

/// One probe group, sized and aligned to a cache line so a lookup touches
/// a single line per probe step.
#[derive(Clone, Copy, Debug)]
#[repr(C, align(64))]
struct Group<V> {
    keys: [V; GROUP_PAIRS],
    vals: [V; GROUP_PAIRS],
}

/// Open-addressed map assigning consecutive dense ids to inserted keys.
///
/// Insertion is idempotent: inserting a present key returns its existing
/// dense id. The table is sized to at most 50% occupancy up front and is
/// never grown; inserting more than the declared number of keys is a
/// programming error. Looking up an absent key is a programming error as
/// well and debug-asserts instead of probing forever.
#[derive(Debug)]
pub struct HashIdMap<V> {
    groups: Vec<Group<V>>,
    mask: usize,
    count: usize,
}

impl<V: Idx> HashIdMap<V> {
    /// A map with capacity for `size` distinct keys.
    pub fn new(size: usize) -> Self {
        let groups = usize::max(1, (2 * size + GROUP_PAIRS - 1) / GROUP_PAIRS).next_power_of_two();
        Self {
            groups: vec![
                Group {
                    keys: [V::max_value(); GROUP_PAIRS],
                    vals: [V::zero(); GROUP_PAIRS],
                };
                groups
            ],
            mask: groups - 1,
            count: 0,
        }
    }

    /// The dense id of `key`, assigning the next free id on first sight.
    pub fn insert(&mut self, key: V) -> V {
        debug_assert_ne!(key, V::max_value(), "the sentinel cannot be a key");
        let mut group_index = hash64(&key) as usize & self.mask;
        let first_group = group_index;
        loop {
            let group = &mut self.groups[group_index];
            for slot in 0..GROUP_PAIRS {
                if group.keys[slot] == key {
                    return group.vals[slot];
                }
                if group.keys[slot] == V::max_value() {
                    let val = V::new(self.count);
                    group.keys[slot] = key;
                    group.vals[slot] = val;
                    self.count += 1;
                    return val;
                }
            }
            group_index = group_index + 1 & self.mask;
            debug_assert_ne!(group_index, first_group, "map is full");
        }
    }

    /// The dense id of a previously inserted `key`.
    pub fn get(&self, key: V) -> V {
        let mut group_index = hash64(&key) as usize & self.mask;
        let first_group = group_index;
        loop {
            let group = &self.groups[group_index];
            for slot in 0..GROUP_PAIRS {
                if group.keys[slot] == key {
                    return group.vals[slot];
                }
            }
            group_index = group_index + 1 & self.mask;
            debug_assert_ne!(group_index, first_group, "key not in map");
        }
    }

    /// Number of distinct keys inserted so far.
    pub fn count(&self) -> usize {
        self.count
    }
}
