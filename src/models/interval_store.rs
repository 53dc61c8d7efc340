//! 匹配区间存储
//!
//! 有序、互不重叠的半开区间 `[start, end)`，每个区间压缩为一个 u64 key：
//! 高 32 位 start，低 32 位 end，key 的大小顺序即 `(start, end)` 的字典序。

/// Half-open `[start, end)` span of char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchInterval {
    pub start: usize,
    pub end: usize,
}

impl MatchInterval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub fn pack(start: usize, end: usize) -> u64 {
        ((start as u64) << 32) | (end as u64 & 0xFFFF_FFFF)
    }

    #[inline]
    pub fn unpack(key: u64) -> Self {
        Self {
            start: (key >> 32) as usize,
            end: (key & 0xFFFF_FFFF) as usize,
        }
    }

    pub fn key(&self) -> u64 {
        Self::pack(self.start, self.end)
    }
}

/// Largest offset a packed key can hold.
pub const MAX_OFFSET: usize = u32::MAX as usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalStore {
    keys: Vec<u64>,
}

impl IntervalStore {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Appends an interval that starts at or after the end of the last one.
    ///
    /// Returns false (and stores nothing) for empty, out-of-range or
    /// out-of-order intervals.
    pub fn push(&mut self, start: usize, end: usize) -> bool {
        if start >= end || end > MAX_OFFSET {
            return false;
        }
        if let Some(last) = self.last() {
            if start < last.end {
                return false;
            }
        }
        self.keys.push(MatchInterval::pack(start, end));
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<MatchInterval> {
        self.keys.get(index).copied().map(MatchInterval::unpack)
    }

    pub fn last(&self) -> Option<MatchInterval> {
        self.keys.last().copied().map(MatchInterval::unpack)
    }

    pub fn iter(&self) -> impl Iterator<Item = MatchInterval> + '_ {
        self.keys.iter().copied().map(MatchInterval::unpack)
    }

    /// Index of the interval exactly equal to `[start, end)`.
    pub fn index_of(&self, start: usize, end: usize) -> Option<usize> {
        if start >= end || end > MAX_OFFSET {
            return None;
        }
        self.keys.binary_search(&MatchInterval::pack(start, end)).ok()
    }

    /// First interval with `start >= offset`.
    pub fn first_starting_at_or_after(&self, offset: usize) -> Option<usize> {
        let idx = self
            .keys
            .partition_point(|&key| MatchInterval::unpack(key).start < offset);
        (idx < self.keys.len()).then_some(idx)
    }

    /// Last interval with `end <= offset`.
    ///
    /// Ends grow with starts because intervals never overlap, so the
    /// predicate is monotone and a partition point exists.
    pub fn last_ending_at_or_before(&self, offset: usize) -> Option<usize> {
        let idx = self
            .keys
            .partition_point(|&key| MatchInterval::unpack(key).end <= offset);
        idx.checked_sub(1)
    }
}

impl FromIterator<MatchInterval> for IntervalStore {
    fn from_iter<T: IntoIterator<Item = MatchInterval>>(iter: T) -> Self {
        let mut store = IntervalStore::new();
        for interval in iter {
            store.push(interval.start, interval.end);
        }
        store
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/interval_store.rs"]
mod tests;
