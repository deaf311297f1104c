// SPDX-License-Identifier: MIT

//! Fixed-capacity circular buffer (spec §3 "CircularBuffer<LogEntry>").

/// Fixed capacity ring buffer. Oldest entries are silently overwritten once
/// full. Insertion order equals chronological order of successful pushes
/// (spec §5).
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    capacity: usize,
    data: Vec<Option<T>>,
    write_idx: usize,
    full: bool,
}

impl<T: Clone> CircularBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "circular buffer capacity must be positive");
        Self { capacity, data: vec![None; capacity], write_idx: 0, full: false }
    }

    pub fn push(&mut self, item: T) {
        self.data[self.write_idx] = Some(item);
        self.write_idx = (self.write_idx + 1) % self.capacity;
        if self.write_idx == 0 {
            self.full = true;
        }
    }

    /// Copy valid entries in insertion order (oldest first).
    pub fn snapshot(&self) -> Vec<T> {
        if self.full {
            (0..self.capacity)
                .map(|i| (self.write_idx + i) % self.capacity)
                .filter_map(|idx| self.data[idx].clone())
                .collect()
        } else {
            self.data[..self.write_idx].iter().filter_map(|v| v.clone()).collect()
        }
    }

    pub fn len(&self) -> usize {
        if self.full {
            self.capacity
        } else {
            self.write_idx
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Reset to empty, keeping the same capacity. Returns the number of
    /// entries that were discarded.
    pub fn clear(&mut self) -> usize {
        let prior = self.len();
        self.data = vec![None; self.capacity];
        self.write_idx = 0;
        self.full = false;
        prior
    }

    /// Rebuild the buffer at a new capacity, keeping the most recent
    /// `min(new_capacity, len())` entries (spec §4.4 "Resize").
    pub fn resize(&mut self, new_capacity: usize) {
        assert!(new_capacity > 0, "circular buffer capacity must be positive");
        let snapshot = self.snapshot();
        let keep_from = snapshot.len().saturating_sub(new_capacity);
        let kept = &snapshot[keep_from..];
        let mut data = vec![None; new_capacity];
        for (i, item) in kept.iter().enumerate() {
            data[i] = Some(item.clone());
        }
        let count = kept.len();
        self.capacity = new_capacity;
        self.data = data;
        self.write_idx = count % new_capacity;
        self.full = count == new_capacity;
    }

    /// Rebuild the buffer keeping only entries for which `keep` returns
    /// true, preserving insertion order (spec §4.4 "Clear(olderThan)").
    pub fn retain(&mut self, keep: impl Fn(&T) -> bool) -> usize {
        let snapshot = self.snapshot();
        let before = snapshot.len();
        let kept: Vec<T> = snapshot.into_iter().filter(|e| keep(e)).collect();
        let removed = before - kept.len();
        let mut data = vec![None; self.capacity];
        for (i, item) in kept.iter().take(self.capacity).enumerate() {
            data[i] = Some(item.clone());
        }
        let count = kept.len().min(self.capacity);
        self.data = data;
        self.write_idx = count % self.capacity;
        self.full = count == self.capacity;
        removed
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
