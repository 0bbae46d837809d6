//! Bounded list of archived version numbers.

/// Archived versions still retained for a key, in archival order.
///
/// Entries are non-zero and unique. `push` never grows the list past its
/// capacity; a list longer than its capacity only arises from a record
/// written under a deeper history setting, and `cleanup` shrinks it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<u32>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from decoded entries, dropping zero padding and duplicates.
    pub fn from_entries(entries: impl IntoIterator<Item = u32>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        for version in entries {
            if version != 0 && !history.contains(version) {
                history.entries.push(version);
            }
        }
        history
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn contains(&self, version: u32) -> bool {
        self.entries.contains(&version)
    }

    /// Append a version. Returns false for zero, duplicates, or a full list.
    pub fn push(&mut self, version: u32) -> bool {
        if version == 0 || self.contains(version) || self.is_full() {
            return false;
        }
        self.entries.push(version);
        true
    }

    /// Index and value of the smallest version.
    ///
    /// Ties go to the first entry in archival order.
    pub fn oldest(&self) -> Option<(usize, u32)> {
        let mut oldest: Option<(usize, u32)> = None;
        for (idx, &version) in self.entries.iter().enumerate() {
            match oldest {
                Some((_, min)) if version >= min => {}
                _ => oldest = Some((idx, version)),
            }
        }
        oldest
    }

    /// Remove and return the entry at `index`, keeping the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Option<u32> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }

    /// Versions newest-first.
    pub fn sorted_desc(&self) -> Vec<u32> {
        let mut sorted = self.entries.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted
    }
}
