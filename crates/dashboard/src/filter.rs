use checkpointz_types::{checkpoint::Checkpoint, slot::BeaconSlot, upstream::Upstream};

/// Row types a table can search over.
pub trait Searchable {
    /// `needle` is already lowercased.
    fn matches(&self, needle: &str) -> bool;
}

fn contains_lowercase(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| value.to_lowercase().contains(needle))
}

fn checkpoint_matches(checkpoint: Option<&Checkpoint>, needle: &str) -> bool {
    checkpoint.is_some_and(|checkpoint| {
        checkpoint.root.to_lowercase().contains(needle)
            || checkpoint.epoch.to_string().contains(needle)
    })
}

impl Searchable for BeaconSlot {
    fn matches(&self, needle: &str) -> bool {
        self.slot.to_string().contains(needle)
            || self
                .epoch
                .is_some_and(|epoch| epoch.to_string().contains(needle))
            || contains_lowercase(self.block_root.as_deref(), needle)
            || contains_lowercase(self.state_root.as_deref(), needle)
    }
}

impl Searchable for Upstream {
    fn matches(&self, needle: &str) -> bool {
        let finality = self.finality.as_ref();
        self.name.to_lowercase().contains(needle)
            || self.health_label().contains(needle)
            || checkpoint_matches(finality.and_then(|f| f.finalized.as_ref()), needle)
            || checkpoint_matches(finality.and_then(|f| f.current_justified.as_ref()), needle)
    }
}

/// The search box state a table keeps for itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TableSearch {
    search: String,
}

impl TableSearch {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
        }
    }

    pub fn set(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn as_str(&self) -> &str {
        &self.search
    }

    /// Rows matching the current search, in source order. An empty search
    /// keeps every row.
    pub fn apply<'a, T, I>(&self, rows: I) -> Vec<&'a T>
    where
        T: Searchable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        if self.search.is_empty() {
            return rows.into_iter().collect();
        }
        let needle = self.search.to_lowercase();
        rows.into_iter().filter(|row| row.matches(&needle)).collect()
    }
}
