//! Sort convention shared by every sortable list in the client.
//!
//! Selecting the active key flips the direction; selecting a different key
//! switches to it and resets the direction to ascending.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Orients an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    key: K,
    direction: SortDirection,
}

impl<K: Copy + PartialEq> SortState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn select(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn set_direction(&mut self, direction: SortDirection) {
        self.direction = direction;
    }

    /// Header suffix for column `key`: an arrow when active, empty otherwise.
    pub fn indicator(&self, key: K) -> &'static str {
        if self.key == key {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

impl<K: Copy + PartialEq + Default> Default for SortState<K> {
    fn default() -> Self {
        Self::new(K::default())
    }
}
