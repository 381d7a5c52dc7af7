//! Read-only search and sort over the doctor/patient reference data.

use shared::domain::{DoctorSummary, PatientSummary};

use crate::sort::{SortDirection, SortState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoctorSortKey {
    #[default]
    Name,
    Specialization,
    Email,
    Phone,
}

impl DoctorSortKey {
    pub const ALL: [DoctorSortKey; 4] = [
        DoctorSortKey::Name,
        DoctorSortKey::Specialization,
        DoctorSortKey::Email,
        DoctorSortKey::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Specialization => "Specialization",
            Self::Email => "Email",
            Self::Phone => "Phone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatientSortKey {
    #[default]
    Name,
    Email,
    Phone,
}

impl PatientSortKey {
    pub const ALL: [PatientSortKey; 3] = [
        PatientSortKey::Name,
        PatientSortKey::Email,
        PatientSortKey::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
        }
    }
}

pub trait DirectoryEntry {
    type SortKey: Copy + PartialEq;

    /// Lowercased text the search query is matched against.
    fn search_text(&self) -> String;

    fn sort_value(&self, key: Self::SortKey) -> Option<&str>;
}

impl DirectoryEntry for DoctorSummary {
    type SortKey = DoctorSortKey;

    fn search_text(&self) -> String {
        [
            Some(self.name.as_str()),
            self.specialization.as_deref(),
            self.email.as_deref(),
            self.phone.as_deref(),
        ]
        .into_iter()
        .map(|part| part.unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }

    fn sort_value(&self, key: DoctorSortKey) -> Option<&str> {
        match key {
            DoctorSortKey::Name => Some(self.name.as_str()),
            DoctorSortKey::Specialization => self.specialization.as_deref(),
            DoctorSortKey::Email => self.email.as_deref(),
            DoctorSortKey::Phone => self.phone.as_deref(),
        }
    }
}

impl DirectoryEntry for PatientSummary {
    type SortKey = PatientSortKey;

    fn search_text(&self) -> String {
        self.name.to_lowercase()
    }

    fn sort_value(&self, key: PatientSortKey) -> Option<&str> {
        match key {
            PatientSortKey::Name => Some(self.name.as_str()),
            PatientSortKey::Email => self.email.as_deref(),
            PatientSortKey::Phone => self.phone.as_deref(),
        }
    }
}

/// Entries whose search text contains `query` (case-insensitive), ordered
/// by the lowercased value of the active sort key. Missing values sort as "".
pub fn filter_and_sort<'a, T: DirectoryEntry>(
    entries: &'a [T],
    query: &str,
    sort: &SortState<T::SortKey>,
) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<&T> = entries
        .iter()
        .filter(|entry| needle.is_empty() || entry.search_text().contains(&needle))
        .collect();

    let key = sort.key();
    let direction = sort.direction();
    matches.sort_by_cached_key(|entry| entry.sort_value(key).unwrap_or_default().to_lowercase());
    if direction == SortDirection::Descending {
        matches.reverse();
    }
    matches
}
