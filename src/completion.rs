//! Front-end cache of task id prefixes, used purely for suggestions.
//!
//! The engine re-derives identifier resolution from the live collection on
//! every call; this copy only feeds hints, and the shell refreshes it after
//! every mutating command.

use crate::store::{CompletionData, TaskStore};

#[derive(Debug, Default)]
pub struct CompletionCache {
    data: CompletionData,
}

impl CompletionCache {
    pub fn new(store: &TaskStore) -> Self {
        Self {
            data: store.completion_ids(),
        }
    }

    /// Re-pull id data from the store; call after add/toggle/del/edit.
    pub fn refresh(&mut self, store: &TaskStore) {
        self.data = store.completion_ids();
    }

    pub fn prefixes(&self) -> &[String] {
        &self.data.prefixes
    }

    pub fn full_ids(&self) -> &[String] {
        &self.data.full_ids
    }

    /// Short-id prefixes extending `partial`, for "did you mean" hints.
    pub fn suggestions(&self, partial: &str) -> Vec<String> {
        self.data
            .prefixes
            .iter()
            .filter(|prefix| prefix.starts_with(partial))
            .cloned()
            .collect()
    }
}
