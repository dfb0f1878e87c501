use chrono::{DateTime, Local, TimeZone, Utc};
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::categories::category_label;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at_millis: i64,
    pub idea_text: String,
    pub category_id: String,
    pub category_label: String,
    pub result: AnalysisResult,
}

impl HistoryEntry {
    pub fn new(idea_text: &str, category_id: &str, result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at_millis: Utc::now().timestamp_millis(),
            idea_text: idea_text.to_string(),
            category_id: category_id.to_string(),
            category_label: category_label(category_id),
            result,
        }
    }

    /// Local wall-clock time of creation, `HH:MM`.
    pub fn created_at_display(&self) -> String {
        Local
            .timestamp_millis_opt(self.created_at_millis)
            .single()
            .map(|dt: DateTime<Local>| dt.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }
}

/// Newest-first list of past analyses, never longer than [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryCache {
    entries: Vec<HistoryEntry>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new cache with `entry` in front; the oldest entry past capacity is dropped.
    pub fn prepend(&self, entry: HistoryEntry) -> HistoryCache {
        let mut entries = Vec::with_capacity(HISTORY_CAPACITY);
        entries.push(entry);
        entries.extend(self.entries.iter().take(HISTORY_CAPACITY - 1).cloned());
        HistoryCache { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
