use std::sync::{Arc, RwLock};

use crate::{frame::Frame, pipeline::PipelineResult};

/// Shared handle to the most recently published pipeline result.
///
/// The three output tables are treated as a single atomically-swapped unit:
/// `publish` replaces the whole result under a write lock, and readers take
/// an `Arc` snapshot, so a concurrent reader observes either the pre-run or
/// the post-run tables, never a partially-merged intermediate. A failed run
/// publishes nothing and the previous snapshot stays visible.
#[derive(Debug, Default)]
pub struct PipelineHandle {
    inner: RwLock<Option<Arc<PipelineResult>>>,
}

impl PipelineHandle {
    pub fn new() -> Self {
        PipelineHandle {
            inner: RwLock::new(None),
        }
    }

    /// Swaps the published result and returns the new snapshot.
    pub fn publish(&self, result: PipelineResult) -> Arc<PipelineResult> {
        let shared = Arc::new(result);
        let mut guard = self.inner.write().unwrap_or_else(|err| err.into_inner());
        *guard = Some(Arc::clone(&shared));
        shared
    }

    /// Current snapshot, if any run has completed.
    pub fn snapshot(&self) -> Option<Arc<PipelineResult>> {
        self.inner
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// Column names of the named table. Empty when the kind is unrecognized
    /// or no run has been published yet.
    pub fn get_columns(&self, kind: &str) -> Vec<String> {
        self.snapshot()
            .and_then(|result| result.table(kind).map(|frame| frame.columns().to_vec()))
            .unwrap_or_default()
    }

    /// Read-only view of the named table, if published.
    pub fn get_table(&self, kind: &str) -> Option<TableView> {
        let selector = Selector::parse(kind)?;
        let result = self.snapshot()?;
        Some(TableView { result, selector })
    }
}

#[derive(Debug, Clone, Copy)]
enum Selector {
    Group,
    Category,
    Item,
}

impl Selector {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "Group" => Some(Selector::Group),
            "Category" => Some(Selector::Category),
            "Item" => Some(Selector::Item),
            _ => None,
        }
    }
}

/// A snapshot-backed view of one published table.
#[derive(Debug, Clone)]
pub struct TableView {
    result: Arc<PipelineResult>,
    selector: Selector,
}

impl TableView {
    pub fn frame(&self) -> &Frame {
        match self.selector {
            Selector::Group => &self.result.group,
            Selector::Category => &self.result.category,
            Selector::Item => &self.result.item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunDiagnostics;

    fn result_with_group_rows(rows: usize) -> PipelineResult {
        let mut group = Frame::new(vec!["Group".into()]);
        for i in 0..rows {
            group.push_row(vec![crate::frame::Value::text(format!("g{i}"))]);
        }
        PipelineResult {
            group,
            category: Frame::default(),
            item: Frame::default(),
            item_columns: Vec::new(),
            diagnostics: RunDiagnostics::default(),
        }
    }

    #[test]
    fn unpublished_handle_answers_empty() {
        let handle = PipelineHandle::new();
        assert!(handle.snapshot().is_none());
        assert!(handle.get_columns("Group").is_empty());
        assert!(handle.get_table("Item").is_none());
    }

    #[test]
    fn unknown_kind_answers_empty_even_after_publish() {
        let handle = PipelineHandle::new();
        handle.publish(result_with_group_rows(1));
        assert!(handle.get_columns("group").is_empty());
        assert!(handle.get_table("Totals").is_none());
    }

    #[test]
    fn snapshots_survive_a_later_publish() {
        let handle = PipelineHandle::new();
        handle.publish(result_with_group_rows(1));
        let before = handle.get_table("Group").unwrap();
        handle.publish(result_with_group_rows(5));
        // The earlier view still sees the result it was taken from.
        assert_eq!(before.frame().row_count(), 1);
        assert_eq!(handle.get_table("Group").unwrap().frame().row_count(), 5);
    }
}
