use crate::{frame::Frame, loader::SourceTable};

/// Granularity bucket for a source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Group,
    Category,
    Item,
}

impl TableKind {
    /// Label stamped into the `type` column of every normalized row.
    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Group => "Group",
            TableKind::Category => "Category",
            TableKind::Item => "Specific Item",
        }
    }
}

/// Buckets a table by which discriminating column is present: a column
/// literally named `Group` wins, then `Category`, and everything else is an
/// item-level table. Total; there is no error case.
pub fn classify(frame: &Frame) -> TableKind {
    if frame.has_column("Group") {
        TableKind::Group
    } else if frame.has_column("Category") {
        TableKind::Category
    } else {
        TableKind::Item
    }
}

/// One concatenated table per kind, in source append order.
#[derive(Debug, Clone, Default)]
pub struct KindTables {
    pub group: Frame,
    pub category: Frame,
    pub item: Frame,
}

/// Partitions the loaded sheet tables by kind and concatenates each bucket.
/// Append order follows the input order (file order times sheet order), and
/// concatenation unions columns so no rows are lost.
pub fn bucket(tables: Vec<SourceTable>) -> KindTables {
    let mut group = Vec::new();
    let mut category = Vec::new();
    let mut item = Vec::new();
    for table in tables {
        match classify(&table.frame) {
            TableKind::Group => group.push(table.frame),
            TableKind::Category => category.push(table.frame),
            TableKind::Item => item.push(table.frame),
        }
    }
    KindTables {
        group: Frame::concat(group),
        category: Frame::concat(category),
        item: Frame::concat(item),
    }
}
