use std::fmt;

use chrono::NaiveDateTime;

/// A single cell scalar. Cells live in a `Frame` as `Option<Value>`; `None`
/// is the null of the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn text(value: impl Into<String>) -> Option<Value> {
        Some(Value::Text(value.into()))
    }

    pub fn number(value: f64) -> Option<Value> {
        Some(Value::Number(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// An in-memory table: ordered column names plus row-major cells. Every row
/// holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Frame {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<Option<Value>>] {
        &mut self.rows
    }

    /// Appends a row, padding with nulls or truncating to the column width.
    pub fn push_row(&mut self, mut row: Vec<Option<Value>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))?.as_ref()
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: Option<Value>) {
        if let Some(cells) = self.rows.get_mut(row)
            && column < cells.len()
        {
            cells[column] = value;
        }
    }

    /// Returns the index of `name`, adding a null-filled column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Unions `other_columns` into this frame's column list and returns, for
    /// each of them, its index here. Existing rows gain nulls for columns
    /// introduced by the union.
    pub fn union_columns(&mut self, other_columns: &[String]) -> Vec<usize> {
        other_columns
            .iter()
            .map(|name| self.ensure_column(name))
            .collect()
    }

    /// Appends every row of `other`, unioning columns by name. Cells for
    /// columns absent on either side become null. Never drops rows.
    pub fn append_frame(&mut self, other: &Frame) {
        let mapping = self.union_columns(other.columns());
        for row in &other.rows {
            self.rows.push(remap_row(row, &mapping, self.columns.len()));
        }
    }

    /// Appends a single row of `other` by index, unioning columns by name.
    pub fn append_row_from(&mut self, other: &Frame, row: usize) {
        let mapping = self.union_columns(other.columns());
        if let Some(cells) = other.rows.get(row) {
            self.rows.push(remap_row(cells, &mapping, self.columns.len()));
        }
    }

    /// Concatenates tables in order: row union and column union, with
    /// missing cells left null. The result's row count is the sum of the
    /// inputs' row counts.
    pub fn concat<I>(frames: I) -> Frame
    where
        I: IntoIterator<Item = Frame>,
    {
        let mut result = Frame::default();
        for frame in frames {
            result.append_frame(&frame);
        }
        result
    }
}

fn remap_row(row: &[Option<Value>], mapping: &[usize], width: usize) -> Vec<Option<Value>> {
    let mut cells = vec![None; width];
    for (idx, cell) in row.iter().enumerate() {
        if let Some(&target) = mapping.get(idx) {
            cells[target] = cell.clone();
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(columns: &[&str], rows: &[&[Option<Value>]]) -> Frame {
        let mut frame = Frame::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            frame.push_row(row.to_vec());
        }
        frame
    }

    #[test]
    fn number_display_drops_trailing_zero_fraction() {
        assert_eq!(Value::Number(12.0).as_display(), "12");
        assert_eq!(Value::Number(12.5).as_display(), "12.5");
    }

    #[test]
    fn push_row_pads_and_truncates_to_width() {
        let mut frame = Frame::new(vec!["a".into(), "b".into()]);
        frame.push_row(vec![Value::number(1.0)]);
        frame.push_row(vec![Value::number(1.0), Value::number(2.0), Value::number(3.0)]);
        assert_eq!(frame.rows()[0].len(), 2);
        assert_eq!(frame.rows()[0][1], None);
        assert_eq!(frame.rows()[1].len(), 2);
    }

    #[test]
    fn ensure_column_backfills_existing_rows_with_null() {
        let mut frame = sample(&["a"], &[&[Value::number(1.0)]]);
        let idx = frame.ensure_column("b");
        assert_eq!(idx, 1);
        assert_eq!(frame.rows()[0][1], None);
        assert_eq!(frame.ensure_column("b"), 1);
    }

    #[test]
    fn concat_unions_columns_and_sums_row_counts() {
        let left = sample(&["a", "b"], &[&[Value::number(1.0), Value::text("x")]]);
        let right = sample(
            &["b", "c"],
            &[
                &[Value::text("y"), Value::number(2.0)],
                &[None, Value::number(3.0)],
            ],
        );
        let combined = Frame::concat([left.clone(), right.clone()]);
        assert_eq!(combined.columns(), &["a", "b", "c"]);
        assert_eq!(combined.row_count(), left.row_count() + right.row_count());
        // First row came from `left` and has no `c` value.
        assert_eq!(combined.cell(0, 2), None);
        // Second row came from `right` and has no `a` value.
        assert_eq!(combined.cell(1, 0), None);
        assert_eq!(combined.cell(1, 1), Some(&Value::Text("y".into())));
    }

    #[test]
    fn append_row_from_copies_a_single_row() {
        let mut target = sample(&["a"], &[&[Value::number(1.0)]]);
        let source = sample(&["b"], &[&[Value::text("x")], &[Value::text("y")]]);
        target.append_row_from(&source, 1);
        assert_eq!(target.row_count(), 2);
        assert_eq!(target.cell(1, 1), Some(&Value::Text("y".into())));
        assert_eq!(target.cell(1, 0), None);
    }

    #[test]
    fn rename_column_reports_missing_names() {
        let mut frame = Frame::new(vec!["a".into()]);
        assert!(frame.rename_column("a", "z"));
        assert!(!frame.rename_column("missing", "z"));
        assert_eq!(frame.columns(), &["z"]);
    }
}
