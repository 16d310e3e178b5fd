use log::debug;

use crate::{
    classify::TableKind,
    frame::{Frame, Value},
    pipeline::RunDiagnostics,
};

pub const AMOUNT_COLUMN: &str = "Amount";
pub const COUNT_COLUMN: &str = "Count";
pub const COST_COLUMN: &str = "cost";
pub const TYPE_COLUMN: &str = "type";

/// Normalizes one classified table in place: coerces the metric columns to
/// numbers, derives the unit-cost column, and stamps every row with the
/// table's kind label. Cells that resist numeric coercion become null and
/// are counted, never raised.
pub fn normalize_metrics(frame: &mut Frame, kind: TableKind, diagnostics: &mut RunDiagnostics) {
    for column in [AMOUNT_COLUMN, COUNT_COLUMN] {
        coerce_numeric_column(frame, column, diagnostics);
    }
    derive_cost(frame);
    stamp_type(frame, kind.label());
    // Cost is recomputed above for every row, but a trailing sweep keeps the
    // no-null-cost invariant even if the column arrived pre-populated.
    fill_null_cost(frame);
}

/// Strips every character that is not a digit, a period, or a minus sign,
/// then parses the remainder as a float. Returns `None` when nothing
/// parseable is left.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let text = value.as_display();
    let filtered: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    filtered.parse::<f64>().ok()
}

fn coerce_numeric_column(frame: &mut Frame, column: &str, diagnostics: &mut RunDiagnostics) {
    let Some(idx) = frame.column_index(column) else {
        return;
    };
    let mut failures = 0usize;
    for row in frame.rows_mut() {
        let Some(value) = row[idx].as_ref() else {
            continue;
        };
        match coerce_numeric(value) {
            Some(parsed) => row[idx] = Some(Value::Number(parsed)),
            None => {
                failures += 1;
                row[idx] = None;
            }
        }
    }
    if failures > 0 {
        debug!("{failures} cell(s) in column '{column}' failed numeric coercion");
        diagnostics.coercion_failures += failures;
    }
}

/// `cost = Amount / Count` when both are present and the count is nonzero;
/// every other case (missing column, null cell, zero count) yields 0.
fn derive_cost(frame: &mut Frame) {
    let amount_idx = frame.column_index(AMOUNT_COLUMN);
    let count_idx = frame.column_index(COUNT_COLUMN);
    let cost_idx = frame.ensure_column(COST_COLUMN);
    for row in frame.rows_mut() {
        let amount = amount_idx.and_then(|i| row[i].as_ref().and_then(Value::as_number));
        let count = count_idx.and_then(|i| row[i].as_ref().and_then(Value::as_number));
        let cost = match (amount, count) {
            (Some(amount), Some(count)) if count != 0.0 => amount / count,
            _ => 0.0,
        };
        row[cost_idx] = Some(Value::Number(cost));
    }
}

fn stamp_type(frame: &mut Frame, label: &str) {
    let idx = frame.ensure_column(TYPE_COLUMN);
    for row in frame.rows_mut() {
        row[idx] = Value::text(label);
    }
}

/// Replaces null `cost` cells with 0. A no-op when the column is absent.
pub fn fill_null_cost(frame: &mut Frame) {
    let Some(idx) = frame.column_index(COST_COLUMN) else {
        return;
    };
    for row in frame.rows_mut() {
        if row[idx].is_none() {
            row[idx] = Value::number(0.0);
        }
    }
}
