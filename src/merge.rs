//! Reconciles the item table against the ingredient catalog and shipment log.
//!
//! The join key is never exact: item and ingredient names are compared
//! through `text::normalize`, and shipment ingredients are decomposed on a
//! `+` delimiter into tokens that match joined-table column names by
//! substring. Substring matching is deliberately loose to tolerate naming
//! variance across source spreadsheets, and a matching token re-selects
//! every shipment row containing it, so the same log row can be appended
//! more than once. `MergeOptions::dedup_matches` bounds that expansion to
//! one append per log row per originating shipment row.

use std::{collections::HashMap, sync::OnceLock};

use itertools::Itertools;
use log::{info, warn};
use regex::Regex;

use crate::{
    error::PipelineError,
    frame::{Frame, Value},
    pipeline::RunDiagnostics,
    text::normalize,
};

pub const ITEM_NAME_COLUMN: &str = "Item Name";
pub const INGREDIENT_NAME_COLUMN: &str = "Item name";
pub const INGREDIENT_MERGED_COLUMN: &str = "Items with Ingredient Counts";
pub const SHIPMENT_INGREDIENT_COLUMN: &str = "Ingredient";

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Append each shipment log row at most once per originating shipment
    /// row instead of once per matching token occurrence.
    pub dedup_matches: bool,
}

/// Produces the merged item table: item rows outer-joined with the
/// ingredient catalog, then extended with shipment log rows whose
/// decomposed ingredients match a joined column name.
pub fn merge_item_references(
    item: &Frame,
    ingredients: &Frame,
    shipments: &Frame,
    options: &MergeOptions,
    diagnostics: &mut RunDiagnostics,
) -> Result<Frame, PipelineError> {
    let mut merged = join_items_with_ingredients(item, ingredients)?;
    // Column matching runs against the joined table's columns as they stand
    // here; columns introduced later by shipment appends do not participate.
    let normalized_columns: Vec<String> = merged
        .columns()
        .iter()
        .map(|name| normalize(name).into_owned())
        .collect();
    expand_shipments(&mut merged, shipments, &normalized_columns, options, diagnostics)?;
    Ok(merged)
}

/// Outer join on normalized name equality. Rows from either side with no
/// counterpart survive with nulls filling the other side's columns.
fn join_items_with_ingredients(
    item: &Frame,
    ingredients: &Frame,
) -> Result<Frame, PipelineError> {
    let left_key = item.column_index(ITEM_NAME_COLUMN).ok_or_else(|| {
        PipelineError::Merge(format!(
            "item table is missing its '{ITEM_NAME_COLUMN}' column"
        ))
    })?;
    let right_key = ingredients
        .column_index(INGREDIENT_NAME_COLUMN)
        .ok_or_else(|| {
            PipelineError::Merge(format!(
                "ingredient catalog is missing its '{INGREDIENT_NAME_COLUMN}' column"
            ))
        })?;

    let mut columns = disambiguated_headers(item.columns(), ingredients.columns());
    columns[item.columns().len() + right_key] = INGREDIENT_MERGED_COLUMN.to_string();
    for name in &mut columns {
        let trimmed = name.trim();
        if trimmed.len() != name.len() {
            *name = trimmed.to_string();
        }
    }
    let mut output = Frame::new(columns);

    let mut lookup: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in ingredients.rows().iter().enumerate() {
        lookup.entry(join_key(&row[right_key])).or_default().push(idx);
    }

    let left_width = item.columns().len();
    let right_width = ingredients.columns().len();
    let mut right_matched = vec![false; ingredients.row_count()];

    for row in item.rows() {
        let mut matched_any = false;
        if let Some(bucket) = lookup.get(&join_key(&row[left_key])) {
            for &right_idx in bucket {
                matched_any = true;
                right_matched[right_idx] = true;
                let mut cells = row.clone();
                cells.extend(ingredients.rows()[right_idx].iter().cloned());
                output.push_row(cells);
            }
        }
        if !matched_any {
            let mut cells = row.clone();
            cells.resize(left_width + right_width, None);
            output.push_row(cells);
        }
    }

    for (right_idx, matched) in right_matched.iter().enumerate() {
        if *matched {
            continue;
        }
        let mut cells = vec![None; left_width];
        cells.extend(ingredients.rows()[right_idx].iter().cloned());
        output.push_row(cells);
    }

    Ok(output)
}

fn join_key(cell: &Option<Value>) -> String {
    cell.as_ref()
        .map(|value| normalize(&value.as_display()).into_owned())
        .unwrap_or_default()
}

/// Name collisions between the two sides get `_item` / `_ing` suffixes;
/// everything else keeps its name. Returns left headers followed by right.
fn disambiguated_headers(left: &[String], right: &[String]) -> Vec<String> {
    let mut headers: Vec<String> = left
        .iter()
        .map(|name| {
            if right.contains(name) {
                format!("{name}_item")
            } else {
                name.clone()
            }
        })
        .collect();
    headers.extend(right.iter().map(|name| {
        if left.contains(name) {
            format!("{name}_ing")
        } else {
            name.clone()
        }
    }));
    headers
}

fn ingredient_delimiter() -> &'static Regex {
    static DELIMITER: OnceLock<Regex> = OnceLock::new();
    DELIMITER.get_or_init(|| Regex::new(r"\s*\+\s*").expect("delimiter pattern compiles"))
}

/// Splits a compound ingredient name on `+` (with surrounding whitespace)
/// and normalizes each non-empty part. `"Flour + Sugar"` yields
/// `["flour", "sugar"]`.
pub fn decompose_ingredient(raw: &str) -> Vec<String> {
    ingredient_delimiter()
        .split(raw)
        .filter(|part| !part.is_empty())
        .map(|part| normalize(part).into_owned())
        .collect()
}

fn expand_shipments(
    merged: &mut Frame,
    shipments: &Frame,
    normalized_columns: &[String],
    options: &MergeOptions,
    diagnostics: &mut RunDiagnostics,
) -> Result<(), PipelineError> {
    let ingredient_idx = shipments
        .column_index(SHIPMENT_INGREDIENT_COLUMN)
        .ok_or_else(|| {
            PipelineError::Merge(format!(
                "shipment log is missing its '{SHIPMENT_INGREDIENT_COLUMN}' column"
            ))
        })?;

    let lowered: Vec<String> = shipments
        .rows()
        .iter()
        .map(|row| {
            row[ingredient_idx]
                .as_ref()
                .map(|value| value.as_display().to_lowercase())
                .unwrap_or_default()
        })
        .collect();

    let mut appended = 0usize;
    for (row_idx, row) in shipments.rows().iter().enumerate() {
        let raw = row[ingredient_idx]
            .as_ref()
            .map(Value::as_display)
            .unwrap_or_default();
        let tokens = decompose_ingredient(&raw);

        let mut matched = false;
        let mut selected: Vec<usize> = Vec::new();
        for token in &tokens {
            if token.is_empty() {
                continue;
            }
            if !normalized_columns
                .iter()
                .any(|column| column.contains(token.as_str()))
            {
                continue;
            }
            matched = true;
            selected.extend(
                lowered
                    .iter()
                    .enumerate()
                    .filter(|(_, text)| text.contains(token.as_str()))
                    .map(|(idx, _)| idx),
            );
        }

        if !matched {
            diagnostics.unmatched_shipments += 1;
            warn!(
                "No matching column found for ingredient token(s) {tokens:?} (shipment row {})",
                row_idx + 1
            );
            continue;
        }

        if options.dedup_matches {
            selected = selected.into_iter().unique().collect();
        }
        for idx in selected {
            merged.append_row_from(shipments, idx);
            appended += 1;
        }
    }

    if appended > 0 {
        info!("Shipment expansion appended {appended} row(s) to the item table");
    }
    Ok(())
}
