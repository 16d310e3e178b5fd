use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, open_workbook_auto};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{
    error::PipelineError,
    frame::{Frame, Value},
    io_utils,
};

/// Column appended to every loaded sheet carrying the reporting-period label
/// derived from the source filename.
pub const PERIOD_COLUMN: &str = "period";

/// One sheet of one source workbook, tagged with its provenance.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub frame: Frame,
    pub path: PathBuf,
    pub sheet_index: usize,
    pub period: String,
}

/// Derives the reporting-period label from a source filename: the substring
/// before the first underscore, with the literal word `Data` removed and
/// whitespace trimmed. `May_Data_Matrix (1).xlsx` yields `May`.
pub fn period_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = name.split('_').next().unwrap_or("");
    prefix.replace("Data", "").trim().to_string()
}

/// Loads every source workbook in order, yielding one `SourceTable` per
/// sheet. Excel workbooks contribute their first `sheets_per_source`
/// worksheets; CSV files are treated as single-sheet workbooks. Any
/// missing or unreadable input aborts the whole load.
pub fn load_sources(
    paths: &[PathBuf],
    sheets_per_source: usize,
) -> Result<Vec<SourceTable>, PipelineError> {
    let mut tables = Vec::new();
    for path in paths {
        let period = period_label(path);
        let frames = load_workbook(path, sheets_per_source)?;
        debug!(
            "Loaded {} sheet(s) from '{}' (period '{}')",
            frames.len(),
            path.display(),
            period
        );
        for (sheet_index, mut frame) in frames.into_iter().enumerate() {
            stamp_period(&mut frame, &period);
            tables.push(SourceTable {
                frame,
                path: path.clone(),
                sheet_index,
                period: period.clone(),
            });
        }
    }
    info!(
        "Loaded {} sheet table(s) from {} source file(s)",
        tables.len(),
        paths.len()
    );
    Ok(tables)
}

fn stamp_period(frame: &mut Frame, period: &str) {
    let idx = frame.ensure_column(PERIOD_COLUMN);
    for row in 0..frame.row_count() {
        frame.set_cell(row, idx, Value::text(period));
    }
}

fn load_workbook(path: &Path, sheets_per_source: usize) -> Result<Vec<Frame>, PipelineError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "xlsx" | "xls" | "ods" => load_excel(path, sheets_per_source),
        "csv" | "tsv" => Ok(vec![load_delimited_sheet(path)?]),
        other => Err(PipelineError::source_load(
            path,
            format!("unsupported source format '{other}'"),
        )),
    }
}

fn load_excel(path: &Path, sheets_per_source: usize) -> Result<Vec<Frame>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::source_load(path, "file not found"));
    }
    let mut workbook =
        open_workbook_auto(path).map_err(|err| PipelineError::source_load(path, err.to_string()))?;
    let sheet_names = workbook.sheet_names();
    if sheet_names.len() < sheets_per_source {
        return Err(PipelineError::source_load(
            path,
            format!(
                "workbook has {} sheet(s), expected at least {sheets_per_source}",
                sheet_names.len()
            ),
        ));
    }
    let mut frames = Vec::with_capacity(sheets_per_source);
    for name in sheet_names.iter().take(sheets_per_source) {
        let range = workbook
            .worksheet_range(name)
            .map_err(|err| PipelineError::source_load(path, err.to_string()))?;
        frames.push(frame_from_range(&range, path, name)?);
    }
    Ok(frames)
}

fn frame_from_range(range: &Range<Data>, path: &Path, sheet: &str) -> Result<Frame, PipelineError> {
    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| {
        PipelineError::source_load(path, format!("sheet '{sheet}' has no header row"))
    })?;
    let columns = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(&cell.to_string(), idx))
        .collect();
    let mut frame = Frame::new(columns);
    for data_row in rows {
        let cells: Vec<Option<Value>> = data_row.iter().map(cell_value).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        frame.push_row(cells);
    }
    Ok(frame)
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Value::Text(trimmed.to_string()))
            }
        }
        Data::Float(f) => Some(Value::Number(*f)),
        Data::Int(i) => Some(Value::Number(*i as f64)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::DateTime)
            .or(Some(Value::Number(dt.as_f64()))),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::Text(s.clone())),
    }
}

fn header_name(raw: &str, idx: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        trimmed.to_string()
    }
}

fn load_delimited_sheet(path: &Path) -> Result<Frame, PipelineError> {
    read_csv_frame(path, UTF_8).map_err(|err| PipelineError::source_load(path, format!("{err:#}")))
}

/// Loads a reference table (ingredient catalog or shipment log) from CSV and
/// verifies its key column is present.
pub fn load_reference(
    path: &Path,
    encoding: &'static Encoding,
    key_column: &str,
) -> Result<Frame, PipelineError> {
    let frame = read_csv_frame(path, encoding)
        .map_err(|err| PipelineError::reference(path, format!("{err:#}")))?;
    if !frame.has_column(key_column) {
        return Err(PipelineError::reference(
            path,
            format!("missing required column '{key_column}'"),
        ));
    }
    debug!(
        "Loaded reference '{}': {} row(s), {} column(s)",
        path.display(),
        frame.row_count(),
        frame.columns().len()
    );
    Ok(frame)
}

fn read_csv_frame(path: &Path, encoding: &'static Encoding) -> anyhow::Result<Frame> {
    let delimiter = io_utils::resolve_input_delimiter(path);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| header_name(name, idx))
        .collect();
    let mut frame = Frame::new(columns);
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|err| anyhow::anyhow!("row {}: {err}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        let cells: Vec<Option<Value>> = decoded
            .iter()
            .map(|field| {
                let trimmed = field.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Value::Text(trimmed.to_string()))
                }
            })
            .collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        frame.push_row(cells);
    }
    Ok(frame)
}
