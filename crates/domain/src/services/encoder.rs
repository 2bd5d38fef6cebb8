//! Tabular-to-file encoding.
//!
//! Converts a `TabularResult` into the file format declared on the report
//! definition. Everything happens in memory and the complete byte buffer is
//! returned; callers stream it afterwards.

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};
use shared::text::{escape_csv, sanitize_filename_component, sanitize_sheet_name};

use crate::error::ExportError;
use crate::models::{CellValue, EncodedArtifact, FileExtension, ReportDefinition, TabularResult};

/// Worksheet row the header is written to (cell A1 is the origin).
pub const HEADER_ROW: RowNum = 0;

/// Result of writing a workbook.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    pub bytes: Vec<u8>,
    pub sheet_name: String,
    /// Rows written including the header row.
    pub rows_written: u32,
}

/// Encode a query result into the format declared by `definition`.
pub fn encode(
    result: &TabularResult,
    definition: &ReportDefinition,
    generated_at: DateTime<Utc>,
) -> Result<EncodedArtifact, ExportError> {
    let filename = artifact_filename(definition, generated_at);

    let bytes = match definition.file_extension {
        FileExtension::Csv => encode_csv(result).into_bytes(),
        FileExtension::Xlsx => encode_xlsx(result, &sheet_name(definition))?.bytes,
    };

    Ok(EncodedArtifact::new(
        bytes,
        definition.file_extension,
        filename,
    ))
}

/// Convert a result to CSV: header line first, `\n` line endings.
pub fn encode_csv(result: &TabularResult) -> String {
    let mut csv = String::new();

    push_csv_line(&mut csv, result.columns().iter().map(|c| escape_csv(&c.name)));
    for row in result.rows() {
        push_csv_line(&mut csv, row.iter().map(|cell| escape_csv(&cell.to_text())));
    }

    csv
}

fn push_csv_line(out: &mut String, fields: impl Iterator<Item = String>) {
    let line: Vec<String> = fields.collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Convert a result to a single-sheet XLSX workbook.
pub fn encode_xlsx(result: &TabularResult, sheet_name: &str) -> Result<XlsxWorkbook, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(xlsx_error)?;

    for (index, column) in result.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(
                HEADER_ROW,
                column_number(index)?,
                column.name.as_str(),
                &header_format,
            )
            .map_err(xlsx_error)?;
    }

    let mut rows_written: u32 = 1;
    for (index, row) in result.rows().iter().enumerate() {
        let row_number = row_number(index + 1)?;
        for (col_index, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_number, column_number(col_index)?, cell)?;
        }
        rows_written += 1;
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;

    Ok(XlsxWorkbook {
        bytes,
        sheet_name: sheet_name.to_string(),
        rows_written,
    })
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    cell: &CellValue,
) -> Result<(), ExportError> {
    match cell {
        // Blank cells are simply not written.
        CellValue::Null => return Ok(()),
        CellValue::Integer(v) => worksheet.write_number(row, col, *v as f64),
        CellValue::Float(v) if v.is_finite() => worksheet.write_number(row, col, *v),
        CellValue::Boolean(v) => worksheet.write_boolean(row, col, *v),
        other => worksheet.write_string(row, col, other.to_text().as_str()),
    }
    .map_err(xlsx_error)?;

    Ok(())
}

fn row_number(index: usize) -> Result<RowNum, ExportError> {
    RowNum::try_from(index)
        .map_err(|_| ExportError::EncodingFailure(format!("row {} exceeds worksheet limits", index)))
}

fn column_number(index: usize) -> Result<ColNum, ExportError> {
    ColNum::try_from(index).map_err(|_| {
        ExportError::EncodingFailure(format!("column {} exceeds worksheet limits", index))
    })
}

fn xlsx_error(err: XlsxError) -> ExportError {
    ExportError::EncodingFailure(err.to_string())
}

/// Worksheet name for a report: the cleaned report name, or `Sheet{n}` when
/// nothing usable remains.
pub fn sheet_name(definition: &ReportDefinition) -> String {
    sanitize_sheet_name(&definition.name)
        .unwrap_or_else(|| format!("Sheet{}", definition.sheet_number.max(1)))
}

/// Suggested download filename: `{name}_{YYYYMMDD_HHMMSS}.{ext}`.
pub fn artifact_filename(definition: &ReportDefinition, generated_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        sanitize_filename_component(&definition.name),
        generated_at.format("%Y%m%d_%H%M%S"),
        definition.file_extension.as_str()
    )
}
