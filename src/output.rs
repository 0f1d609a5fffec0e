use crate::error::{ExportError, Result};
use crate::types::{DetailPreviewRow, RollupPreviewRow, RollupRow, ViewResult};
use crate::util::format_int;
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub const SHEET_NAME: &str = "SLS";
pub const DOCUMENT_TITLE: &str = "Tabel SLS (Hasil Filter)";

pub const DETAIL_COLUMNS: [&str; 9] = [
    "rank",
    "area_id",
    "area_name",
    "district",
    "subdistrict",
    "count_a",
    "count_b",
    "difference",
    "category",
];

pub const ROLLUP_COLUMNS: [&str; 6] = [
    "rank",
    "subdistrict",
    "count_a_sum",
    "count_b_sum",
    "difference_sum",
    "record_count",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Empty,
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_text(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Int(v) => v.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl From<Option<&str>> for Value {
    fn from(v: Option<&str>) -> Self {
        v.map_or(Value::Empty, |s| Value::Text(s.to_string()))
    }
}

/// Named columns plus rows of values, in the order they should be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TableView {
    pub fn detail(view: &ViewResult) -> Self {
        let rows = view
            .iter()
            .map(|(rank, r)| {
                vec![
                    Value::Int(rank as i64),
                    Value::Text(r.area_id.clone()),
                    Value::Text(r.area_name.clone()),
                    r.district.as_deref().into(),
                    r.subdistrict.as_deref().into(),
                    Value::Int(r.count_a),
                    Value::Int(r.count_b),
                    Value::Int(r.difference),
                    Value::Text(r.category.label().to_string()),
                ]
            })
            .collect();
        Self {
            columns: DETAIL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn rollup(rows: &[RollupRow]) -> Self {
        let rows = rows
            .iter()
            .map(|r| {
                vec![
                    Value::Int(r.rank as i64),
                    Value::Text(r.subdistrict.clone()),
                    Value::Int(r.count_a_sum),
                    Value::Int(r.count_b_sum),
                    Value::Int(r.difference_sum),
                    Value::Int(r.record_count as i64),
                ]
            })
            .collect();
        Self {
            columns: ROLLUP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Header row followed by every row rendered as text.
    pub fn text_grid(&self) -> Vec<Vec<String>> {
        std::iter::once(self.columns.clone())
            .chain(self.rows.iter().map(|row| row.iter().map(Value::as_text).collect()))
            .collect()
    }
}

/// One worksheet, bold header row, no index column, columns in the order
/// given by the view.
pub fn to_spreadsheet_bytes(view: &TableView, sheet_name: &str) -> std::result::Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, name) in view.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name.as_str(), &bold)?;
    }
    for (idx, row) in view.rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            let c = col as u16;
            match value {
                Value::Empty => {}
                Value::Int(v) => {
                    sheet.write_number(r, c, *v as f64)?;
                }
                Value::Text(s) => {
                    sheet.write_string(r, c, s.as_str())?;
                }
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Paginated table document. See [`crate::document`].
pub fn to_document_bytes(
    title: &str,
    view: &TableView,
    generated_at: NaiveDateTime,
) -> std::result::Result<Vec<u8>, ExportError> {
    crate::document::render(title, view, generated_at)
}

pub fn document_export_available() -> bool {
    cfg!(feature = "pdf")
}

/// `SLS_filtered_<YYYYMMDD_HHMM>.<ext>`
pub fn export_filename(at: NaiveDateTime, ext: &str) -> String {
    format!("SLS_filtered_{}.{}", at.format("%Y%m%d_%H%M"), ext)
}

pub fn write_bytes(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, value)?;
    w.flush()?;
    Ok(())
}

pub fn detail_preview(view: &ViewResult) -> Vec<DetailPreviewRow> {
    view.iter()
        .map(|(rank, r)| DetailPreviewRow {
            rank,
            area_id: r.area_id.clone(),
            area_name: r.area_name.clone(),
            district: r.district.clone().unwrap_or_default(),
            subdistrict: r.subdistrict.clone().unwrap_or_default(),
            count_a: format_int(r.count_a),
            count_b: format_int(r.count_b),
            difference: format_int(r.difference),
            category: r.category.label().to_string(),
        })
        .collect()
}

pub fn rollup_preview(rows: &[RollupRow]) -> Vec<RollupPreviewRow> {
    rows.iter()
        .map(|r| RollupPreviewRow {
            rank: r.rank,
            subdistrict: r.subdistrict.clone(),
            count_a_sum: format_int(r.count_a_sum),
            count_b_sum: format_int(r.count_b_sum),
            difference_sum: format_int(r.difference_sum),
            record_count: format_int(r.record_count),
        })
        .collect()
}

/// Titled markdown preview of at most `max_rows` rows, with an optional
/// caption and a count of the rows left out.
pub fn render_preview<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let mut out = format!("{title}\n");
    if let Some(n) = note {
        out.push_str(&format!("({n})\n"));
    }
    out.push('\n');
    if rows.is_empty() || max_rows == 0 {
        out.push_str("(no rows)\n");
        return out;
    }
    let shown = Table::new(rows.iter().take(max_rows).cloned()).with(Style::markdown()).to_string();
    out.push_str(&shown);
    out.push('\n');
    if rows.len() > max_rows {
        out.push_str(&format!("... {} more rows\n", format_int(rows.len() - max_rows)));
    }
    out
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", render_preview(title, note, rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, EnrichedRecord};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 27)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap()
    }

    fn view() -> ViewResult {
        ViewResult {
            records: vec![EnrichedRecord {
                area_id: "3576010001".into(),
                area_name: "[12] Foo".into(),
                count_a: 10,
                count_b: 8,
                difference: -2,
                parsed_code: Some("12".into()),
                district: Some("Prajurit Kulon".into()),
                subdistrict: None,
                category: Category::Over,
            }],
            ranks: vec![1],
        }
    }

    #[test]
    fn filenames_carry_minute_timestamp() {
        assert_eq!(export_filename(at(), "xlsx"), "SLS_filtered_20251027_0805.xlsx");
        assert_eq!(export_filename(at(), "pdf"), "SLS_filtered_20251027_0805.pdf");
    }

    #[test]
    fn detail_view_keeps_literal_column_order() {
        let t = TableView::detail(&view());
        assert_eq!(t.columns, DETAIL_COLUMNS);
        assert_eq!(t.rows[0][4], Value::Empty);
        assert_eq!(t.rows[0][8], Value::Text("Hijau (Over/Bagus)".into()));
        let grid = t.text_grid();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][7], "-2");
    }

    #[test]
    fn spreadsheet_bytes_are_a_zip_container() {
        let bytes = to_spreadsheet_bytes(&TableView::detail(&view()), SHEET_NAME).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn preview_rows_use_separators() {
        let rows = rollup_preview(&[RollupRow {
            rank: 1,
            subdistrict: "Wates".into(),
            count_a_sum: 12000,
            count_b_sum: 11000,
            difference_sum: -1000,
            record_count: 3,
        }]);
        assert_eq!(rows[0].difference_sum, "-1,000");
        assert_eq!(rows[0].count_a_sum, "12,000");
    }

    #[test]
    fn preview_is_titled_and_truncated() {
        let rows: Vec<RollupPreviewRow> = (1..=3)
            .map(|i| RollupPreviewRow {
                rank: i,
                subdistrict: format!("Kel {i}"),
                count_a_sum: "0".into(),
                count_b_sum: "0".into(),
                difference_sum: "0".into(),
                record_count: "1".into(),
            })
            .collect();
        let out = render_preview("Akumulasi", Some("Definisi"), &rows, 2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(&lines[..3], &["Akumulasi", "(Definisi)", ""]);
        assert!(out.contains("Kel 2") && !out.contains("Kel 3"));
        assert!(out.ends_with("... 1 more rows\n"));

        let empty = render_preview::<RollupPreviewRow>("Tabel SLS", None, &[], 20);
        assert_eq!(empty, "Tabel SLS\n\n(no rows)\n");
    }
}
