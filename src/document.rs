// Paginated PDF rendering of a `TableView`.
//
// Layout: A4 landscape, title and timestamp on the first page, one table
// whose header row is repeated on every page. Cells are centered, the grid is
// drawn in grey, the header is bold on light grey and body rows alternate
// between whitesmoke and white.
use crate::error::ExportError;
use crate::output::TableView;
use chrono::NaiveDateTime;

#[cfg(not(feature = "pdf"))]
pub fn render(_title: &str, _view: &TableView, _at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unavailable)
}

#[cfg(feature = "pdf")]
pub fn render(title: &str, view: &TableView, at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
    pdf::render(title, view, at)
}

/// Column widths in points for `grid`, scaled down to fit `available`.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
pub(crate) fn column_widths(grid: &[Vec<String>], font_size: i64, available: i64) -> Vec<i64> {
    let cols = grid.first().map_or(0, Vec::len);
    let mut widths: Vec<i64> = (0..cols)
        .map(|c| {
            let chars = grid
                .iter()
                .filter_map(|row| row.get(c))
                .map(|s| s.chars().count() as i64)
                .max()
                .unwrap_or(0);
            text_width(chars, font_size) + 2 * CELL_PADDING
        })
        .collect();
    let total: i64 = widths.iter().sum();
    if total > available && total > 0 {
        for w in &mut widths {
            *w = (*w * available / total).max(2 * CELL_PADDING + 1);
        }
    }
    widths
}

/// Splits `rows` body rows into page-sized chunks. The first page holds
/// fewer rows because of the title block.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
pub(crate) fn paginate(rows: usize, rows_per_page: usize, first_page_rows: usize) -> Vec<std::ops::Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = first_page_rows.max(1);
    while start < rows {
        let end = (start + capacity).min(rows);
        pages.push(start..end);
        start = end;
        capacity = rows_per_page.max(1);
    }
    if pages.is_empty() {
        pages.push(0..0);
    }
    pages
}

const CELL_PADDING: i64 = 4;

// Helvetica averages about half an em per glyph.
fn text_width(chars: i64, font_size: i64) -> i64 {
    chars * font_size / 2
}

#[cfg(feature = "pdf")]
mod pdf {
    use super::{column_widths, paginate, text_width, CELL_PADDING};
    use crate::error::ExportError;
    use crate::output::TableView;
    use chrono::NaiveDateTime;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    const PAGE_WIDTH: i64 = 842;
    const PAGE_HEIGHT: i64 = 595;
    const MARGIN_X: i64 = 24;
    const MARGIN_Y: i64 = 18;
    const FONT_SIZE: i64 = 8;
    const ROW_HEIGHT: i64 = 14;
    const TITLE_SIZE: i64 = 18;
    const TITLE_BLOCK: i64 = 52;

    pub fn render(title: &str, view: &TableView, at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
        let grid = view.text_grid();
        let widths = column_widths(&grid, FONT_SIZE, PAGE_WIDTH - 2 * MARGIN_X);
        let table_width: i64 = widths.iter().sum();
        let x0 = (PAGE_WIDTH - table_width) / 2;

        let usable = PAGE_HEIGHT - 2 * MARGIN_Y;
        let rows_per_page = (usable / ROW_HEIGHT - 1).max(1) as usize;
        let first_page_rows = ((usable - TITLE_BLOCK) / ROW_HEIGHT - 1).max(1) as usize;
        let body = &grid[1..];

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => regular, "F2" => bold },
        });

        let mut kids: Vec<Object> = Vec::new();
        for (page_no, range) in paginate(body.len(), rows_per_page, first_page_rows).into_iter().enumerate() {
            let mut ops = Vec::new();
            let mut y = PAGE_HEIGHT - MARGIN_Y;
            if page_no == 0 {
                let stamp = at.format("Dibuat: %d %b %Y %H:%M").to_string();
                let title_x = (PAGE_WIDTH - text_width(title.chars().count() as i64, TITLE_SIZE)) / 2;
                text(&mut ops, "F2", TITLE_SIZE, title_x.max(MARGIN_X), y - TITLE_SIZE, title);
                text(&mut ops, "F1", 10, MARGIN_X, y - TITLE_SIZE - 20, &stamp);
                y -= TITLE_BLOCK;
            }

            y -= ROW_HEIGHT;
            fill_row(&mut ops, (0.827, 0.827, 0.827), x0, y, table_width);
            draw_row(&mut ops, "F2", &grid[0], &widths, x0, y);

            for (i, row) in body[range].iter().enumerate() {
                y -= ROW_HEIGHT;
                let shade = if i % 2 == 0 { (0.961, 0.961, 0.961) } else { (1.0, 1.0, 1.0) };
                fill_row(&mut ops, shade, x0, y, table_width);
                draw_row(&mut ops, "F1", row, &widths, x0, y);
            }

            let content = Content { operations: ops };
            let encoded = content
                .encode()
                .map_err(|e| ExportError::Document(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| ExportError::Document(e.to_string()))?;
        Ok(out)
    }

    fn fill_row(ops: &mut Vec<Operation>, (r, g, b): (f32, f32, f32), x: i64, y: i64, w: i64) {
        ops.push(Operation::new("rg", vec![Object::Real(r.into()), Object::Real(g.into()), Object::Real(b.into())]));
        ops.push(Operation::new("re", vec![x.into(), y.into(), w.into(), ROW_HEIGHT.into()]));
        ops.push(Operation::new("f", vec![]));
    }

    fn draw_row(ops: &mut Vec<Operation>, font: &str, cells: &[String], widths: &[i64], x0: i64, y: i64) {
        ops.push(Operation::new("RG", vec![Object::Real(0.5), Object::Real(0.5), Object::Real(0.5)]));
        ops.push(Operation::new("w", vec![Object::Real(0.25)]));
        let mut x = x0;
        for (cell, w) in cells.iter().zip(widths) {
            ops.push(Operation::new("re", vec![x.into(), y.into(), (*w).into(), ROW_HEIGHT.into()]));
            ops.push(Operation::new("S", vec![]));

            let fit = ((w - 2 * CELL_PADDING) * 2 / FONT_SIZE).max(1) as usize;
            let shown: String = cell.chars().take(fit).collect();
            let tw = text_width(shown.chars().count() as i64, FONT_SIZE);
            text(ops, font, FONT_SIZE, x + (w - tw) / 2, y + (ROW_HEIGHT - FONT_SIZE) / 2 + 1, &shown);
            x += w;
        }
    }

    fn text(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, s: &str) {
        ops.push(Operation::new("g", vec![0.into()]));
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(s))]));
        ops.push(Operation::new("ET", vec![]));
    }

    // Latin-1 maps onto WinAnsi for everything the sheets contain; anything
    // outside it prints as '?'.
    fn win_ansi(s: &str) -> Vec<u8> {
        s.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::output::Value;
        use chrono::NaiveDate;

        #[test]
        fn renders_a_pdf_with_one_page_per_chunk() {
            let view = TableView {
                columns: vec!["rank".into(), "area_name".into()],
                rows: (0..100)
                    .map(|i| vec![Value::Int(i), Value::Text(format!("SLS {i}"))])
                    .collect(),
            };
            let at = NaiveDate::from_ymd_opt(2025, 10, 27)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap();
            let bytes = render("Tabel SLS (Hasil Filter)", &view, at).unwrap();
            assert!(bytes.starts_with(b"%PDF-1.5"));
            let doc = Document::load_mem(&bytes).unwrap();
            assert_eq!(doc.get_pages().len(), 3);
        }

        #[test]
        fn non_latin_text_is_replaced() {
            assert_eq!(win_ansi("Σ ab"), b"? ab".to_vec());
            assert_eq!(win_ansi("é"), vec![0xE9]);
        }
    }
}
