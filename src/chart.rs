use crate::types::{SortDirection, ViewResult};
use crate::util::format_int;

const BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 28;

pub fn chart_title(direction: SortDirection) -> String {
    let order = match direction {
        SortDirection::Ascending => "Naik",
        SortDirection::Descending => "Turun",
    };
    format!("Ranking Selisih (urut: {})", order)
}

/// Horizontal bar chart of `difference` per record, in view order.
///
/// Negative differences draw with `=`, the rest with `#`; a zero difference
/// is an empty bar. Returns `None` for an empty view.
pub fn render_bars(view: &ViewResult, direction: SortDirection) -> Option<String> {
    if view.is_empty() {
        return None;
    }
    let max = view
        .records
        .iter()
        .map(|r| r.difference.unsigned_abs())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut out = chart_title(direction);
    out.push('\n');
    for r in &view.records {
        let len = bar_len(r.difference.unsigned_abs(), max);
        let glyph = if r.difference < 0 { '=' } else { '#' };
        let label: String = r.area_name.chars().take(LABEL_WIDTH).collect();
        out.push_str(&format!(
            "{:<width$} | {:<bar$} {}\n",
            label,
            glyph.to_string().repeat(len),
            format_int(r.difference),
            width = LABEL_WIDTH,
            bar = BAR_WIDTH,
        ));
    }
    Some(out)
}

// Widened to u128 so |i64::MIN| * BAR_WIDTH cannot overflow.
fn bar_len(magnitude: u64, max: u64) -> usize {
    (u128::from(magnitude) * BAR_WIDTH as u128).div_ceil(u128::from(max)) as usize
}
