use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// One cell as it comes out of the workbook or CSV reader, before any
/// coercion happens.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Text rendering used for string fields (`area_id`, `area_name`).
    ///
    /// Whole floats print without a fractional part so that an id typed as a
    /// number in the sheet (`3576010001.0`) keeps its digits stable for
    /// prefix slicing.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Cell::Float(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

/// Header row plus data rows, exactly as read. Discarded after normalization.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// A row after header mapping. Numeric fields are still raw cells; the
/// enricher owns coercion.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    pub area_id: Cell,
    pub area_name: Cell,
    pub count_a: Cell,
    pub count_b: Cell,
    pub difference: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Over,
    Match,
    Shortfall,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Over, Category::Match, Category::Shortfall];

    pub fn from_difference(difference: i64) -> Self {
        match difference.signum() {
            -1 => Category::Over,
            0 => Category::Match,
            _ => Category::Shortfall,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Over => "Hijau (Over/Bagus)",
            Category::Match => "Kuning (Match)",
            Category::Shortfall => "Merah (Kurang)",
        }
    }

    /// Accepts either the display label or the short enum name, any case.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Category::ALL.into_iter().find(|c| {
            c.label().eq_ignore_ascii_case(s) || format!("{:?}", c).eq_ignore_ascii_case(s)
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub area_id: String,
    pub area_name: String,
    pub count_a: i64,
    pub count_b: i64,
    pub difference: i64,
    pub parsed_code: Option<String>,
    pub district: Option<String>,
    pub subdistrict: Option<String>,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "Terkecil → Terbesar",
            SortDirection::Descending => "Terbesar → Terkecil",
        }
    }
}

/// Sorted detail view: records plus a parallel rank per record.
#[derive(Debug, Clone, Default)]
pub struct ViewResult {
    pub records: Vec<EnrichedRecord>,
    pub ranks: Vec<usize>,
}

impl ViewResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &EnrichedRecord)> {
        self.ranks.iter().copied().zip(self.records.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupRow {
    pub rank: usize,
    pub subdistrict: String,
    pub count_a_sum: i64,
    pub count_b_sum: i64,
    pub difference_sum: i64,
    pub record_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RollupPreviewRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Kelurahan")]
    pub subdistrict: String,
    #[tabled(rename = "Total PLKUMKM")]
    pub count_a_sum: String,
    #[tabled(rename = "Total KDM")]
    pub count_b_sum: String,
    #[tabled(rename = "Σ Selisih")]
    pub difference_sum: String,
    #[tabled(rename = "Jumlah SLS")]
    pub record_count: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DetailPreviewRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "ID SLS")]
    pub area_id: String,
    #[tabled(rename = "Nama SLS")]
    pub area_name: String,
    #[tabled(rename = "Kecamatan")]
    pub district: String,
    #[tabled(rename = "Kelurahan")]
    pub subdistrict: String,
    #[tabled(rename = "Total PLKUMKM")]
    pub count_a: String,
    #[tabled(rename = "Total KDM")]
    pub count_b: String,
    #[tabled(rename = "Σ Selisih")]
    pub difference: String,
    #[tabled(rename = "Kategori")]
    pub category: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct SummaryStats {
    pub total_count_a: i64,
    pub total_count_b: i64,
    pub total_difference: i64,
    pub record_count: usize,
    pub match_count: usize,
    pub shortfall_count: usize,
    pub over_count: usize,
}
