use crate::enrich::enrich;
use crate::error::{Result, SchemaError, SlsError};
use crate::regions::RegionLookup;
use crate::schema::normalize;
use crate::types::{Cell, EnrichedRecord, RawTable};
use calamine::{Data, Reader, Xlsx};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// The well-known file the dashboard reads when nothing else is given.
pub const DEFAULT_INPUT: &str = "Data KDM SLS.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Xlsx,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(InputFormat::Xlsx),
            "csv" => Some(InputFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub unlabeled_rows: usize,
    pub source_hash: String,
    pub cache_hit: bool,
}

/// Shared, immutable snapshot of the enriched table.
pub type Snapshot = Arc<Vec<EnrichedRecord>>;

pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn read_raw(bytes: &[u8], format: InputFormat) -> Result<RawTable> {
    match format {
        InputFormat::Xlsx => read_xlsx(bytes),
        InputFormat::Csv => read_csv(bytes),
    }
}

fn read_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SchemaError::NoSheets)?;
    debug!("reading worksheet {:?}", sheet);
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(SchemaError::EmptySheet)?
        .iter()
        .map(|c| cell_from_data(c).as_text().trim().to_string())
        .collect();
    let rows = rows
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| *c != Cell::Empty))
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(String::is_empty) {
        return Err(SchemaError::EmptySheet.into());
    }
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawTable { headers, rows })
}

/// Normalize and enrich an in-memory file.
pub fn load_bytes(
    bytes: &[u8],
    format: InputFormat,
    regions: &RegionLookup,
) -> Result<Vec<EnrichedRecord>> {
    let raw = read_raw(bytes, format)?;
    let canonical = normalize(raw)?;
    Ok(enrich(&canonical, regions))
}

/// Memoizes the enriched table on the SHA-256 of the source bytes.
///
/// The same content is never re-enriched; a different content replaces the
/// snapshot wholesale.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<(String, Snapshot)>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.entry.as_ref().map(|(_, table)| Arc::clone(table))
    }

    pub fn source_hash(&self) -> Option<&str> {
        self.entry.as_ref().map(|(hash, _)| hash.as_str())
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn load_path(&mut self, path: &Path, regions: &RegionLookup) -> Result<(Snapshot, LoadReport)> {
        if !path.exists() {
            return Err(SlsError::FileNotFound(path.to_path_buf()));
        }
        let format =
            InputFormat::from_path(path).ok_or_else(|| SlsError::UnsupportedFormat(path.to_path_buf()))?;
        let bytes = std::fs::read(path)?;
        info!("loading {} ({} bytes)", path.display(), bytes.len());
        self.load_bytes(&bytes, format, regions)
    }

    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        format: InputFormat,
        regions: &RegionLookup,
    ) -> Result<(Snapshot, LoadReport)> {
        let hash = content_hash(bytes);
        if let Some((cached, table)) = &self.entry {
            if *cached == hash {
                debug!("source {} unchanged, reusing enriched table", &hash[..12]);
                return Ok((Arc::clone(table), report_for(table, hash, true)));
            }
        }

        debug!("source {} not cached, enriching", &hash[..12]);
        let table: Snapshot = Arc::new(load_bytes(bytes, format, regions)?);
        let report = report_for(&table, hash.clone(), false);
        if report.unlabeled_rows > 0 {
            warn!(
                "{} of {} rows have an area_id prefix outside the region tables",
                report.unlabeled_rows, report.total_rows
            );
        }
        self.entry = Some((hash, Arc::clone(&table)));
        Ok((table, report))
    }
}

fn report_for(table: &[EnrichedRecord], source_hash: String, cache_hit: bool) -> LoadReport {
    LoadReport {
        total_rows: table.len(),
        unlabeled_rows: table
            .iter()
            .filter(|r| r.district.is_none() || r.subdistrict.is_none())
            .count(),
        source_hash,
        cache_hit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "ID SLS,Nama SLS,PLKUMKM,KDM,Selisih,Keterangan\n\
                       3576010001,[12] Foo,10,8,-2,a\n\
                       3576020003,Bar,5,,x,b\n";

    #[test]
    fn csv_input_is_normalized_and_enriched() {
        let recs = load_bytes(CSV.as_bytes(), InputFormat::Csv, RegionLookup::mojokerto()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].subdistrict.as_deref(), Some("Surodinawan"));
        assert_eq!(recs[1].count_b, 0);
        assert_eq!(recs[1].difference, 0);
        assert_eq!(recs[1].subdistrict.as_deref(), Some("Kedundung"));
    }

    #[test]
    fn missing_columns_abort_the_load() {
        let err = load_bytes(b"id,nama\n1,a\n", InputFormat::Csv, RegionLookup::mojokerto()).unwrap_err();
        assert!(matches!(err, SlsError::Schema(SchemaError::MissingFields { .. })));
    }

    #[test]
    fn cache_reuses_identical_content_and_replaces_on_change() {
        let mut cache = TableCache::new();
        let regions = RegionLookup::mojokerto();
        let (first, r1) = cache.load_bytes(CSV.as_bytes(), InputFormat::Csv, regions).unwrap();
        assert!(!r1.cache_hit);
        let (second, r2) = cache.load_bytes(CSV.as_bytes(), InputFormat::Csv, regions).unwrap();
        assert!(r2.cache_hit);
        assert!(Arc::ptr_eq(&first, &second));

        let changed = CSV.replace("-2", "3");
        let (third, r3) = cache.load_bytes(changed.as_bytes(), InputFormat::Csv, regions).unwrap();
        assert!(!r3.cache_hit);
        assert_eq!(third[0].difference, 3);
        assert_eq!(cache.source_hash(), Some(r3.source_hash.as_str()));

        cache.invalidate();
        assert!(cache.snapshot().is_none());
    }

    #[test]
    fn failed_load_keeps_previous_snapshot() {
        let mut cache = TableCache::new();
        let regions = RegionLookup::mojokerto();
        cache.load_bytes(CSV.as_bytes(), InputFormat::Csv, regions).unwrap();
        assert!(cache.load_bytes(b"foo\n1\n", InputFormat::Csv, regions).is_err());
        assert_eq!(cache.snapshot().map(|t| t.len()), Some(2));
    }

    #[test]
    fn format_detection() {
        assert_eq!(InputFormat::from_path(Path::new("a/Data.XLSX")), Some(InputFormat::Xlsx));
        assert_eq!(InputFormat::from_path(Path::new("a.csv")), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_path(Path::new("a.ods")), None);
    }
}
