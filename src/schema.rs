// Header normalization: free-text sheet headers -> canonical fields.
use crate::error::SchemaError;
use crate::types::{CanonicalRecord, Cell, RawTable};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    AreaId,
    AreaName,
    CountA,
    CountB,
    Difference,
}

impl CanonicalField {
    pub const REQUIRED: [CanonicalField; 5] = [
        CanonicalField::AreaId,
        CanonicalField::AreaName,
        CanonicalField::CountA,
        CanonicalField::CountB,
        CanonicalField::Difference,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::AreaId => "area_id",
            CanonicalField::AreaName => "area_name",
            CanonicalField::CountA => "count_a",
            CanonicalField::CountB => "count_b",
            CanonicalField::Difference => "difference",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

const SYNONYMS: &[(&str, CanonicalField)] = &[
    ("id sls", CanonicalField::AreaId),
    ("id_sls", CanonicalField::AreaId),
    ("idsls", CanonicalField::AreaId),
    ("id", CanonicalField::AreaId),
    ("area_id", CanonicalField::AreaId),
    ("nama sls", CanonicalField::AreaName),
    ("nama_sls", CanonicalField::AreaName),
    ("nama", CanonicalField::AreaName),
    ("area_name", CanonicalField::AreaName),
    ("jumlah usaha plkumkm", CanonicalField::CountA),
    ("plkumkm", CanonicalField::CountA),
    ("jumlah plkumkm", CanonicalField::CountA),
    ("count_a", CanonicalField::CountA),
    ("jumlah usaha kdm", CanonicalField::CountB),
    ("kdm", CanonicalField::CountB),
    ("jumlah kdm", CanonicalField::CountB),
    ("count_b", CanonicalField::CountB),
    ("selisih jumlah usaha", CanonicalField::Difference),
    ("selisih", CanonicalField::Difference),
    ("difference", CanonicalField::Difference),
];

/// Map one header (any casing, surrounding whitespace) to its field.
pub fn lookup_header(header: &str) -> Option<CanonicalField> {
    let key = header.trim().to_lowercase();
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, field)| *field)
}

/// Resolve the header row to one column index per canonical field.
///
/// The first header that maps to a field wins; unrecognized headers are
/// dropped. Fails with the list of missing fields if any are unmapped.
pub fn map_headers(headers: &[String]) -> Result<[usize; 5], SchemaError> {
    let mut slots: [Option<usize>; 5] = [None; 5];
    for (idx, header) in headers.iter().enumerate() {
        match lookup_header(header) {
            Some(field) if slots[field.index()].is_none() => {
                debug!("header {:?} -> {}", header, field.name());
                slots[field.index()] = Some(idx);
            }
            Some(field) => debug!("header {:?} duplicates {}, ignored", header, field.name()),
            None => warn!("dropping unrecognized column {:?}", header),
        }
    }

    let missing: Vec<&'static str> = CanonicalField::REQUIRED
        .iter()
        .filter(|f| slots[f.index()].is_none())
        .map(|f| f.name())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingFields {
            missing,
            required: CanonicalField::REQUIRED.iter().map(|f| f.name()).collect(),
        });
    }

    let mut out = [0usize; 5];
    for (slot, found) in out.iter_mut().zip(slots) {
        *slot = found.unwrap_or_default();
    }
    Ok(out)
}

pub fn normalize(table: RawTable) -> Result<Vec<CanonicalRecord>, SchemaError> {
    let cols = map_headers(&table.headers)?;
    let pick = |row: &[Cell], field: CanonicalField| {
        row.get(cols[field.index()]).cloned().unwrap_or(Cell::Empty)
    };
    Ok(table
        .rows
        .iter()
        .map(|row| CanonicalRecord {
            area_id: pick(row, CanonicalField::AreaId),
            area_name: pick(row, CanonicalField::AreaName),
            count_a: pick(row, CanonicalField::CountA),
            count_b: pick(row, CanonicalField::CountB),
            difference: pick(row, CanonicalField::Difference),
        })
        .collect())
}
