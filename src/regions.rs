// Static code-prefix -> region name tables.
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const DISTRICT_PREFIX_LEN: usize = 7;
pub const SUBDISTRICT_PREFIX_LEN: usize = 10;

const MOJOKERTO_DISTRICTS: &[(&str, &str)] = &[
    ("3576010", "Prajurit Kulon"),
    ("3576020", "Magersari"),
    ("3576021", "Kranggan"),
];

const MOJOKERTO_SUBDISTRICTS: &[(&str, &str)] = &[
    ("3576010001", "Surodinawan"),
    ("3576010004", "Prajuritkulon"),
    ("3576010005", "Blooto"),
    ("3576010006", "Mentikan"),
    ("3576010007", "Kauman"),
    ("3576010008", "Pulorejo"),
    ("3576020002", "Gunung Gedangan"),
    ("3576020003", "Kedundung"),
    ("3576020004", "Balongsari"),
    ("3576020008", "Gedongan"),
    ("3576020009", "Magersari"),
    ("3576020010", "Wates"),
    ("3576021004", "Miji"),
    ("3576021001", "Kranggan"),
    ("3576021006", "Purwotengah"),
    ("3576021005", "Sentanan"),
    ("3576021003", "Jagalan"),
    ("3576021002", "Meri"),
];

static MOJOKERTO: Lazy<RegionLookup> =
    Lazy::new(|| RegionLookup::from_pairs(MOJOKERTO_DISTRICTS, MOJOKERTO_SUBDISTRICTS));

/// Two immutable prefix tables: 7-character district codes and
/// 10-character subdistrict codes.
#[derive(Debug, Clone, Default)]
pub struct RegionLookup {
    districts: HashMap<String, String>,
    subdistricts: HashMap<String, String>,
}

impl RegionLookup {
    /// The compiled-in Kota Mojokerto tables, built on first use.
    pub fn mojokerto() -> &'static RegionLookup {
        &MOJOKERTO
    }

    pub fn from_pairs(districts: &[(&str, &str)], subdistricts: &[(&str, &str)]) -> Self {
        let own = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect()
        };
        Self {
            districts: own(districts),
            subdistricts: own(subdistricts),
        }
    }

    pub fn district(&self, area_id: &str) -> Option<&str> {
        lookup_prefix(&self.districts, area_id, DISTRICT_PREFIX_LEN)
    }

    pub fn subdistrict(&self, area_id: &str) -> Option<&str> {
        lookup_prefix(&self.subdistricts, area_id, SUBDISTRICT_PREFIX_LEN)
    }
}

// An id shorter than the prefix is looked up whole, so it only matches a
// key of exactly that length (never, for well-formed tables).
fn lookup_prefix<'a>(map: &'a HashMap<String, String>, area_id: &str, len: usize) -> Option<&'a str> {
    let prefix = match area_id.char_indices().nth(len) {
        Some((byte_idx, _)) => &area_id[..byte_idx],
        None => area_id,
    };
    map.get(prefix).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_levels_from_a_full_id() {
        let lookup = RegionLookup::mojokerto();
        assert_eq!(lookup.district("3576010001"), Some("Prajurit Kulon"));
        assert_eq!(lookup.subdistrict("3576010001"), Some("Surodinawan"));
        assert_eq!(lookup.subdistrict("35760210060007"), Some("Purwotengah"));
    }

    #[test]
    fn unknown_or_short_prefixes_miss() {
        let lookup = RegionLookup::mojokerto();
        assert_eq!(lookup.district("3577010001"), None);
        assert_eq!(lookup.subdistrict("3576010"), None);
        assert_eq!(lookup.district(""), None);
    }

    #[test]
    fn custom_tables_can_be_injected() {
        let lookup = RegionLookup::from_pairs(&[("1234567", "Alpha")], &[]);
        assert_eq!(lookup.district("1234567999"), Some("Alpha"));
        assert_eq!(lookup.subdistrict("1234567999"), None);
    }
}
