use crate::regions::RegionLookup;
use crate::types::{CanonicalRecord, Category, EnrichedRecord};
use crate::util::{coerce_i64, parse_code};

/// Turn one canonical row into its enriched form.
///
/// `difference` is taken from the source as-is; it is never recomputed from
/// the two counts.
pub fn enrich_record(rec: &CanonicalRecord, regions: &RegionLookup) -> EnrichedRecord {
    let area_id = rec.area_id.as_text();
    let area_name = rec.area_name.as_text();
    let difference = coerce_i64(&rec.difference);
    EnrichedRecord {
        parsed_code: parse_code(&area_name),
        district: regions.district(&area_id).map(str::to_string),
        subdistrict: regions.subdistrict(&area_id).map(str::to_string),
        count_a: coerce_i64(&rec.count_a),
        count_b: coerce_i64(&rec.count_b),
        category: Category::from_difference(difference),
        difference,
        area_id,
        area_name,
    }
}

pub fn enrich(records: &[CanonicalRecord], regions: &RegionLookup) -> Vec<EnrichedRecord> {
    records.iter().map(|r| enrich_record(r, regions)).collect()
}
