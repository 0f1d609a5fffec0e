use crate::types::{Category, EnrichedRecord};
use std::collections::BTreeSet;

/// Label the district selector shows for "no district restriction".
pub const ALL_DISTRICTS: &str = "(Semua)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DistrictChoice {
    #[default]
    All,
    Named(String),
}

impl DistrictChoice {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == ALL_DISTRICTS || s.eq_ignore_ascii_case("all") {
            DistrictChoice::All
        } else {
            DistrictChoice::Named(s.to_string())
        }
    }
}

/// One query over the enriched table. Built fresh per interaction.
///
/// The category set is applied literally: an empty set matches nothing.
/// `FilterSpec::default()` therefore starts with every category selected,
/// the way the dashboard's category widget does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub district: DistrictChoice,
    pub subdistricts: BTreeSet<String>,
    pub search: Option<String>,
    pub categories: BTreeSet<Category>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            district: DistrictChoice::All,
            subdistricts: BTreeSet::new(),
            search: None,
            categories: Category::ALL.into_iter().collect(),
        }
    }
}

impl FilterSpec {
    /// Only the region part of this spec; used for the subdistrict rollup.
    pub fn regions_only(&self) -> FilterSpec {
        FilterSpec {
            district: self.district.clone(),
            subdistricts: self.subdistricts.clone(),
            search: None,
            categories: Category::ALL.into_iter().collect(),
        }
    }

    pub fn matches(&self, rec: &EnrichedRecord) -> bool {
        matches_district(&self.district, rec)
            && matches_subdistricts(&self.subdistricts, rec)
            && self.search.as_deref().map_or(true, |q| matches_search(q, rec))
            && self.categories.contains(&rec.category)
    }

    pub fn apply<'a>(&self, table: &'a [EnrichedRecord]) -> Vec<&'a EnrichedRecord> {
        table.iter().filter(|r| self.matches(r)).collect()
    }
}

pub fn matches_district(choice: &DistrictChoice, rec: &EnrichedRecord) -> bool {
    match choice {
        DistrictChoice::All => true,
        DistrictChoice::Named(name) => rec.district.as_deref() == Some(name.as_str()),
    }
}

pub fn matches_subdistricts(selected: &BTreeSet<String>, rec: &EnrichedRecord) -> bool {
    selected.is_empty()
        || rec
            .subdistrict
            .as_ref()
            .is_some_and(|s| selected.contains(s))
}

/// Case-insensitive on the name; plain substring on the id and parsed code.
/// A blank query matches everything.
pub fn matches_search(query: &str, rec: &EnrichedRecord) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    rec.area_name.to_lowercase().contains(&q)
        || rec.area_id.contains(&q)
        || rec.parsed_code.as_deref().unwrap_or("").contains(&q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, name: &str, diff: i64, district: Option<&str>, sub: Option<&str>) -> EnrichedRecord {
        EnrichedRecord {
            area_id: id.into(),
            area_name: name.into(),
            count_a: 0,
            count_b: diff,
            difference: diff,
            parsed_code: crate::util::parse_code(name),
            district: district.map(Into::into),
            subdistrict: sub.map(Into::into),
            category: Category::from_difference(diff),
        }
    }

    fn table() -> Vec<EnrichedRecord> {
        vec![
            rec("3576010001001", "[12] Foo", -2, Some("Prajurit Kulon"), Some("Surodinawan")),
            rec("3576020003002", "Bar RT 1", 0, Some("Magersari"), Some("Kedundung")),
            rec("9999999999003", "[77] Baz", 4, None, None),
        ]
    }

    #[test]
    fn default_spec_keeps_everything() {
        let t = table();
        assert_eq!(FilterSpec::default().apply(&t).len(), 3);
    }

    #[test]
    fn empty_category_set_matches_nothing() {
        let t = table();
        let spec = FilterSpec {
            categories: BTreeSet::new(),
            ..FilterSpec::default()
        };
        assert!(spec.apply(&t).is_empty());
    }

    #[test]
    fn district_and_subdistrict_exclude_unlabeled_rows() {
        let t = table();
        let spec = FilterSpec {
            district: DistrictChoice::Named("Magersari".into()),
            ..FilterSpec::default()
        };
        let hits = spec.apply(&t);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].area_name, "Bar RT 1");

        let spec = FilterSpec {
            subdistricts: ["Surodinawan".to_string(), "Kedundung".to_string()].into(),
            ..FilterSpec::default()
        };
        assert_eq!(spec.apply(&t).len(), 2);
    }

    #[test]
    fn search_covers_name_id_and_code() {
        let t = table();
        let by = |q: &str| {
            FilterSpec {
                search: Some(q.into()),
                ..FilterSpec::default()
            }
            .apply(&t)
            .into_iter()
            .map(|r| r.area_name.clone())
            .collect::<Vec<_>>()
        };
        assert_eq!(by("FOO"), vec!["[12] Foo"]);
        assert_eq!(by("3576020"), vec!["Bar RT 1"]);
        assert_eq!(by("77"), vec!["[77] Baz"]);
        assert_eq!(by("  ").len(), 3);
    }

    #[test]
    fn district_choice_parsing() {
        assert_eq!(DistrictChoice::parse("(Semua)"), DistrictChoice::All);
        assert_eq!(DistrictChoice::parse(""), DistrictChoice::All);
        assert_eq!(
            DistrictChoice::parse(" Kranggan "),
            DistrictChoice::Named("Kranggan".into())
        );
    }
}
