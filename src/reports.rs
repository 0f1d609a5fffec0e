use crate::filter::{matches_district, DistrictChoice, FilterSpec};
use crate::types::{Category, EnrichedRecord, RollupRow, SortDirection, SummaryStats, ViewResult};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Stable sort on `key` in the requested direction.
pub fn sort_by_direction<T>(items: &mut [T], direction: SortDirection, key: impl Fn(&T) -> i64) {
    match direction {
        SortDirection::Ascending => items.sort_by_key(key),
        SortDirection::Descending => items.sort_by_key(|t| std::cmp::Reverse(key(t))),
    }
}

/// "min" ranking over an already sorted sequence: tied keys share the
/// 1-based position of the first member of the tie, and the next distinct
/// key jumps past every tied position.
pub fn min_ranks<T>(sorted: &[T], key: impl Fn(&T) -> i64) -> Vec<usize> {
    let mut ranks = Vec::with_capacity(sorted.len());
    let mut prev: Option<(i64, usize)> = None;
    for (idx, item) in sorted.iter().enumerate() {
        let k = key(item);
        let rank = match prev {
            Some((pk, pr)) if pk == k => pr,
            _ => idx + 1,
        };
        ranks.push(rank);
        prev = Some((k, rank));
    }
    ranks
}

/// Detail table: filtered records sorted by `difference`, with ranks.
pub fn rank_view(records: &[&EnrichedRecord], direction: SortDirection) -> ViewResult {
    let mut sorted: Vec<EnrichedRecord> = records.iter().map(|r| (*r).clone()).collect();
    sort_by_direction(&mut sorted, direction, |r| r.difference);
    let ranks = min_ranks(&sorted, |r| r.difference);
    ViewResult {
        records: sorted,
        ranks,
    }
}

pub fn detail_view(table: &[EnrichedRecord], spec: &FilterSpec, direction: SortDirection) -> ViewResult {
    rank_view(&spec.apply(table), direction)
}

/// Per-subdistrict rollup of `records`, ranked by summed difference.
///
/// Rows without a subdistrict are left out; an empty input yields no rows.
pub fn rollup(records: &[&EnrichedRecord], direction: SortDirection) -> Vec<RollupRow> {
    #[derive(Default)]
    struct Acc {
        count_a: i64,
        count_b: i64,
        difference: i64,
        records: usize,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in records {
        let Some(sub) = r.subdistrict.as_deref() else {
            continue;
        };
        let e = map.entry(sub).or_default();
        e.count_a = e.count_a.saturating_add(r.count_a);
        e.count_b = e.count_b.saturating_add(r.count_b);
        e.difference = e.difference.saturating_add(r.difference);
        e.records += 1;
    }

    let mut rows: Vec<RollupRow> = map
        .into_iter()
        .map(|(sub, acc)| RollupRow {
            rank: 0,
            subdistrict: sub.to_string(),
            count_a_sum: acc.count_a,
            count_b_sum: acc.count_b,
            difference_sum: acc.difference,
            record_count: acc.records,
        })
        .collect();
    sort_by_direction(&mut rows, direction, |r| r.difference_sum);
    let ranks = min_ranks(&rows, |r| r.difference_sum);
    for (row, rank) in rows.iter_mut().zip(ranks) {
        row.rank = rank;
    }
    rows
}

/// Rollup for the region part of `spec`; search text and categories do not
/// narrow the subdistrict totals.
pub fn region_rollup(table: &[EnrichedRecord], spec: &FilterSpec, direction: SortDirection) -> Vec<RollupRow> {
    rollup(&spec.regions_only().apply(table), direction)
}

pub fn summarize<'a>(records: impl IntoIterator<Item = &'a EnrichedRecord>) -> SummaryStats {
    let mut stats = SummaryStats::default();
    for r in records {
        stats.total_count_a = stats.total_count_a.saturating_add(r.count_a);
        stats.total_count_b = stats.total_count_b.saturating_add(r.count_b);
        stats.total_difference = stats.total_difference.saturating_add(r.difference);
        stats.record_count += 1;
        match r.category {
            Category::Match => stats.match_count += 1,
            Category::Shortfall => stats.shortfall_count += 1,
            Category::Over => stats.over_count += 1,
        }
    }
    stats
}

/// Sorted distinct districts present in the table.
pub fn district_options(table: &[EnrichedRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = table.iter().filter_map(|r| r.district.as_deref()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Distinct subdistricts in first-appearance order, limited to the chosen
/// district.
pub fn subdistrict_options(table: &[EnrichedRecord], district: &DistrictChoice) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .iter()
        .filter(|r| matches_district(district, r))
        .filter_map(|r| r.subdistrict.as_deref())
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}
