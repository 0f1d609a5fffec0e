// One user's dashboard state: the cached table plus the current controls.
//
// Every query runs against an `Arc` snapshot of the enriched table; a new
// snapshot only appears when `load` is called with different content.
use crate::error::{ExportError, Result, SlsError};
use crate::filter::{DistrictChoice, FilterSpec};
use crate::loader::{LoadReport, Snapshot, TableCache};
use crate::output::{self, TableView, DOCUMENT_TITLE, SHEET_NAME};
use crate::regions::RegionLookup;
use crate::reports::{detail_view, district_options, region_rollup, subdistrict_options, summarize};
use crate::types::{RollupRow, SortDirection, SummaryStats, ViewResult};
use chrono::NaiveDateTime;
use log::info;
use std::path::{Path, PathBuf};

/// Everything one render of the dashboard needs.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub summary: SummaryStats,
    pub rollup: Vec<RollupRow>,
    pub detail: ViewResult,
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub spreadsheet: PathBuf,
    pub summary: PathBuf,
    /// `Err(ExportError::Unavailable)` when the document renderer is absent.
    pub document: std::result::Result<PathBuf, ExportError>,
}

pub struct Session {
    regions: &'static RegionLookup,
    cache: TableCache,
    pub filter: FilterSpec,
    pub direction: SortDirection,
}

impl Session {
    pub fn new(regions: &'static RegionLookup, direction: SortDirection) -> Self {
        Self {
            regions,
            cache: TableCache::new(),
            filter: FilterSpec::default(),
            direction,
        }
    }

    pub fn load(&mut self, path: &Path) -> Result<LoadReport> {
        let (_, report) = self.cache.load_path(path, self.regions)?;
        Ok(report)
    }

    pub fn table(&self) -> Option<Snapshot> {
        self.cache.snapshot()
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.snapshot().is_some()
    }

    /// Changing the district clears subdistrict picks that no longer apply.
    pub fn set_district(&mut self, choice: DistrictChoice) {
        self.filter.district = choice;
        let allowed = self.subdistrict_options();
        self.filter.subdistricts.retain(|s| allowed.contains(s));
    }

    pub fn district_options(&self) -> Vec<String> {
        self.table().map(|t| district_options(&t)).unwrap_or_default()
    }

    pub fn subdistrict_options(&self) -> Vec<String> {
        self.table()
            .map(|t| subdistrict_options(&t, &self.filter.district))
            .unwrap_or_default()
    }

    pub fn dashboard(&self) -> Option<Dashboard> {
        let table = self.table()?;
        // KPIs and the rollup follow the region controls only; the detail
        // table also applies search and category.
        let regional = self.filter.regions_only().apply(&table);
        Some(Dashboard {
            summary: summarize(regional.iter().copied()),
            rollup: region_rollup(&table, &self.filter, self.direction),
            detail: detail_view(&table, &self.filter, self.direction),
        })
    }

    /// Writes the current detail view as spreadsheet, document and summary
    /// JSON into `dir`. A missing document renderer does not fail the call.
    pub fn export(&self, dir: &Path, at: NaiveDateTime) -> Result<ExportOutcome> {
        let board = self.dashboard().ok_or(SlsError::NotLoaded)?;
        let view = TableView::detail(&board.detail);

        let xlsx = output::to_spreadsheet_bytes(&view, SHEET_NAME)?;
        let spreadsheet = output::write_bytes(dir, &output::export_filename(at, "xlsx"), &xlsx)?;
        info!("wrote {}", spreadsheet.display());

        let document = match output::to_document_bytes(DOCUMENT_TITLE, &view, at) {
            Ok(pdf) => {
                let path = output::write_bytes(dir, &output::export_filename(at, "pdf"), &pdf)?;
                info!("wrote {}", path.display());
                Ok(path)
            }
            Err(e) => Err(e),
        };

        let summary = dir.join("summary.json");
        output::write_json(&summary, &board.summary)?;
        Ok(ExportOutcome {
            spreadsheet,
            summary,
            document,
        })
    }
}
