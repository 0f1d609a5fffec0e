// Entry point and the interactive menu.
//
// - Option [1] loads (or reloads) the input file through the cached pipeline.
// - Option [2] changes the district / subdistrict / search / category filters.
// - Option [3] prints the KPI summary, the subdistrict rollup, the detail
//   table and the chart for the current filters.
// - Option [4] flips the shared sort direction.
// - Option [5] exports the current detail view.
use chrono::Local;
use clap::Parser;
use log::error;
use once_cell::sync::Lazy;
use sls_report::chart::render_bars;
use sls_report::cli::Cli;
use sls_report::error::ExportError;
use sls_report::filter::{DistrictChoice, ALL_DISTRICTS};
use sls_report::loader::DEFAULT_INPUT;
use sls_report::output::{self, detail_preview, rollup_preview};
use sls_report::regions::RegionLookup;
use sls_report::session::Session;
use sls_report::types::{Category, SortDirection};
use sls_report::util::format_int;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const PREVIEW_ROWS: usize = 20;

// Single-user app state: the table is loaded once and queried many times.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        session: Session::new(RegionLookup::mojokerto(), SortDirection::default()),
        input: PathBuf::from(DEFAULT_INPUT),
        out_dir: PathBuf::from("."),
    })
});

struct AppState {
    session: Session,
    input: PathBuf,
    out_dir: PathBuf,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print `label` and read one trimmed line from stdin.
fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Parse a comma separated list of 1-based choices into indexes.
fn parse_picks(input: &str, len: usize) -> Vec<usize> {
    input
        .split(',')
        .filter_map(|p| p.trim().parse::<usize>().ok())
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
        .collect()
}

/// `0` is "(Semua)", `1..=len` names a district; anything else is rejected.
fn district_pick(input: &str, districts: &[String]) -> Option<DistrictChoice> {
    match input.trim().parse::<usize>().ok()? {
        0 => Some(DistrictChoice::All),
        n => districts.get(n - 1).cloned().map(DistrictChoice::Named),
    }
}

fn handle_load() {
    let mut st = state();
    let input = st.input.clone();
    match st.session.load(&input) {
        Ok(report) => {
            let note = if report.cache_hit { " (unchanged, cached)" } else { "" };
            println!(
                "Loaded {} SLS rows from {}{}",
                format_int(report.total_rows),
                input.display(),
                note
            );
            if report.unlabeled_rows > 0 {
                println!(
                    "Note: {} rows have no Kecamatan/Kelurahan mapping and only show without region filters.",
                    format_int(report.unlabeled_rows)
                );
            }
            println!();
        }
        Err(e) => {
            error!("load failed: {}", e);
            eprintln!("Failed to load data: {}\n", e);
        }
    }
}

fn handle_filters() {
    let mut st = state();
    if !st.session.is_loaded() {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    }

    let districts = st.session.district_options();
    println!("Kecamatan:");
    println!("  [0] {}", ALL_DISTRICTS);
    for (i, d) in districts.iter().enumerate() {
        println!("  [{}] {}", i + 1, d);
    }
    let pick = prompt("Pilih Kecamatan (blank = keep): ");
    if !pick.is_empty() {
        match district_pick(&pick, &districts) {
            Some(choice) => st.session.set_district(choice),
            None => println!("Invalid choice. Keeping current Kecamatan."),
        }
    }

    let subs = st.session.subdistrict_options();
    println!("Kelurahan:");
    for (i, s) in subs.iter().enumerate() {
        println!("  [{}] {}", i + 1, s);
    }
    let pick = prompt("Filter Kelurahan (e.g. 1,3; '-' = none; blank = keep): ");
    if pick == "-" {
        st.session.filter.subdistricts.clear();
    } else if !pick.is_empty() {
        st.session.filter.subdistricts = parse_picks(&pick, subs.len())
            .into_iter()
            .map(|i| subs[i].clone())
            .collect();
    }

    let q = prompt("Cari Nama/ID SLS ('-' = clear; blank = keep): ");
    if q == "-" {
        st.session.filter.search = None;
    } else if !q.is_empty() {
        st.session.filter.search = Some(q);
    }

    println!("Kategori:");
    for (i, c) in Category::ALL.iter().enumerate() {
        println!("  [{}] {}", i + 1, c);
    }
    let pick = prompt("Filter Kategori (e.g. 1,2; '-' = none; blank = keep): ");
    if pick == "-" {
        st.session.filter.categories = BTreeSet::new();
    } else if !pick.is_empty() {
        st.session.filter.categories = parse_picks(&pick, Category::ALL.len())
            .into_iter()
            .map(|i| Category::ALL[i])
            .collect();
    }
    println!();
}

fn handle_dashboard() {
    let st = state();
    let Some(board) = st.session.dashboard() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let s = &board.summary;
    println!("Statistik Ringkas");
    println!(
        "  Total PLKUMKM: {}   Total KDM: {}   Σ Selisih: {}   Jumlah SLS: {}",
        format_int(s.total_count_a),
        format_int(s.total_count_b),
        format_int(s.total_difference),
        format_int(s.record_count)
    );
    println!(
        "  Match (=0): {}   Kurang (>0): {}   Bagus/Over (<0): {}\n",
        s.match_count, s.shortfall_count, s.over_count
    );

    output::preview_table(
        &format!("Akumulasi per Kelurahan ({})", st.session.direction.label()),
        Some("Definisi: Selisih = KDM − PLKUMKM. 0 = Match, <0 = Over/Bagus, >0 = Kurang."),
        &rollup_preview(&board.rollup),
        PREVIEW_ROWS,
    );
    output::preview_table("Tabel SLS", None, &detail_preview(&board.detail), PREVIEW_ROWS);

    match render_bars(&board.detail, st.session.direction) {
        Some(chart) => println!("{}", chart),
        None => println!("Tidak ada data untuk divisualisasikan.\n"),
    }
}

fn handle_toggle_sort() {
    let mut st = state();
    st.session.direction = st.session.direction.toggled();
    println!("Urutkan Ranking Selisih: {}\n", st.session.direction.label());
}

fn handle_export() {
    let st = state();
    let now = Local::now().naive_local();
    match st.session.export(&st.out_dir, now) {
        Ok(outcome) => {
            println!("Excel saved to {}", outcome.spreadsheet.display());
            match outcome.document {
                Ok(path) => println!("PDF saved to {}", path.display()),
                Err(ExportError::Unavailable) => {
                    println!("PDF export is disabled in this build (feature `pdf`).")
                }
                Err(e) => eprintln!("PDF export failed: {}", e),
            }
            println!("Summary saved to {}\n", outcome.summary.display());
        }
        Err(e) => {
            error!("export failed: {}", e);
            eprintln!("Export failed: {}\n", e);
        }
    }
}

fn main() {
    sls_report::init_logging();
    let cli = Cli::parse();
    {
        let mut st = state();
        st.input = cli.input;
        st.out_dir = cli.out_dir;
        if cli.ascending {
            st.session.direction = SortDirection::Ascending;
        }
    }

    loop {
        println!("Dashboard SLS: PLKUMKM vs KDM");
        println!("[1] Load the file");
        println!("[2] Set filters");
        println!("[3] Show dashboard");
        println!("[4] Toggle sort direction");
        if output::document_export_available() {
            println!("[5] Export view (Excel + PDF)");
        } else {
            println!("[5] Export view (Excel)");
        }
        println!("[0] Exit\n");
        match prompt("Enter choice: ").as_str() {
            "1" => handle_load(),
            "2" => handle_filters(),
            "3" => {
                println!();
                handle_dashboard();
            }
            "4" => handle_toggle_sort(),
            "5" => handle_export(),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{district_pick, parse_picks};
    use sls_report::filter::DistrictChoice;

    #[test]
    fn picks_ignore_out_of_range_entries() {
        assert_eq!(parse_picks("1, 3,9,x", 3), vec![0, 2]);
        assert!(parse_picks("", 3).is_empty());
    }

    #[test]
    fn invalid_district_pick_is_rejected() {
        let districts = vec!["Kranggan".to_string(), "Magersari".to_string()];
        assert_eq!(district_pick("0", &districts), Some(DistrictChoice::All));
        assert_eq!(
            district_pick(" 2 ", &districts),
            Some(DistrictChoice::Named("Magersari".into()))
        );
        assert_eq!(district_pick("3", &districts), None);
        assert_eq!(district_pick("abc", &districts), None);
        assert_eq!(district_pick("-1", &districts), None);
    }
}
