//! Reconciliation report of PLKUMKM vs KDM business counts per SLS.
//!
//! Load once (`loader` -> `schema` -> `enrich`), then query as often as the
//! user changes a control (`filter`, `reports`), and export the current view
//! on demand (`output`, `document`).
pub mod chart;
pub mod cli;
pub mod document;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod regions;
pub mod reports;
pub mod schema;
pub mod session;
pub mod types;
pub mod util;

use std::{env, sync::OnceLock};

use log::LevelFilter;

static LOGGER: OnceLock<()> = OnceLock::new();

pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sls_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}
